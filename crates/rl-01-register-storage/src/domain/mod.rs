//! Domain layer: key layout, errors, configuration and record encoding.

pub(crate) mod codec;
pub mod config;
pub mod errors;
pub mod keys;

pub use config::StorageConfig;
pub use errors::{KVStoreError, StorageError, StorageResult};
pub use keys::KeyPrefix;
