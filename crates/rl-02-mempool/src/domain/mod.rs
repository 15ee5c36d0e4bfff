//! Domain layer for the mempool.

pub mod entities;
pub mod errors;
pub mod pool;
pub mod value_objects;

pub use entities::{MempoolConfig, PooledTransaction, Priority};
pub use errors::MempoolError;
pub use pool::RegisterPool;
pub use value_objects::{MempoolStats, QueueKey};
