//! Adapters for the validator's outbound ports.

pub mod storage;

pub use storage::StorageRegisterView;
