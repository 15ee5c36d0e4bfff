//! Adapters for register creation's outbound ports.

pub mod local_wallet;
pub mod memory_store;

pub use local_wallet::LocalKeyWallet;
pub use memory_store::InMemoryPendingStore;
