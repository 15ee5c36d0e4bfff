//! Adapters for the mempool's outbound ports.

pub mod sealed_index;

pub use sealed_index::StorageSealedIndex;
