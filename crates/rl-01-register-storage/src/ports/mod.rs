//! Ports: `LedgerStore` is what the rest of the ledger calls; `KeyValueStore`
//! is what a storage backend implements.

pub mod inbound;
pub mod outbound;

pub use inbound::LedgerStore;
pub use outbound::{BatchOperation, KeyValueStore, ScanResult};
