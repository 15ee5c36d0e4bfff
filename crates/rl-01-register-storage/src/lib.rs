//! # Register Storage
//!
//! Persists registers, sealed dockets and sealed transactions over any
//! ordered key-value store with atomic batch writes.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | A register exists only with its genesis docket | `commit_genesis` writes both in one batch |
//! | `(registerId, height)` is unique | `check_sealed_docket` rejects taken heights |
//! | `previousHash` links to the stored parent | `commit_docket` compares before writing |
//! | A docket's hash matches its contents | `check_sealed_docket` recomputes it |
//! | Register height never decreases | `Register::advance_height` |
//! | Tenant isolation | `get_register_for_tenant` answers `NotFound` across tenants |
//!
//! ## Persisted layout
//!
//! Partitions `registers`, `transactions` and `dockets`, each keyed by
//! register; transactions additionally indexed by sender wallet and
//! timestamp. See `domain::keys`.
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │ ports/inbound.rs  - LedgerStore             │
//! ├────────────────────────────────────────────┤
//! │ service.rs        - RegisterStorageService  │
//! ├────────────────────────────────────────────┤
//! │ ports/outbound.rs - KeyValueStore           │
//! │ adapters/memory.rs - InMemoryKVStore        │
//! └────────────────────────────────────────────┘
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::InMemoryKVStore;
pub use domain::{KVStoreError, KeyPrefix, StorageConfig, StorageError, StorageResult};
pub use ports::{BatchOperation, KeyValueStore, LedgerStore};
pub use service::RegisterStorageService;

/// Storage service over the in-memory backend.
pub type InMemoryLedgerStore = RegisterStorageService<InMemoryKVStore>;

impl InMemoryLedgerStore {
    /// In-memory store with default limits.
    pub fn in_memory() -> Self {
        RegisterStorageService::new(InMemoryKVStore::new(), StorageConfig::default())
    }
}
