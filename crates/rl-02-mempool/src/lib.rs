//! # Mempool
//!
//! Per-register holding area for validated, not-yet-sealed transactions.
//!
//! ## Ordering contract
//!
//! Docket building consumes `peek_batch` as-is, so the order is part of the
//! API: priority band first (`High`, `Normal`, `Low`), then arrival order
//! within a band. A transaction whose parent (`prev_tx_id`) is still pending
//! is held back until the parent is placed before it or sealed.
//!
//! ## Removal
//!
//! ```text
//! [PENDING] ──peek_batch──→ (still PENDING) ──commit ok──→ confirm_sealed ──→ [GONE]
//!                                   │
//!                                   └── commit failed ──→ (nothing to undo)
//! ```
//!
//! Transactions are removed only after the docket containing them has been
//! committed to storage. A failed commit needs no rollback because nothing
//! left the pool.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::StorageSealedIndex;
pub use domain::{MempoolConfig, MempoolError, MempoolStats, Priority};
pub use ports::{MempoolApi, SealedTransactionIndex};
pub use service::MempoolService;
