//! # Node Runtime Library
//!
//! Wires the register ledger's subsystems into one process. The `main.rs`
//! binary is a thin shell around `NodeRuntime`.
//!
//! ## Request Flow
//!
//! ```text
//! LedgerApi ──initiate/finalize──→ RegisterCreationService ─→ GenesisManager ─→ ConsensusService
//!     │                                                                              │
//!     └──submit_transaction──→ TransactionValidator ─→ MempoolService               │
//!                                         │                  ↑                      │
//!                                TransactionAccepted         │ peek/confirm         │
//!                                         ↓                  │                      ↓
//!                                  SealingScheduler ──build_and_seal──→ ConsensusService ─→ storage
//! ```
//!
//! ## Modules
//!
//! - `container/` - configuration and subsystem wiring
//! - `handlers/` - sealing scheduler and pending-registration reaper
//! - `api/` - the request/response surface

pub mod api;
pub mod container;
pub mod handlers;
pub mod runtime;

pub use api::LedgerApi;
pub use container::{ConfigError, ContainerError, LedgerContainer, LoggingConfig, NodeConfig};
pub use handlers::{PendingReaper, SealingScheduler};
pub use runtime::NodeRuntime;
