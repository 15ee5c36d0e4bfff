//! # Docket Consensus
//!
//! Drains the mempool into hash-linked, sealed dockets and owns each
//! register's height.
//!
//! ## Docket lifecycle
//!
//! ```text
//! build_next ─→ [Init] ─propose─→ [Proposed] ─accept─→ [Accepted] ─seal─→ [Sealed] ─commit─→ storage
//!     │                                                                                   │
//!     └── takes the register's SealingLease ──────────── released after commit or drop ───┘
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | One in-flight build per register | `SealingLeases::try_acquire`; the loser gets `LeaseHeld` (Conflict) |
//! | `height = head.height + 1`, `previousHash = head.hash` | `DocketCandidate::after`, rechecked in `seal` and by storage |
//! | Docket, transactions and register height commit together | single `commit_docket` batch |
//! | Mempool forgets a transaction only after its commit | `confirm_sealed` runs after `commit_docket` returns |
//! | A docket's hash covers its ordered transaction ids | `DocketCandidate::seal` |
//! | Chain breaks are reported, never repaired | `verify_register_chain` moves the register to `Recovery` |
//!
//! A commit that fails with a retryable storage error restarts from
//! `build_next`, so every attempt is built against the current head.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    verify_links, verify_stored, ChainBreak, ChainCursor, ChainMetrics, ConsensusError,
    ConsensusResult, DocketCandidate, SealingLease, SealingLeases, SealingPolicy,
};
pub use ports::{ConsensusApi, DocketBuild};
pub use service::ConsensusService;
