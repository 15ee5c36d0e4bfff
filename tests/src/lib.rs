//! # Register Ledger Test Suite
//!
//! Cross-crate flows driven through `node_runtime::LedgerApi` and the
//! container's subsystems.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs     # node, owners, signed transactions
//!     ├── flows.rs        # creation, admission, sealing, verification
//!     └── concurrency.rs  # racing finalizes, builders and enqueues
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p rl-tests
//! cargo test -p rl-tests integration::concurrency::
//! ```

pub mod integration;
