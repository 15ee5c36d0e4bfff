//! # Transaction Validation
//!
//! Admission pipeline in front of the mempool. A transaction is admitted only
//! if its digests match its content, every signature verifies, its register
//! is online, its `prevTxId` is known, and its id is new.
//!
//! ## Checks
//!
//! | Step | Check | Rejection | Kind |
//! |------|-------|-----------|------|
//! | a | `payloadHash` over the exact payload bytes, then `transactionId` | `HashMismatch` | CryptographicFailure |
//! | b | each signature over the 32-byte id digest, `DigestMode::PreHashed` | `InvalidSignature` | CryptographicFailure |
//! | c | register exists and is `Online` | `RegisterNotFound` / `RegisterNotOnline` | NotFound / Validation |
//! | d | `prevTxId` sealed or pending in the same register | `InvalidChainReference` | NotFound |
//! | e | id not pending and not sealed | `Duplicate` | Conflict |
//!
//! Steps a and b are pure and run on the rayon pool for batches.
//!
//! ```text
//! client ──Transaction──→ [TransactionValidator] ──enqueue──→ [Mempool]
//!                                  │
//!                                  └──TransactionAccepted──→ [Event Bus]
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::StorageRegisterView;
pub use domain::{
    HashField, RejectionReason, ValidationError, ValidationOutcome, ValidatorConfig,
};
pub use ports::{RegisterView, TransactionValidationApi};
pub use service::TransactionValidator;
