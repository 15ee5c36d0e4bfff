//! # Error Types
//!
//! Every subsystem owns a `thiserror` enum for its own failures and
//! classifies each variant into one `ErrorKind`. At the surface they all
//! collapse into `LedgerError`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error taxonomy shared by every subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed input.
    Validation,
    /// Missing register, pending registration or reference.
    NotFound,
    /// Replay, double genesis, nonce mismatch, duplicate id, lost sealing lease.
    Conflict,
    /// Signature or hash mismatch.
    CryptographicFailure,
    /// Broken docket chain.
    IntegrityViolation,
    /// A collaborator (wallet, storage backend) could not be reached.
    Unavailable,
    /// Capacity or index limit reached.
    Exhausted,
}

impl ErrorKind {
    /// Whether a caller may retry the same request unchanged.
    ///
    /// Validation and cryptographic failures are terminal: a bad signature
    /// cannot become valid.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validation => "ValidationError",
            Self::NotFound => "NotFound",
            Self::Conflict => "Conflict",
            Self::CryptographicFailure => "CryptographicFailure",
            Self::IntegrityViolation => "IntegrityViolation",
            Self::Unavailable => "Unavailable",
            Self::Exhausted => "Exhausted",
        };
        f.write_str(name)
    }
}

/// Unified error surfaced to callers of the ledger API.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct LedgerError {
    /// Classification.
    pub kind: ErrorKind,
    /// Human-readable detail.
    pub message: String,
}

impl LedgerError {
    /// Create an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for `ErrorKind::Validation`.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Shorthand for `ErrorKind::NotFound`.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Shorthand for `ErrorKind::Conflict`.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }
}

/// Result alias for surface operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
