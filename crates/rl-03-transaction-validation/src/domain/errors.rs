//! Rejection reasons and validator errors.
//!
//! A `RejectionReason` is a verdict on the transaction; the caller must not
//! resubmit it unchanged. A `ValidationError` means the validator itself could
//! not reach a verdict.

use shared_types::{
    ErrorKind, LedgerError, RegisterId, RegisterStatus, Timestamp, TransactionId,
};
use std::fmt;
use thiserror::Error;

/// Which digest failed to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashField {
    PayloadHash,
    TransactionId,
}

impl fmt::Display for HashField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PayloadHash => f.write_str("payloadHash"),
            Self::TransactionId => f.write_str("transactionId"),
        }
    }
}

/// Why a transaction was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("malformed transaction: {0}")]
    Malformed(String),

    #[error("{field} does not match the transmitted content")]
    HashMismatch { field: HashField },

    #[error("transaction carries no signatures")]
    MissingSignature,

    #[error("signature {index} failed verification: {detail}")]
    InvalidSignature { index: usize, detail: String },

    #[error("register {register_id} not found")]
    RegisterNotFound { register_id: RegisterId },

    #[error("register {register_id} is {status:?}, not Online")]
    RegisterNotOnline {
        register_id: RegisterId,
        status: RegisterStatus,
    },

    #[error("prevTxId {prev_tx_id} is not an accepted transaction of this register")]
    InvalidChainReference { prev_tx_id: TransactionId },

    #[error("transaction {transaction_id} already seen")]
    Duplicate { transaction_id: TransactionId },

    #[error("transaction expired at {expires_at}")]
    Expired { expires_at: Timestamp },

    #[error("mempool full ({capacity} pending)")]
    PoolFull { capacity: usize },
}

impl RejectionReason {
    /// Classify into the shared taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Malformed(_) | Self::MissingSignature | Self::Expired { .. } => {
                ErrorKind::Validation
            }
            Self::RegisterNotOnline { .. } => ErrorKind::Validation,
            Self::HashMismatch { .. } | Self::InvalidSignature { .. } => {
                ErrorKind::CryptographicFailure
            }
            Self::RegisterNotFound { .. } | Self::InvalidChainReference { .. } => {
                ErrorKind::NotFound
            }
            Self::Duplicate { .. } => ErrorKind::Conflict,
            Self::PoolFull { .. } => ErrorKind::Exhausted,
        }
    }
}

impl From<RejectionReason> for LedgerError {
    fn from(reason: RejectionReason) -> Self {
        LedgerError::new(reason.kind(), reason.to_string())
    }
}

/// The validator could not reach a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Storage or mempool could not be consulted.
    #[error("validation dependency unavailable: {0}")]
    Unavailable(String),
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unavailable(_) => ErrorKind::Unavailable,
        }
    }
}

impl From<ValidationError> for LedgerError {
    fn from(err: ValidationError) -> Self {
        LedgerError::new(err.kind(), err.to_string())
    }
}
