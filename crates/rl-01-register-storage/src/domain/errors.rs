//! # Domain Errors
//!
//! Error types for register storage. Each variant maps to one `ErrorKind`.

use shared_types::{ErrorKind, LedgerError, RegisterId, TenantId, TransactionId};
use thiserror::Error;

/// Errors from the underlying key-value store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    /// The backend rejected or failed the operation.
    #[error("I/O error: {0}")]
    Io(String),
}

/// Errors that can occur during storage operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("register {register_id} not found")]
    RegisterNotFound { register_id: RegisterId },

    #[error("register {register_id} already exists")]
    RegisterExists { register_id: RegisterId },

    #[error("docket {height} of register {register_id} already sealed")]
    HeightTaken { register_id: RegisterId, height: u64 },

    #[error("docket height {actual} does not follow register height {expected_after}")]
    HeightMismatch { expected_after: u64, actual: u64 },

    #[error("docket {height} previous hash does not match sealed docket {}", .height.saturating_sub(1))]
    PreviousHashMismatch { height: u64 },

    #[error("docket at height {height} is not a genesis docket")]
    NotGenesis { height: u64 },

    #[error("docket {height} hash does not match its contents")]
    InvalidDocketHash { height: u64 },

    #[error("docket {height} is not sealed")]
    DocketNotSealed { height: u64 },

    #[error("docket {height} transaction ids do not match the transactions supplied")]
    TransactionSetMismatch { height: u64 },

    #[error("transaction {transaction_id} already sealed")]
    DuplicateTransaction { transaction_id: TransactionId },

    #[error("transaction {transaction_id} follows {prev_tx_id}, which is neither sealed nor earlier in the docket")]
    UnsealedParent {
        transaction_id: TransactionId,
        prev_tx_id: TransactionId,
    },

    #[error("record of {size} bytes exceeds limit of {max}")]
    RecordTooLarge { size: usize, max: usize },

    #[error("tenant {tenant_id} reached its limit of {limit} registers")]
    TenantLimit { tenant_id: TenantId, limit: usize },

    #[error("database error: {0}")]
    Database(#[from] KVStoreError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    /// Classify into the shared taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RegisterNotFound { .. } => ErrorKind::NotFound,
            Self::RegisterExists { .. }
            | Self::HeightTaken { .. }
            | Self::HeightMismatch { .. }
            | Self::PreviousHashMismatch { .. }
            | Self::DuplicateTransaction { .. } => ErrorKind::Conflict,
            Self::InvalidDocketHash { .. }
            | Self::NotGenesis { .. }
            | Self::DocketNotSealed { .. }
            | Self::TransactionSetMismatch { .. }
            | Self::UnsealedParent { .. } => ErrorKind::Validation,
            Self::RecordTooLarge { .. } | Self::TenantLimit { .. } => ErrorKind::Exhausted,
            Self::Database(_) => ErrorKind::Unavailable,
            // A stored record that no longer decodes is corruption.
            Self::Serialization(_) => ErrorKind::IntegrityViolation,
        }
    }
}

impl From<StorageError> for LedgerError {
    fn from(err: StorageError) -> Self {
        LedgerError::new(err.kind(), err.to_string())
    }
}

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
