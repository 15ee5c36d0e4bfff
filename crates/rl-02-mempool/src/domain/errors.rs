//! Mempool error types.

use shared_types::{ErrorKind, LedgerError, RegisterId, Timestamp, TransactionId};
use thiserror::Error;

/// Why a transaction was not admitted to (or could not be served from) the pool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MempoolError {
    /// Already pending, or already sealed.
    #[error("transaction {transaction_id} already seen")]
    Duplicate { transaction_id: TransactionId },

    /// Past its `expiresAt`.
    #[error("transaction {transaction_id} expired at {expires_at}")]
    Expired {
        transaction_id: TransactionId,
        expires_at: Timestamp,
    },

    /// Structurally unusable.
    #[error("invalid transaction: {0}")]
    Invalid(String),

    /// Pending capacity for the register is used up.
    #[error("mempool for register {register_id} is full ({capacity} pending)")]
    PoolFull {
        register_id: RegisterId,
        capacity: usize,
    },

    /// The sealed-transaction index could not be consulted.
    #[error("sealed index unavailable: {0}")]
    Unavailable(String),
}

impl MempoolError {
    /// Classify into the shared taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Duplicate { .. } => ErrorKind::Conflict,
            Self::Expired { .. } | Self::Invalid(_) => ErrorKind::Validation,
            Self::PoolFull { .. } => ErrorKind::Exhausted,
            Self::Unavailable(_) => ErrorKind::Unavailable,
        }
    }
}

impl From<MempoolError> for LedgerError {
    fn from(err: MempoolError) -> Self {
        LedgerError::new(err.kind(), err.to_string())
    }
}
