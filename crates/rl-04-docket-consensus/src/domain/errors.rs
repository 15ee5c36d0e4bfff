//! Consensus error types.

use rl_01_register_storage::StorageError;
use shared_types::{ErrorKind, LedgerError, RegisterId, RegisterStatus};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsensusError {
    /// Another build for this register is in flight.
    #[error("sealing lease for register {register_id} is held by another build")]
    LeaseHeld { register_id: RegisterId },

    /// The stored head moved since the candidate was built.
    #[error("candidate at height {candidate_height} is stale for register {register_id}: {detail}")]
    StaleCandidate {
        register_id: RegisterId,
        candidate_height: u64,
        detail: String,
    },

    #[error("register {register_id} already has a genesis docket")]
    GenesisExists { register_id: RegisterId },

    #[error("register {register_id} not found")]
    RegisterNotFound { register_id: RegisterId },

    #[error("register {register_id} is {status:?}; sealing suspended")]
    RegisterNotOnline {
        register_id: RegisterId,
        status: RegisterStatus,
    },

    /// A candidate that cannot be sealed as built.
    #[error("invalid candidate: {0}")]
    InvalidCandidate(String),

    /// A break in stored dockets. Never repaired automatically.
    #[error("chain integrity violation in register {register_id} at height {height}: {detail}")]
    IntegrityViolation {
        register_id: RegisterId,
        height: u64,
        detail: String,
    },

    /// Persistence kept failing with a retryable error.
    #[error("persistence failed after {attempts} attempts: {last_error}")]
    PersistenceExhausted { attempts: u32, last_error: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ConsensusError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LeaseHeld { .. } | Self::StaleCandidate { .. } | Self::GenesisExists { .. } => {
                ErrorKind::Conflict
            }
            Self::RegisterNotFound { .. } => ErrorKind::NotFound,
            Self::RegisterNotOnline { .. } | Self::InvalidCandidate(_) => ErrorKind::Validation,
            Self::IntegrityViolation { .. } => ErrorKind::IntegrityViolation,
            Self::PersistenceExhausted { .. } => ErrorKind::Unavailable,
            Self::Storage(err) => err.kind(),
        }
    }

    /// Whether `build_and_seal` should start over from a fresh build.
    pub(crate) fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(err) if err.kind().is_retryable())
    }
}

impl From<ConsensusError> for LedgerError {
    fn from(err: ConsensusError) -> Self {
        LedgerError::new(err.kind(), err.to_string())
    }
}

pub type ConsensusResult<T> = Result<T, ConsensusError>;
