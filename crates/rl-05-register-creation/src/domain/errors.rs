//! Register creation error types.

use super::attestation::AttestationKey;
use rl_04_docket_consensus::ConsensusError;
use shared_types::{ErrorKind, LedgerError, RegisterId};
use thiserror::Error;

/// Failures reported by the wallet collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// The wallet could not be reached. Retryable.
    #[error("wallet unavailable: {0}")]
    Unavailable(String),

    /// The wallet refused the request.
    #[error("wallet refused to sign: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreationError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("no pending registration for register {register_id}")]
    PendingNotFound { register_id: RegisterId },

    #[error("pending registration for register {register_id} expired")]
    Expired { register_id: RegisterId },

    #[error("nonce does not match pending registration for register {register_id}")]
    NonceMismatch { register_id: RegisterId },

    #[error("finalize already in progress for register {register_id}")]
    FinalizeInProgress { register_id: RegisterId },

    #[error("register {register_id} was already finalized")]
    AlreadyFinalized { register_id: RegisterId },

    /// The finalize lease was reclaimed while its holder was still working.
    #[error("finalize lease for register {register_id} was reclaimed")]
    LeaseLost { register_id: RegisterId },

    /// A live pending registration owns this register id.
    #[error("register id {register_id} is reserved by a pending registration")]
    RegisterReserved { register_id: RegisterId },

    #[error("no attestation was issued for {key}")]
    UnknownAttestation { key: AttestationKey },

    #[error("attestation signature for {key} failed verification: {detail}")]
    SignatureInvalid { key: AttestationKey, detail: String },

    #[error("missing valid attestations for {}", format_keys(.missing))]
    IncompleteAttestation { missing: Vec<AttestationKey> },

    #[error("genesis for register {register_id} already in flight")]
    GenesisInFlight { register_id: RegisterId },

    #[error("genesis transaction rejected: {0}")]
    InvalidGenesis(String),

    #[error("wallet signature over genesis transaction did not verify")]
    WalletSignatureInvalid,

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Consensus(#[from] ConsensusError),

    #[error("pending registration store unavailable: {0}")]
    StoreUnavailable(String),
}

fn format_keys(keys: &[AttestationKey]) -> String {
    keys.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

impl CreationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest(_)
            | Self::IncompleteAttestation { .. }
            | Self::InvalidGenesis(_) => ErrorKind::Validation,
            Self::PendingNotFound { .. } | Self::Expired { .. } => ErrorKind::NotFound,
            Self::NonceMismatch { .. }
            | Self::FinalizeInProgress { .. }
            | Self::AlreadyFinalized { .. }
            | Self::LeaseLost { .. }
            | Self::RegisterReserved { .. }
            | Self::GenesisInFlight { .. } => ErrorKind::Conflict,
            Self::UnknownAttestation { .. }
            | Self::SignatureInvalid { .. }
            | Self::WalletSignatureInvalid => ErrorKind::CryptographicFailure,
            Self::Wallet(WalletError::Unavailable(_)) | Self::StoreUnavailable(_) => {
                ErrorKind::Unavailable
            }
            Self::Wallet(WalletError::Rejected(_)) => ErrorKind::CryptographicFailure,
            Self::Consensus(err) => err.kind(),
        }
    }
}

impl From<CreationError> for LedgerError {
    fn from(err: CreationError) -> Self {
        LedgerError::new(err.kind(), err.to_string())
    }
}

pub type CreationResult<T> = Result<T, CreationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy() {
        let register_id = RegisterId::generate();
        assert_eq!(
            CreationError::NonceMismatch { register_id }.kind(),
            ErrorKind::Conflict
        );
        assert_eq!(CreationError::Expired { register_id }.kind(), ErrorKind::NotFound);
        assert_eq!(
            CreationError::Wallet(WalletError::Unavailable("down".into())).kind(),
            ErrorKind::Unavailable
        );
        assert_eq!(
            CreationError::IncompleteAttestation { missing: vec![] }.kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_incomplete_lists_missing_owners() {
        let err = CreationError::IncompleteAttestation {
            missing: vec![
                AttestationKey::new("admin", "alice"),
                AttestationKey::new("auditor", "bob"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "missing valid attestations for (admin, alice), (auditor, bob)"
        );
    }
}
