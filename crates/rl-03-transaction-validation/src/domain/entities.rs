//! Validation outcomes and configuration.

use super::errors::RejectionReason;
use shared_types::{LedgerError, TransactionId};

/// Verdict on one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Admitted to the mempool.
    Accepted {
        transaction_id: TransactionId,
        /// Pending count for the register after the enqueue.
        pending: usize,
    },
    Rejected(RejectionReason),
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// The rejection reason, if any.
    pub fn rejection(&self) -> Option<&RejectionReason> {
        match self {
            Self::Rejected(reason) => Some(reason),
            Self::Accepted { .. } => None,
        }
    }

    /// Collapse into the surface result.
    pub fn into_result(self) -> Result<TransactionId, LedgerError> {
        match self {
            Self::Accepted { transaction_id, .. } => Ok(transaction_id),
            Self::Rejected(reason) => Err(reason.into()),
        }
    }
}

impl From<RejectionReason> for ValidationOutcome {
    fn from(reason: RejectionReason) -> Self {
        Self::Rejected(reason)
    }
}

/// Validator configuration.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Minimum number of signatures a transaction must carry.
    pub min_signatures: usize,
    /// Upper bound on payloads per transaction.
    pub max_payloads: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            min_signatures: 1,
            max_payloads: 1_024,
        }
    }
}
