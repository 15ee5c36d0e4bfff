//! Inbound (Driving) port: the admission API.

use crate::domain::{RejectionReason, ValidationError, ValidationOutcome};
use async_trait::async_trait;
use shared_types::Transaction;

/// Transaction admission.
#[async_trait]
pub trait TransactionValidationApi: Send + Sync {
    /// Run every check in order and, on success, enqueue into the mempool.
    ///
    /// Check order:
    /// 1. payload hash and transaction id (`HashMismatch`)
    /// 2. signatures over the id digest (`InvalidSignature`)
    /// 3. register exists and is `Online`
    /// 4. `prevTxId` is sealed or pending (`InvalidChainReference`)
    /// 5. id not already seen (`Duplicate`)
    async fn validate(&self, tx: Transaction) -> Result<ValidationOutcome, ValidationError>;

    /// Validate many transactions. Stateless checks run in parallel; the
    /// stateful checks and enqueues run in input order, so a child listed
    /// after its parent is admitted.
    async fn validate_batch(
        &self,
        txs: Vec<Transaction>,
    ) -> Result<Vec<ValidationOutcome>, ValidationError>;

    /// Only the checks that need no shared state.
    fn check_stateless(&self, tx: &Transaction) -> Result<(), RejectionReason>;
}
