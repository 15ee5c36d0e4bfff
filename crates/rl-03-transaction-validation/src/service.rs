//! # Transaction Validator
//!
//! Application service implementing `TransactionValidationApi`.
//!
//! The duplicate check here is advisory: two identical submissions can both
//! pass it. The mempool's per-register lock makes the final call, and a
//! `Duplicate` from `enqueue` is reported as the same rejection.

use crate::domain::{
    check_stateless, RejectionReason, ValidationError, ValidationOutcome, ValidatorConfig,
};
use crate::ports::{RegisterView, TransactionValidationApi};
use async_trait::async_trait;
use rayon::prelude::*;
use rl_02_mempool::{MempoolApi, MempoolError};
use shared_bus::{EventPublisher, LedgerEvent};
use shared_types::Transaction;
use std::sync::Arc;
use tracing::{debug, warn};

/// The admission pipeline.
pub struct TransactionValidator {
    registers: Arc<dyn RegisterView>,
    mempool: Arc<dyn MempoolApi>,
    publisher: Arc<dyn EventPublisher>,
    config: ValidatorConfig,
}

impl TransactionValidator {
    pub fn new(
        config: ValidatorConfig,
        registers: Arc<dyn RegisterView>,
        mempool: Arc<dyn MempoolApi>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            registers,
            mempool,
            publisher,
            config,
        }
    }

    /// Checks (c) to (e). Assumes the stateless checks already passed.
    fn check_stateful(&self, tx: &Transaction) -> Result<(), CheckFailure> {
        let register_id = tx.register_id;
        let register = self
            .registers
            .register(&register_id)?
            .ok_or(RejectionReason::RegisterNotFound { register_id })?;
        if !register.is_online() {
            return Err(RejectionReason::RegisterNotOnline {
                register_id,
                status: register.status,
            }
            .into());
        }

        if let Some(prev_tx_id) = tx.prev_tx_id {
            let known = self.mempool.contains(&register_id, &prev_tx_id)
                || self.registers.is_sealed(&register_id, &prev_tx_id)?;
            if !known {
                return Err(RejectionReason::InvalidChainReference { prev_tx_id }.into());
            }
        }

        let tx_id = tx.transaction_id;
        if self.mempool.contains(&register_id, &tx_id)
            || self.registers.is_sealed(&register_id, &tx_id)?
        {
            return Err(RejectionReason::Duplicate {
                transaction_id: tx_id,
            }
            .into());
        }
        Ok(())
    }

    /// Stateful checks, enqueue and event. Stateless checks already passed.
    async fn admit(&self, tx: Transaction) -> Result<ValidationOutcome, ValidationError> {
        let register_id = tx.register_id;
        let transaction_id = tx.transaction_id;

        match self.check_stateful(&tx) {
            Ok(()) => {}
            Err(CheckFailure::Rejected(reason)) => return Ok(self.rejected(&tx, reason)),
            Err(CheckFailure::Error(err)) => return Err(err),
        }

        let pending = match self.mempool.enqueue(tx) {
            Ok(pending) => pending,
            Err(MempoolError::Unavailable(detail)) => {
                return Err(ValidationError::Unavailable(detail))
            }
            Err(err) => {
                let reason = match err {
                    MempoolError::Duplicate { transaction_id } => {
                        RejectionReason::Duplicate { transaction_id }
                    }
                    MempoolError::Expired { expires_at, .. } => {
                        RejectionReason::Expired { expires_at }
                    }
                    MempoolError::PoolFull { capacity, .. } => {
                        RejectionReason::PoolFull { capacity }
                    }
                    other => RejectionReason::Malformed(other.to_string()),
                };
                debug!(%register_id, %transaction_id, %reason, "Mempool refused transaction");
                return Ok(ValidationOutcome::Rejected(reason));
            }
        };

        self.publisher
            .publish(LedgerEvent::TransactionAccepted {
                register_id,
                transaction_id,
                pending,
            })
            .await;
        debug!(%register_id, %transaction_id, pending, "Transaction accepted");

        Ok(ValidationOutcome::Accepted {
            transaction_id,
            pending,
        })
    }

    fn rejected(&self, tx: &Transaction, reason: RejectionReason) -> ValidationOutcome {
        match &reason {
            RejectionReason::HashMismatch { .. } | RejectionReason::InvalidSignature { .. } => {
                warn!(
                    register_id = %tx.register_id,
                    transaction_id = %tx.transaction_id,
                    sender = %tx.sender_wallet,
                    %reason,
                    "Transaction failed cryptographic checks"
                );
            }
            _ => {
                debug!(
                    register_id = %tx.register_id,
                    transaction_id = %tx.transaction_id,
                    %reason,
                    "Transaction rejected"
                );
            }
        }
        ValidationOutcome::Rejected(reason)
    }
}

/// Internal split between a verdict and an inability to reach one.
enum CheckFailure {
    Rejected(RejectionReason),
    Error(ValidationError),
}

impl From<RejectionReason> for CheckFailure {
    fn from(reason: RejectionReason) -> Self {
        Self::Rejected(reason)
    }
}

impl From<ValidationError> for CheckFailure {
    fn from(err: ValidationError) -> Self {
        Self::Error(err)
    }
}

#[async_trait]
impl TransactionValidationApi for TransactionValidator {
    async fn validate(&self, tx: Transaction) -> Result<ValidationOutcome, ValidationError> {
        if let Err(reason) = check_stateless(&tx, &self.config) {
            return Ok(self.rejected(&tx, reason));
        }
        self.admit(tx).await
    }

    async fn validate_batch(
        &self,
        txs: Vec<Transaction>,
    ) -> Result<Vec<ValidationOutcome>, ValidationError> {
        let config = self.config.clone();
        let (txs, verdicts) = tokio::task::spawn_blocking(move || {
            let verdicts: Vec<Result<(), RejectionReason>> = txs
                .par_iter()
                .map(|tx| check_stateless(tx, &config))
                .collect();
            (txs, verdicts)
        })
        .await
        .map_err(|e| ValidationError::Unavailable(format!("verification worker failed: {e}")))?;

        let mut outcomes = Vec::with_capacity(txs.len());
        for (tx, verdict) in txs.into_iter().zip(verdicts) {
            let outcome = match verdict {
                Ok(()) => self.admit(tx).await?,
                Err(reason) => self.rejected(&tx, reason),
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    fn check_stateless(&self, tx: &Transaction) -> Result<(), RejectionReason> {
        check_stateless(tx, &self.config)
    }
}

#[cfg(test)]
mod tests;
