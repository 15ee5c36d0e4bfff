//! # Ledger API
//!
//! The request/response surface of the node. Transport is external: an HTTP
//! or RPC layer maps its routes onto these methods one to one and renders
//! `LedgerError::kind` as its status.
//!
//! Every register-scoped call takes the caller's tenant; a register owned by
//! another tenant is reported as `NotFound`.

pub mod dto;

use std::collections::HashSet;
use std::sync::Arc;

use rl_01_register_storage::LedgerStore;
use rl_02_mempool::MempoolApi;
use rl_03_transaction_validation::TransactionValidationApi;
use rl_04_docket_consensus::{ChainMetrics, ConsensusApi};
use rl_05_register_creation::{
    FinalizeRequest, FinalizeResponse, GenesisApi, InitiateRequest, InitiateResponse,
    RegisterCreationApi,
};
use shared_types::{
    Docket, LedgerError, LedgerResult, Register, RegisterId, RegisterStatus, TenantId, Timestamp,
    Transaction, TransactionId,
};
use tracing::info;

use crate::container::LedgerContainer;
pub use dto::{
    ChainVerificationResponse, GenesisRequest, GenesisResponse, MempoolStatsResponse,
    SetStatusRequest, SubmitTransactionResponse,
};

/// Facade over the container's subsystems.
#[derive(Clone)]
pub struct LedgerApi {
    container: Arc<LedgerContainer>,
}

impl LedgerApi {
    pub fn new(container: Arc<LedgerContainer>) -> Self {
        Self { container }
    }

    fn owned_register(
        &self,
        tenant_id: &TenantId,
        register_id: &RegisterId,
    ) -> LedgerResult<Register> {
        Ok(self
            .container
            .storage
            .get_register_for_tenant(tenant_id, register_id)?)
    }

    // =========================================================================
    // REGISTER CREATION
    // =========================================================================

    /// `POST /registers/initiate`
    pub async fn initiate_register(
        &self,
        request: InitiateRequest,
    ) -> LedgerResult<InitiateResponse> {
        Ok(self.container.registration.initiate(request).await?)
    }

    /// `POST /registers/finalize`
    pub async fn finalize_register(
        &self,
        request: FinalizeRequest,
    ) -> LedgerResult<FinalizeResponse> {
        Ok(self.container.registration.finalize(request).await?)
    }

    /// `POST /genesis`
    pub async fn submit_genesis(
        &self,
        tenant_id: TenantId,
        request: GenesisRequest,
    ) -> LedgerResult<GenesisResponse> {
        self.container
            .registration
            .ensure_unreserved(&request.register_id)
            .await?;
        let register = Register::at_genesis(
            request.register_id,
            request.name,
            request.description,
            tenant_id,
            self.container.time_source.now(),
        );
        let docket = self
            .container
            .genesis
            .submit_genesis(register, request.transaction)
            .await?;
        Ok(GenesisResponse {
            register_id: docket.register_id,
            sealed_docket_height: docket.height,
            docket_hash: docket.hash,
        })
    }

    // =========================================================================
    // TRANSACTIONS
    // =========================================================================

    /// Validate and admit one transaction.
    pub async fn submit_transaction(
        &self,
        tenant_id: &TenantId,
        transaction: Transaction,
    ) -> LedgerResult<SubmitTransactionResponse> {
        self.owned_register(tenant_id, &transaction.register_id)?;
        let transaction_id = self
            .container
            .validator
            .validate(transaction)
            .await?
            .into_result()?;
        Ok(SubmitTransactionResponse { transaction_id })
    }

    /// Validate and admit many transactions. One result per input, in
    /// order; a failure affects only its own entry.
    pub async fn submit_transactions(
        &self,
        tenant_id: &TenantId,
        transactions: Vec<Transaction>,
    ) -> LedgerResult<Vec<LedgerResult<SubmitTransactionResponse>>> {
        let mut results = Vec::with_capacity(transactions.len());
        let mut admitted = Vec::new();
        let mut slots = Vec::new();
        for (index, tx) in transactions.into_iter().enumerate() {
            match self.owned_register(tenant_id, &tx.register_id) {
                Ok(_) => {
                    slots.push(index);
                    admitted.push(tx);
                    results.push(None);
                }
                Err(e) => results.push(Some(Err(e))),
            }
        }

        let outcomes = self.container.validator.validate_batch(admitted).await?;
        for (index, outcome) in slots.into_iter().zip(outcomes) {
            results[index] = Some(
                outcome
                    .into_result()
                    .map(|transaction_id| SubmitTransactionResponse { transaction_id }),
            );
        }
        Ok(results
            .into_iter()
            .map(|r| r.unwrap_or_else(|| Err(LedgerError::validation("not processed"))))
            .collect())
    }

    // =========================================================================
    // METRICS
    // =========================================================================

    pub fn get_mempool_stats(
        &self,
        tenant_id: &TenantId,
        register_id: &RegisterId,
    ) -> LedgerResult<MempoolStatsResponse> {
        self.owned_register(tenant_id, register_id)?;
        Ok(MempoolStatsResponse::new(
            *register_id,
            self.container.mempool.stats(register_id),
        ))
    }

    pub async fn get_chain_metrics(
        &self,
        tenant_id: &TenantId,
        register_id: &RegisterId,
    ) -> LedgerResult<ChainMetrics> {
        self.owned_register(tenant_id, register_id)?;
        Ok(self.container.consensus.chain_metrics(register_id).await?)
    }

    // =========================================================================
    // READS
    // =========================================================================

    pub fn get_register(
        &self,
        tenant_id: &TenantId,
        register_id: &RegisterId,
    ) -> LedgerResult<Register> {
        self.owned_register(tenant_id, register_id)
    }

    pub fn list_registers(&self, tenant_id: &TenantId) -> LedgerResult<Vec<Register>> {
        Ok(self.container.storage.list_registers(tenant_id)?)
    }

    pub fn get_docket(
        &self,
        tenant_id: &TenantId,
        register_id: &RegisterId,
        height: u64,
    ) -> LedgerResult<Docket> {
        self.owned_register(tenant_id, register_id)?;
        self.container
            .storage
            .get_docket(register_id, height)?
            .ok_or_else(|| {
                LedgerError::not_found(format!("register {register_id} has no docket {height}"))
            })
    }

    pub fn get_transaction(
        &self,
        tenant_id: &TenantId,
        register_id: &RegisterId,
        transaction_id: &TransactionId,
    ) -> LedgerResult<Transaction> {
        self.owned_register(tenant_id, register_id)?;
        self.container
            .storage
            .get_transaction(register_id, transaction_id)?
            .ok_or_else(|| {
                LedgerError::not_found(format!(
                    "transaction {transaction_id} not sealed in register {register_id}"
                ))
            })
    }

    /// Sealed transactions sent by `wallet`, limited to the tenant's
    /// registers.
    pub fn transactions_by_sender(
        &self,
        tenant_id: &TenantId,
        wallet: &str,
    ) -> LedgerResult<Vec<Transaction>> {
        let owned: HashSet<RegisterId> = self
            .container
            .storage
            .list_registers(tenant_id)?
            .into_iter()
            .map(|r| r.id)
            .collect();
        Ok(self
            .container
            .storage
            .transactions_by_sender(wallet)?
            .into_iter()
            .filter(|tx| owned.contains(&tx.register_id))
            .collect())
    }

    /// Sealed transactions with `from <= timestamp < to`.
    pub fn transactions_in_range(
        &self,
        tenant_id: &TenantId,
        register_id: &RegisterId,
        from: Timestamp,
        to: Timestamp,
    ) -> LedgerResult<Vec<Transaction>> {
        self.owned_register(tenant_id, register_id)?;
        Ok(self
            .container
            .storage
            .transactions_in_range(register_id, from, to)?)
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Re-verify the stored chain. A break moves the register to `Recovery`.
    pub async fn verify_register_chain(
        &self,
        tenant_id: &TenantId,
        register_id: &RegisterId,
    ) -> LedgerResult<ChainVerificationResponse> {
        self.owned_register(tenant_id, register_id)?;
        let verified_dockets = self
            .container
            .consensus
            .verify_register_chain(register_id)
            .await?;
        Ok(ChainVerificationResponse {
            register_id: *register_id,
            verified_dockets,
        })
    }

    pub fn set_register_status(
        &self,
        tenant_id: &TenantId,
        register_id: &RegisterId,
        request: SetStatusRequest,
    ) -> LedgerResult<Register> {
        self.owned_register(tenant_id, register_id)?;
        let register = self.container.storage.set_register_status(
            register_id,
            request.status,
            self.container.time_source.now(),
        )?;
        if request.status == RegisterStatus::Online {
            info!(%register_id, %tenant_id, "Register returned to service");
        }
        Ok(register)
    }

    /// Seal whatever is pending for the register now, outside the
    /// scheduler's cadence.
    pub async fn seal_pending(
        &self,
        tenant_id: &TenantId,
        register_id: &RegisterId,
    ) -> LedgerResult<Option<Docket>> {
        self.owned_register(tenant_id, register_id)?;
        Ok(self.container.consensus.build_and_seal(register_id).await?)
    }
}
