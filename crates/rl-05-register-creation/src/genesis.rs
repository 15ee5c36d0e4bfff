//! # Genesis Manager
//!
//! Signs a register's first transaction through the wallet and hands it to
//! consensus, which seals docket 0 and persists the register in one commit.
//!
//! At most one submission per register runs at a time: the in-flight set is
//! checked before any wallet call, so a racing second submission fails
//! `GenesisInFlight` without side effects.

use crate::domain::{CreationError, CreationResult, RegistrationConfig, WalletError};
use crate::ports::{GenesisApi, SignRequest, WalletSignature, WalletSigner};
use async_trait::async_trait;
use dashmap::DashSet;
use rl_04_docket_consensus::ConsensusApi;
use shared_bus::{EventPublisher, LedgerEvent};
use shared_crypto::verify_signature;
use shared_types::{
    DigestMode, Docket, Register, RegisterId, Transaction, TransactionSignature, TransactionType,
};
use std::sync::Arc;
use tracing::{info, warn};

pub struct GenesisManager {
    consensus: Arc<dyn ConsensusApi>,
    wallet: Arc<dyn WalletSigner>,
    publisher: Arc<dyn EventPublisher>,
    config: RegistrationConfig,
    in_flight: Arc<DashSet<RegisterId>>,
}

/// Removes the register from the in-flight set on drop.
struct InFlight {
    set: Arc<DashSet<RegisterId>>,
    register_id: RegisterId,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.set.remove(&self.register_id);
    }
}

impl GenesisManager {
    pub fn new(
        config: RegistrationConfig,
        consensus: Arc<dyn ConsensusApi>,
        wallet: Arc<dyn WalletSigner>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            consensus,
            wallet,
            publisher,
            config,
            in_flight: Arc::new(DashSet::new()),
        }
    }

    fn claim(&self, register_id: RegisterId) -> CreationResult<InFlight> {
        if !self.in_flight.insert(register_id) {
            return Err(CreationError::GenesisInFlight { register_id });
        }
        Ok(InFlight {
            set: self.in_flight.clone(),
            register_id,
        })
    }

    fn check_candidate(register: &Register, candidate: &Transaction) -> CreationResult<()> {
        let reject = |why: &str| Err(CreationError::InvalidGenesis(why.to_string()));
        if candidate.register_id != register.id {
            return reject("transaction belongs to another register");
        }
        if candidate.prev_tx_id.is_some() {
            return reject("genesis transaction cannot reference a previous transaction");
        }
        if candidate.docket_height != 0 {
            return reject("genesis transaction must target docket 0");
        }
        if candidate.metadata.tx_type != TransactionType::Control {
            return reject("genesis transaction must be a control record");
        }
        if Transaction::compute_payload_hash(&candidate.payloads) != candidate.payload_hash
            || candidate.compute_id() != candidate.transaction_id
        {
            return reject("transaction id does not match its content");
        }
        Ok(())
    }

    /// Ask the wallet to sign, retrying with backoff while it is
    /// unavailable.
    pub async fn sign_with_retry(&self, request: SignRequest) -> CreationResult<WalletSignature> {
        let attempts = self.config.wallet_max_attempts.max(1);
        let mut last = WalletError::Unavailable("no attempt made".into());
        for attempt in 1..=attempts {
            let backoff = self.config.wallet_backoff_for(attempt);
            if !backoff.is_zero() {
                tokio::time::sleep(backoff).await;
            }
            match self.wallet.sign(request.clone()).await {
                Ok(signature) => return Ok(signature),
                Err(WalletError::Unavailable(detail)) => {
                    warn!(wallet = %request.wallet, attempt, %detail, "Wallet unavailable");
                    last = WalletError::Unavailable(detail);
                }
                Err(rejected) => return Err(rejected.into()),
            }
        }
        Err(last.into())
    }
}

#[async_trait]
impl GenesisApi for GenesisManager {
    async fn submit_genesis(
        &self,
        register: Register,
        mut candidate: Transaction,
    ) -> CreationResult<Docket> {
        let register_id = register.id;
        let _in_flight = self.claim(register_id)?;
        Self::check_candidate(&register, &candidate)?;

        let signed = self
            .sign_with_retry(SignRequest {
                wallet: self.config.system_wallet.clone(),
                data: candidate.signing_target().to_vec(),
                mode: DigestMode::PreHashed,
                algorithm: self.config.genesis_algorithm,
            })
            .await?;
        verify_signature(
            signed.algorithm,
            &signed.public_key,
            candidate.signing_target(),
            DigestMode::PreHashed,
            &signed.signature,
        )
        .map_err(|_| CreationError::WalletSignatureInvalid)?;
        candidate.signatures.push(TransactionSignature {
            public_key: signed.public_key,
            signature_value: signed.signature,
            algorithm: signed.algorithm,
        });

        let genesis_transaction_id = candidate.transaction_id;
        let tenant_id = register.tenant_id.clone();
        let docket = self.consensus.seal_genesis(register, candidate).await?;

        self.publisher
            .publish(LedgerEvent::RegisterCreated {
                register_id,
                tenant_id: tenant_id.clone(),
                genesis_transaction_id,
                genesis_hash: docket.hash,
            })
            .await;
        info!(
            %register_id,
            %tenant_id,
            %genesis_transaction_id,
            "Register created"
        );
        Ok(docket)
    }
}
