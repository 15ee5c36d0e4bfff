//! # Register Creation Service
//!
//! Orchestrates the two-phase protocol over the pending store and the
//! genesis manager.
//!
//! `finalize` holds the registration's lease from the first check to the
//! last write. A verification failure hands the lease back so the client may
//! retry before the TTL; a genesis failure discards the registration, so no
//! partial register can ever be observed. The lease is committed right
//! before genesis: a holder whose lease the reaper reclaimed stops there,
//! and a committed registration is never reported expired.

use crate::domain::{
    generate_nonce, AttestationDocument, AttestationKey, CreationError, CreationResult,
    FinalizeLease, GenesisControlRecord, PendingRegistration, RegistrationConfig, VerifiedOwner,
    ATTESTATION_VERSION,
};
use crate::ports::{
    AttestationToSign, FinalizeRequest, FinalizeResponse, GenesisApi, InitiateRequest,
    InitiateResponse, PendingRegistrationStore, RegisterCreationApi, SignedAttestation,
};
use async_trait::async_trait;
use rl_01_register_storage::LedgerStore;
use shared_bus::{EventPublisher, LedgerEvent};
use shared_crypto::verify_signature;
use shared_types::{DigestMode, Register, RegisterId, TimeSource};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct RegisterCreationService {
    pending: Arc<dyn PendingRegistrationStore>,
    genesis: Arc<dyn GenesisApi>,
    ledger: Arc<dyn LedgerStore>,
    publisher: Arc<dyn EventPublisher>,
    time_source: Arc<dyn TimeSource>,
    config: RegistrationConfig,
}

impl RegisterCreationService {
    pub fn new(
        config: RegistrationConfig,
        pending: Arc<dyn PendingRegistrationStore>,
        genesis: Arc<dyn GenesisApi>,
        ledger: Arc<dyn LedgerStore>,
        publisher: Arc<dyn EventPublisher>,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            pending,
            genesis,
            ledger,
            publisher,
            time_source,
            config,
        }
    }

    pub fn config(&self) -> &RegistrationConfig {
        &self.config
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.pending_count().await
    }

    fn check_request(&self, request: &InitiateRequest) -> CreationResult<()> {
        let invalid = |why: String| Err(CreationError::InvalidRequest(why));
        if request.name.trim().is_empty() {
            return invalid("register name is empty".into());
        }
        if request.tenant_id.as_str().is_empty() {
            return invalid("tenant id is empty".into());
        }
        if request.owners.is_empty() {
            return invalid("at least one owner is required".into());
        }
        if request.owners.len() > self.config.max_owners {
            return invalid(format!(
                "{} owners exceeds the limit of {}",
                request.owners.len(),
                self.config.max_owners
            ));
        }
        let mut seen = BTreeSet::new();
        for owner in &request.owners {
            if owner.role.is_empty() || owner.subject.is_empty() {
                return invalid("owner role and subject must be non-empty".into());
            }
            if !seen.insert(owner.key()) {
                return invalid(format!("owner {} listed twice", owner.key()));
            }
        }
        Ok(())
    }

    /// Check every submitted signature against the digest issued for its
    /// slot, then confirm every required owner is covered.
    fn verify_attestations(
        registration: &PendingRegistration,
        signed: &[SignedAttestation],
    ) -> CreationResult<Vec<VerifiedOwner>> {
        let mut verified: BTreeMap<AttestationKey, VerifiedOwner> = BTreeMap::new();
        for attestation in signed {
            let key = attestation.attestation_data.key();
            let Some(expected) = registration.attestation_hashes.get(&key) else {
                return Err(CreationError::UnknownAttestation { key });
            };
            verify_signature(
                attestation.algorithm,
                &attestation.public_key,
                expected,
                DigestMode::PreHashed,
                &attestation.signature,
            )
            .map_err(|e| CreationError::SignatureInvalid {
                key: key.clone(),
                detail: e.to_string(),
            })?;
            verified.insert(
                key.clone(),
                VerifiedOwner {
                    role: key.role,
                    subject: key.subject,
                    public_key: attestation.public_key.clone(),
                    algorithm: attestation.algorithm,
                    attestation_hash: expected.to_vec(),
                },
            );
        }

        let missing: Vec<AttestationKey> = registration
            .required_owners
            .iter()
            .filter(|key| !verified.contains_key(key))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(CreationError::IncompleteAttestation { missing });
        }

        Ok(registration
            .required_owners
            .iter()
            .filter_map(|key| verified.remove(key))
            .collect())
    }

    async fn begin(
        &self,
        request: &FinalizeRequest,
    ) -> CreationResult<(FinalizeLease, PendingRegistration)> {
        let register_id = request.register_id;
        match self
            .pending
            .begin_finalize(&register_id, &request.nonce, self.time_source.now())
            .await
        {
            Err(CreationError::PendingNotFound { .. }) if self.register_exists(&register_id) => {
                Err(CreationError::AlreadyFinalized { register_id })
            }
            other => other,
        }
    }

    fn register_exists(&self, register_id: &RegisterId) -> bool {
        matches!(self.ledger.get_register(register_id), Ok(Some(_)))
    }

    async fn release(&self, lease: &FinalizeLease) {
        if let Err(e) = self.pending.release_finalize(lease).await {
            let register_id = lease.register_id;
            warn!(%register_id, error = %e, "Failed to release finalize lease");
        }
    }

    async fn discard(&self, lease: &FinalizeLease) {
        if let Err(e) = self.pending.discard(lease).await {
            let register_id = lease.register_id;
            warn!(%register_id, error = %e, "Failed to discard pending registration");
        }
    }

    /// Refuse a direct genesis for an id that a live pending registration
    /// owns; only that registration's `finalize` may create it.
    pub async fn ensure_unreserved(&self, register_id: &RegisterId) -> CreationResult<()> {
        if self.pending.get(register_id).await?.is_some() {
            warn!(%register_id, "Direct genesis for a reserved register id");
            return Err(CreationError::RegisterReserved {
                register_id: *register_id,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RegisterCreationApi for RegisterCreationService {
    async fn initiate(&self, request: InitiateRequest) -> CreationResult<InitiateResponse> {
        self.check_request(&request)?;

        let register_id = RegisterId::generate();
        let nonce = generate_nonce();
        let now = self.time_source.now();

        let mut attestation_hashes = BTreeMap::new();
        let mut attestations_to_sign = Vec::with_capacity(request.owners.len());
        for owner in &request.owners {
            let document = AttestationDocument {
                version: ATTESTATION_VERSION,
                register_id,
                register_name: request.name.clone(),
                tenant_id: request.tenant_id.clone(),
                role: owner.role.clone(),
                subject: owner.subject.clone(),
                nonce: nonce.clone(),
                issued_at: now,
            };
            let digest = document
                .digest()
                .map_err(|e| CreationError::InvalidRequest(e.to_string()))?;
            attestation_hashes.insert(owner.key(), digest);
            attestations_to_sign.push(AttestationToSign {
                role: owner.role.clone(),
                subject: owner.subject.clone(),
                data_to_sign: hex::encode(digest),
                attestation_data: document,
            });
        }

        let registration = PendingRegistration {
            register_id,
            nonce: nonce.clone(),
            tenant_id: request.tenant_id.clone(),
            name: request.name,
            description: request.description,
            attestation_hashes,
            required_owners: request.owners.iter().map(|o| o.key()).collect(),
            created_at: now,
            expires_at: now.saturating_add(self.config.pending_ttl_ms()),
        };
        let expires_at = registration.expires_at;
        self.pending.insert(registration).await?;

        info!(
            %register_id,
            tenant_id = %request.tenant_id,
            owners = attestations_to_sign.len(),
            expires_at,
            "Register creation initiated"
        );
        Ok(InitiateResponse {
            register_id,
            nonce,
            attestations_to_sign,
        })
    }

    async fn finalize(&self, request: FinalizeRequest) -> CreationResult<FinalizeResponse> {
        let register_id = request.register_id;
        let (lease, registration) = self.begin(&request).await?;

        let owners = match Self::verify_attestations(&registration, &request.signed_attestations)
        {
            Ok(owners) => owners,
            Err(e) => {
                warn!(%register_id, error = %e, "Attestation verification failed");
                self.release(&lease).await;
                return Err(e);
            }
        };

        let now = self.time_source.now();
        let record = GenesisControlRecord {
            register_id,
            name: registration.name.clone(),
            description: registration.description.clone(),
            tenant_id: registration.tenant_id.clone(),
            owners,
            created_at: now,
        };
        let candidate = match record.into_transaction(&self.config.system_wallet) {
            Ok(tx) => tx,
            Err(e) => {
                self.discard(&lease).await;
                return Err(CreationError::InvalidGenesis(e.to_string()));
            }
        };
        let genesis_transaction_id = candidate.transaction_id;
        let register = Register::at_genesis(
            register_id,
            registration.name,
            registration.description,
            registration.tenant_id,
            now,
        );

        self.pending.commit_finalize(&lease).await?;
        if let Err(e) = self.genesis.submit_genesis(register, candidate).await {
            warn!(%register_id, error = %e, "Genesis failed, discarding registration");
            self.discard(&lease).await;
            return Err(e);
        }
        if let Err(e) = self.pending.complete_finalize(&lease).await {
            // The register exists; replays are still caught by the storage check.
            warn!(%register_id, error = %e, "Failed to mark registration consumed");
        }

        info!(%register_id, %genesis_transaction_id, "Register creation finalized");
        Ok(FinalizeResponse {
            register_id,
            genesis_transaction_id,
        })
    }

    async fn reap_expired(&self) -> CreationResult<Vec<RegisterId>> {
        let expired = self
            .pending
            .reap_expired(
                self.time_source.now(),
                self.config.finalize_lease_timeout_ms(),
            )
            .await?;
        for register_id in &expired {
            self.publisher
                .publish(LedgerEvent::RegistrationExpired {
                    register_id: *register_id,
                })
                .await;
        }
        if expired.is_empty() {
            debug!("No expired registrations");
        } else {
            info!(count = expired.len(), "Reaped expired registrations");
        }
        Ok(expired)
    }
}
