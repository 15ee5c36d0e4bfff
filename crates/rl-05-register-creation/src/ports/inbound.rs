//! Inbound (Driving) ports: the two-phase creation protocol and genesis
//! submission.

use crate::domain::{AttestationDocument, CreationResult, Owner};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{
    Docket, Register, RegisterId, SignatureAlgorithm, TenantId, Transaction, TransactionId,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub tenant_id: TenantId,
    pub owners: Vec<Owner>,
}

/// One statement for an owner to sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationToSign {
    pub role: String,
    pub subject: String,
    /// 64 hex characters: the SHA-256 digest to sign with `isPreHashed = true`.
    pub data_to_sign: String,
    /// The document the digest was taken over. Echo it back in `finalize`.
    pub attestation_data: AttestationDocument,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateResponse {
    pub register_id: RegisterId,
    pub nonce: String,
    pub attestations_to_sign: Vec<AttestationToSign>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedAttestation {
    pub attestation_data: AttestationDocument,
    #[serde(with = "hex")]
    pub public_key: Vec<u8>,
    #[serde(with = "hex")]
    pub signature: Vec<u8>,
    pub algorithm: SignatureAlgorithm,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeRequest {
    pub register_id: RegisterId,
    pub nonce: String,
    pub signed_attestations: Vec<SignedAttestation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeResponse {
    pub register_id: RegisterId,
    pub genesis_transaction_id: TransactionId,
}

/// Register creation orchestrator.
#[async_trait]
pub trait RegisterCreationApi: Send + Sync {
    /// Phase one: issue attestation digests. Persists no register.
    ///
    /// # Errors
    /// - `InvalidRequest` for an empty name, no owners, or a repeated owner
    async fn initiate(&self, request: InitiateRequest) -> CreationResult<InitiateResponse>;

    /// Phase two: verify owner signatures against the stored digests and
    /// create the register with its sealed genesis docket.
    ///
    /// # Errors
    /// - `PendingNotFound` / `Expired` (NotFound)
    /// - `NonceMismatch`, `AlreadyFinalized`, `FinalizeInProgress` (Conflict)
    /// - `UnknownAttestation`, `SignatureInvalid` (CryptographicFailure)
    /// - `IncompleteAttestation`
    /// - whatever genesis sealing reports; no register exists afterwards
    async fn finalize(&self, request: FinalizeRequest) -> CreationResult<FinalizeResponse>;

    /// Drop expired registrations and reclaim abandoned finalize leases.
    /// Returns the ids of registrations removed.
    async fn reap_expired(&self) -> CreationResult<Vec<RegisterId>>;
}

/// Genesis submission.
#[async_trait]
pub trait GenesisApi: Send + Sync {
    /// Have the wallet sign the candidate's id digest (pre-hashed) and seal
    /// it as docket 0 together with `register`.
    ///
    /// # Errors
    /// - `GenesisInFlight` if a submission for the register is running
    /// - `Consensus(GenesisExists)` if docket 0 is already sealed
    async fn submit_genesis(
        &self,
        register: Register,
        candidate: Transaction,
    ) -> CreationResult<Docket>;
}
