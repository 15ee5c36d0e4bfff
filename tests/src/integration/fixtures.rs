//! Shared fixtures: a node on a manual clock, owner keys that sign the way a
//! wallet does, and signed data transactions.

use node_runtime::{LedgerApi, LedgerContainer, NodeConfig};
use rl_01_register_storage::test_utils::data_transaction;
use rl_05_register_creation::{
    FinalizeRequest, InitiateRequest, InitiateResponse, Owner, SignedAttestation,
};
use shared_crypto::SigningKeyPair;
use shared_types::{
    DigestMode, ManualTimeSource, RegisterId, SignatureAlgorithm, TenantId, Transaction,
    TransactionId, TransactionSignature,
};
use std::sync::Arc;

pub const T0: u64 = 1_700_000_000_000;

pub struct Node {
    pub api: LedgerApi,
    pub container: Arc<LedgerContainer>,
    pub clock: Arc<ManualTimeSource>,
}

impl Node {
    pub fn new() -> Self {
        Self::with_config(NodeConfig::default())
    }

    pub fn with_config(config: NodeConfig) -> Self {
        let clock = Arc::new(ManualTimeSource::new(T0));
        let container = Arc::new(
            LedgerContainer::with_time_source(config, clock.clone()).expect("node starts"),
        );
        Self {
            api: LedgerApi::new(container.clone()),
            container,
            clock,
        }
    }
}

pub fn tenant() -> TenantId {
    TenantId::new("tenant-a")
}

/// An owner together with the key that signs for them.
pub struct OwnerKey {
    pub owner: Owner,
    pub key: SigningKeyPair,
}

impl OwnerKey {
    pub fn new(role: &str, subject: &str, algorithm: SignatureAlgorithm) -> Self {
        Self {
            owner: Owner {
                role: role.into(),
                subject: subject.into(),
            },
            key: SigningKeyPair::generate(algorithm).expect("key"),
        }
    }

    /// Sign a 64-hex digest exactly as given, pre-hashed.
    pub fn sign_hex(&self, initiated: &InitiateResponse, data_to_sign: &str) -> SignedAttestation {
        let issued = initiated
            .attestations_to_sign
            .iter()
            .find(|a| a.role == self.owner.role && a.subject == self.owner.subject)
            .expect("attestation issued for owner");
        let digest = hex::decode(data_to_sign).expect("hex");
        SignedAttestation {
            attestation_data: issued.attestation_data.clone(),
            public_key: self.key.public_key_bytes().expect("public key"),
            signature: self.key.sign(&digest, DigestMode::PreHashed).expect("sign"),
            algorithm: self.key.algorithm(),
        }
    }

    /// Sign the digest issued for this owner.
    pub fn attest(&self, initiated: &InitiateResponse) -> SignedAttestation {
        let issued = initiated
            .attestations_to_sign
            .iter()
            .find(|a| a.role == self.owner.role && a.subject == self.owner.subject)
            .expect("attestation issued for owner");
        self.sign_hex(initiated, &issued.data_to_sign)
    }
}

pub fn initiate_request(name: &str, owners: &[&OwnerKey]) -> InitiateRequest {
    InitiateRequest {
        name: name.into(),
        description: String::new(),
        tenant_id: tenant(),
        owners: owners.iter().map(|o| o.owner.clone()).collect(),
    }
}

pub fn finalize_request(
    initiated: &InitiateResponse,
    signed_attestations: Vec<SignedAttestation>,
) -> FinalizeRequest {
    FinalizeRequest {
        register_id: initiated.register_id,
        nonce: initiated.nonce.clone(),
        signed_attestations,
    }
}

/// Create a register with a single Ed25519 admin and return its id.
pub async fn create_register(api: &LedgerApi, name: &str) -> RegisterId {
    let admin = OwnerKey::new("admin", "alice", SignatureAlgorithm::Ed25519);
    let initiated = api
        .initiate_register(initiate_request(name, &[&admin]))
        .await
        .expect("initiate");
    api.finalize_register(finalize_request(&initiated, vec![admin.attest(&initiated)]))
        .await
        .expect("finalize")
        .register_id
}

pub fn sign(mut tx: Transaction, key: &SigningKeyPair) -> Transaction {
    tx.signatures.push(TransactionSignature {
        public_key: key.public_key_bytes().expect("public key"),
        signature_value: key
            .sign(tx.signing_target(), DigestMode::PreHashed)
            .expect("sign"),
        algorithm: key.algorithm(),
    });
    tx
}

/// A signed data transaction from `sender`.
pub fn signed_data(
    key: &SigningKeyPair,
    register_id: RegisterId,
    sender: &str,
    n: u64,
    prev: Option<TransactionId>,
) -> Transaction {
    sign(data_transaction(register_id, sender, T0 + n, prev), key)
}
