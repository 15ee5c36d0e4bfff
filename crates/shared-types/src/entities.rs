//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Identity**: `RegisterId`, `TenantId`, `Digest`
//! - **Ledger**: `Register`, `Transaction`, `Docket`
//!
//! A register's chain is a sequence of dockets. Docket 0 is genesis and
//! links to `GENESIS_PREVIOUS_HASH`; docket `n > 0` links to the hash of
//! docket `n - 1`.

use crate::errors::LedgerError;
use serde::{Deserialize, Serialize};
use shared_crypto::{digest_from_hex, CanonicalHasher, SignatureAlgorithm};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A 32-byte SHA-256 output.
pub type Hash = [u8; 32];

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Wallet address of a sender or recipient.
pub type WalletAddress = String;

// =============================================================================
// IDENTITY
// =============================================================================

/// A SHA-256 digest, rendered as 64 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(#[serde(with = "hex")] pub Hash);

impl Digest {
    /// All-zero digest.
    pub const ZERO: Digest = Digest([0u8; 32]);

    /// Parse 64 hex characters.
    pub fn from_hex(value: &str) -> Result<Self, LedgerError> {
        digest_from_hex(value)
            .map(Self)
            .map_err(|e| LedgerError::validation(format!("bad digest {value:?}: {e}")))
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({}..)", &self.to_hex()[..12])
    }
}

impl From<Hash> for Digest {
    fn from(hash: Hash) -> Self {
        Self(hash)
    }
}

/// Transaction identifiers are digests of the transaction's signing fields.
pub type TransactionId = Digest;

/// Register identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegisterId(Uuid);

impl RegisterId {
    /// Fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Raw UUID bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl fmt::Display for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for RegisterId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| LedgerError::validation(format!("bad register id {s:?}: {e}")))
    }
}

/// Tenant identifier. All register reads and writes are scoped by it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Wrap a tenant identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// String form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// =============================================================================
// REGISTER
// =============================================================================

/// Operational status of a register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegisterStatus {
    /// Accepting transactions.
    Online,
    /// Taken out of service by an operator.
    Offline,
    /// Planned maintenance.
    Maintenance,
    /// Chain integrity violation detected; awaiting operator intervention.
    Recovery,
}

/// A tenant-scoped ledger instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Register {
    pub id: RegisterId,
    pub name: String,
    pub description: String,
    pub tenant_id: TenantId,
    /// Height of the last sealed docket. Never decreases.
    pub height: u64,
    pub status: RegisterStatus,
    pub advertise: bool,
    pub is_full_replica: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Register {
    /// The register as it exists once its genesis docket is sealed.
    pub fn at_genesis(
        id: RegisterId,
        name: impl Into<String>,
        description: impl Into<String>,
        tenant_id: TenantId,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            tenant_id,
            height: 0,
            status: RegisterStatus::Online,
            advertise: false,
            is_full_replica: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether new transactions may be admitted.
    pub fn is_online(&self) -> bool {
        self.status == RegisterStatus::Online
    }

    /// Raise the height. Returns false (and changes nothing) if `height`
    /// would not move the register forward.
    pub fn advance_height(&mut self, height: u64, now: Timestamp) -> bool {
        if height <= self.height {
            return false;
        }
        self.height = height;
        self.updated_at = now;
        true
    }
}

// =============================================================================
// TRANSACTION
// =============================================================================

/// Kind of transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Register control record (genesis, ownership changes).
    Control,
    /// Workflow action output.
    Action,
    /// Plain data record.
    Data,
}

/// Workflow provenance of a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMetadata {
    pub blueprint_id: Option<String>,
    pub action_id: Option<String>,
    pub tx_type: TransactionType,
}

impl TransactionMetadata {
    /// Metadata with no workflow provenance.
    pub fn of_type(tx_type: TransactionType) -> Self {
        Self {
            blueprint_id: None,
            action_id: None,
            tx_type,
        }
    }
}

/// Per-recipient encrypted blob, carried as the exact bytes transmitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    pub recipient_wallet: WalletAddress,
    #[serde(with = "hex")]
    pub data: Vec<u8>,
}

/// A signature over the transaction id digest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSignature {
    #[serde(with = "hex")]
    pub public_key: Vec<u8>,
    #[serde(with = "hex")]
    pub signature_value: Vec<u8>,
    pub algorithm: SignatureAlgorithm,
}

/// A ledger transaction.
///
/// Immutable once accepted. `docket_height` is the only field written
/// after signing; it is excluded from the id digest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id: TransactionId,
    pub register_id: RegisterId,
    pub sender_wallet: WalletAddress,
    pub recipient_wallets: Vec<WalletAddress>,
    pub payloads: Vec<Payload>,
    pub prev_tx_id: Option<TransactionId>,
    pub docket_height: u64,
    pub timestamp: Timestamp,
    pub expires_at: Option<Timestamp>,
    pub signatures: Vec<TransactionSignature>,
    pub payload_hash: Digest,
    pub metadata: TransactionMetadata,
}

impl Transaction {
    /// Build an unsigned transaction with its payload hash and id computed.
    pub fn unsigned(
        register_id: RegisterId,
        sender_wallet: impl Into<WalletAddress>,
        payloads: Vec<Payload>,
        prev_tx_id: Option<TransactionId>,
        timestamp: Timestamp,
        metadata: TransactionMetadata,
    ) -> Self {
        let recipient_wallets = payloads.iter().map(|p| p.recipient_wallet.clone()).collect();
        let payload_hash = Self::compute_payload_hash(&payloads);
        let mut tx = Self {
            transaction_id: Digest::ZERO,
            register_id,
            sender_wallet: sender_wallet.into(),
            recipient_wallets,
            payloads,
            prev_tx_id,
            docket_height: 0,
            timestamp,
            expires_at: None,
            signatures: Vec::new(),
            payload_hash,
            metadata,
        };
        tx.transaction_id = tx.compute_id();
        tx
    }

    /// Set an expiry and recompute the id.
    pub fn with_expiry(mut self, expires_at: Timestamp) -> Self {
        self.expires_at = Some(expires_at);
        self.transaction_id = self.compute_id();
        self
    }

    /// Digest over the exact payload bytes, in transmitted order.
    pub fn compute_payload_hash(payloads: &[Payload]) -> Digest {
        let mut hasher = CanonicalHasher::new("rl/payload/v1");
        hasher.u64(payloads.len() as u64);
        for payload in payloads {
            hasher.bytes(&payload.data);
        }
        Digest(hasher.finalize())
    }

    /// Digest over every signing field. Signatures and `docket_height` are
    /// not part of it.
    pub fn compute_id(&self) -> TransactionId {
        let mut hasher = CanonicalHasher::new("rl/tx/v1");
        hasher
            .bytes(self.register_id.as_bytes())
            .str(&self.sender_wallet)
            .u64(self.recipient_wallets.len() as u64);
        for wallet in &self.recipient_wallets {
            hasher.str(wallet);
        }
        hasher
            .digest(self.payload_hash.as_bytes())
            .optional_digest(self.prev_tx_id.as_ref().map(Digest::as_bytes))
            .u64(self.timestamp)
            .optional_u64(self.expires_at)
            .optional_str(self.metadata.blueprint_id.as_deref())
            .optional_str(self.metadata.action_id.as_deref())
            .str(tx_type_tag(self.metadata.tx_type));
        Digest(hasher.finalize())
    }

    /// The bytes every signature on this transaction covers: the raw
    /// 32-byte id digest, signed pre-hashed.
    pub fn signing_target(&self) -> &Hash {
        self.transaction_id.as_bytes()
    }

    /// Whether the transaction is past its expiry at `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }

    /// Copy stamped with the height of the docket that sealed it.
    pub fn sealed_at(&self, height: u64) -> Self {
        Self {
            docket_height: height,
            ..self.clone()
        }
    }
}

fn tx_type_tag(tx_type: TransactionType) -> &'static str {
    match tx_type {
        TransactionType::Control => "control",
        TransactionType::Action => "action",
        TransactionType::Data => "data",
    }
}

// =============================================================================
// DOCKET
// =============================================================================

/// `previous_hash` of every genesis docket.
pub const GENESIS_PREVIOUS_HASH: Digest = Digest::ZERO;

/// Lifecycle of a docket. `Sealed` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocketState {
    Init,
    Proposed,
    Accepted,
    Sealed,
}

/// A hash-linked batch of transactions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Docket {
    pub register_id: RegisterId,
    pub height: u64,
    pub hash: Digest,
    pub previous_hash: Digest,
    pub transaction_ids: Vec<TransactionId>,
    pub state: DocketState,
    pub timestamp: Timestamp,
}

impl Docket {
    /// `digest(header fields ++ ordered transaction ids)`.
    pub fn compute_hash(
        register_id: &RegisterId,
        height: u64,
        previous_hash: &Digest,
        timestamp: Timestamp,
        transaction_ids: &[TransactionId],
    ) -> Digest {
        let mut hasher = CanonicalHasher::new("rl/docket/v1");
        hasher
            .bytes(register_id.as_bytes())
            .u64(height)
            .digest(previous_hash.as_bytes())
            .u64(timestamp)
            .u64(transaction_ids.len() as u64);
        for id in transaction_ids {
            hasher.digest(id.as_bytes());
        }
        Digest(hasher.finalize())
    }

    /// Recompute this docket's hash from its own fields.
    pub fn recompute_hash(&self) -> Digest {
        Self::compute_hash(
            &self.register_id,
            self.height,
            &self.previous_hash,
            self.timestamp,
            &self.transaction_ids,
        )
    }

    /// Height 0 linked to the genesis sentinel.
    pub fn is_genesis(&self) -> bool {
        self.height == 0 && self.previous_hash == GENESIS_PREVIOUS_HASH
    }
}
