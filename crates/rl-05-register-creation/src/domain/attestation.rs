//! # Attestations
//!
//! An attestation binds one owner `(role, subject)` to one register creation.
//! `initiate` serializes the document once, hashes it, and keeps only the 32
//! digest bytes. `finalize` looks those bytes up by key and verifies the
//! owner's signature against them; the echoed document is used for its key
//! and nothing else.

use serde::{Deserialize, Serialize};
use shared_crypto::sha256;
use shared_types::{Hash, RegisterId, TenantId, Timestamp};
use std::fmt;

/// Attestation format version.
pub const ATTESTATION_VERSION: u32 = 1;

/// Composite key of an owner slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttestationKey {
    pub role: String,
    pub subject: String,
}

impl AttestationKey {
    pub fn new(role: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            subject: subject.into(),
        }
    }
}

impl fmt::Display for AttestationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.role, self.subject)
    }
}

/// An owner requested at `initiate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub role: String,
    pub subject: String,
}

impl Owner {
    pub fn key(&self) -> AttestationKey {
        AttestationKey::new(self.role.clone(), self.subject.clone())
    }
}

/// The statement an owner signs.
///
/// Field order is the serialization order; the digest is taken over exactly
/// the bytes `serde_json::to_vec` produces for it at `initiate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationDocument {
    pub version: u32,
    pub register_id: RegisterId,
    pub register_name: String,
    pub tenant_id: TenantId,
    pub role: String,
    pub subject: String,
    pub nonce: String,
    pub issued_at: Timestamp,
}

impl AttestationDocument {
    pub fn key(&self) -> AttestationKey {
        AttestationKey::new(self.role.clone(), self.subject.clone())
    }

    /// SHA-256 over the document's JSON bytes.
    pub fn digest(&self) -> Result<Hash, serde_json::Error> {
        Ok(sha256(&serde_json::to_vec(self)?))
    }
}
