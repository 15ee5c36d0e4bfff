//! # SHA-256 Hashing
//!
//! Every digest in the ledger (payload hashes, transaction ids, docket
//! hashes, attestation hashes) is SHA-256.
//!
//! `CanonicalHasher` writes every variable-length field with an 8-byte
//! big-endian length prefix so that adjacent fields can never be shifted
//! into one another (`"ab" ++ "c"` and `"a" ++ "bc"` hash differently).

use crate::CryptoError;
use sha2::{Digest, Sha256};

/// SHA-256 output (256-bit).
pub type Hash = [u8; 32];

/// Hash data with SHA-256 (one-shot).
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// Parse a 64-character hex string into a digest.
pub fn digest_from_hex(value: &str) -> Result<Hash, CryptoError> {
    let mut out = [0u8; 32];
    hex::decode_to_slice(value, &mut out).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
    Ok(out)
}

/// Length-prefixed, domain-separated SHA-256 writer.
pub struct CanonicalHasher {
    inner: Sha256,
}

impl CanonicalHasher {
    /// Create a hasher bound to a domain tag.
    pub fn new(domain: &str) -> Self {
        let mut hasher = Self {
            inner: Sha256::new(),
        };
        hasher.bytes(domain.as_bytes());
        hasher
    }

    /// Write a variable-length byte field.
    pub fn bytes(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update((data.len() as u64).to_be_bytes());
        self.inner.update(data);
        self
    }

    /// Write a UTF-8 string field.
    pub fn str(&mut self, value: &str) -> &mut Self {
        self.bytes(value.as_bytes())
    }

    /// Write a fixed-width integer field.
    pub fn u64(&mut self, value: u64) -> &mut Self {
        self.inner.update(value.to_be_bytes());
        self
    }

    /// Write a 32-byte digest field.
    pub fn digest(&mut self, value: &Hash) -> &mut Self {
        self.inner.update(value);
        self
    }

    /// Write an optional field with a presence marker.
    pub fn optional_digest(&mut self, value: Option<&Hash>) -> &mut Self {
        match value {
            Some(hash) => {
                self.inner.update([1u8]);
                self.inner.update(hash);
            }
            None => self.inner.update([0u8]),
        }
        self
    }

    /// Write an optional integer with a presence marker.
    pub fn optional_u64(&mut self, value: Option<u64>) -> &mut Self {
        match value {
            Some(v) => {
                self.inner.update([1u8]);
                self.inner.update(v.to_be_bytes());
            }
            None => self.inner.update([0u8]),
        }
        self
    }

    /// Write an optional string with a presence marker.
    pub fn optional_str(&mut self, value: Option<&str>) -> &mut Self {
        match value {
            Some(v) => {
                self.inner.update([1u8]);
                self.str(v);
            }
            None => self.inner.update([0u8]),
        }
        self
    }

    /// Finalize and return hash.
    pub fn finalize(self) -> Hash {
        self.inner.finalize().into()
    }
}
