//! # Algorithm Dispatch
//!
//! Every sign/verify call names its algorithm and whether `data` is already a
//! SHA-256 digest (`DigestMode::PreHashed`) or a message the backend must hash
//! itself (`DigestMode::Raw`). Nothing here guesses which one was meant.

use crate::ecdsa::{P256KeyPair, P256PublicKey};
use crate::hashing::sha256;
use crate::rsa4096::{Rsa4096KeyPair, Rsa4096PublicKey};
use crate::signatures::{Ed25519KeyPair, Ed25519PublicKey};
use crate::CryptoError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported signature algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignatureAlgorithm {
    /// Ed25519 (RFC 8032).
    Ed25519,
    /// ECDSA over NIST P-256 with SHA-256.
    NistP256,
    /// RSA-4096 PKCS#1 v1.5 with SHA-256.
    Rsa4096,
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ed25519 => "ED25519",
            Self::NistP256 => "NISTP256",
            Self::Rsa4096 => "RSA4096",
        };
        f.write_str(name)
    }
}

/// What the `data` argument of a sign/verify call is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestMode {
    /// `data` is a 32-byte SHA-256 digest and is signed as-is.
    PreHashed,
    /// `data` is a message; the algorithm applies SHA-256 where it needs one.
    Raw,
}

impl DigestMode {
    /// Maps the wallet-facing `isPreHashed` flag.
    pub fn from_pre_hashed(is_pre_hashed: bool) -> Self {
        if is_pre_hashed {
            Self::PreHashed
        } else {
            Self::Raw
        }
    }

    /// True for `PreHashed`.
    pub fn is_pre_hashed(self) -> bool {
        matches!(self, Self::PreHashed)
    }
}

fn require_digest(data: &[u8]) -> Result<(), CryptoError> {
    if data.len() != 32 {
        return Err(CryptoError::InvalidDigestLength(data.len()));
    }
    Ok(())
}

/// Verify `signature` over `data` with the declared algorithm and mode.
pub fn verify_signature(
    algorithm: SignatureAlgorithm,
    public_key: &[u8],
    data: &[u8],
    mode: DigestMode,
    signature: &[u8],
) -> Result<(), CryptoError> {
    if mode.is_pre_hashed() {
        require_digest(data)?;
    }
    match algorithm {
        SignatureAlgorithm::Ed25519 => Ed25519PublicKey::from_slice(public_key)?.verify(data, signature),
        SignatureAlgorithm::NistP256 => {
            let key = P256PublicKey::from_sec1_bytes(public_key)?;
            match mode {
                DigestMode::PreHashed => key.verify_prehash(data, signature),
                DigestMode::Raw => key.verify(data, signature),
            }
        }
        SignatureAlgorithm::Rsa4096 => {
            let key = Rsa4096PublicKey::from_der(public_key)?;
            match mode {
                DigestMode::PreHashed => key.verify_prehash(data, signature),
                DigestMode::Raw => key.verify_prehash(&sha256(data), signature),
            }
        }
    }
}

/// A private key of any supported algorithm.
pub enum SigningKeyPair {
    /// Ed25519 key.
    Ed25519(Ed25519KeyPair),
    /// P-256 key.
    NistP256(P256KeyPair),
    /// RSA-4096 key.
    Rsa4096(Rsa4096KeyPair),
}

impl SigningKeyPair {
    /// Generate a fresh key for `algorithm`.
    pub fn generate(algorithm: SignatureAlgorithm) -> Result<Self, CryptoError> {
        Ok(match algorithm {
            SignatureAlgorithm::Ed25519 => Self::Ed25519(Ed25519KeyPair::generate()),
            SignatureAlgorithm::NistP256 => Self::NistP256(P256KeyPair::generate()),
            SignatureAlgorithm::Rsa4096 => Self::Rsa4096(Rsa4096KeyPair::generate()?),
        })
    }

    /// Algorithm of this key.
    pub fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            Self::Ed25519(_) => SignatureAlgorithm::Ed25519,
            Self::NistP256(_) => SignatureAlgorithm::NistP256,
            Self::Rsa4096(_) => SignatureAlgorithm::Rsa4096,
        }
    }

    /// Public key bytes in the encoding `verify_signature` expects.
    pub fn public_key_bytes(&self) -> Result<Vec<u8>, CryptoError> {
        match self {
            Self::Ed25519(key) => Ok(key.public_key().as_bytes().to_vec()),
            Self::NistP256(key) => Ok(key.public_key().to_sec1_bytes()),
            Self::Rsa4096(key) => key.public_key().to_der(),
        }
    }

    /// Sign `data` under the given digest mode.
    pub fn sign(&self, data: &[u8], mode: DigestMode) -> Result<Vec<u8>, CryptoError> {
        if mode.is_pre_hashed() {
            require_digest(data)?;
        }
        match (self, mode) {
            (Self::Ed25519(key), _) => Ok(key.sign(data).to_vec()),
            (Self::NistP256(key), DigestMode::PreHashed) => key.sign_prehash(data),
            (Self::NistP256(key), DigestMode::Raw) => Ok(key.sign(data)),
            (Self::Rsa4096(key), DigestMode::PreHashed) => key.sign_prehash(data),
            (Self::Rsa4096(key), DigestMode::Raw) => key.sign_prehash(&sha256(data)),
        }
    }
}
