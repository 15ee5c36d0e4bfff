//! # ECDSA Signatures (NIST P-256)
//!
//! Public keys travel as SEC1 points (compressed or uncompressed),
//! signatures as fixed 64-byte `r || s`.
//!
//! Pre-hashed calls go through the `hazmat` prehash traits so a digest is
//! fed to the curve as-is; raw calls let the signer apply SHA-256.

use crate::CryptoError;
use p256::ecdsa::{
    signature::{
        hazmat::{PrehashSigner, PrehashVerifier},
        Signer, Verifier,
    },
    Signature, SigningKey, VerifyingKey,
};

/// P-256 public key (SEC1 encoded).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct P256PublicKey(VerifyingKey);

impl P256PublicKey {
    /// Parse from SEC1 bytes.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        VerifyingKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidPublicKey)
    }

    /// Compressed SEC1 encoding (33 bytes).
    pub fn to_sec1_bytes(&self) -> Vec<u8> {
        self.0.to_encoded_point(true).as_bytes().to_vec()
    }

    /// Verify a signature over a message (SHA-256 applied here).
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        let sig = parse_signature(signature)?;
        self.0
            .verify(message, &sig)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }

    /// Verify a signature over an existing 32-byte digest.
    pub fn verify_prehash(&self, digest: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        let sig = parse_signature(signature)?;
        self.0
            .verify_prehash(digest, &sig)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

fn parse_signature(bytes: &[u8]) -> Result<Signature, CryptoError> {
    Signature::from_slice(bytes).map_err(|_| CryptoError::InvalidSignatureFormat)
}

/// P-256 ECDSA keypair. `SigningKey` wipes its secret on drop.
pub struct P256KeyPair {
    signing_key: SigningKey,
}

impl P256KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret scalar bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Get public key.
    pub fn public_key(&self) -> P256PublicKey {
        P256PublicKey(*self.signing_key.verifying_key())
    }

    /// Sign a message (RFC 6979, SHA-256 applied here).
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        let sig: Signature = self.signing_key.sign(message);
        sig.to_bytes().to_vec()
    }

    /// Sign an existing digest without hashing it again.
    pub fn sign_prehash(&self, digest: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let sig: Signature = self
            .signing_key
            .sign_prehash(digest)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
        Ok(sig.to_bytes().to_vec())
    }
}
