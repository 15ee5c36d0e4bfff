//! # Ed25519 Signatures
//!
//! Twisted Edwards curve signatures with deterministic nonces.
//! A pre-hashed call signs the 32 digest bytes as the message; Ed25519
//! hashes internally either way, so the caller-visible contract is that the
//! digest is never hashed a second time before it reaches the curve.

use crate::CryptoError;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};

/// Ed25519 public key (32 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ed25519PublicKey([u8; 32]);

impl Ed25519PublicKey {
    /// Create from a byte slice, rejecting anything that is not a curve point.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        VerifyingKey::from_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Verify a signature.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)?;

        let sig = ed25519_dalek::Signature::from_slice(signature)
            .map_err(|_| CryptoError::InvalidSignatureFormat)?;

        verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

/// Ed25519 keypair. `SigningKey` wipes its secret on drop.
pub struct Ed25519KeyPair {
    signing_key: SigningKey,
}

impl Ed25519KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret seed (32 bytes).
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);
        Self { signing_key }
    }

    /// Get public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message (deterministic - no RNG needed).
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify() {
        let keypair = Ed25519KeyPair::generate();
        let signature = keypair.sign(b"register attestation");

        assert!(keypair
            .public_key()
            .verify(b"register attestation", &signature)
            .is_ok());
    }

    #[test]
    fn test_wrong_key_fails() {
        let signer = Ed25519KeyPair::generate();
        let other = Ed25519KeyPair::generate();
        let signature = signer.sign(b"test");

        assert_eq!(
            other.public_key().verify(b"test", &signature),
            Err(CryptoError::SignatureVerificationFailed)
        );
    }

    #[test]
    fn test_short_signature_is_format_error() {
        let keypair = Ed25519KeyPair::from_seed([7u8; 32]);
        assert_eq!(
            keypair.public_key().verify(b"m", &[0u8; 12]),
            Err(CryptoError::InvalidSignatureFormat)
        );
    }

    #[test]
    fn test_seeded_key_signs_identically_after_previous_drop() {
        let first = Ed25519KeyPair::from_seed([3u8; 32]);
        let signature = first.sign(b"genesis");
        let public = first.public_key();
        drop(first);

        let second = Ed25519KeyPair::from_seed([3u8; 32]);
        assert_eq!(second.sign(b"genesis"), signature);
        assert!(public.verify(b"genesis", &signature).is_ok());
    }

    #[test]
    fn test_public_key_length_checked() {
        assert!(matches!(
            Ed25519PublicKey::from_slice(&[1u8; 31]),
            Err(CryptoError::InvalidKeyLength { expected: 32, actual: 31 })
        ));
    }
}
