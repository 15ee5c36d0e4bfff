//! # RSA-4096 Signatures
//!
//! PKCS#1 v1.5 with SHA-256. Public keys are accepted as PKCS#1 or SPKI DER;
//! any modulus other than 4096 bits is rejected.

use crate::CryptoError;
use rsa::pkcs1::{DecodeRsaPublicKey, EncodeRsaPublicKey};
use rsa::pkcs8::DecodePublicKey;
use rsa::sha2::Sha256;
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};

/// Required modulus size.
pub const RSA_MODULUS_BITS: usize = 4096;

/// RSA-4096 public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rsa4096PublicKey(RsaPublicKey);

impl Rsa4096PublicKey {
    /// Parse from DER, trying PKCS#1 first and SPKI second.
    pub fn from_der(bytes: &[u8]) -> Result<Self, CryptoError> {
        let key = RsaPublicKey::from_pkcs1_der(bytes)
            .or_else(|_| RsaPublicKey::from_public_key_der(bytes))
            .map_err(|_| CryptoError::InvalidPublicKey)?;
        Self::checked(key)
    }

    fn checked(key: RsaPublicKey) -> Result<Self, CryptoError> {
        let bits = key.size() * 8;
        if bits != RSA_MODULUS_BITS {
            return Err(CryptoError::InvalidKeyLength {
                expected: RSA_MODULUS_BITS / 8,
                actual: key.size(),
            });
        }
        Ok(Self(key))
    }

    /// PKCS#1 DER encoding.
    pub fn to_der(&self) -> Result<Vec<u8>, CryptoError> {
        self.0
            .to_pkcs1_der()
            .map(|doc| doc.as_bytes().to_vec())
            .map_err(|_| CryptoError::InvalidPublicKey)
    }

    /// Verify a signature over an existing SHA-256 digest.
    pub fn verify_prehash(&self, digest: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        if signature.len() != self.0.size() {
            return Err(CryptoError::InvalidSignatureFormat);
        }
        self.0
            .verify(Pkcs1v15Sign::new::<Sha256>(), digest, signature)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

/// RSA-4096 keypair.
pub struct Rsa4096KeyPair {
    private_key: RsaPrivateKey,
}

impl Rsa4096KeyPair {
    /// Generate a fresh 4096-bit key. Slow; intended for wallets and tests.
    pub fn generate() -> Result<Self, CryptoError> {
        let private_key = RsaPrivateKey::new(&mut rand::thread_rng(), RSA_MODULUS_BITS)
            .map_err(|e| CryptoError::KeyGenerationFailed(e.to_string()))?;
        Ok(Self { private_key })
    }

    /// Get public key.
    pub fn public_key(&self) -> Rsa4096PublicKey {
        Rsa4096PublicKey(self.private_key.to_public_key())
    }

    /// Sign an existing SHA-256 digest.
    pub fn sign_prehash(&self, digest: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.private_key
            .sign(Pkcs1v15Sign::new::<Sha256>(), digest)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::sha256;

    #[test]
    fn test_small_modulus_rejected() {
        let small = RsaPrivateKey::new(&mut rand::thread_rng(), 1024).unwrap();
        let der = small.to_public_key().to_pkcs1_der().unwrap();

        assert!(matches!(
            Rsa4096PublicKey::from_der(der.as_bytes()),
            Err(CryptoError::InvalidKeyLength { expected: 512, actual: 128 })
        ));
    }

    #[test]
    fn test_garbage_der_rejected() {
        assert_eq!(
            Rsa4096PublicKey::from_der(&[0x30, 0x03, 0x02, 0x01, 0x00]),
            Err(CryptoError::InvalidPublicKey)
        );
    }

    #[test]
    #[ignore = "4096-bit key generation is slow in debug builds"]
    fn test_sign_verify_prehash() {
        let keypair = Rsa4096KeyPair::generate().unwrap();
        let digest = sha256(b"genesis control record");
        let signature = keypair.sign_prehash(&digest).unwrap();

        let public = Rsa4096PublicKey::from_der(&keypair.public_key().to_der().unwrap()).unwrap();
        assert!(public.verify_prehash(&digest, &signature).is_ok());
        assert!(public.verify_prehash(&sha256(b"other"), &signature).is_err());
    }
}
