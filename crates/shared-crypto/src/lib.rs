//! # Shared Crypto - Hashing and Signatures
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-256 | Payload, transaction, docket and attestation digests |
//! | `signatures` | Ed25519 | Owner and transaction signatures |
//! | `ecdsa` | NIST P-256 | Owner and transaction signatures |
//! | `rsa4096` | RSA-4096 PKCS#1 v1.5 | Owner and transaction signatures |
//! | `scheme` | dispatch | `verify_signature` / `SigningKeyPair` with an explicit `DigestMode` |
//!
//! ## Pre-hashed vs raw
//!
//! Attestations and transaction ids are already SHA-256 digests when they are
//! signed. Hashing them a second time produces a signature that verifies
//! against nothing, so every call site states `DigestMode` explicitly.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;
pub mod rsa4096;
pub mod scheme;
pub mod signatures;

// Re-exports
pub use ecdsa::{P256KeyPair, P256PublicKey};
pub use errors::CryptoError;
pub use hashing::{digest_from_hex, sha256, CanonicalHasher, Hash};
pub use rsa4096::{Rsa4096KeyPair, Rsa4096PublicKey};
pub use scheme::{verify_signature, DigestMode, SignatureAlgorithm, SigningKeyPair};
pub use signatures::{Ed25519KeyPair, Ed25519PublicKey};
