//! # Register Creation
//!
//! Creates a register in two phases so that every owner has signed off on
//! the register before it exists.
//!
//! ## Protocol
//!
//! ```text
//! client                    RegisterCreationService        PendingStore     GenesisManager ── wallet
//!   │ initiate(name, owners) ──→ hash one document per owner ──→ insert
//!   │ ←── registerId, nonce, [{role, subject, dataToSign}]
//!   │
//!   │ (each owner signs dataToSign, isPreHashed = true)
//!   │
//!   │ finalize(signatures) ──→ begin_finalize (lease) ──→
//!   │                          verify vs stored digests
//!   │                          build control record
//!   │                          commit_finalize (pin lease) ──────────→ sign tx id (pre-hashed)
//!   │                                                                  seal docket 0 + register
//!   │ ←── registerId, genesisTransactionId ←── complete_finalize
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Signatures are checked against the digest issued at `initiate` | `PendingRegistration::attestation_hashes` holds raw digest bytes; the echoed document only selects the slot |
//! | Every required owner has a valid signature | `IncompleteAttestation` lists the missing `(role, subject)` pairs |
//! | One finalize per registration at a time | the store's `Finalizing` lease; losers get `FinalizeInProgress` |
//! | Register and genesis docket appear together or not at all | a single `commit_genesis`; on failure the registration is discarded |
//! | A replayed finalize cannot create a second register | consumed tombstone, then the register's own existence |
//! | A registration being sealed is never reported expired | `commit_finalize` pins the lease generation before genesis; the reaper skips committed leases |
//! | Only the registration's own finalize creates its register | `ensure_unreserved` rejects a direct genesis for a pending id |
//! | The wallet is always told the data is a digest | `SignRequest::mode` is `PreHashed` for genesis signing |

pub mod adapters;
pub mod domain;
pub mod genesis;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryPendingStore, LocalKeyWallet};
pub use domain::{
    AttestationDocument, AttestationKey, CreationError, CreationResult, FinalizeLease,
    GenesisControlRecord, Owner, PendingRegistration, RegistrationConfig, VerifiedOwner, WalletError,
};
pub use genesis::GenesisManager;
pub use ports::{
    AttestationToSign, FinalizeRequest, FinalizeResponse, GenesisApi, InitiateRequest,
    InitiateResponse, PendingRegistrationStore, RegisterCreationApi, SignRequest,
    SignedAttestation, WalletSignature, WalletSigner,
};
pub use service::RegisterCreationService;
