//! Domain layer for register creation.

pub mod attestation;
pub mod config;
pub mod errors;
pub mod genesis_record;
pub mod pending;

pub use attestation::{AttestationDocument, AttestationKey, Owner, ATTESTATION_VERSION};
pub use config::RegistrationConfig;
pub use errors::{CreationError, CreationResult, WalletError};
pub use genesis_record::{GenesisControlRecord, VerifiedOwner};
pub use pending::{generate_nonce, FinalizeLease, PendingRegistration};
