//! Ports for register creation.

pub mod inbound;
pub mod outbound;

pub use inbound::{
    AttestationToSign, FinalizeRequest, FinalizeResponse, GenesisApi, InitiateRequest,
    InitiateResponse, RegisterCreationApi, SignedAttestation,
};
pub use outbound::{PendingRegistrationStore, SignRequest, WalletSignature, WalletSigner};
