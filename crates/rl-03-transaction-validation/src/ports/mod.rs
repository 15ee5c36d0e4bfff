//! Ports for transaction validation.

pub mod inbound;
pub mod outbound;

pub use inbound::TransactionValidationApi;
pub use outbound::RegisterView;
