//! Domain layer for transaction validation.

pub mod checks;
pub mod entities;
pub mod errors;

pub use checks::{check_hashes, check_signatures, check_stateless, check_structure};
pub use entities::{ValidationOutcome, ValidatorConfig};
pub use errors::{HashField, RejectionReason, ValidationError};
