//! # Shared Types Crate
//!
//! Domain entities shared by every ledger subsystem: registers, the
//! transactions they hold, the dockets that seal them, and the error
//! taxonomy every subsystem error classifies into.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: cross-subsystem types live here.
//! - **Exact-byte digests**: payload hashes, transaction ids and docket
//!   hashes are computed over length-prefixed canonical fields, never over a
//!   re-serialized object.
//! - **Tenant isolation**: every `Register` carries its `TenantId`; reads that
//!   cross tenants are `NotFound`, not `Forbidden`.

pub mod entities;
pub mod errors;
pub mod time;

pub use entities::*;
pub use errors::*;
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource};

pub use shared_crypto::{DigestMode, SignatureAlgorithm};
