//! Domain layer for docket consensus.

pub mod candidate;
pub mod chain;
pub mod errors;
pub mod lease;
pub mod metrics;
pub mod policy;

pub use candidate::{Accepted, DocketCandidate, Init, Proposed, Sealed};
pub use chain::{verify_links, verify_stored, ChainBreak, ChainCursor};
pub use errors::{ConsensusError, ConsensusResult};
pub use lease::{SealingLease, SealingLeases};
pub use metrics::ChainMetrics;
pub use policy::SealingPolicy;
