//! Ports for docket consensus.

pub mod inbound;

pub use inbound::{ConsensusApi, DocketBuild};
