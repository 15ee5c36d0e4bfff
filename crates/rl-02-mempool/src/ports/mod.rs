//! Ports for the mempool.

pub mod inbound;
pub mod outbound;

pub use inbound::MempoolApi;
pub use outbound::SealedTransactionIndex;
