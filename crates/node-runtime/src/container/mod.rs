//! # Container
//!
//! Configuration and the dependency-injection container.

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, LoggingConfig, NodeConfig};
pub use subsystems::{ContainerError, LedgerContainer, NodeStorage};
