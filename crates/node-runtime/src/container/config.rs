//! # Node Configuration
//!
//! Unified configuration for all subsystems and runtime parameters.
//!
//! Every value has a default. `from_env` overrides them from `RL_*`
//! variables; a value that does not parse is logged and the default kept.

use rl_01_register_storage::StorageConfig;
use rl_02_mempool::MempoolConfig;
use rl_03_transaction_validation::ValidatorConfig;
use rl_04_docket_consensus::SealingPolicy;
use rl_05_register_creation::RegistrationConfig;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    pub storage: StorageConfig,
    pub mempool: MempoolConfig,
    pub validator: ValidatorConfig,
    /// Sealing cadence and batch size.
    pub consensus: SealingPolicy,
    pub registration: RegistrationConfig,
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
}

impl LoggingConfig {
    /// Read ahead of the rest so the subscriber is installed before any
    /// other setting is parsed.
    pub fn from_env() -> Self {
        let mut logging = Self::default();
        let lookup = |key: &str| std::env::var(key).ok();
        EnvReader { lookup: &lookup }.parse("RL_LOG_LEVEL", &mut logging.level);
        logging
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("seal trigger count {trigger} exceeds max docket transactions {max}")]
    TriggerAboveBatch { trigger: usize, max: usize },

    #[error("system wallet name is empty")]
    EmptySystemWallet,
}

impl NodeConfig {
    /// Defaults overridden from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let env = EnvReader { lookup: &lookup };

        let registration = &mut config.registration;
        env.secs("RL_PENDING_TTL_SECS", &mut registration.pending_ttl);
        env.secs("RL_REAP_INTERVAL_SECS", &mut registration.reap_interval);
        env.secs(
            "RL_FINALIZE_LEASE_TIMEOUT_SECS",
            &mut registration.finalize_lease_timeout,
        );
        env.parse("RL_WALLET_MAX_ATTEMPTS", &mut registration.wallet_max_attempts);
        env.millis("RL_WALLET_BACKOFF_MS", &mut registration.wallet_backoff);
        env.parse("RL_SYSTEM_WALLET", &mut registration.system_wallet);
        env.parse("RL_MAX_OWNERS", &mut registration.max_owners);

        let consensus = &mut config.consensus;
        env.parse("RL_MAX_DOCKET_TRANSACTIONS", &mut consensus.max_transactions);
        env.millis("RL_SEAL_INTERVAL_MS", &mut consensus.interval);
        env.parse("RL_SEAL_TRIGGER_COUNT", &mut consensus.trigger_count);
        env.parse("RL_SEAL_MAX_ATTEMPTS", &mut consensus.max_attempts);

        env.parse(
            "RL_MAX_PENDING_PER_REGISTER",
            &mut config.mempool.max_pending_per_register,
        );
        env.parse(
            "RL_MAX_REGISTERS_PER_TENANT",
            &mut config.storage.max_registers_per_tenant,
        );
        env.parse("RL_MIN_SIGNATURES", &mut config.validator.min_signatures);
        env.parse("RL_LOG_LEVEL", &mut config.logging.level);

        config
    }

    /// Reject settings the node cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zero = |field| Err(ConfigError::Zero { field });
        if self.consensus.max_transactions == 0 {
            return zero("max docket transactions");
        }
        if self.consensus.trigger_count == 0 {
            return zero("seal trigger count");
        }
        if self.consensus.interval.is_zero() {
            return zero("seal interval");
        }
        if self.consensus.max_attempts == 0 {
            return zero("seal attempts");
        }
        if self.consensus.trigger_count > self.consensus.max_transactions {
            return Err(ConfigError::TriggerAboveBatch {
                trigger: self.consensus.trigger_count,
                max: self.consensus.max_transactions,
            });
        }
        if self.registration.pending_ttl.is_zero() {
            return zero("pending registration TTL");
        }
        if self.registration.reap_interval.is_zero() {
            return zero("reap interval");
        }
        if self.registration.wallet_max_attempts == 0 {
            return zero("wallet attempts");
        }
        if self.registration.system_wallet.trim().is_empty() {
            return Err(ConfigError::EmptySystemWallet);
        }
        if self.mempool.max_pending_per_register == 0 {
            return zero("mempool capacity");
        }
        Ok(())
    }
}

struct EnvReader<'a, F: Fn(&str) -> Option<String>> {
    lookup: &'a F,
}

impl<F: Fn(&str) -> Option<String>> EnvReader<'_, F> {
    fn parse<T: FromStr>(&self, key: &str, target: &mut T) {
        let Some(raw) = (self.lookup)(key) else {
            return;
        };
        match raw.trim().parse() {
            Ok(value) => *target = value,
            Err(_) => warn!(key, value = %raw, "Ignoring unparseable setting"),
        }
    }

    fn secs(&self, key: &str, target: &mut Duration) {
        let mut secs = target.as_secs();
        self.parse(key, &mut secs);
        *target = Duration::from_secs(secs);
    }

    fn millis(&self, key: &str, target: &mut Duration) {
        let mut millis = target.as_millis() as u64;
        self.parse(key, &mut millis);
        *target = Duration::from_millis(millis);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = NodeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.consensus.max_transactions, 100);
        assert_eq!(config.registration.pending_ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_overrides_from_lookup() {
        let config = NodeConfig::from_lookup(lookup(&[
            ("RL_PENDING_TTL_SECS", "60"),
            ("RL_MAX_DOCKET_TRANSACTIONS", "10"),
            ("RL_SEAL_INTERVAL_MS", "250"),
            ("RL_SEAL_TRIGGER_COUNT", "5"),
            ("RL_LOG_LEVEL", "debug"),
        ]));

        assert_eq!(config.registration.pending_ttl, Duration::from_secs(60));
        assert_eq!(config.consensus.max_transactions, 10);
        assert_eq!(config.consensus.interval, Duration::from_millis(250));
        assert_eq!(config.consensus.trigger_count, 5);
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unparseable_value_keeps_default() {
        let config = NodeConfig::from_lookup(lookup(&[("RL_MAX_DOCKET_TRANSACTIONS", "lots")]));
        assert_eq!(config.consensus.max_transactions, 100);
    }

    #[test]
    fn test_validate_rejects_zero_batch_and_ttl() {
        let config = NodeConfig::from_lookup(lookup(&[("RL_MAX_DOCKET_TRANSACTIONS", "0")]));
        assert_eq!(
            config.validate(),
            Err(ConfigError::Zero {
                field: "max docket transactions"
            })
        );

        let config = NodeConfig::from_lookup(lookup(&[("RL_PENDING_TTL_SECS", "0")]));
        assert_eq!(
            config.validate(),
            Err(ConfigError::Zero {
                field: "pending registration TTL"
            })
        );
    }

    #[test]
    fn test_trigger_cannot_exceed_batch() {
        let config = NodeConfig::from_lookup(lookup(&[
            ("RL_MAX_DOCKET_TRANSACTIONS", "10"),
            ("RL_SEAL_TRIGGER_COUNT", "20"),
        ]));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TriggerAboveBatch { .. })
        ));
    }
}
