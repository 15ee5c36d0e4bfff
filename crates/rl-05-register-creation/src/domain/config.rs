//! Registration configuration.

use shared_types::SignatureAlgorithm;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RegistrationConfig {
    /// How long an initiated registration waits for `finalize`.
    pub pending_ttl: Duration,
    /// Reaper sweep period.
    pub reap_interval: Duration,
    /// A finalize that has held its lease this long is presumed abandoned.
    pub finalize_lease_timeout: Duration,
    /// Wallet calls per signing request while the wallet is unavailable.
    pub wallet_max_attempts: u32,
    /// First wallet retry delay, doubled each attempt.
    pub wallet_backoff: Duration,
    /// Wallet that signs genesis transactions.
    pub system_wallet: String,
    pub genesis_algorithm: SignatureAlgorithm,
    pub max_owners: usize,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            pending_ttl: Duration::from_secs(5 * 60),
            reap_interval: Duration::from_secs(30),
            finalize_lease_timeout: Duration::from_secs(30),
            wallet_max_attempts: 3,
            wallet_backoff: Duration::from_millis(100),
            system_wallet: "system".into(),
            genesis_algorithm: SignatureAlgorithm::Ed25519,
            max_owners: 64,
        }
    }
}

impl RegistrationConfig {
    pub fn pending_ttl_ms(&self) -> u64 {
        self.pending_ttl.as_millis() as u64
    }

    pub fn finalize_lease_timeout_ms(&self) -> u64 {
        self.finalize_lease_timeout.as_millis() as u64
    }

    /// Delay before wallet attempt `attempt` (1-based).
    pub fn wallet_backoff_for(&self, attempt: u32) -> Duration {
        match attempt {
            0 | 1 => Duration::ZERO,
            n => self.wallet_backoff.saturating_mul(1 << (n - 2).min(16)),
        }
    }
}
