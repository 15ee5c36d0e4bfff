//! Sealing cadence and retry policy.

use std::time::Duration;

/// When and how much to seal.
///
/// A register is due when its pending count reaches `trigger_count`, or when
/// `interval` passes with anything pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealingPolicy {
    /// Upper bound on transactions per docket.
    pub max_transactions: usize,
    pub interval: Duration,
    pub trigger_count: usize,
    /// Build attempts per `build_and_seal` when persistence is unavailable.
    pub max_attempts: u32,
    /// Pause between attempts, doubled each time.
    pub retry_backoff: Duration,
}

impl Default for SealingPolicy {
    fn default() -> Self {
        Self {
            max_transactions: 100,
            interval: Duration::from_secs(2),
            trigger_count: 50,
            max_attempts: 3,
            retry_backoff: Duration::from_millis(50),
        }
    }
}

impl SealingPolicy {
    /// Size trigger.
    pub fn is_full(&self, pending: usize) -> bool {
        pending >= self.trigger_count.max(1)
    }

    /// Backoff before attempt `attempt` (1-based; attempt 1 has none).
    pub fn backoff(&self, attempt: u32) -> Duration {
        match attempt {
            0 | 1 => Duration::ZERO,
            n => self.retry_backoff.saturating_mul(1 << (n - 2).min(16)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles() {
        let policy = SealingPolicy::default();
        assert_eq!(policy.backoff(1), Duration::ZERO);
        assert_eq!(policy.backoff(2), Duration::from_millis(50));
        assert_eq!(policy.backoff(3), Duration::from_millis(100));
    }

    #[test]
    fn test_trigger() {
        let policy = SealingPolicy {
            trigger_count: 3,
            ..SealingPolicy::default()
        };
        assert!(!policy.is_full(2));
        assert!(policy.is_full(3));
    }
}
