//! Value objects: queue ordering and statistics.

use super::entities::Priority;
use shared_types::Timestamp;

/// Position in a register's queue: priority band, then arrival order.
///
/// `Ord` is derived field by field, so `High` sorts before `Normal` and, within
/// a band, the earlier sequence number first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct QueueKey {
    pub priority: Priority,
    pub sequence: u64,
}

/// Snapshot of one register's pool.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MempoolStats {
    pub pending: usize,
    pub high: usize,
    pub normal: usize,
    pub low: usize,
    /// Age of the longest-waiting transaction, in milliseconds.
    pub oldest_age_ms: Option<u64>,
}

impl MempoolStats {
    pub(crate) fn count(&mut self, priority: Priority, added_at: Timestamp, now: Timestamp) {
        self.pending += 1;
        match priority {
            Priority::High => self.high += 1,
            Priority::Normal => self.normal += 1,
            Priority::Low => self.low += 1,
        }
        let age = now.saturating_sub(added_at);
        self.oldest_age_ms = Some(self.oldest_age_ms.map_or(age, |oldest| oldest.max(age)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_beats_arrival() {
        let early_normal = QueueKey {
            priority: Priority::Normal,
            sequence: 1,
        };
        let late_high = QueueKey {
            priority: Priority::High,
            sequence: 50,
        };
        assert!(late_high < early_normal);
    }

    #[test]
    fn test_fifo_within_band() {
        let a = QueueKey {
            priority: Priority::Low,
            sequence: 3,
        };
        let b = QueueKey {
            priority: Priority::Low,
            sequence: 4,
        };
        assert!(a < b);
    }
}
