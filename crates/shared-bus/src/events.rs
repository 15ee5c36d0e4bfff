//! # Ledger Events
//!
//! All event types that flow through the shared bus.

use serde::{Deserialize, Serialize};
use shared_types::{Digest, RegisterId, TenantId, TransactionId};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    // =========================================================================
    // REGISTER CREATION
    // =========================================================================
    /// A register was persisted together with its sealed genesis docket.
    RegisterCreated {
        register_id: RegisterId,
        tenant_id: TenantId,
        genesis_transaction_id: TransactionId,
        genesis_hash: Digest,
    },

    /// An abandoned pending registration was reaped.
    RegistrationExpired { register_id: RegisterId },

    // =========================================================================
    // ADMISSION
    // =========================================================================
    /// A transaction passed validation and entered the mempool.
    TransactionAccepted {
        register_id: RegisterId,
        transaction_id: TransactionId,
        /// Pending count for the register after the enqueue.
        pending: usize,
    },

    // =========================================================================
    // SEALING
    // =========================================================================
    /// A docket was committed.
    DocketSealed {
        register_id: RegisterId,
        height: u64,
        hash: Digest,
        transaction_count: usize,
    },

    // =========================================================================
    // INTEGRITY
    // =========================================================================
    /// Chain verification found a broken link. The register is in `Recovery`.
    IntegrityViolation {
        register_id: RegisterId,
        height: u64,
        detail: String,
    },
}

impl LedgerEvent {
    /// Get the topic for this event.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::RegisterCreated { .. } | Self::RegistrationExpired { .. } => {
                EventTopic::Registration
            }
            Self::TransactionAccepted { .. } => EventTopic::Admission,
            Self::DocketSealed { .. } => EventTopic::Sealing,
            Self::IntegrityViolation { .. } => EventTopic::Integrity,
        }
    }

    /// Register the event concerns.
    #[must_use]
    pub fn register_id(&self) -> RegisterId {
        match self {
            Self::RegisterCreated { register_id, .. }
            | Self::RegistrationExpired { register_id }
            | Self::TransactionAccepted { register_id, .. }
            | Self::DocketSealed { register_id, .. }
            | Self::IntegrityViolation { register_id, .. } => *register_id,
        }
    }
}

/// Event topics for filtering subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    Registration,
    Admission,
    Sealing,
    Integrity,
    /// Matches every topic.
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include (empty = all).
    pub topics: Vec<EventTopic>,
    /// Registers to include (empty = all).
    pub registers: Vec<RegisterId>,
}

impl EventFilter {
    /// Every event.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Events on the given topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            registers: Vec::new(),
        }
    }

    /// Narrow to one register.
    #[must_use]
    pub fn for_register(mut self, register_id: RegisterId) -> Self {
        self.registers.push(register_id);
        self
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let register_match =
            self.registers.is_empty() || self.registers.contains(&event.register_id());

        topic_match && register_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sealed(register_id: RegisterId) -> LedgerEvent {
        LedgerEvent::DocketSealed {
            register_id,
            height: 1,
            hash: Digest::ZERO,
            transaction_count: 3,
        }
    }

    #[test]
    fn test_event_topic_mapping() {
        let register_id = RegisterId::generate();
        assert_eq!(sealed(register_id).topic(), EventTopic::Sealing);
        assert_eq!(
            LedgerEvent::RegistrationExpired { register_id }.topic(),
            EventTopic::Registration
        );
    }

    #[test]
    fn test_filter_by_register() {
        let a = RegisterId::generate();
        let b = RegisterId::generate();
        let filter = EventFilter::topics(vec![EventTopic::Sealing]).for_register(a);

        assert!(filter.matches(&sealed(a)));
        assert!(!filter.matches(&sealed(b)));
    }

    #[test]
    fn test_all_topic_matches_everything() {
        let filter = EventFilter::topics(vec![EventTopic::All]);
        assert!(filter.matches(&LedgerEvent::IntegrityViolation {
            register_id: RegisterId::generate(),
            height: 4,
            detail: "previous hash mismatch".into(),
        }));
    }
}
