//! # Shared Bus - In-Process Ledger Events
//!
//! Subsystems announce what happened (`RegisterCreated`, `TransactionAccepted`,
//! `DocketSealed`, `IntegrityViolation`) without knowing who listens. The
//! node runtime uses `TransactionAccepted` to trigger size-based sealing and
//! `IntegrityViolation` to alert operators.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Validator    │    publish()       │ Sealing      │
//! │              │ ──────┐            │ scheduler    │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! Delivery is best effort: a subscriber that lags loses the oldest events
//! and is told how many. Nothing in the ledger's correctness depends on an
//! event arriving.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventTopic, LedgerEvent};
pub use publisher::{EventPublisher, InMemoryEventBus, NoopPublisher};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before the oldest are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
