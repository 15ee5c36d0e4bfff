//! # Background Handlers
//!
//! Long-running tasks spawned by the runtime. Each stops when the shutdown
//! watch channel flips.

pub mod reaper;
pub mod sealing;

pub use reaper::PendingReaper;
pub use sealing::SealingScheduler;
