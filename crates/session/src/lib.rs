//! Session Scheduler
//!
//! Drives a study session from focus and habit signals:
//! - Total and per-interval countdowns advanced by 1 s ticks
//! - Interval, manual and sustained-unfocus breaks
//! - Per-second time accounting and the final session summary

pub mod breaks;
pub mod config;
pub mod counters;
pub mod scheduler;
pub mod summary;

pub use breaks::{BreakEntry, BreakLog, BreakReason};
pub use config::SessionConfig;
pub use counters::SessionCounters;
pub use scheduler::{SessionEvent, SessionPhase, SessionScheduler};
pub use summary::SessionSummary;

use thiserror::Error;

/// Session error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Length of one scheduler tick
pub const TICK_MS: u64 = 1_000;
