//! Focus Engine
//!
//! Per-user attention tracking from face landmarks:
//! - Eye-aspect-ratio calibration (per-user open-eye thresholds)
//! - Debounced FOCUSED / NOT FOCUSED state machine
//! - "Not focused since" clock used for break escalation

pub mod calibration;
pub mod config;
pub mod engine;
pub mod state;

pub use calibration::{Calibration, EyeThresholds};
pub use config::FocusConfig;
pub use engine::FocusEngine;
pub use state::{FocusState, FocusStatus};

use thiserror::Error;

/// Focus engine error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FocusError {
    #[error("Configuration error: {0}")]
    Config(String),
}
