//! Study Pipeline
//!
//! Feeds landmark frames and 1 s ticks through the engines in a fixed order:
//! geometry -> focus / habits -> session scheduler. Emits the status only
//! when it changes, habit start/end events, and scheduler events.

pub mod config;
pub mod pipeline;
mod telemetry;

pub use config::PipelineConfig;
pub use pipeline::{PipelineOutput, PipelineStatus, StudyPipeline};

use thiserror::Error;

/// Pipeline error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Focus engine: {0}")]
    Focus(#[from] focus::FocusError),

    #[error("Habits engine: {0}")]
    Habits(#[from] habits::HabitsError),

    #[error("Session: {0}")]
    Session(#[from] session::SessionError),
}
