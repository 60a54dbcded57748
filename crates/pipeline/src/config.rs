//! Pipeline configuration

use focus::FocusConfig;
use habits::HabitsConfig;
use serde::{Deserialize, Serialize};
use session::SessionConfig;

use crate::PipelineError;

/// Combined engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub focus: FocusConfig,
    pub habits: HabitsConfig,
    pub session: SessionConfig,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.focus.validate()?;
        self.habits.validate()?;
        self.session.validate()?;
        Ok(())
    }
}
