//! Layered application configuration
//!
//! Built-in defaults, then an optional TOML file, then `STUDY__*`
//! environment variables (`STUDY__SESSION__TOTAL_MINUTES=90`).

use cloud_sync::CloudConfig;
use config::{Config, ConfigError, Environment, File};
use focus::FocusConfig;
use habits::HabitsConfig;
use pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use session::SessionConfig;
use std::path::{Path, PathBuf};

/// Replay behaviour
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Resume automatically this long after a break opens
    pub auto_resume_after_secs: Option<u64>,
    /// postcard snapshot of the session repository
    pub store_path: Option<PathBuf>,
}

/// Full application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub focus: FocusConfig,
    pub habits: HabitsConfig,
    pub session: SessionConfig,
    pub cloud: CloudConfig,
    pub replay: ReplayConfig,
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder
            .add_source(
                Environment::with_prefix("STUDY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            focus: self.focus.clone(),
            habits: self.habits.clone(),
            session: self.session.clone(),
        }
    }
}
