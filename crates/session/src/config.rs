//! Session configuration

use serde::{Deserialize, Serialize};

use crate::SessionError;

/// Largest UTC offset accepted for summary timestamps (14 h)
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Session presets and summary identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Total session length; 0 finishes the session on start
    pub total_minutes: u32,

    /// Work interval between breaks; 0 disables interval breaks
    pub interval_minutes: u32,

    /// Continuous NOT FOCUSED time that opens an automatic break
    pub not_focused_limit_secs: u64,

    /// Offset applied when rendering `date` / `time_started`
    pub utc_offset_minutes: i32,

    pub user_id: Option<String>,
    pub username: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            total_minutes: 60,
            interval_minutes: 30,
            not_focused_limit_secs: 30,
            utc_offset_minutes: 0,
            user_id: None,
            username: None,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.not_focused_limit_secs == 0 {
            return Err(SessionError::Config(
                "not_focused_limit_secs must be greater than 0".into(),
            ));
        }
        if self.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(SessionError::Config(format!(
                "utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            )));
        }
        Ok(())
    }

    pub fn total_ms(&self) -> u64 {
        u64::from(self.total_minutes) * 60_000
    }

    pub fn interval_ms(&self) -> u64 {
        u64::from(self.interval_minutes) * 60_000
    }

    pub fn breaks_enabled(&self) -> bool {
        self.interval_minutes > 0
    }

    pub fn not_focused_limit_ms(&self) -> u64 {
        self.not_focused_limit_secs.saturating_mul(1_000)
    }
}
