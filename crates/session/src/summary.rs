//! Session summary record

use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::breaks::BreakLog;
use crate::config::SessionConfig;
use crate::counters::SessionCounters;

/// Flat summary emitted once when a session finishes.
/// Durations are whole seconds unless named otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub user_id: Option<String>,
    pub username: Option<String>,
    /// `YYYY-MM-DD` of the session start
    pub date: String,
    /// `HH:MM` of the session start
    pub time_started: String,
    /// Active (focused + not focused) hours, 2 decimals
    pub total_hours: f64,
    /// Number of breaks taken
    pub intervals: u32,
    /// Configured interval length in minutes
    pub time_per_interval: u32,
    pub time_hair: u64,
    pub time_nail: u64,
    pub time_eye: u64,
    pub time_nose: u64,
    pub time_unfocused: u64,
    pub time_focused: u64,
    /// Sum of closed break durations
    pub time_paused: u64,
}

impl SessionSummary {
    pub fn build(
        config: &SessionConfig,
        started_at_ms: u64,
        counters: &SessionCounters,
        breaks: &BreakLog,
    ) -> Self {
        let started = start_time(started_at_ms, config.utc_offset_minutes);
        Self {
            session_id: Uuid::new_v4(),
            user_id: config.user_id.clone(),
            username: config.username.clone(),
            date: started.format("%Y-%m-%d").to_string(),
            time_started: started.format("%H:%M").to_string(),
            total_hours: round2(counters.active_seconds() as f64 / 3600.0),
            intervals: u32::try_from(breaks.break_count()).unwrap_or(u32::MAX),
            time_per_interval: config.interval_minutes,
            time_hair: counters.hair_touch_s,
            time_nail: counters.nail_bite_s,
            time_eye: counters.eye_rub_s,
            time_nose: counters.nose_touch_s,
            time_unfocused: counters.not_focused_s,
            time_focused: counters.focused_s,
            time_paused: breaks.total_break_seconds(),
        }
    }
}

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn start_time(started_at_ms: u64, utc_offset_minutes: i32) -> DateTime<FixedOffset> {
    let offset =
        FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix());
    i64::try_from(started_at_ms)
        .ok()
        .and_then(|ms| offset.timestamp_millis_opt(ms).single())
        .unwrap_or_else(|| DateTime::<Utc>::default().with_timezone(&offset))
}
