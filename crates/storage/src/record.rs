//! Lifetime record aggregation

use serde::{Deserialize, Serialize};
use session::summary::round2;
use session::SessionSummary;

/// Running totals across all sessions of one user.
/// Time fields are hours (2 decimals); the session summary carries seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifetimeRecord {
    pub user_id: String,
    pub username: Option<String>,
    pub total_sessions: u32,
    pub total_hours: f64,
    pub total_intervals: u32,
    pub time_hair: f64,
    pub time_nail: f64,
    pub time_eye: f64,
    pub time_nose: f64,
    pub time_unfocused: f64,
    pub time_paused: f64,
}

impl LifetimeRecord {
    pub fn new(user_id: impl Into<String>, username: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username,
            total_sessions: 0,
            total_hours: 0.0,
            total_intervals: 0,
            time_hair: 0.0,
            time_nail: 0.0,
            time_eye: 0.0,
            time_nose: 0.0,
            time_unfocused: 0.0,
            time_paused: 0.0,
        }
    }

    /// Fold one finished session into the totals
    pub fn add_session(&mut self, summary: &SessionSummary) {
        self.total_sessions += 1;
        self.total_hours = round2(self.total_hours + summary.total_hours);
        self.total_intervals += summary.intervals;
        add_hours(&mut self.time_hair, summary.time_hair);
        add_hours(&mut self.time_nail, summary.time_nail);
        add_hours(&mut self.time_eye, summary.time_eye);
        add_hours(&mut self.time_nose, summary.time_nose);
        add_hours(&mut self.time_unfocused, summary.time_unfocused);
        add_hours(&mut self.time_paused, summary.time_paused);
        if summary.username.is_some() {
            self.username = summary.username.clone();
        }
    }
}

/// Each session contributes its own rounded hours
fn add_hours(total: &mut f64, seconds: u64) {
    *total = round2(*total + round2(seconds as f64 / 3600.0));
}
