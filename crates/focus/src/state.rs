//! Focus state tracking

use serde::{Deserialize, Serialize};

/// Attention status reported to the UI / telemetry layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FocusStatus {
    #[serde(rename = "FOCUSED")]
    Focused,
    #[default]
    #[serde(rename = "NOT FOCUSED")]
    NotFocused,
    /// Only produced by the session layer while a break is open
    #[serde(rename = "PAUSED")]
    Paused,
}

impl FocusStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FocusStatus::Focused => "FOCUSED",
            FocusStatus::NotFocused => "NOT FOCUSED",
            FocusStatus::Paused => "PAUSED",
        }
    }
}

impl std::fmt::Display for FocusStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Debounce state (tracked over frames)
///
/// At most one of `open_streak` / `miss_streak` is nonzero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusState {
    /// Consecutive open-eye frames
    pub open_streak: u32,

    /// Consecutive closed-eye or no-face frames
    pub miss_streak: u32,

    /// Debounced focus flag
    pub focused: bool,

    /// First non-qualifying frame of the current miss run (ms)
    pub not_focused_since_ms: Option<u64>,
}

impl FocusState {
    /// Register a qualifying (eyes open) frame. Returns true when focus was gained.
    pub fn record_open(&mut self, debounce_frames: u32) -> bool {
        self.open_streak = self.open_streak.saturating_add(1);
        self.miss_streak = 0;
        self.not_focused_since_ms = None;

        if !self.focused && self.open_streak >= debounce_frames {
            self.focused = true;
            return true;
        }
        false
    }

    /// Register a non-qualifying frame. Returns true when focus was lost.
    pub fn record_miss(&mut self, now_ms: u64, unfocus_miss_frames: u32) -> bool {
        self.miss_streak = self.miss_streak.saturating_add(1);
        self.open_streak = 0;
        if self.not_focused_since_ms.is_none() {
            self.not_focused_since_ms = Some(now_ms);
        }

        if self.focused && self.miss_streak >= unfocus_miss_frames {
            self.focused = false;
            return true;
        }
        false
    }

    pub fn status(&self) -> FocusStatus {
        if self.focused {
            FocusStatus::Focused
        } else {
            FocusStatus::NotFocused
        }
    }

    /// Reset state (on recalibration)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
