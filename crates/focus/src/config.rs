//! Focus engine configuration

use serde::{Deserialize, Serialize};

use crate::FocusError;

/// Focus engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    /// Calibration window measured from calibration start (milliseconds)
    pub calibration_window_ms: u64,

    /// Open-eye EAR used before (or instead of) calibration
    pub ear_fallback_open: f32,

    /// Lowest threshold calibration may produce
    pub ear_min_clamp: f32,

    /// Per-eye threshold = median EAR * margin
    pub ear_margin: f32,

    /// Average threshold = median average EAR * margin
    pub avg_margin: f32,

    /// Consecutive open-eye frames required to become FOCUSED
    pub debounce_frames: u32,

    /// Consecutive closed-eye / no-face frames required to become NOT FOCUSED
    pub unfocus_miss_frames: u32,

    /// Either eye above its threshold counts as open (otherwise both are required)
    pub either_eye_ok: bool,

    /// Accept the frame when the average EAR clears the average threshold
    pub use_avg_guard: bool,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            calibration_window_ms: 3000,
            ear_fallback_open: 0.23,
            ear_min_clamp: 0.18,
            ear_margin: 0.85,
            avg_margin: 0.88,
            debounce_frames: 5,
            unfocus_miss_frames: 8,
            either_eye_ok: true,
            use_avg_guard: true,
        }
    }
}

impl FocusConfig {
    /// Create strict config (both eyes, no average guard, quicker to drop focus)
    pub fn strict() -> Self {
        Self {
            either_eye_ok: false,
            use_avg_guard: false,
            unfocus_miss_frames: 5,
            ..Default::default()
        }
    }

    /// Create lenient config (slower to drop focus)
    pub fn lenient() -> Self {
        Self {
            unfocus_miss_frames: 15,
            debounce_frames: 3,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), FocusError> {
        if self.debounce_frames == 0 {
            return Err(FocusError::Config("debounce_frames must be at least 1".into()));
        }
        if self.unfocus_miss_frames == 0 {
            return Err(FocusError::Config(
                "unfocus_miss_frames must be at least 1".into(),
            ));
        }
        for (name, value) in [
            ("ear_fallback_open", self.ear_fallback_open),
            ("ear_min_clamp", self.ear_min_clamp),
            ("ear_margin", self.ear_margin),
            ("avg_margin", self.avg_margin),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(FocusError::Config(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}
