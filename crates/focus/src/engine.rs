//! Focus engine: calibration + debounced eye-openness classification

use landmarks::indices::{LEFT_EYE, RIGHT_EYE};
use landmarks::{eye_aspect_ratio, FaceFrame};
use tracing::{debug, info};

use crate::calibration::{Calibration, EyeThresholds};
use crate::state::{FocusState, FocusStatus};
use crate::{FocusConfig, FocusError};

/// Per-session focus engine. Only ever reports FOCUSED or NOT FOCUSED.
#[derive(Debug, Clone)]
pub struct FocusEngine {
    config: FocusConfig,
    calibration: Calibration,
    state: FocusState,
}

impl FocusEngine {
    /// Create a new focus engine with configuration
    pub fn new(config: FocusConfig) -> Result<Self, FocusError> {
        config.validate()?;
        Ok(Self {
            config,
            calibration: Calibration::default(),
            state: FocusState::default(),
        })
    }

    /// Process a frame with a detected face
    pub fn update(&mut self, face: &FaceFrame, now_ms: u64) -> FocusStatus {
        let (Some(left), Some(right)) = (face.gather(&LEFT_EYE), face.gather(&RIGHT_EYE)) else {
            debug!("Face mesh without eye contour ({} points), counting as miss", face.len());
            return self.notify_no_face(now_ms);
        };

        let left_ear = eye_aspect_ratio(&left);
        let right_ear = eye_aspect_ratio(&right);
        self.step_with_ear(left_ear, right_ear, now_ms)
    }

    /// Process a frame in which no face was found (counts as a miss)
    pub fn notify_no_face(&mut self, now_ms: u64) -> FocusStatus {
        self.ensure_calibration_started(now_ms);
        self.record_miss(now_ms);
        self.state.status()
    }

    /// Feed per-eye EARs directly
    pub fn step_with_ear(&mut self, left_ear: f32, right_ear: f32, now_ms: u64) -> FocusStatus {
        self.ensure_calibration_started(now_ms);
        self.calibration
            .observe(now_ms, left_ear, right_ear, &self.config);

        if self.eyes_open(left_ear, right_ear) {
            if self.state.record_open(self.config.debounce_frames) {
                info!("Focus gained at {} ms", now_ms);
            }
        } else {
            self.record_miss(now_ms);
        }

        self.state.status()
    }

    /// Full reset: new calibration epoch and cleared debounce state
    pub fn reset_calibration(&mut self, now_ms: u64) {
        info!("Recalibrating focus engine at {} ms", now_ms);
        self.calibration.begin(now_ms);
        self.state.reset();
    }

    /// Classify one frame against the active thresholds
    pub fn eyes_open(&self, left_ear: f32, right_ear: f32) -> bool {
        let thr = self.active_thresholds();
        let avg_ear = (left_ear + right_ear) / 2.0;

        let per_eye_pass = if self.config.either_eye_ok {
            left_ear > thr.left || right_ear > thr.right
        } else {
            left_ear > thr.left && right_ear > thr.right
        };
        let avg_pass = self.config.use_avg_guard && avg_ear > thr.avg;

        per_eye_pass || avg_pass
    }

    pub fn is_focused(&self) -> bool {
        self.state.focused
    }

    pub fn status(&self) -> FocusStatus {
        self.state.status()
    }

    /// Timestamp of the first non-qualifying frame of the current miss run
    pub fn not_focused_since(&self) -> Option<u64> {
        self.state.not_focused_since_ms
    }

    /// How long the learner has been continuously non-qualifying
    pub fn not_focused_for(&self, now_ms: u64) -> Option<u64> {
        self.state
            .not_focused_since_ms
            .map(|since| now_ms.saturating_sub(since))
    }

    /// Calibrated thresholds, `None` until the calibration window has elapsed
    pub fn thresholds(&self) -> Option<EyeThresholds> {
        self.calibration.thresholds()
    }

    pub fn state(&self) -> &FocusState {
        &self.state
    }

    pub fn config(&self) -> &FocusConfig {
        &self.config
    }

    fn active_thresholds(&self) -> EyeThresholds {
        self.calibration
            .thresholds()
            .unwrap_or_else(|| EyeThresholds::fallback(&self.config))
    }

    fn ensure_calibration_started(&mut self, now_ms: u64) {
        if !self.calibration.is_started() {
            self.calibration.begin(now_ms);
        }
    }

    fn record_miss(&mut self, now_ms: u64) {
        if self
            .state
            .record_miss(now_ms, self.config.unfocus_miss_frames)
        {
            info!(
                "Focus lost at {} ms after {} missed frames",
                now_ms, self.state.miss_streak
            );
        }
    }
}
