//! Per-user open-eye threshold calibration
//!
//! Samples are collected for a fixed window from calibration start. The first
//! face frame after the window turns them into [`EyeThresholds`]; the samples
//! are then dropped and never reused.

use landmarks::median;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::FocusConfig;

/// Open-eye thresholds derived from calibration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeThresholds {
    pub left: f32,
    pub right: f32,
    pub avg: f32,
}

impl EyeThresholds {
    /// Thresholds used before calibration has produced anything
    pub fn fallback(config: &FocusConfig) -> Self {
        Self {
            left: config.ear_fallback_open,
            right: config.ear_fallback_open,
            avg: config.ear_fallback_open,
        }
    }

    /// Median * margin, floored at the minimum clamp. Empty sequences use the fallback EAR.
    pub fn from_samples(left: &[f32], right: &[f32], avg: &[f32], config: &FocusConfig) -> Self {
        let fallback = config.ear_fallback_open;
        let med_left = median(left).unwrap_or(fallback);
        let med_right = median(right).unwrap_or(fallback);
        let med_avg = median(avg).unwrap_or(fallback);

        Self {
            left: (med_left * config.ear_margin).max(config.ear_min_clamp),
            right: (med_right * config.ear_margin).max(config.ear_min_clamp),
            avg: (med_avg * config.avg_margin).max(config.ear_min_clamp),
        }
    }
}

/// EAR samples collected during the calibration window
#[derive(Debug, Clone, Default)]
struct CalibrationBuffer {
    left: Vec<f32>,
    right: Vec<f32>,
    avg: Vec<f32>,
}

impl CalibrationBuffer {
    fn push(&mut self, left: f32, right: f32) {
        self.left.push(left);
        self.right.push(right);
        self.avg.push((left + right) / 2.0);
    }

    fn len(&self) -> usize {
        self.avg.len()
    }
}

/// Calibration epoch owned by one focus engine
#[derive(Debug, Clone, Default)]
pub struct Calibration {
    started_at_ms: Option<u64>,
    buffer: Option<CalibrationBuffer>,
    thresholds: Option<EyeThresholds>,
}

impl Calibration {
    /// Start a new epoch at `now_ms`, discarding samples and thresholds
    pub fn begin(&mut self, now_ms: u64) {
        debug!("Calibration epoch started at {} ms", now_ms);
        self.started_at_ms = Some(now_ms);
        self.buffer = Some(CalibrationBuffer::default());
        self.thresholds = None;
    }

    pub fn is_started(&self) -> bool {
        self.started_at_ms.is_some()
    }

    pub fn thresholds(&self) -> Option<EyeThresholds> {
        self.thresholds
    }

    /// Number of samples collected so far in this epoch
    pub fn sample_count(&self) -> usize {
        self.buffer.as_ref().map_or(0, CalibrationBuffer::len)
    }

    /// Feed one frame's EARs. Returns true on the frame that produced thresholds.
    pub fn observe(&mut self, now_ms: u64, left_ear: f32, right_ear: f32, config: &FocusConfig) -> bool {
        let Some(started) = self.started_at_ms else {
            return false;
        };

        if now_ms.saturating_sub(started) <= config.calibration_window_ms {
            if let Some(buffer) = self.buffer.as_mut() {
                buffer.push(left_ear, right_ear);
            }
            return false;
        }

        if self.thresholds.is_some() {
            return false;
        }

        let buffer = self.buffer.take().unwrap_or_default();
        if buffer.avg.is_empty() {
            warn!("No face seen during calibration, using fallback EAR thresholds");
        }

        let thresholds = EyeThresholds::from_samples(&buffer.left, &buffer.right, &buffer.avg, config);
        info!(
            "Calibrated from {} samples: left={:.3} right={:.3} avg={:.3}",
            buffer.len(),
            thresholds.left,
            thresholds.right,
            thresholds.avg
        );
        self.thresholds = Some(thresholds);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_samples_use_fallback() {
        let config = FocusConfig::default();
        let t = EyeThresholds::from_samples(&[], &[], &[], &config);
        assert!((t.left - 0.23 * 0.85).abs() < 1e-6);
        assert!((t.avg - 0.23 * 0.88).abs() < 1e-6);
    }

    #[test]
    fn test_squint_is_clamped() {
        let config = FocusConfig::default();
        let squint = [0.05, 0.06, 0.04];
        let t = EyeThresholds::from_samples(&squint, &squint, &squint, &config);
        assert_eq!(t.left, 0.18);
        assert_eq!(t.right, 0.18);
        assert_eq!(t.avg, 0.18);
    }

    #[test]
    fn test_thresholds_computed_once_after_window() {
        let config = FocusConfig::default();
        let mut calibration = Calibration::default();
        calibration.begin(1_000);

        for t in (1_000..=4_000).step_by(100) {
            assert!(!calibration.observe(t, 0.30, 0.32, &config));
        }
        assert_eq!(calibration.sample_count(), 31);
        assert!(calibration.thresholds().is_none());

        assert!(calibration.observe(4_001, 0.10, 0.10, &config));
        let t = calibration.thresholds().unwrap();
        assert!((t.left - 0.30 * 0.85).abs() < 1e-5);
        assert!((t.right - 0.32 * 0.85).abs() < 1e-5);
        assert!((t.avg - 0.31 * 0.88).abs() < 1e-5);

        // Later frames never recompute
        assert!(!calibration.observe(5_000, 0.50, 0.50, &config));
        assert_eq!(calibration.thresholds(), Some(t));
        assert_eq!(calibration.sample_count(), 0);
    }

    #[test]
    fn test_begin_resets_epoch() {
        let config = FocusConfig::default();
        let mut calibration = Calibration::default();
        calibration.begin(0);
        calibration.observe(10, 0.3, 0.3, &config);
        calibration.observe(5_000, 0.3, 0.3, &config);
        assert!(calibration.thresholds().is_some());

        calibration.begin(6_000);
        assert!(calibration.thresholds().is_none());
        assert_eq!(calibration.sample_count(), 0);
    }

    #[test]
    fn test_unstarted_calibration_ignores_samples() {
        let config = FocusConfig::default();
        let mut calibration = Calibration::default();
        assert!(!calibration.observe(10_000, 0.3, 0.3, &config));
        assert!(calibration.thresholds().is_none());
    }

    proptest! {
        #[test]
        fn prop_thresholds_never_below_clamp(
            left in proptest::collection::vec(0.0f32..0.6, 0..50),
            right in proptest::collection::vec(0.0f32..0.6, 0..50),
        ) {
            let config = FocusConfig::default();
            let avg: Vec<f32> = left.iter().zip(&right).map(|(l, r)| (l + r) / 2.0).collect();
            let t = EyeThresholds::from_samples(&left, &right, &avg, &config);
            prop_assert!(t.left >= config.ear_min_clamp);
            prop_assert!(t.right >= config.ear_min_clamp);
            prop_assert!(t.avg >= config.ear_min_clamp);
        }
    }
}
