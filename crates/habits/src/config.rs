//! Habits engine configuration

use serde::{Deserialize, Serialize};

use crate::latch::LatchConfig;
use crate::HabitsError;

/// Habits engine configuration
///
/// All `*_mul` values are multiples of the face scale (inter-ocular distance).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HabitsConfig {
    /// Dwell times shared by the four latches
    pub latch: LatchConfig,

    /// Fingertip to eye-center distance for eye rubbing
    pub eye_mul: f32,

    /// Fingertip to nose tip / bridge distance for nose touching
    pub nose_mul: f32,

    /// Fingertip to mouth distance for nail biting
    pub mouth_mul: f32,

    /// Horizontal slack beyond the temples for the hair band
    pub hair_x_margin_mul: f32,

    /// How far above the forehead a point must be to count as "above"
    pub hair_above_forehead_mul: f32,

    /// How far above the eye line a point must be
    pub hair_above_eye_mul: f32,

    /// Points higher than this above the forehead are ignored (raised hand)
    pub hair_max_above_forehead_mul: f32,

    /// Distance to forehead/temples that counts as touching the scalp
    pub hair_near_scalp_mul: f32,

    /// Face scale floor for tiny or occluded faces
    pub min_face_scale: f32,

    /// Use all five fingertips for nose and mouth (otherwise index/middle and thumb)
    pub broad_finger_match: bool,
}

impl Default for HabitsConfig {
    fn default() -> Self {
        Self {
            latch: LatchConfig::default(),
            eye_mul: 0.18,
            nose_mul: 0.22,
            mouth_mul: 0.24,
            hair_x_margin_mul: 0.09,
            hair_above_forehead_mul: 0.06,
            hair_above_eye_mul: 0.02,
            hair_max_above_forehead_mul: 1.6,
            hair_near_scalp_mul: 0.16,
            min_face_scale: 1e-6,
            broad_finger_match: false,
        }
    }
}

impl HabitsConfig {
    pub fn validate(&self) -> Result<(), HabitsError> {
        for (name, value) in [
            ("eye_mul", self.eye_mul),
            ("nose_mul", self.nose_mul),
            ("mouth_mul", self.mouth_mul),
            ("hair_x_margin_mul", self.hair_x_margin_mul),
            ("hair_above_forehead_mul", self.hair_above_forehead_mul),
            ("hair_above_eye_mul", self.hair_above_eye_mul),
            ("hair_max_above_forehead_mul", self.hair_max_above_forehead_mul),
            ("hair_near_scalp_mul", self.hair_near_scalp_mul),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(HabitsError::Config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if !(self.min_face_scale.is_finite() && self.min_face_scale > 0.0) {
            return Err(HabitsError::Config("min_face_scale must be positive".into()));
        }
        if self.hair_max_above_forehead_mul <= self.hair_above_forehead_mul {
            return Err(HabitsError::Config(
                "hair_max_above_forehead_mul must exceed hair_above_forehead_mul".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(HabitsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_negative_multiplier_rejected() {
        let config = HabitsConfig {
            nose_mul: -0.1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(HabitsError::Config(_))));
    }

    #[test]
    fn test_inverted_hair_band_rejected() {
        let config = HabitsConfig {
            hair_max_above_forehead_mul: 0.01,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
