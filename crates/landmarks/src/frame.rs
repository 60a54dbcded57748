//! Per-frame landmark types

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::indices::HAND_POINTS;
use crate::LandmarkError;

/// Maximum number of hands tracked per frame
pub const MAX_HANDS: usize = 2;

/// 2D landmark coordinate (normalized, scaled by the caller)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
}

impl LandmarkPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Face mesh points for the most recent frame with a detected face
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceFrame {
    pub points: Vec<LandmarkPoint>,
}

impl FaceFrame {
    pub fn new(points: Vec<LandmarkPoint>) -> Self {
        Self { points }
    }

    /// Point at `index`. `None` when the mesh is shorter than expected or
    /// the point is not finite.
    pub fn get(&self, index: usize) -> Option<LandmarkPoint> {
        self.points.get(index).copied().filter(LandmarkPoint::is_finite)
    }

    /// Gather several points at once; `None` if any is missing
    pub fn gather<const N: usize>(&self, indices: &[usize; N]) -> Option<[LandmarkPoint; N]> {
        let mut out = [LandmarkPoint::default(); N];
        for (slot, &idx) in out.iter_mut().zip(indices) {
            *slot = self.get(idx)?;
        }
        Some(out)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// One detected hand (21 points)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandFrame {
    pub points: Vec<LandmarkPoint>,
}

impl HandFrame {
    pub fn new(points: Vec<LandmarkPoint>) -> Self {
        Self { points }
    }

    pub fn get(&self, index: usize) -> Option<LandmarkPoint> {
        self.points.get(index).copied().filter(LandmarkPoint::is_finite)
    }

    /// Full 21-point hand
    pub fn is_complete(&self) -> bool {
        self.points.len() == HAND_POINTS
    }

    /// Fingertip points that are present, in the order of `tips`
    pub fn tips<'a>(&'a self, tips: &'a [usize]) -> impl Iterator<Item = LandmarkPoint> + 'a {
        tips.iter().filter_map(move |&i| self.get(i))
    }
}

/// Everything the detector hands over for one video frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameInput {
    /// Monotonically increasing frame timestamp (milliseconds)
    pub timestamp_ms: u64,

    /// Primary face, absent when no face was detected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face: Option<FaceFrame>,

    /// Zero, one or two hands
    #[serde(default)]
    pub hands: Vec<HandFrame>,
}

impl FrameInput {
    /// Frame without a face or hands (detector produced nothing)
    pub fn empty(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            ..Default::default()
        }
    }

    pub fn has_face(&self) -> bool {
        self.face.as_ref().is_some_and(|f| !f.is_empty())
    }

    /// Complete hands, at most [`MAX_HANDS`]. Borrows when every hand is usable.
    pub fn usable_hands(&self) -> Cow<'_, [HandFrame]> {
        if self.hands.len() <= MAX_HANDS && self.hands.iter().all(HandFrame::is_complete) {
            return Cow::Borrowed(&self.hands);
        }
        Cow::Owned(
            self.hands
                .iter()
                .filter(|h| h.is_complete())
                .take(MAX_HANDS)
                .cloned()
                .collect(),
        )
    }

    /// Report problems with the frame. The engines still accept such frames:
    /// non-finite points read as missing and incomplete hands are skipped.
    pub fn validate(&self) -> Result<(), LandmarkError> {
        if let Some(face) = &self.face {
            if let Some(index) = face.points.iter().position(|p| !p.is_finite()) {
                return Err(LandmarkError::NonFinite {
                    source_name: "face",
                    index,
                });
            }
        }

        if self.hands.len() > MAX_HANDS {
            return Err(LandmarkError::TooManyHands(self.hands.len()));
        }

        for (hand, frame) in self.hands.iter().enumerate() {
            if frame.points.len() != HAND_POINTS {
                return Err(LandmarkError::HandPointCount {
                    hand,
                    len: frame.points.len(),
                    expected: HAND_POINTS,
                });
            }
            if let Some(index) = frame.points.iter().position(|p| !p.is_finite()) {
                return Err(LandmarkError::NonFinite {
                    source_name: "hand",
                    index,
                });
            }
        }

        Ok(())
    }
}
