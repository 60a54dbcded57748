//! Landmark Frames and Geometry
//!
//! Data handed to the engines by the external landmark detector:
//! - Face mesh points (single primary face, ~478 points)
//! - Hand points (up to two hands, 21 points each)
//! - Distance, midpoint, eye-aspect-ratio and face-scale helpers

pub mod frame;
pub mod geometry;
pub mod indices;

pub use frame::{FaceFrame, FrameInput, HandFrame, LandmarkPoint};
pub use geometry::{distance, eye_aspect_ratio, face_scale, median, midpoint};

use thiserror::Error;

/// Malformed input frame
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LandmarkError {
    #[error("Non-finite coordinate at {source_name} point {index}")]
    NonFinite {
        source_name: &'static str,
        index: usize,
    },

    #[error("Hand {hand} has {len} points, expected {expected}")]
    HandPointCount {
        hand: usize,
        len: usize,
        expected: usize,
    },

    #[error("Too many hands in frame: {0}")]
    TooManyHands(usize),
}
