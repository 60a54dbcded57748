//! Landmark indices (MediaPipe face mesh with iris refinement, MediaPipe hands)

/// Left eye contour for EAR: outer corner, two upper lid points, inner corner, two lower lid points
pub const LEFT_EYE: [usize; 6] = [33, 159, 158, 133, 153, 144];
/// Right eye contour for EAR, same ordering as [`LEFT_EYE`]
pub const RIGHT_EYE: [usize; 6] = [362, 386, 385, 263, 374, 373];

pub const LEFT_EYE_OUTER: usize = 33;
pub const RIGHT_EYE_OUTER: usize = 263;

/// Iris centers (only present in the 478-point model)
pub const LEFT_EYE_CENTER: usize = 468;
pub const RIGHT_EYE_CENTER: usize = 473;

pub const UPPER_LIP: usize = 13;
pub const LOWER_LIP: usize = 14;
pub const MOUTH_CORNERS: [usize; 2] = [61, 291];

pub const NOSE_TIP: usize = 1;
/// Bridge/dorsum points around the nose tip
pub const NOSE_BRIDGE: [usize; 4] = [6, 197, 195, 5];

pub const FOREHEAD_CENTER: usize = 10;
pub const LEFT_TEMPLE: usize = 127;
pub const RIGHT_TEMPLE: usize = 356;

/// Points per hand
pub const HAND_POINTS: usize = 21;

pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_TIP: usize = 12;
pub const RING_TIP: usize = 16;
pub const PINKY_TIP: usize = 20;

pub const ALL_TIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];
pub const PINCH_TIPS: [usize; 2] = [INDEX_TIP, MIDDLE_TIP];
