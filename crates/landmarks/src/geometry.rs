//! Stateless geometry helpers

use crate::frame::{FaceFrame, LandmarkPoint};
use crate::indices::{LEFT_EYE_OUTER, RIGHT_EYE_OUTER};

/// Horizontal eye spans below this are treated as degenerate
const EAR_MIN_SPAN: f32 = 1e-6;

/// Euclidean distance between two points
#[inline]
pub fn distance(a: LandmarkPoint, b: LandmarkPoint) -> f32 {
    (a.x - b.x).hypot(a.y - b.y)
}

#[inline]
pub fn midpoint(a: LandmarkPoint, b: LandmarkPoint) -> LandmarkPoint {
    LandmarkPoint::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Eye aspect ratio of a 6-point contour `p0..p5`:
/// `(|p1-p5| + |p2-p4|) / (2·|p0-p3|)`, or 0 for a degenerate horizontal span.
pub fn eye_aspect_ratio(p: &[LandmarkPoint; 6]) -> f32 {
    let vertical_1 = distance(p[1], p[5]);
    let vertical_2 = distance(p[2], p[4]);
    let horizontal = distance(p[0], p[3]);

    if horizontal > EAR_MIN_SPAN {
        (vertical_1 + vertical_2) / (2.0 * horizontal)
    } else {
        0.0
    }
}

/// Inter-ocular distance (outer eye corners), floored at `min_scale`.
/// `None` when either corner is missing.
pub fn face_scale(face: &FaceFrame, min_scale: f32) -> Option<f32> {
    let left = face.get(LEFT_EYE_OUTER)?;
    let right = face.get(RIGHT_EYE_OUTER)?;
    Some(distance(left, right).max(min_scale))
}

/// Median of a sample set (mean of the two middle values for even lengths)
pub fn median(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eye(open: f32) -> [LandmarkPoint; 6] {
        // Horizontal span of 1.0, vertical gap of `open` at both lid pairs
        [
            LandmarkPoint::new(0.0, 0.0),
            LandmarkPoint::new(0.33, -open / 2.0),
            LandmarkPoint::new(0.66, -open / 2.0),
            LandmarkPoint::new(1.0, 0.0),
            LandmarkPoint::new(0.66, open / 2.0),
            LandmarkPoint::new(0.33, open / 2.0),
        ]
    }

    #[test]
    fn test_distance_and_midpoint() {
        let a = LandmarkPoint::new(0.0, 0.0);
        let b = LandmarkPoint::new(3.0, 4.0);
        assert!((distance(a, b) - 5.0).abs() < 1e-6);
        assert_eq!(midpoint(a, b), LandmarkPoint::new(1.5, 2.0));
    }

    #[test]
    fn test_ear_open_eye() {
        let ear = eye_aspect_ratio(&eye(0.3));
        assert!((ear - 0.3).abs() < 1e-4);
    }

    #[test]
    fn test_ear_degenerate_span() {
        let p = [LandmarkPoint::new(0.5, 0.5); 6];
        assert_eq!(eye_aspect_ratio(&p), 0.0);
    }

    #[test]
    fn test_face_scale_floor() {
        let mut points = vec![LandmarkPoint::default(); 300];
        points[LEFT_EYE_OUTER] = LandmarkPoint::new(0.5, 0.5);
        points[RIGHT_EYE_OUTER] = LandmarkPoint::new(0.5, 0.5);
        let face = FaceFrame::new(points);
        assert_eq!(face_scale(&face, 0.01), Some(0.01));
    }

    #[test]
    fn test_face_scale_missing_corner() {
        let face = FaceFrame::new(vec![LandmarkPoint::default(); 100]);
        assert_eq!(face_scale(&face, 1e-6), None);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
    }

    proptest::proptest! {
        #[test]
        fn prop_ear_finite_and_non_negative(c in proptest::array::uniform12(-1.0f32..1.0)) {
            let p = [
                LandmarkPoint::new(c[0], c[1]),
                LandmarkPoint::new(c[2], c[3]),
                LandmarkPoint::new(c[4], c[5]),
                LandmarkPoint::new(c[6], c[7]),
                LandmarkPoint::new(c[8], c[9]),
                LandmarkPoint::new(c[10], c[11]),
            ];
            let ear = eye_aspect_ratio(&p);
            proptest::prop_assert!(ear.is_finite());
            proptest::prop_assert!(ear >= 0.0);
        }
    }
}
