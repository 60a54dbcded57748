//! Per-frame geometric habit conditions
//!
//! Distances are compared against multiples of the face scale, so the same
//! pixel distance means more when the face is small (far from the camera).

use landmarks::indices::{
    ALL_TIPS, FOREHEAD_CENTER, LEFT_EYE_CENTER, LEFT_TEMPLE, LOWER_LIP, MOUTH_CORNERS,
    NOSE_BRIDGE, NOSE_TIP, PINCH_TIPS, RIGHT_EYE_CENTER, RIGHT_TEMPLE, THUMB_TIP, UPPER_LIP,
};
use landmarks::{distance, face_scale, midpoint, FaceFrame, HandFrame, LandmarkPoint};

use crate::{HabitKind, HabitSet, HabitsConfig};

const THUMB_ONLY: [usize; 1] = [THUMB_TIP];

/// Face anchor points needed by the proximity tests
#[derive(Debug, Clone, PartialEq)]
pub struct FaceAnchors {
    pub scale: f32,
    pub eye_centers: [LandmarkPoint; 2],
    pub nose_targets: Vec<LandmarkPoint>,
    pub mouth_targets: Vec<LandmarkPoint>,
    pub forehead: LandmarkPoint,
    pub left_temple: LandmarkPoint,
    pub right_temple: LandmarkPoint,
}

impl FaceAnchors {
    /// `None` when any required anchor is missing from the mesh.
    /// Nose bridge and mouth corner points are optional extras.
    pub fn from_face(face: &FaceFrame, min_scale: f32) -> Option<Self> {
        let scale = face_scale(face, min_scale)?;
        let [left_eye, right_eye] = face.gather(&[LEFT_EYE_CENTER, RIGHT_EYE_CENTER])?;
        let [upper_lip, lower_lip] = face.gather(&[UPPER_LIP, LOWER_LIP])?;
        let nose_tip = face.get(NOSE_TIP)?;
        let [forehead, left_temple, right_temple] =
            face.gather(&[FOREHEAD_CENTER, LEFT_TEMPLE, RIGHT_TEMPLE])?;

        let mut nose_targets = vec![nose_tip];
        nose_targets.extend(NOSE_BRIDGE.iter().filter_map(|&i| face.get(i)));

        let mut mouth_targets = vec![midpoint(upper_lip, lower_lip), upper_lip, lower_lip];
        mouth_targets.extend(MOUTH_CORNERS.iter().filter_map(|&i| face.get(i)));

        Some(Self {
            scale,
            eye_centers: [left_eye, right_eye],
            nose_targets,
            mouth_targets,
            forehead,
            left_temple,
            right_temple,
        })
    }

    /// Eye line used by the hair band (the higher of the two eye centers)
    fn eye_line_y(&self) -> f32 {
        self.eye_centers[0].y.min(self.eye_centers[1].y)
    }
}

/// Raw (undebounced) habit conditions for one frame.
/// All false when there is no face or a required anchor is missing.
pub fn evaluate(face: Option<&FaceFrame>, hands: &[HandFrame], config: &HabitsConfig) -> HabitSet {
    let mut conditions = HabitSet::default();

    let Some(anchors) = face.and_then(|f| FaceAnchors::from_face(f, config.min_face_scale)) else {
        return conditions;
    };
    if hands.is_empty() {
        return conditions;
    }

    let scale = anchors.scale;
    let nose_tips: &[usize] = if config.broad_finger_match { &ALL_TIPS } else { &PINCH_TIPS };
    let mouth_tips: &[usize] = if config.broad_finger_match { &ALL_TIPS } else { &THUMB_ONLY };

    conditions.set(
        HabitKind::EyeRub,
        any_near(hands, &ALL_TIPS, &anchors.eye_centers, config.eye_mul * scale),
    );
    conditions.set(
        HabitKind::NoseTouch,
        any_near(hands, nose_tips, &anchors.nose_targets, config.nose_mul * scale),
    );
    conditions.set(
        HabitKind::NailBite,
        any_near(hands, mouth_tips, &anchors.mouth_targets, config.mouth_mul * scale),
    );
    conditions.set(
        HabitKind::HairTouch,
        hands
            .iter()
            .flat_map(|hand| hand.tips(&ALL_TIPS))
            .any(|p| in_hair_band(p, &anchors, config)),
    );

    conditions
}

fn any_near(hands: &[HandFrame], tips: &[usize], targets: &[LandmarkPoint], threshold: f32) -> bool {
    hands
        .iter()
        .flat_map(|hand| hand.tips(tips))
        .any(|p| targets.iter().any(|&t| distance(p, t) <= threshold))
}

/// Fingertip inside the band above the forehead / around the temples
fn in_hair_band(p: LandmarkPoint, anchors: &FaceAnchors, config: &HabitsConfig) -> bool {
    let scale = anchors.scale;
    let forehead = anchors.forehead;

    let margin = config.hair_x_margin_mul * scale;
    let x_min = anchors.left_temple.x.min(anchors.right_temple.x) - margin;
    let x_max = anchors.left_temple.x.max(anchors.right_temple.x) + margin;
    if p.x < x_min || p.x > x_max {
        return false;
    }

    // Raised hand far above the head
    if p.y < forehead.y - config.hair_max_above_forehead_mul * scale {
        return false;
    }

    let above_eye = p.y < anchors.eye_line_y() - config.hair_above_eye_mul * scale;
    if !above_eye {
        return false;
    }

    let above_forehead = p.y < forehead.y - config.hair_above_forehead_mul * scale;
    let near_scalp = [forehead, anchors.left_temple, anchors.right_temple]
        .iter()
        .map(|&a| distance(p, a))
        .fold(f32::INFINITY, f32::min)
        < config.hair_near_scalp_mul * scale;

    above_forehead || near_scalp
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use landmarks::indices::INDEX_TIP;

    fn only(kind: HabitKind) -> HabitSet {
        let mut set = HabitSet::default();
        set.set(kind, true);
        set
    }

    fn eval(hand: HandFrame) -> HabitSet {
        evaluate(Some(&face()), &[hand], &HabitsConfig::default())
    }

    #[test]
    fn test_resting_hand_triggers_nothing() {
        assert!(eval(resting_hand()).is_empty());
    }

    #[test]
    fn test_eye_rub() {
        let hand = hand_with_tip(INDEX_TIP, LandmarkPoint::new(0.44, 0.41));
        assert_eq!(eval(hand), only(HabitKind::EyeRub));
    }

    #[test]
    fn test_nose_touch_uses_pinch_fingers() {
        let index = hand_with_tip(INDEX_TIP, LandmarkPoint::new(0.50, 0.51));
        assert_eq!(eval(index), only(HabitKind::NoseTouch));

        let thumb = hand_with_tip(THUMB_TIP, LandmarkPoint::new(0.50, 0.51));
        assert!(!eval(thumb).contains(HabitKind::NoseTouch));
    }

    #[test]
    fn test_broad_mode_accepts_any_finger() {
        let config = HabitsConfig {
            broad_finger_match: true,
            ..Default::default()
        };
        let thumb = hand_with_tip(THUMB_TIP, LandmarkPoint::new(0.50, 0.51));
        let set = evaluate(Some(&face()), &[thumb], &config);
        assert!(set.contains(HabitKind::NoseTouch));
    }

    #[test]
    fn test_nail_bite_with_thumb() {
        let hand = hand_with_tip(THUMB_TIP, LandmarkPoint::new(0.50, 0.57));
        assert_eq!(eval(hand), only(HabitKind::NailBite));
    }

    #[test]
    fn test_hair_above_forehead() {
        let hand = hand_with_tip(INDEX_TIP, LandmarkPoint::new(0.50, 0.20));
        assert_eq!(eval(hand), only(HabitKind::HairTouch));
    }

    #[test]
    fn test_hair_near_temple() {
        let hand = hand_with_tip(INDEX_TIP, LandmarkPoint::new(0.36, 0.38));
        assert_eq!(eval(hand), only(HabitKind::HairTouch));
    }

    #[test]
    fn test_raised_hand_far_above_head_ignored() {
        let hand = hand_with_tip(INDEX_TIP, LandmarkPoint::new(0.50, -0.10));
        assert!(eval(hand).is_empty());
    }

    #[test]
    fn test_hand_beside_head_ignored() {
        let hand = hand_with_tip(INDEX_TIP, LandmarkPoint::new(0.20, 0.20));
        assert!(eval(hand).is_empty());
    }

    #[test]
    fn test_missing_anchor_disables_all() {
        // 468-point mesh: no iris centers
        let mut face = face();
        face.points.truncate(468);
        let hand = hand_with_tip(INDEX_TIP, LandmarkPoint::new(0.50, 0.51));
        assert!(evaluate(Some(&face), &[hand], &HabitsConfig::default()).is_empty());
    }

    #[test]
    fn test_non_finite_anchor_disables_all() {
        let mut face = face();
        face.points[NOSE_TIP].x = f32::NAN;
        let hand = hand_with_tip(THUMB_TIP, LandmarkPoint::new(0.50, 0.57));
        assert!(evaluate(Some(&face), &[hand], &HabitsConfig::default()).is_empty());
    }

    #[test]
    fn test_non_finite_fingertip_ignored() {
        let mut hand = hand_with_tip(THUMB_TIP, LandmarkPoint::new(0.50, 0.57));
        hand.points[INDEX_TIP] = LandmarkPoint::new(f32::NAN, 0.41);
        assert_eq!(eval(hand), only(HabitKind::NailBite));
    }

    #[test]
    fn test_no_face_disables_all() {
        let hand = hand_with_tip(INDEX_TIP, LandmarkPoint::new(0.44, 0.41));
        assert!(evaluate(None, &[hand], &HabitsConfig::default()).is_empty());
    }

    #[test]
    fn test_second_hand_counts() {
        let hands = [
            resting_hand(),
            hand_with_tip(THUMB_TIP, LandmarkPoint::new(0.50, 0.57)),
        ];
        let set = evaluate(Some(&face()), &hands, &HabitsConfig::default());
        assert!(set.contains(HabitKind::NailBite));
    }

    #[test]
    fn test_threshold_scales_with_face() {
        let anchors = FaceAnchors::from_face(&face(), 1e-6).unwrap();
        assert!((anchors.scale - 0.2).abs() < 1e-6);
        assert_eq!(anchors.nose_targets.len(), 5);
        assert_eq!(anchors.mouth_targets.len(), 5);
    }
}
