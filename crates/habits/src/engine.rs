//! Habits engine: proximity conditions feeding one latch per habit

use landmarks::{FaceFrame, HandFrame};
use tracing::{debug, info};

use crate::latch::LatchState;
use crate::proximity::evaluate;
use crate::{HabitEvent, HabitKind, HabitSet, HabitsConfig, HabitsError};

/// Result of one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HabitsUpdate {
    /// Debounced (latched) habits after this frame
    pub active: HabitSet,
    /// Habits that became active on this frame
    pub started: Vec<HabitKind>,
    /// Habits that ended on this frame
    pub ended: Vec<HabitKind>,
}

impl HabitsUpdate {
    /// Start and end events, starts first
    pub fn events(&self) -> Vec<HabitEvent> {
        self.started
            .iter()
            .map(|&k| HabitEvent::start(k))
            .chain(self.ended.iter().map(|&k| HabitEvent::end(k)))
            .collect()
    }

    /// Warning labels for the active habits
    pub fn active_labels(&self) -> Vec<&'static str> {
        self.active.iter().map(|k| k.label()).collect()
    }
}

/// Four independent latches, one per [`HabitKind`]
#[derive(Debug, Clone)]
pub struct HabitsEngine {
    config: HabitsConfig,
    latches: [LatchState; 4],
    prev_active: HabitSet,
}

impl HabitsEngine {
    pub fn new(config: HabitsConfig) -> Result<Self, HabitsError> {
        config.validate()?;
        Ok(Self {
            config,
            latches: [LatchState::default(); 4],
            prev_active: HabitSet::default(),
        })
    }

    /// Process one frame. A missing face counts as "no condition" for every habit.
    pub fn update(&mut self, face: Option<&FaceFrame>, hands: &[HandFrame], now_ms: u64) -> HabitsUpdate {
        let conditions = evaluate(face, hands, &self.config);
        if !conditions.is_empty() {
            debug!("Raw habit conditions at {} ms: {:?}", now_ms, conditions);
        }
        self.apply(conditions, now_ms)
    }

    /// Feed precomputed raw conditions through the latches
    pub fn apply(&mut self, conditions: HabitSet, now_ms: u64) -> HabitsUpdate {
        let mut active = HabitSet::default();
        for kind in HabitKind::ALL {
            let latch = &mut self.latches[kind as usize];
            latch.update(conditions.contains(kind), now_ms, &self.config.latch);
            active.set(kind, latch.active);
        }

        let mut update = HabitsUpdate {
            active,
            ..Default::default()
        };
        for kind in HabitKind::ALL {
            match (self.prev_active.contains(kind), active.contains(kind)) {
                (false, true) => {
                    info!("Habit started: {}", kind.as_str());
                    update.started.push(kind);
                }
                (true, false) => {
                    info!("Habit ended: {}", kind.as_str());
                    update.ended.push(kind);
                }
                _ => {}
            }
        }
        self.prev_active = active;
        update
    }

    /// Currently latched habits
    pub fn active(&self) -> HabitSet {
        self.prev_active
    }

    /// Drop all latch state (on session resume)
    pub fn reset(&mut self) {
        self.latches = [LatchState::default(); 4];
        self.prev_active = HabitSet::default();
    }

    pub fn config(&self) -> &HabitsConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proximity::fixtures::{face, hand_with_tip, resting_hand};
    use landmarks::indices::{INDEX_TIP, THUMB_TIP};
    use landmarks::LandmarkPoint;

    fn engine() -> HabitsEngine {
        HabitsEngine::new(HabitsConfig::default()).unwrap()
    }

    #[test]
    fn test_sustained_contact_starts_and_ends() {
        let mut engine = engine();
        let face = face();
        let biting = [hand_with_tip(THUMB_TIP, LandmarkPoint::new(0.50, 0.57))];
        let resting = [resting_hand()];

        let mut starts = Vec::new();
        let mut ends = Vec::new();
        let mut now = 0;
        while now <= 600 {
            let u = engine.update(Some(&face), &biting, now);
            starts.extend(u.started.iter().map(|&k| (k, now)));
            now += 50;
        }
        while now <= 1_200 {
            let u = engine.update(Some(&face), &resting, now);
            ends.extend(u.ended.iter().map(|&k| (k, now)));
            now += 50;
        }

        assert_eq!(starts, vec![(HabitKind::NailBite, 300)]);
        // Release run starts at 650, needs 250 ms
        assert_eq!(ends, vec![(HabitKind::NailBite, 900)]);
    }

    #[test]
    fn test_condition_one_ms_short_never_starts() {
        let mut engine = engine();
        let face = face();
        let rubbing = [hand_with_tip(INDEX_TIP, LandmarkPoint::new(0.44, 0.41))];

        assert!(engine.update(Some(&face), &rubbing, 1_000).started.is_empty());
        assert!(engine.update(Some(&face), &rubbing, 1_299).started.is_empty());
        assert!(engine.update(Some(&face), &[], 1_300).started.is_empty());
        assert!(engine.update(Some(&face), &rubbing, 1_400).started.is_empty());
        assert!(engine.active().is_empty());
    }

    #[test]
    fn test_dropout_does_not_clear_immediately() {
        let mut engine = engine();
        let face = face();
        let rubbing = [hand_with_tip(INDEX_TIP, LandmarkPoint::new(0.44, 0.41))];

        engine.update(Some(&face), &rubbing, 0);
        engine.update(Some(&face), &rubbing, 300);
        assert!(engine.active().contains(HabitKind::EyeRub));

        // Face lost for 200 ms: latch holds
        let u = engine.update(None, &rubbing, 400);
        assert!(u.ended.is_empty());
        let u = engine.update(None, &rubbing, 600);
        assert!(u.active.contains(HabitKind::EyeRub));

        let u = engine.update(None, &rubbing, 650);
        assert_eq!(u.ended, vec![HabitKind::EyeRub]);
    }

    #[test]
    fn test_habits_are_independent() {
        let mut engine = engine();
        let face = face();
        let hands = [
            hand_with_tip(INDEX_TIP, LandmarkPoint::new(0.50, 0.20)),
            hand_with_tip(THUMB_TIP, LandmarkPoint::new(0.50, 0.57)),
        ];
        engine.update(Some(&face), &hands, 0);
        let u = engine.update(Some(&face), &hands, 300);
        assert_eq!(u.started, vec![HabitKind::HairTouch, HabitKind::NailBite]);
        assert_eq!(u.active_labels(), vec!["Hair Touching", "Nail Biting"]);
        assert_eq!(
            u.events(),
            vec![
                HabitEvent::start(HabitKind::HairTouch),
                HabitEvent::start(HabitKind::NailBite)
            ]
        );
    }

    #[test]
    fn test_reset_clears_latches() {
        let mut engine = engine();
        let mut set = HabitSet::default();
        set.set(HabitKind::NoseTouch, true);
        engine.apply(set, 0);
        engine.apply(set, 300);
        assert!(!engine.active().is_empty());

        engine.reset();
        assert!(engine.active().is_empty());
        // Fresh pending run after reset
        assert!(engine.apply(set, 310).started.is_empty());
    }
}
