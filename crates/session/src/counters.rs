//! Per-second time accounting

use habits::{HabitKind, HabitSet};
use serde::{Deserialize, Serialize};

/// Active seconds per category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCounters {
    pub focused_s: u64,
    pub not_focused_s: u64,
    pub hair_touch_s: u64,
    pub nose_touch_s: u64,
    pub eye_rub_s: u64,
    pub nail_bite_s: u64,
}

impl SessionCounters {
    /// Attribute one second: exactly one focus bucket plus every active habit
    pub fn record_second(&mut self, focused: bool, habits: &HabitSet) {
        if focused {
            self.focused_s += 1;
        } else {
            self.not_focused_s += 1;
        }
        for kind in habits.iter() {
            *self.habit_mut(kind) += 1;
        }
    }

    pub fn active_seconds(&self) -> u64 {
        self.focused_s + self.not_focused_s
    }

    pub fn habit_seconds(&self, kind: HabitKind) -> u64 {
        match kind {
            HabitKind::HairTouch => self.hair_touch_s,
            HabitKind::NoseTouch => self.nose_touch_s,
            HabitKind::EyeRub => self.eye_rub_s,
            HabitKind::NailBite => self.nail_bite_s,
        }
    }

    fn habit_mut(&mut self, kind: HabitKind) -> &mut u64 {
        match kind {
            HabitKind::HairTouch => &mut self.hair_touch_s,
            HabitKind::NoseTouch => &mut self.nose_touch_s,
            HabitKind::EyeRub => &mut self.eye_rub_s,
            HabitKind::NailBite => &mut self.nail_bite_s,
        }
    }
}
