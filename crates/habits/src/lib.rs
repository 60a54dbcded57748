//! Habits Engine
//!
//! Detects self-touch habits from face + hand landmarks:
//! - Eye rubbing, nose touching, nail biting (fingertip proximity)
//! - Hair touching (fingertip inside a band above the forehead)
//!
//! Every raw per-frame condition goes through its own hysteresis latch, so
//! the start/end events this crate emits are already debounced.

pub mod config;
pub mod engine;
pub mod latch;
pub mod proximity;

pub use config::HabitsConfig;
pub use engine::{HabitsEngine, HabitsUpdate};
pub use latch::{LatchConfig, LatchState};
pub use proximity::{evaluate, FaceAnchors};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Habits engine error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HabitsError {
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Self-touch habit kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitKind {
    HairTouch,
    NoseTouch,
    EyeRub,
    NailBite,
}

impl HabitKind {
    pub const ALL: [HabitKind; 4] = [
        HabitKind::HairTouch,
        HabitKind::NoseTouch,
        HabitKind::EyeRub,
        HabitKind::NailBite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HabitKind::HairTouch => "hair_touch",
            HabitKind::NoseTouch => "nose_touch",
            HabitKind::EyeRub => "eye_rub",
            HabitKind::NailBite => "nail_bite",
        }
    }

    /// Human-readable warning label
    pub fn label(&self) -> &'static str {
        match self {
            HabitKind::HairTouch => "Hair Touching",
            HabitKind::NoseTouch => "Nose Rubbing",
            HabitKind::EyeRub => "Eye Rubbing",
            HabitKind::NailBite => "Nail Biting",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Set of habit kinds, one flag per kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitSet([bool; 4]);

impl HabitSet {
    pub fn contains(&self, kind: HabitKind) -> bool {
        self.0[kind.index()]
    }

    pub fn set(&mut self, kind: HabitKind, on: bool) {
        self.0[kind.index()] = on;
    }

    pub fn iter(&self) -> impl Iterator<Item = HabitKind> + '_ {
        HabitKind::ALL.into_iter().filter(|k| self.contains(*k))
    }

    pub fn is_empty(&self) -> bool {
        !self.0.iter().any(|&on| on)
    }

    pub fn len(&self) -> usize {
        self.0.iter().filter(|&&on| on).count()
    }
}

/// Phase of a habit event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitPhase {
    Start,
    End,
}

/// Debounced habit transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitEvent {
    pub habit: HabitKind,
    pub phase: HabitPhase,
}

impl HabitEvent {
    pub fn start(habit: HabitKind) -> Self {
        Self {
            habit,
            phase: HabitPhase::Start,
        }
    }

    pub fn end(habit: HabitKind) -> Self {
        Self {
            habit,
            phase: HabitPhase::End,
        }
    }
}
