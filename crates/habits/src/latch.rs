//! Hysteresis latch
//!
//! An inactive latch turns on only after its condition has held continuously
//! for the activation dwell; an active latch turns off only after the
//! condition has been absent continuously for the release dwell. Any
//! interruption of the pending run restarts it from scratch.

use serde::{Deserialize, Serialize};

/// Dwell times for one latch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatchConfig {
    pub activation_dwell_ms: u64,
    pub release_dwell_ms: u64,
}

impl Default for LatchConfig {
    fn default() -> Self {
        Self {
            activation_dwell_ms: 300,
            release_dwell_ms: 250,
        }
    }
}

/// Latch state value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatchState {
    pub active: bool,
    /// Start of the current pending run (towards activation or release)
    pub pending_since_ms: Option<u64>,
}

impl LatchState {
    /// Apply one observation in place. Returns true when the latch flipped.
    pub fn update(&mut self, condition: bool, now_ms: u64, config: &LatchConfig) -> bool {
        let (next, flipped) = transition(*self, condition, now_ms, config);
        *self = next;
        flipped
    }
}

/// Pure latch transition: `(state, condition, now) -> (state, flipped)`
pub fn transition(
    state: LatchState,
    condition: bool,
    now_ms: u64,
    config: &LatchConfig,
) -> (LatchState, bool) {
    // The condition that moves the latch away from its current value
    let pushing = condition != state.active;
    if !pushing {
        return (
            LatchState {
                active: state.active,
                pending_since_ms: None,
            },
            false,
        );
    }

    let since = state.pending_since_ms.unwrap_or(now_ms);
    let dwell = if state.active {
        config.release_dwell_ms
    } else {
        config.activation_dwell_ms
    };

    if now_ms.saturating_sub(since) >= dwell {
        (
            LatchState {
                active: !state.active,
                pending_since_ms: None,
            },
            true,
        )
    } else {
        (
            LatchState {
                active: state.active,
                pending_since_ms: Some(since),
            },
            false,
        )
    }
}
