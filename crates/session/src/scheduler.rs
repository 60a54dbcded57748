//! Session scheduler implementation

use focus::FocusStatus;
use habits::{HabitEvent, HabitPhase, HabitSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::breaks::{BreakEntry, BreakLog, BreakReason};
use crate::config::SessionConfig;
use crate::counters::SessionCounters;
use crate::summary::SessionSummary;
use crate::{SessionError, TICK_MS};

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    NotStarted,
    Running,
    OnBreak,
    Finished,
}

/// Side effects produced by scheduler operations
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    BreakStarted(BreakEntry),
    BreakEnded(BreakEntry),
    Finished(Box<SessionSummary>),
}

/// Countdown + break state machine for one study session.
///
/// Every operation is a no-op outside the phases it applies to, so manual
/// input racing with automatic triggers never errors.
#[derive(Debug, Clone)]
pub struct SessionScheduler {
    config: SessionConfig,
    phase: SessionPhase,
    started_at_ms: u64,
    remaining_total_ms: u64,
    remaining_interval_ms: u64,
    /// Last focus status reported while running
    focus: FocusStatus,
    /// Habits currently reported as active
    habits: HabitSet,
    counters: SessionCounters,
    breaks: BreakLog,
    summary: Option<SessionSummary>,
}

impl SessionScheduler {
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self {
            config,
            phase: SessionPhase::NotStarted,
            started_at_ms: 0,
            remaining_total_ms: 0,
            remaining_interval_ms: 0,
            focus: FocusStatus::NotFocused,
            habits: HabitSet::default(),
            counters: SessionCounters::default(),
            breaks: BreakLog::default(),
            summary: None,
        })
    }

    /// Start the countdowns. A zero-length session finishes immediately.
    pub fn start(&mut self, now_ms: u64) -> Vec<SessionEvent> {
        if self.phase != SessionPhase::NotStarted {
            debug!("Session already started, ignoring start");
            return Vec::new();
        }

        self.started_at_ms = now_ms;
        self.remaining_total_ms = self.config.total_ms();
        self.remaining_interval_ms = self.fresh_interval_ms();
        self.phase = SessionPhase::Running;
        info!(
            "Session started: {} min total, {} min intervals",
            self.config.total_minutes, self.config.interval_minutes
        );

        let mut events = Vec::new();
        if self.remaining_total_ms == 0 {
            self.finish(now_ms, &mut events);
        }
        events
    }

    /// One elapsed second. Only counts while running.
    pub fn tick(&mut self, now_ms: u64) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.phase != SessionPhase::Running {
            return events;
        }

        self.remaining_total_ms = self.remaining_total_ms.saturating_sub(TICK_MS);
        if self.config.breaks_enabled() {
            self.remaining_interval_ms = self
                .remaining_interval_ms
                .saturating_sub(TICK_MS)
                .min(self.remaining_total_ms);
        }
        self.counters
            .record_second(self.focus == FocusStatus::Focused, &self.habits);

        if self.remaining_total_ms == 0 {
            self.finish(now_ms, &mut events);
        } else if self.config.breaks_enabled() && self.remaining_interval_ms == 0 {
            self.open_break(BreakReason::Interval, now_ms, &mut events);
        }
        events
    }

    /// Latest focus status plus how long the user has been NOT FOCUSED.
    /// Opens an automatic break once the limit is reached.
    pub fn observe_focus(
        &mut self,
        status: FocusStatus,
        not_focused_for_ms: Option<u64>,
        now_ms: u64,
    ) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.phase != SessionPhase::Running {
            return events;
        }

        self.focus = status;
        if not_focused_for_ms.is_some_and(|ms| ms >= self.config.not_focused_limit_ms()) {
            info!("Not focused for {} s, opening break", self.config.not_focused_limit_secs);
            self.open_break(BreakReason::AutoUnfocus, now_ms, &mut events);
        }
        events
    }

    /// Habit start/end. Ignored unless running.
    pub fn observe_habit(&mut self, event: HabitEvent) {
        if self.phase != SessionPhase::Running {
            return;
        }
        self.habits.set(event.habit, event.phase == HabitPhase::Start);
    }

    pub fn request_break(&mut self, now_ms: u64) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.phase == SessionPhase::Running {
            self.open_break(BreakReason::Manual, now_ms, &mut events);
        }
        events
    }

    /// Close the open break and restart the interval countdown.
    /// Focus and habit inputs start over from NOT FOCUSED / none.
    pub fn resume(&mut self, now_ms: u64) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.phase != SessionPhase::OnBreak {
            return events;
        }

        if let Some(entry) = self.breaks.close(now_ms) {
            info!(
                "Break {} ({}) ended after {} s",
                entry.id,
                entry.reason.as_str(),
                entry.duration_secs().unwrap_or(0)
            );
            events.push(SessionEvent::BreakEnded(entry.clone()));
        }
        self.remaining_interval_ms = self.fresh_interval_ms();
        self.focus = FocusStatus::NotFocused;
        self.habits = HabitSet::default();
        self.phase = SessionPhase::Running;
        events
    }

    /// End early. Closes any open break and emits the summary.
    pub fn end_session(&mut self, now_ms: u64) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if matches!(self.phase, SessionPhase::Running | SessionPhase::OnBreak) {
            self.finish(now_ms, &mut events);
        }
        events
    }

    fn fresh_interval_ms(&self) -> u64 {
        if self.config.breaks_enabled() {
            self.config.interval_ms().min(self.remaining_total_ms)
        } else {
            0
        }
    }

    fn open_break(&mut self, reason: BreakReason, now_ms: u64, events: &mut Vec<SessionEvent>) {
        if let Some(entry) = self.breaks.open(reason, now_ms) {
            info!("Break {} started ({})", entry.id, reason.as_str());
            events.push(SessionEvent::BreakStarted(entry.clone()));
            self.phase = SessionPhase::OnBreak;
        }
    }

    fn finish(&mut self, now_ms: u64, events: &mut Vec<SessionEvent>) {
        if let Some(entry) = self.breaks.close(now_ms) {
            events.push(SessionEvent::BreakEnded(entry.clone()));
        }
        self.phase = SessionPhase::Finished;

        let summary =
            SessionSummary::build(&self.config, self.started_at_ms, &self.counters, &self.breaks);
        info!(
            "Session finished: {} h active, {} breaks, {} s paused",
            summary.total_hours, summary.intervals, summary.time_paused
        );
        events.push(SessionEvent::Finished(Box::new(summary.clone())));
        self.summary = Some(summary);
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_on_break(&self) -> bool {
        self.phase == SessionPhase::OnBreak
    }

    pub fn is_finished(&self) -> bool {
        self.phase == SessionPhase::Finished
    }

    pub fn remaining_total_ms(&self) -> u64 {
        self.remaining_total_ms
    }

    pub fn remaining_interval_ms(&self) -> u64 {
        self.remaining_interval_ms
    }

    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    pub fn breaks(&self) -> &BreakLog {
        &self.breaks
    }

    pub fn active_habits(&self) -> HabitSet {
        self.habits
    }

    /// Summary, once finished
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}
