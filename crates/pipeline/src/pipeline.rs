//! Frame pipeline implementation

use focus::{EyeThresholds, FocusEngine, FocusStatus};
use habits::{HabitEvent, HabitsEngine};
use landmarks::FrameInput;
use serde::Serialize;
use session::{SessionEvent, SessionScheduler, SessionSummary};
use tracing::{debug, info, warn};

use crate::telemetry;
use crate::{PipelineConfig, PipelineError};

/// Everything one call produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOutput {
    /// New status, only when it differs from the last emitted one
    pub status_change: Option<FocusStatus>,
    pub habit_events: Vec<HabitEvent>,
    pub session_events: Vec<SessionEvent>,
}

impl PipelineOutput {
    pub fn is_empty(&self) -> bool {
        self.status_change.is_none() && self.habit_events.is_empty() && self.session_events.is_empty()
    }

    /// Summary, if the session finished during this call
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.session_events.iter().find_map(|e| match e {
            SessionEvent::Finished(summary) => Some(summary.as_ref()),
            _ => None,
        })
    }
}

/// Live snapshot for status displays
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineStatus {
    pub status: FocusStatus,
    pub active_habits: Vec<&'static str>,
    pub remaining_total_ms: u64,
    pub remaining_interval_ms: u64,
    pub breaks: usize,
}

/// One study session: focus engine, habits engine and scheduler
pub struct StudyPipeline {
    focus: FocusEngine,
    habits: HabitsEngine,
    scheduler: SessionScheduler,
    last_status: Option<FocusStatus>,
}

impl StudyPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        Ok(Self {
            focus: FocusEngine::new(config.focus)?,
            habits: HabitsEngine::new(config.habits)?,
            scheduler: SessionScheduler::new(config.session)?,
            last_status: None,
        })
    }

    /// Start the session and the first calibration window
    pub fn start(&mut self, now_ms: u64) -> PipelineOutput {
        self.focus.reset_calibration(now_ms);
        self.habits.reset();
        let session_events = self.scheduler.start(now_ms);
        self.finish_output(Vec::new(), session_events)
    }

    /// Process one landmark frame.
    ///
    /// Frames are ignored before start and after the session finished, and
    /// skipped entirely while a break is open. Malformed parts of a frame only
    /// disable what depends on them: non-finite points read as missing
    /// anchors and incomplete hands are left out of habit detection.
    pub fn process_frame(&mut self, frame: &FrameInput) -> PipelineOutput {
        if !self.is_live() {
            return PipelineOutput::default();
        }
        if let Err(e) = frame.validate() {
            warn!("Frame at {} ms partially unusable: {}", frame.timestamp_ms, e);
        }
        telemetry::frame(frame.has_face());

        if self.scheduler.is_on_break() {
            return self.finish_output(Vec::new(), Vec::new());
        }

        let now = frame.timestamp_ms;
        let status = match &frame.face {
            Some(face) => self.focus.update(face, now),
            None => self.focus.notify_no_face(now),
        };

        let hands = frame.usable_hands();
        let update = self.habits.update(frame.face.as_ref(), &hands, now);
        let habit_events = update.events();
        for event in &habit_events {
            telemetry::habit(event);
            self.scheduler.observe_habit(*event);
        }

        let session_events =
            self.scheduler
                .observe_focus(status, self.focus.not_focused_for(now), now);
        self.finish_output(habit_events, session_events)
    }

    /// One elapsed second of wall time
    pub fn tick(&mut self, now_ms: u64) -> PipelineOutput {
        if !self.is_live() {
            return PipelineOutput::default();
        }
        let mut session_events = self.scheduler.observe_focus(
            self.focus.status(),
            self.focus.not_focused_for(now_ms),
            now_ms,
        );
        session_events.extend(self.scheduler.tick(now_ms));
        self.finish_output(Vec::new(), session_events)
    }

    pub fn request_break(&mut self, now_ms: u64) -> PipelineOutput {
        let session_events = self.scheduler.request_break(now_ms);
        self.finish_output(Vec::new(), session_events)
    }

    /// Close the open break and re-arm the engines: a fresh calibration
    /// window and empty habit latches.
    pub fn resume(&mut self, now_ms: u64) -> PipelineOutput {
        let session_events = self.scheduler.resume(now_ms);
        if !session_events.is_empty() {
            self.focus.reset_calibration(now_ms);
            self.habits.reset();
        }
        self.finish_output(Vec::new(), session_events)
    }

    pub fn end_session(&mut self, now_ms: u64) -> PipelineOutput {
        let session_events = self.scheduler.end_session(now_ms);
        self.finish_output(Vec::new(), session_events)
    }

    /// Restart eye calibration without touching the session
    pub fn recalibrate(&mut self, now_ms: u64) -> PipelineOutput {
        self.focus.reset_calibration(now_ms);
        self.finish_output(Vec::new(), Vec::new())
    }

    /// Status as shown to the learner: PAUSED while a break is open
    pub fn status(&self) -> FocusStatus {
        if self.scheduler.is_on_break() {
            FocusStatus::Paused
        } else {
            self.focus.status()
        }
    }

    pub fn snapshot(&self) -> PipelineStatus {
        PipelineStatus {
            status: self.status(),
            active_habits: self
                .scheduler
                .active_habits()
                .iter()
                .map(|k| k.label())
                .collect(),
            remaining_total_ms: self.scheduler.remaining_total_ms(),
            remaining_interval_ms: self.scheduler.remaining_interval_ms(),
            breaks: self.scheduler.breaks().break_count(),
        }
    }

    pub fn thresholds(&self) -> Option<EyeThresholds> {
        self.focus.thresholds()
    }

    pub fn focus(&self) -> &FocusEngine {
        &self.focus
    }

    pub fn habits(&self) -> &HabitsEngine {
        &self.habits
    }

    pub fn scheduler(&self) -> &SessionScheduler {
        &self.scheduler
    }

    fn is_live(&self) -> bool {
        matches!(
            self.scheduler.phase(),
            session::SessionPhase::Running | session::SessionPhase::OnBreak
        )
    }

    fn finish_output(
        &mut self,
        habit_events: Vec<HabitEvent>,
        session_events: Vec<SessionEvent>,
    ) -> PipelineOutput {
        telemetry::session_events(&session_events);
        let status_change = if self.scheduler.is_finished() {
            None
        } else {
            self.status_change()
        };
        if !habit_events.is_empty() {
            debug!("{} habit events", habit_events.len());
        }
        PipelineOutput {
            status_change,
            habit_events,
            session_events,
        }
    }

    fn status_change(&mut self) -> Option<FocusStatus> {
        let status = self.status();
        if self.last_status == Some(status) {
            return None;
        }
        info!("Status: {}", status);
        telemetry::status_change(status);
        self.last_status = Some(status);
        Some(status)
    }
}
