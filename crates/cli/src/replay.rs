//! JSON-lines replay
//!
//! Frames carry their own timestamps; 1 s scheduler ticks are derived from
//! them, so a recording replays identically at any speed.

use focus::FocusStatus;
use landmarks::FrameInput;
use pipeline::{PipelineOutput, StudyPipeline};
use serde::Serialize;
use session::{SessionSummary, TICK_MS};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

use crate::settings::ReplayConfig;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// What happened during a replay
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplayReport {
    pub frames: u64,
    pub skipped_lines: u64,
    pub status_changes: Vec<(u64, FocusStatus)>,
    pub habit_events: u64,
    pub breaks: usize,
    pub summary: Option<SessionSummary>,
}

/// Drives a pipeline from timestamped frames
pub struct Replayer {
    pipeline: StudyPipeline,
    auto_resume_ms: Option<u64>,
    next_tick_ms: Option<u64>,
    last_ts: Option<u64>,
    report: ReplayReport,
}

impl Replayer {
    pub fn new(pipeline: StudyPipeline, config: &ReplayConfig) -> Self {
        Self {
            pipeline,
            auto_resume_ms: config.auto_resume_after_secs.map(|s| s.saturating_mul(1_000)),
            next_tick_ms: None,
            last_ts: None,
            report: ReplayReport::default(),
        }
    }

    /// Parse and feed one input line. Blank lines are ignored.
    pub fn feed_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        match serde_json::from_str::<FrameInput>(line) {
            Ok(frame) => self.feed(&frame),
            Err(e) => {
                warn!("Skipping malformed frame line: {}", e);
                self.report.skipped_lines += 1;
            }
        }
    }

    /// Feed one frame. The first frame starts the session.
    pub fn feed(&mut self, frame: &FrameInput) {
        let ts = frame.timestamp_ms;
        let next_tick = match self.next_tick_ms {
            Some(next) => next,
            None => {
                info!("Replay starting at {} ms", ts);
                let out = self.pipeline.start(ts);
                self.record(ts, out);
                ts + TICK_MS
            }
        };

        if self.last_ts.is_some_and(|last| ts < last) {
            warn!("Frame timestamp {} ms goes backwards, skipping", ts);
            self.report.skipped_lines += 1;
            self.next_tick_ms = Some(next_tick);
            return;
        }
        self.last_ts = Some(ts);
        self.report.frames += 1;

        if self.pipeline.scheduler().is_finished() {
            self.next_tick_ms = Some(next_tick);
            return;
        }

        let mut next_tick = next_tick;
        while next_tick <= ts && !self.pipeline.scheduler().is_finished() {
            self.maybe_resume(next_tick);
            let out = self.pipeline.tick(next_tick);
            self.record(next_tick, out);
            next_tick += TICK_MS;
        }
        self.next_tick_ms = Some(next_tick);

        self.maybe_resume(ts);
        let out = self.pipeline.process_frame(frame);
        self.record(ts, out);
    }

    /// End the session at the last frame time and hand back the report
    pub fn finish(mut self) -> ReplayReport {
        if let Some(last) = self.last_ts {
            let out = self.pipeline.end_session(last);
            self.record(last, out);
        }
        self.report.breaks = self.pipeline.scheduler().breaks().break_count();
        self.report
    }

    pub fn pipeline(&self) -> &StudyPipeline {
        &self.pipeline
    }

    fn maybe_resume(&mut self, now_ms: u64) {
        let Some(delay) = self.auto_resume_ms else {
            return;
        };
        let due = self
            .pipeline
            .scheduler()
            .breaks()
            .current()
            .is_some_and(|entry| now_ms >= entry.start_ms.saturating_add(delay));
        if due {
            debug!("Auto-resuming break at {} ms", now_ms);
            let out = self.pipeline.resume(now_ms);
            self.record(now_ms, out);
        }
    }

    fn record(&mut self, ts: u64, out: PipelineOutput) {
        if let Some(status) = out.status_change {
            self.report.status_changes.push((ts, status));
        }
        self.report.habit_events += out.habit_events.len() as u64;
        if let Some(summary) = out.summary() {
            self.report.summary = Some(summary.clone());
        }
    }
}

/// Read JSON-lines frames to EOF, then end the session
pub async fn replay_reader<R>(reader: R, mut replayer: Replayer) -> Result<ReplayReport, ReplayError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        replayer.feed_line(&line);
    }
    Ok(replayer.finish())
}
