//! Counters reported through the `metrics` facade

use focus::FocusStatus;
use habits::HabitEvent;
use metrics::counter;
use session::SessionEvent;

pub(crate) fn frame(face_present: bool) {
    let face = if face_present { "present" } else { "absent" };
    counter!("study_frames_total", "face" => face).increment(1);
}

pub(crate) fn status_change(status: FocusStatus) {
    counter!("study_status_changes_total", "status" => status.as_str()).increment(1);
}

pub(crate) fn habit(event: &HabitEvent) {
    let phase = match event.phase {
        habits::HabitPhase::Start => "start",
        habits::HabitPhase::End => "end",
    };
    counter!("study_habit_events_total", "habit" => event.habit.as_str(), "phase" => phase)
        .increment(1);
}

pub(crate) fn session_events(events: &[SessionEvent]) {
    for event in events {
        if let SessionEvent::BreakStarted(entry) = event {
            counter!("study_breaks_total", "reason" => entry.reason.as_str()).increment(1);
        }
    }
}
