//! End-to-end scheduler scenarios

use focus::FocusStatus;
use habits::{HabitEvent, HabitKind};
use proptest::prelude::*;
use session::{BreakReason, SessionConfig, SessionEvent, SessionPhase, SessionScheduler, TICK_MS};

fn scheduler(total_minutes: u32, interval_minutes: u32) -> SessionScheduler {
    SessionScheduler::new(SessionConfig {
        total_minutes,
        interval_minutes,
        ..Default::default()
    })
    .unwrap()
}

fn summaries(events: &[SessionEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, SessionEvent::Finished(_)))
        .count()
}

#[test]
fn test_zero_total_finishes_on_start() {
    let mut s = scheduler(0, 30);
    let events = s.start(1_700_000_000_000);

    assert_eq!(summaries(&events), 1);
    assert_eq!(s.phase(), SessionPhase::Finished);
    assert_eq!(s.counters().active_seconds(), 0);
    assert_eq!(s.breaks().break_count(), 0);

    let summary = s.summary().unwrap();
    assert_eq!(summary.total_hours, 0.0);
    assert_eq!(summary.intervals, 0);
    assert_eq!(summary.time_paused, 0);

    assert!(s.tick(1_700_000_001_000).is_empty());
}

#[test]
fn test_session_end_wins_over_simultaneous_interval_end() {
    let mut s = scheduler(1, 1);
    let t0 = 1_700_000_000_000u64;
    s.start(t0);

    let mut all_events = Vec::new();
    for k in 1..=60u64 {
        all_events.extend(s.tick(t0 + k * TICK_MS));
    }

    assert!(s.is_finished());
    assert_eq!(summaries(&all_events), 1);
    assert!(!all_events
        .iter()
        .any(|e| matches!(e, SessionEvent::BreakStarted(_))));
    assert_eq!(s.breaks().break_count(), 0);

    let summary = s.summary().unwrap();
    assert_eq!(summary.intervals, 0);
    assert_eq!(summary.time_paused, 0);
}

#[test]
fn test_hour_session_with_half_hour_intervals() {
    let mut s = scheduler(60, 30);
    let t0 = 1_700_000_000_000u64;
    s.start(t0);

    let mut now = t0;
    let mut all_events = Vec::new();
    let mut first_break_at = None;
    while !s.is_finished() {
        now += TICK_MS;
        // Continuous focus: the engine never reports a not-focused duration
        all_events.extend(s.observe_focus(FocusStatus::Focused, None, now));
        let events = s.tick(now);
        let break_started = events
            .iter()
            .any(|e| matches!(e, SessionEvent::BreakStarted(_)));
        if break_started && first_break_at.is_none() {
            first_break_at = Some(now - t0);
        }
        all_events.extend(events);
        if s.is_on_break() {
            // User resumes after five minutes
            now += 5 * 60_000;
            all_events.extend(s.resume(now));
        }
    }

    assert_eq!(first_break_at, Some(30 * 60_000));
    assert_eq!(s.breaks().count_by_reason(BreakReason::Interval), 1);
    assert_eq!(s.breaks().count_by_reason(BreakReason::AutoUnfocus), 0);
    assert_eq!(summaries(&all_events), 1);

    let summary = s.summary().unwrap();
    assert_eq!(summary.time_focused, 3_600);
    assert_eq!(summary.time_unfocused, 0);
    assert_eq!(summary.total_hours, 1.0);
    assert_eq!(summary.intervals, 1);
    assert_eq!(summary.time_paused, 300);
    assert_eq!(summary.time_per_interval, 30);
}

#[test]
fn test_sustained_unfocus_fires_mid_interval() {
    let mut s = scheduler(60, 30);
    s.start(0);
    for i in 1..=40u64 {
        let now = i * TICK_MS;
        // Not focused since t = 5 s
        let not_focused_for = now.checked_sub(5_000);
        s.observe_focus(FocusStatus::NotFocused, not_focused_for, now);
        s.tick(now);
    }
    assert!(s.is_on_break());
    assert_eq!(s.breaks().entries()[0].reason, BreakReason::AutoUnfocus);
    assert_eq!(s.breaks().entries()[0].start_ms, 35_000);
    // Interval countdown was still in progress
    assert!(s.remaining_interval_ms() > 0);
}

#[test]
fn test_habit_time_only_while_running() {
    let mut s = scheduler(5, 0);
    s.start(0);
    s.observe_habit(HabitEvent::start(HabitKind::HairTouch));
    for i in 1..=10 {
        s.tick(i * TICK_MS);
    }
    s.request_break(10_000);
    for i in 11..=20 {
        s.tick(i * TICK_MS);
    }
    s.resume(20_000);
    let events = s.end_session(21_000);

    let Some(SessionEvent::Finished(summary)) = events.last() else {
        panic!("expected summary");
    };
    assert_eq!(summary.time_hair, 10);
    assert_eq!(summary.time_paused, 10);
}

#[derive(Debug, Clone)]
enum Op {
    Tick,
    Focus(bool, Option<u64>),
    Habit(usize, bool),
    Break,
    Resume,
    End,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => Just(Op::Tick),
        2 => (any::<bool>(), proptest::option::of(0u64..60_000)).prop_map(|(f, d)| Op::Focus(f, d)),
        2 => (0usize..4, any::<bool>()).prop_map(|(h, on)| Op::Habit(h, on)),
        1 => Just(Op::Break),
        1 => Just(Op::Resume),
        1 => Just(Op::End),
    ]
}

proptest! {
    #[test]
    fn prop_break_log_invariants(
        total in 0u32..5,
        interval in 0u32..3,
        ops in proptest::collection::vec(op_strategy(), 1..400),
    ) {
        let mut s = scheduler(total, interval);
        let mut now = 0u64;
        let mut finished = summaries(&s.start(now));

        for op in ops {
            now += 700;
            let events = match op {
                Op::Tick => s.tick(now),
                Op::Focus(focused, since) => {
                    let status = if focused { FocusStatus::Focused } else { FocusStatus::NotFocused };
                    s.observe_focus(status, since, now)
                }
                Op::Habit(h, on) => {
                    let habit = HabitKind::ALL[h];
                    s.observe_habit(if on { HabitEvent::start(habit) } else { HabitEvent::end(habit) });
                    Vec::new()
                }
                Op::Break => s.request_break(now),
                Op::Resume => s.resume(now),
                Op::End => s.end_session(now),
            };
            finished += summaries(&events);

            let entries = s.breaks().entries();
            let open = entries.iter().filter(|e| e.is_open()).count();
            prop_assert!(open <= 1);
            prop_assert_eq!(open == 1, s.is_on_break());
            prop_assert_eq!(s.breaks().break_count(), entries.len());

            let closed: u64 = entries.iter().filter_map(|e| e.duration_secs()).sum();
            prop_assert_eq!(s.breaks().total_break_seconds(), closed);
            prop_assert!(s.remaining_interval_ms() <= s.remaining_total_ms() || s.is_finished());
            prop_assert!(finished <= 1);
        }

        if s.is_finished() {
            prop_assert_eq!(finished, 1);
            prop_assert!(!s.breaks().is_open());
        }
    }
}
