//! End-to-end allocation scenarios on a single week.
//!
//! The week of 2026-10-12 (a Monday) is used throughout with the default
//! configuration: days span 06:00-22:00, morning is 06:00-12:00.

use chrono::{NaiveDate, NaiveDateTime, Weekday};
use studyplan_core::scheduler::StopReason;
use studyplan_core::{
    BusyEvent, Goal, PlannerState, PreferredWindow, Session, SessionStatus, TimeBand, Week,
    WeeklyScheduler,
};

fn week() -> Week {
    Week::containing(NaiveDate::from_ymd_opt(2026, 10, 12).unwrap())
}

fn on(weekday: Weekday, h: u32, m: u32) -> NaiveDateTime {
    week().date_of(weekday).and_hms_opt(h, m, 0).unwrap()
}

fn goal(hours: f64, slot: u32, windows: &[(Weekday, TimeBand)]) -> Goal {
    Goal::new("Goal", hours, slot)
        .with_windows(windows.iter().map(|&(d, b)| PreferredWindow::new(d, b)))
}

fn planned(state: &PlannerState, goal_id: &str) -> Vec<Session> {
    let mut sessions: Vec<Session> = state
        .sessions
        .iter()
        .filter(|s| s.goal_id == goal_id && s.status == SessionStatus::Planned)
        .cloned()
        .collect();
    sessions.sort_by_key(|s| s.start);
    sessions
}

#[test]
fn two_windows_get_one_session_each() {
    let g = goal(2.0, 60, &[(Weekday::Mon, TimeBand::Morning), (Weekday::Wed, TimeBand::Morning)]);
    let id = g.id.clone();
    let mut state = PlannerState {
        goals: vec![g],
        ..Default::default()
    };

    let summary = WeeklyScheduler::default().regenerate_week(&mut state, week());

    let sessions = planned(&state, &id);
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].start, on(Weekday::Mon, 6, 0));
    assert_eq!(sessions[0].end, on(Weekday::Mon, 7, 0));
    assert_eq!(sessions[1].start, on(Weekday::Wed, 6, 0));
    assert_eq!(sessions[1].end, on(Weekday::Wed, 7, 0));
    assert_eq!(summary.goals[0].allocated_minutes, 120);
}

#[test]
fn busy_morning_shifts_monday_session() {
    let g = goal(2.0, 60, &[(Weekday::Mon, TimeBand::Morning), (Weekday::Wed, TimeBand::Morning)]);
    let id = g.id.clone();
    let mut state = PlannerState {
        goals: vec![g],
        busy_events: vec![
            BusyEvent::new("Gym", on(Weekday::Mon, 6, 0), on(Weekday::Mon, 7, 0)).unwrap(),
        ],
        ..Default::default()
    };

    WeeklyScheduler::default().regenerate_week(&mut state, week());

    let starts: Vec<_> = planned(&state, &id).iter().map(|s| s.start).collect();
    assert_eq!(starts, vec![on(Weekday::Mon, 7, 0), on(Weekday::Wed, 6, 0)]);
}

#[test]
fn half_hour_goal_stops_after_one_session() {
    let g = goal(0.5, 30, &[(Weekday::Mon, TimeBand::Morning)]);
    let id = g.id.clone();
    let mut state = PlannerState {
        goals: vec![g],
        ..Default::default()
    };

    let summary = WeeklyScheduler::default().regenerate_week(&mut state, week());

    let sessions = planned(&state, &id);
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].start, on(Weekday::Mon, 6, 0));
    assert_eq!(sessions[0].duration_minutes(), 30);
    assert_eq!(summary.goals[0].stop, StopReason::RequirementMet);
}

#[test]
fn one_hour_goal_with_short_slots_fills_exactly_its_target() {
    let g = goal(1.0, 30, &[(Weekday::Mon, TimeBand::Morning)]);
    let id = g.id.clone();
    let mut state = PlannerState {
        goals: vec![g],
        ..Default::default()
    };

    let summary = WeeklyScheduler::default().regenerate_week(&mut state, week());

    let sessions = planned(&state, &id);
    let spans: Vec<_> = sessions.iter().map(|s| (s.start, s.end)).collect();
    assert_eq!(
        spans,
        vec![
            (on(Weekday::Mon, 6, 0), on(Weekday::Mon, 6, 30)),
            (on(Weekday::Mon, 6, 30), on(Weekday::Mon, 7, 0)),
        ]
    );
    assert_eq!(summary.goals[0].allocated_minutes, 60);
    assert_eq!(summary.goals[0].stop, StopReason::RequirementMet);
}

#[test]
fn ten_free_minutes_are_not_enough() {
    let g = goal(1.0, 60, &[(Weekday::Mon, TimeBand::Morning)]);
    let id = g.id.clone();
    let mut state = PlannerState {
        goals: vec![g],
        busy_events: vec![
            BusyEvent::new("Shift", on(Weekday::Mon, 6, 0), on(Weekday::Mon, 11, 50)).unwrap(),
        ],
        ..Default::default()
    };

    let summary = WeeklyScheduler::default().regenerate_week(&mut state, week());

    assert!(planned(&state, &id).is_empty());
    assert_eq!(summary.goals[0].allocated_minutes, 0);
    assert_eq!(summary.goals[0].stop, StopReason::CapacityExhausted);
}

#[test]
fn goal_without_windows_reports_zero_progress() {
    let g = goal(3.0, 60, &[]);
    let id = g.id.clone();
    let mut state = PlannerState {
        goals: vec![g],
        ..Default::default()
    };
    let scheduler = WeeklyScheduler::default();

    let summary = scheduler.regenerate_week(&mut state, week());

    assert!(state.sessions.is_empty());
    assert_eq!(summary.goals[0].stop, StopReason::NoWindows);
    let progress = scheduler.progress(&state, &id, week()).unwrap();
    assert_eq!(progress.percent, 0);
    assert_eq!(progress.remaining_minutes, 180);
}

#[test]
fn windows_are_visited_round_robin() {
    let g = goal(
        4.0,
        60,
        &[
            (Weekday::Tue, TimeBand::Evening),
            (Weekday::Thu, TimeBand::Afternoon),
        ],
    );
    let id = g.id.clone();
    let mut state = PlannerState {
        goals: vec![g],
        ..Default::default()
    };

    WeeklyScheduler::default().regenerate_week(&mut state, week());

    let starts: Vec<_> = planned(&state, &id).iter().map(|s| s.start).collect();
    assert_eq!(
        starts,
        vec![
            on(Weekday::Tue, 18, 0),
            on(Weekday::Tue, 19, 0),
            on(Weekday::Thu, 12, 0),
            on(Weekday::Thu, 13, 0),
        ]
    );
}

#[test]
fn session_crossing_into_next_week_is_not_counted_here() {
    let g = goal(1.0, 60, &[(Weekday::Mon, TimeBand::Morning)]);
    let id = g.id.clone();
    let sunday_night = week().end() - chrono::Duration::minutes(30);
    let mut crossing = Session::planned(
        id.clone(),
        studyplan_core::Interval::new(sunday_night, sunday_night + chrono::Duration::hours(1)),
    );
    crossing.status = SessionStatus::Completed;
    let mut state = PlannerState {
        goals: vec![g],
        sessions: vec![crossing],
        ..Default::default()
    };

    let summary = WeeklyScheduler::default().regenerate_week(&mut state, week());
    assert_eq!(summary.goals[0].requirement_minutes, 60);
}
