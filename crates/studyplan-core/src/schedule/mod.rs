//! Schedule types: goals, busy events and study sessions.

mod session;
mod window;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::scheduler::SchedulerConfig;
use crate::timeline::Interval;

pub use session::{Session, SessionStatus, SessionTransitionError};
pub use window::{dedup_windows, BandTable, HourRange, PreferredWindow, TimeBand};

/// A recurring weekly study goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "GoalRecord")]
pub struct Goal {
    pub id: String,
    pub title: String,
    /// Target weekly study time in hours.
    pub hours_per_week: f64,
    /// Preferred length of a single session.
    pub slot_minutes: u32,
    /// Ordered, deduplicated preferred windows. Order drives the allocator's
    /// round-robin.
    pub windows: Vec<PreferredWindow>,
    pub completed: bool,
    pub class_name: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}

impl Goal {
    pub fn new(title: impl Into<String>, hours_per_week: f64, slot_minutes: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            hours_per_week,
            slot_minutes,
            windows: Vec::new(),
            completed: false,
            class_name: None,
            due_date: None,
            created_at: Local::now().naive_local(),
        }
    }

    pub fn with_window(mut self, window: PreferredWindow) -> Self {
        self.add_window(window);
        self
    }

    pub fn with_windows(mut self, windows: impl IntoIterator<Item = PreferredWindow>) -> Self {
        for window in windows {
            self.add_window(window);
        }
        self
    }

    /// Add a window unless it is already present.
    pub fn add_window(&mut self, window: PreferredWindow) {
        if !self.windows.contains(&window) {
            self.windows.push(window);
        }
    }

    /// Weekly target in whole minutes. Fractional minutes are dropped so the
    /// target never exceeds `hours_per_week * 60`.
    pub fn target_minutes(&self) -> i64 {
        if self.hours_per_week.is_finite() && self.hours_per_week > 0.0 {
            (self.hours_per_week * 60.0).floor() as i64
        } else {
            0
        }
    }

    /// Clamp numeric fields into the configured limits and dedupe windows.
    ///
    /// # Errors
    /// Returns an error for an empty title or a non-finite weekly target.
    pub fn normalize(&mut self, limits: &SchedulerConfig) -> Result<(), ValidationError> {
        self.title = self.title.trim().to_string();
        if self.title.is_empty() {
            return Err(ValidationError::invalid_value("title", "must not be empty"));
        }
        if !self.hours_per_week.is_finite() {
            return Err(ValidationError::invalid_value(
                "hours_per_week",
                "must be a finite number",
            ));
        }
        self.hours_per_week = self.hours_per_week.clamp(0.0, limits.max_hours_per_week);
        self.slot_minutes = limits.clamp_slot(self.slot_minutes);
        self.class_name = self
            .class_name
            .take()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        dedup_windows(&mut self.windows);
        Ok(())
    }
}

/// On-disk goal shape, accepting records written before goals had `windows`
/// (a single `preferred_time` band applied to a list of `days`).
#[derive(Deserialize)]
struct GoalRecord {
    id: String,
    title: String,
    hours_per_week: f64,
    slot_minutes: u32,
    #[serde(default)]
    windows: Vec<PreferredWindow>,
    #[serde(default, alias = "preferredTime")]
    preferred_time: Option<TimeBand>,
    #[serde(default)]
    days: Vec<i64>,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    class_name: Option<String>,
    #[serde(default)]
    due_date: Option<NaiveDate>,
    #[serde(default)]
    created_at: NaiveDateTime,
}

impl From<GoalRecord> for Goal {
    fn from(record: GoalRecord) -> Self {
        let mut windows = record.windows;
        if windows.is_empty() {
            if let Some(band) = record.preferred_time {
                windows = record
                    .days
                    .iter()
                    .map(|&day| PreferredWindow::new(window::sunday_based::from_index(day), band))
                    .collect();
            }
        }
        dedup_windows(&mut windows);

        Goal {
            id: record.id,
            title: record.title,
            hours_per_week: record.hours_per_week,
            slot_minutes: record.slot_minutes,
            windows,
            completed: record.completed,
            class_name: record.class_name,
            due_date: record.due_date,
            created_at: record.created_at,
        }
    }
}

/// A fixed external commitment. The allocator only ever reads it as a blocker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyEvent {
    pub id: String,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl BusyEvent {
    /// Create a busy event.
    ///
    /// # Errors
    /// Returns an error if `end` is not after `start`.
    pub fn new(
        title: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Self, ValidationError> {
        validate_range(start, end)?;
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            start,
            end,
        })
    }

    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }
}

/// Reject intervals with `end <= start`.
pub fn validate_range(
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<Interval, ValidationError> {
    Interval::checked(start, end).ok_or(ValidationError::InvalidTimeRange { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn dt(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 12)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn goal_serialization_roundtrip() {
        let goal = Goal::new("Algorithms", 2.5, 45)
            .with_window(PreferredWindow::new(Weekday::Mon, TimeBand::Morning))
            .with_window(PreferredWindow::new(Weekday::Thu, TimeBand::Evening));
        let json = serde_json::to_string(&goal).unwrap();
        let decoded: Goal = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, goal);
    }

    #[test]
    fn legacy_goal_migrates_days_to_windows() {
        let json = r#"{
            "id": "g1",
            "title": "Chemistry",
            "hours_per_week": 3,
            "slot_minutes": 60,
            "preferredTime": "afternoon",
            "days": [1, 3, 3]
        }"#;
        let goal: Goal = serde_json::from_str(json).unwrap();
        assert_eq!(
            goal.windows,
            vec![
                PreferredWindow::new(Weekday::Mon, TimeBand::Afternoon),
                PreferredWindow::new(Weekday::Wed, TimeBand::Afternoon),
            ]
        );
        assert!(!goal.completed);
    }

    #[test]
    fn explicit_windows_win_over_legacy_fields() {
        let json = r#"{
            "id": "g1", "title": "Art", "hours_per_week": 1, "slot_minutes": 30,
            "windows": [{"day": 5, "band": "evening"}],
            "preferred_time": "morning", "days": [1]
        }"#;
        let goal: Goal = serde_json::from_str(json).unwrap();
        assert_eq!(goal.windows, vec![PreferredWindow::new(Weekday::Fri, TimeBand::Evening)]);
    }

    #[test]
    fn target_minutes_floors_fractional_hours() {
        assert_eq!(Goal::new("g", 2.0, 60).target_minutes(), 120);
        assert_eq!(Goal::new("g", 0.33, 60).target_minutes(), 19);
        assert_eq!(Goal::new("g", -1.0, 60).target_minutes(), 0);
        assert_eq!(Goal::new("g", f64::NAN, 60).target_minutes(), 0);
    }

    #[test]
    fn normalize_clamps_slot_and_hours() {
        let limits = SchedulerConfig::default();
        let mut goal = Goal::new("  Physics  ", 500.0, 5);
        goal.normalize(&limits).unwrap();
        assert_eq!(goal.title, "Physics");
        assert_eq!(goal.slot_minutes, 15);
        assert_eq!(goal.hours_per_week, 168.0);

        goal.slot_minutes = 1000;
        goal.normalize(&limits).unwrap();
        assert_eq!(goal.slot_minutes, 240);
    }

    #[test]
    fn normalize_rejects_blank_title() {
        let mut goal = Goal::new("   ", 1.0, 30);
        assert!(goal.normalize(&SchedulerConfig::default()).is_err());
    }

    #[test]
    fn busy_event_requires_positive_range() {
        assert!(BusyEvent::new("Lecture", dt(9, 0), dt(10, 0)).is_ok());
        let err = BusyEvent::new("Broken", dt(10, 0), dt(10, 0)).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTimeRange { .. }));
    }
}
