//! Study sessions and their status state machine.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::timeline::Interval;

/// Session status.
///
/// ```text
///   PLANNED ──check in──> CHECKED_IN ──complete──> COMPLETED
///      │                                               ^
///      └──────────────────complete─────────────────────┘
/// ```
///
/// Only `planned` sessions belong to the allocator. The other two are
/// historical: they are never moved or deleted by regeneration and they
/// block future allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Planned,
    CheckedIn,
    Completed,
}

impl SessionStatus {
    pub fn is_historical(&self) -> bool {
        !matches!(self, SessionStatus::Planned)
    }

    /// Check if a transition is valid. Transitions are forward-only.
    pub fn can_transition_to(&self, to: &SessionStatus) -> bool {
        self.valid_transitions().contains(to)
    }

    pub fn valid_transitions(&self) -> &[SessionStatus] {
        match self {
            SessionStatus::Planned => &[SessionStatus::CheckedIn, SessionStatus::Completed],
            SessionStatus::CheckedIn => &[SessionStatus::Completed],
            SessionStatus::Completed => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Planned => "planned",
            SessionStatus::CheckedIn => "checked_in",
            SessionStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an invalid status transition is attempted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionTransitionError {
    pub from: SessionStatus,
    pub to: SessionStatus,
}

impl std::fmt::Display for SessionTransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid session transition: {} → {}", self.from, self.to)
    }
}

impl std::error::Error for SessionTransitionError {}

/// A block of study time for one goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    /// May dangle if the goal was removed out of band; such sessions are pruned.
    pub goal_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: SessionStatus,
}

impl Session {
    /// Create a new allocator-owned session.
    pub fn planned(goal_id: impl Into<String>, interval: Interval) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            goal_id: goal_id.into(),
            start: interval.start,
            end: interval.end,
            status: SessionStatus::Planned,
        }
    }

    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }

    pub fn duration_minutes(&self) -> i64 {
        self.interval().duration_minutes()
    }

    pub fn is_historical(&self) -> bool {
        self.status.is_historical()
    }

    pub fn transition_to(&mut self, to: SessionStatus) -> Result<(), SessionTransitionError> {
        if !self.status.can_transition_to(&to) {
            return Err(SessionTransitionError {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}
