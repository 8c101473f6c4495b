//! The planner's in-memory state: goals, busy events and sessions.
//!
//! `PlannerState` is the snapshot handed to and returned from a
//! [`StateStore`](crate::storage::StateStore), and the context object every
//! scheduling operation works on.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::schedule::{BusyEvent, Goal, Session, SessionStatus};
use crate::timeline::Week;

/// Title shown for a session whose goal cannot be found.
const FALLBACK_SESSION_TITLE: &str = "Study";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerState {
    /// Registration order. Earlier goals get first claim on shared free time.
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default, alias = "busy")]
    pub busy_events: Vec<BusyEvent>,
    #[serde(default)]
    pub sessions: Vec<Session>,
}

/// Whether an upcoming entry blocks time or is study time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpcomingKind {
    Busy,
    Study,
}

/// One line of the upcoming agenda.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingItem {
    pub kind: UpcomingKind,
    pub id: String,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Set for study sessions only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SessionStatus>,
}

impl PlannerState {
    pub fn goal(&self, id: &str) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    pub fn goal_mut(&mut self, id: &str) -> Option<&mut Goal> {
        self.goals.iter_mut().find(|g| g.id == id)
    }

    pub fn busy_event(&self, id: &str) -> Option<&BusyEvent> {
        self.busy_events.iter().find(|b| b.id == id)
    }

    pub fn session(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn session_mut(&mut self, id: &str) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    /// Sessions of `goal_id` lying entirely inside `week`.
    pub fn sessions_for_goal_in_week<'a>(
        &'a self,
        goal_id: &'a str,
        week: Week,
    ) -> impl Iterator<Item = &'a Session> + 'a {
        self.sessions
            .iter()
            .filter(move |s| s.goal_id == goal_id && week.encloses(&s.interval()))
    }

    /// Minutes of every session of `goal_id` inside `week`, any status.
    pub fn scheduled_minutes(&self, goal_id: &str, week: Week) -> i64 {
        self.sessions_for_goal_in_week(goal_id, week)
            .map(Session::duration_minutes)
            .sum()
    }

    /// Minutes of `goal_id` sessions inside `week` with the given status.
    pub fn minutes_with_status(&self, goal_id: &str, week: Week, status: SessionStatus) -> i64 {
        self.sessions_for_goal_in_week(goal_id, week)
            .filter(|s| s.status == status)
            .map(Session::duration_minutes)
            .sum()
    }

    /// Sessions starting inside `week`, ordered by start.
    pub fn sessions_in_week(&self, week: Week) -> Vec<&Session> {
        let mut sessions: Vec<&Session> = self
            .sessions
            .iter()
            .filter(|s| week.contains(s.start))
            .collect();
        sessions.sort_by_key(|s| s.start);
        sessions
    }

    /// Busy events starting inside `week`, ordered by start.
    pub fn busy_events_in_week(&self, week: Week) -> Vec<&BusyEvent> {
        let mut events: Vec<&BusyEvent> = self
            .busy_events
            .iter()
            .filter(|b| week.contains(b.start))
            .collect();
        events.sort_by_key(|b| b.start);
        events
    }

    /// Busy events and unfinished sessions starting in `[now, now + horizon)`,
    /// ordered by start and capped at `limit`.
    ///
    /// Busy events sort before sessions that start at the same instant.
    pub fn upcoming(
        &self,
        now: NaiveDateTime,
        horizon: Duration,
        limit: usize,
    ) -> Vec<UpcomingItem> {
        let until = now + horizon;
        let in_range = |start: NaiveDateTime| start >= now && start < until;

        let busy = self
            .busy_events
            .iter()
            .filter(|b| in_range(b.start))
            .map(|b| UpcomingItem {
                kind: UpcomingKind::Busy,
                id: b.id.clone(),
                title: b.title.clone(),
                start: b.start,
                end: b.end,
                status: None,
            });
        let study = self
            .sessions
            .iter()
            .filter(|s| s.status != SessionStatus::Completed && in_range(s.start))
            .map(|s| UpcomingItem {
                kind: UpcomingKind::Study,
                id: s.id.clone(),
                title: self
                    .goal(&s.goal_id)
                    .map_or(FALLBACK_SESSION_TITLE, |g| g.title.as_str())
                    .to_string(),
                start: s.start,
                end: s.end,
                status: Some(s.status),
            });

        let mut items: Vec<UpcomingItem> = busy.chain(study).collect();
        items.sort_by_key(|item| item.start);
        items.truncate(limit);
        items
    }

    /// Delete sessions whose goal no longer exists. Returns how many were removed.
    pub fn prune_orphaned_sessions(&mut self) -> usize {
        let before = self.sessions.len();
        let goals = &self.goals;
        self.sessions
            .retain(|s| goals.iter().any(|g| g.id == s.goal_id));
        let pruned = before - self.sessions.len();
        if pruned > 0 {
            warn!(pruned, "removed sessions referencing deleted goals");
        }
        pruned
    }

    /// Remove a goal together with all of its sessions, planned and historical.
    pub fn remove_goal_cascade(&mut self, id: &str) -> Option<(Goal, usize)> {
        let index = self.goals.iter().position(|g| g.id == id)?;
        let goal = self.goals.remove(index);
        let before = self.sessions.len();
        self.sessions.retain(|s| s.goal_id != id);
        Some((goal, before - self.sessions.len()))
    }

    /// Delete the planned sessions of one goal, in every week.
    pub fn remove_planned_sessions_of(&mut self, goal_id: &str) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|s| !(s.goal_id == goal_id && s.status == SessionStatus::Planned));
        before - self.sessions.len()
    }
}
