//! The planner: state, configuration and a store, behind one API.
//!
//! Every mutating operation regenerates the previous, current and next week
//! around the planner's current week and then saves once. Edits to busy
//! events and sessions also regenerate every other week the old or new
//! interval falls in. Two exceptions:
//! checking in or completing a session is a pure status change, and
//! completing a goal only removes its planned sessions.

use chrono::{Duration, NaiveDateTime};
use tracing::{debug, info};

use crate::error::{CoreError, EntityKind, Result, ValidationError};
use crate::schedule::{validate_range, BusyEvent, Goal, Session, SessionStatus};
use crate::scheduler::{GoalProgress, RegenerationSummary, WeeklyScheduler};
use crate::state::PlannerState;
use crate::storage::{Config, StateStore};
use crate::timeline::{Interval, Week, WeekAvailability};

pub struct Planner<S: StateStore> {
    state: PlannerState,
    store: S,
    config: Config,
    scheduler: WeeklyScheduler,
    current_week: Week,
}

impl<S: StateStore> Planner<S> {
    /// Load state from `store`. Orphaned sessions found on load are dropped
    /// and the cleaned state is saved.
    pub fn open(store: S, config: Config, current_week: Week) -> Result<Self> {
        let state = store.load()?;
        let mut planner = Self::with_state(store, config, current_week, state);
        if planner.state.prune_orphaned_sessions() > 0 {
            planner.save()?;
        }
        Ok(planner)
    }

    /// Wrap an existing state without touching the store.
    pub fn with_state(store: S, config: Config, current_week: Week, state: PlannerState) -> Self {
        let scheduler = config.scheduler();
        Self {
            state,
            store,
            config,
            scheduler,
            current_week,
        }
    }

    pub fn state(&self) -> &PlannerState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn current_week(&self) -> Week {
        self.current_week
    }

    pub fn into_state(self) -> PlannerState {
        self.state
    }

    pub fn save(&self) -> Result<()> {
        self.store.save(&self.state)
    }

    // ── Scheduling ───────────────────────────────────────────────────

    /// Regenerate one week and save.
    pub fn regenerate_week(&mut self, week: Week) -> Result<RegenerationSummary> {
        let summary = self.scheduler.regenerate_week(&mut self.state, week);
        self.save()?;
        Ok(summary)
    }

    /// Regenerate the week before `week`, `week` itself and the week after,
    /// then save once.
    pub fn regenerate_weeks_around(&mut self, week: Week) -> Result<Vec<RegenerationSummary>> {
        let summaries: Vec<RegenerationSummary> = week
            .around()
            .into_iter()
            .map(|w| self.scheduler.regenerate_week(&mut self.state, w))
            .collect();
        self.save()?;
        Ok(summaries)
    }

    fn refresh(&mut self) -> Result<Vec<RegenerationSummary>> {
        self.refresh_touching(&[])
    }

    /// Regenerate around the current week plus every week one of `touched`
    /// falls in, then save once.
    fn refresh_touching(&mut self, touched: &[Interval]) -> Result<Vec<RegenerationSummary>> {
        let mut weeks = self.current_week.around().to_vec();
        for interval in touched {
            let last = Week::containing_instant(interval.end - Duration::nanoseconds(1));
            for week in [Week::containing_instant(interval.start), last] {
                if !weeks.contains(&week) {
                    debug!(%week, "regenerating week outside the current range");
                    weeks.push(week);
                }
            }
        }

        let summaries = weeks
            .into_iter()
            .map(|w| self.scheduler.regenerate_week(&mut self.state, w))
            .collect();
        self.save()?;
        Ok(summaries)
    }

    pub fn free_intervals_for_week(&self, week: Week) -> WeekAvailability {
        self.scheduler.availability(&self.state, week)
    }

    pub fn remaining_minutes(&self, goal_id: &str, week: Week) -> Result<i64> {
        self.scheduler.remaining_minutes(&self.state, goal_id, week)
    }

    pub fn progress(&self, goal_id: &str, week: Week) -> Result<GoalProgress> {
        self.scheduler.progress(&self.state, goal_id, week)
    }

    /// Move to another week and regenerate around it.
    pub fn set_current_week(&mut self, week: Week) -> Result<Vec<RegenerationSummary>> {
        self.current_week = week;
        info!(%week, "switched current week");
        self.refresh()
    }

    // ── Goals ────────────────────────────────────────────────────────

    /// Register a goal after normalizing it. New goals go last.
    pub fn add_goal(&mut self, mut goal: Goal) -> Result<Goal> {
        goal.normalize(&self.config.scheduler)?;
        if self.state.goal(&goal.id).is_some() {
            let message = format!("goal {} already exists", goal.id);
            return Err(ValidationError::invalid_value("id", message).into());
        }
        debug!(goal = %goal.id, title = %goal.title, "adding goal");
        self.state.goals.push(goal.clone());
        self.refresh()?;
        Ok(goal)
    }

    /// Replace a goal's fields. Its position and creation time are kept.
    pub fn update_goal(&mut self, mut goal: Goal) -> Result<Goal> {
        goal.normalize(&self.config.scheduler)?;
        let existing = self
            .state
            .goal_mut(&goal.id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Goal, goal.id.clone()))?;
        goal.created_at = existing.created_at;
        *existing = goal.clone();
        if goal.completed {
            self.state.remove_planned_sessions_of(&goal.id);
        }
        self.refresh()?;
        Ok(goal)
    }

    /// Mark a goal completed or reopen it.
    ///
    /// Completing drops the goal's planned sessions in every week and keeps
    /// its history. Reopening regenerates around the current week.
    pub fn set_goal_completed(&mut self, id: &str, completed: bool) -> Result<Goal> {
        let goal = self
            .state
            .goal_mut(id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Goal, id))?;
        goal.completed = completed;
        let goal = goal.clone();

        if completed {
            let removed = self.state.remove_planned_sessions_of(id);
            info!(goal = %id, removed, "completed goal");
            self.save()?;
        } else {
            info!(goal = %id, "reopened goal");
            self.refresh()?;
        }
        Ok(goal)
    }

    /// Delete a goal and every session that belongs to it.
    pub fn delete_goal(&mut self, id: &str) -> Result<Goal> {
        let (goal, removed) = self
            .state
            .remove_goal_cascade(id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Goal, id))?;
        info!(goal = %id, removed_sessions = removed, "deleted goal");
        self.refresh()?;
        Ok(goal)
    }

    // ── Busy events ──────────────────────────────────────────────────

    pub fn add_busy_event(
        &mut self,
        title: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<BusyEvent> {
        let event = BusyEvent::new(title, start, end)?;
        self.state.busy_events.push(event.clone());
        self.refresh_touching(&[event.interval()])?;
        Ok(event)
    }

    /// Replace a busy event's title and times.
    pub fn update_busy_event(&mut self, event: BusyEvent) -> Result<BusyEvent> {
        validate_range(event.start, event.end)?;
        let existing = self
            .state
            .busy_events
            .iter_mut()
            .find(|b| b.id == event.id)
            .ok_or_else(|| CoreError::not_found(EntityKind::BusyEvent, event.id.clone()))?;
        let previous = existing.interval();
        *existing = event.clone();
        self.refresh_touching(&[previous, event.interval()])?;
        Ok(event)
    }

    pub fn delete_busy_event(&mut self, id: &str) -> Result<BusyEvent> {
        let index = self
            .state
            .busy_events
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| CoreError::not_found(EntityKind::BusyEvent, id))?;
        let event = self.state.busy_events.remove(index);
        self.refresh_touching(&[event.interval()])?;
        Ok(event)
    }

    // ── Sessions ─────────────────────────────────────────────────────

    fn transition_session(&mut self, id: &str, to: SessionStatus) -> Result<Session> {
        let session = self
            .state
            .session_mut(id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Session, id))?;
        session.transition_to(to)?;
        let session = session.clone();
        debug!(session = %id, status = %to, "session status changed");
        self.save()?;
        Ok(session)
    }

    pub fn check_in(&mut self, id: &str) -> Result<Session> {
        self.transition_session(id, SessionStatus::CheckedIn)
    }

    pub fn complete_session(&mut self, id: &str) -> Result<Session> {
        self.transition_session(id, SessionStatus::Completed)
    }

    /// Move a checked-in or completed session.
    ///
    /// Planned sessions belong to the allocator and cannot be moved by hand.
    /// The new interval must not overlap a busy event or another historical
    /// session.
    pub fn reschedule_session(
        &mut self,
        id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Session> {
        let interval = validate_range(start, end)?;
        let session = self
            .state
            .session(id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Session, id))?;
        if !session.is_historical() {
            return Err(ValidationError::invalid_value(
                "status",
                "planned sessions are regenerated automatically and cannot be moved",
            )
            .into());
        }

        let busy_clash = self
            .state
            .busy_events
            .iter()
            .find(|b| b.interval().overlaps(&interval))
            .map(|b| b.id.clone());
        let session_clash = self
            .state
            .sessions
            .iter()
            .filter(|s| s.id != id && s.is_historical())
            .find(|s| s.interval().overlaps(&interval))
            .map(|s| s.id.clone());
        if let Some(other) = busy_clash.or(session_clash) {
            return Err(ValidationError::Overlap {
                id: id.to_string(),
                other,
            }
            .into());
        }

        let session = self
            .state
            .session_mut(id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Session, id))?;
        let previous = session.interval();
        session.start = interval.start;
        session.end = interval.end;
        let session = session.clone();
        self.refresh_touching(&[previous, interval])?;
        Ok(session)
    }

    /// Delete a session of any status.
    pub fn delete_session(&mut self, id: &str) -> Result<Session> {
        let index = self
            .state
            .sessions
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| CoreError::not_found(EntityKind::Session, id))?;
        let session = self.state.sessions.remove(index);
        self.refresh_touching(&[session.interval()])?;
        Ok(session)
    }
}
