//! Weekly session scheduler.
//!
//! Regenerating a week:
//! - Drops sessions whose goal no longer exists
//! - Discards the week's `planned` sessions and keeps historical ones
//! - Computes free time from busy events and historical sessions
//! - Places new sessions goal by goal, round-robin across each goal's windows
//!
//! Goals share one evolving availability. An earlier goal claims its time
//! before a later goal is resolved, so registration order decides who wins
//! contested capacity.

mod allocator;
mod resolver;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CoreError, EntityKind, Result};
use crate::schedule::{BandTable, Goal, Session, SessionStatus};
use crate::state::PlannerState;
use crate::timeline::{AvailabilityBuilder, Week, WeekAvailability};

pub use allocator::{Allocation, FairAllocator, StopReason};
pub use resolver::{WindowQueue, WindowResolver};

/// Scheduler limits, loaded from the `[scheduler]` table of `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// First schedulable hour of every day.
    #[serde(default = "default_day_start_hour")]
    pub day_start_hour: u32,
    /// End of the schedulable span (exclusive, may be 24).
    #[serde(default = "default_day_end_hour")]
    pub day_end_hour: u32,
    /// Shortest session the allocator will create.
    #[serde(default = "default_min_minutes")]
    pub min_session_minutes: u32,
    #[serde(default = "default_min_minutes")]
    pub min_slot_minutes: u32,
    #[serde(default = "default_max_slot_minutes")]
    pub max_slot_minutes: u32,
    #[serde(default = "default_max_hours_per_week")]
    pub max_hours_per_week: f64,
}

fn default_day_start_hour() -> u32 {
    6
}
fn default_day_end_hour() -> u32 {
    22
}
fn default_min_minutes() -> u32 {
    15
}
fn default_max_slot_minutes() -> u32 {
    240
}
fn default_max_hours_per_week() -> f64 {
    168.0
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            day_start_hour: default_day_start_hour(),
            day_end_hour: default_day_end_hour(),
            min_session_minutes: default_min_minutes(),
            min_slot_minutes: default_min_minutes(),
            max_slot_minutes: default_max_slot_minutes(),
            max_hours_per_week: default_max_hours_per_week(),
        }
    }
}

impl SchedulerConfig {
    /// Clamp a slot length into `[min_slot_minutes, max_slot_minutes]`.
    ///
    /// The floor never drops below `min_session_minutes`, since a shorter
    /// slot could not produce a single session.
    pub fn clamp_slot(&self, slot_minutes: u32) -> u32 {
        let floor = self.min_slot_minutes.max(self.min_session_minutes);
        slot_minutes.clamp(floor, self.max_slot_minutes.max(floor))
    }
}

/// Outcome of allocating one goal during a week regeneration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalAllocation {
    pub goal_id: String,
    pub requirement_minutes: i64,
    pub allocated_minutes: i64,
    pub sessions_created: usize,
    pub stop: StopReason,
}

/// What a week regeneration changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegenerationSummary {
    pub week: Week,
    pub pruned_orphans: usize,
    pub removed_planned: usize,
    pub created_sessions: usize,
    /// One entry per non-completed goal, in registration order.
    pub goals: Vec<GoalAllocation>,
}

/// Weekly progress figures for one goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub goal_id: String,
    pub week: Week,
    pub target_minutes: i64,
    pub completed_minutes: i64,
    pub scheduled_minutes: i64,
    pub remaining_minutes: i64,
    pub percent: u8,
}

/// Regenerates planned sessions for whole weeks.
#[derive(Debug, Clone, Default)]
pub struct WeeklyScheduler {
    config: SchedulerConfig,
    bands: BandTable,
}

impl WeeklyScheduler {
    pub fn new(config: SchedulerConfig, bands: BandTable) -> Self {
        Self { config, bands }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn bands(&self) -> &BandTable {
        &self.bands
    }

    fn builder(&self) -> AvailabilityBuilder {
        AvailabilityBuilder::new()
            .with_day_span(self.config.day_start_hour, self.config.day_end_hour)
    }

    /// Free time in `week` given the current busy events and historical sessions.
    pub fn availability(&self, state: &PlannerState, week: Week) -> WeekAvailability {
        self.builder()
            .build_from(week, &state.busy_events, &state.sessions)
    }

    /// Replace the planned sessions of `week` with a fresh allocation.
    ///
    /// Historical sessions are never touched. Running this twice in a row
    /// yields the same minutes per goal.
    pub fn regenerate_week(&self, state: &mut PlannerState, week: Week) -> RegenerationSummary {
        let pruned_orphans = state.prune_orphaned_sessions();

        let before = state.sessions.len();
        state
            .sessions
            .retain(|s| s.status != SessionStatus::Planned || !week.contains(s.start));
        let removed_planned = before - state.sessions.len();

        let mut availability = self.availability(state, week);
        let resolver = WindowResolver::new(self.bands.clone(), self.config.min_session_minutes);
        let allocator = FairAllocator::new(self.config.min_session_minutes);

        let mut created = Vec::new();
        let mut goals = Vec::new();
        for goal in state.goals.iter().filter(|g| !g.completed) {
            let requirement =
                (goal.target_minutes() - state.scheduled_minutes(&goal.id, week)).max(0);

            let allocation = if goal.windows.is_empty() {
                Allocation {
                    intervals: Vec::new(),
                    allocated_minutes: 0,
                    steps: 0,
                    stop: StopReason::NoWindows,
                }
            } else {
                let mut queues = resolver.resolve(&goal.windows, &availability);
                let slot = self.config.clamp_slot(goal.slot_minutes);
                allocator.allocate(requirement, slot, &mut queues)
            };

            for interval in &allocation.intervals {
                availability.claim(*interval);
                created.push(Session::planned(goal.id.clone(), *interval));
            }

            debug!(
                goal = %goal.id,
                requirement,
                allocated = allocation.allocated_minutes,
                sessions = allocation.intervals.len(),
                stop = %allocation.stop,
                "allocated goal"
            );
            goals.push(GoalAllocation {
                goal_id: goal.id.clone(),
                requirement_minutes: requirement,
                allocated_minutes: allocation.allocated_minutes,
                sessions_created: allocation.intervals.len(),
                stop: allocation.stop,
            });
        }

        let created_sessions = created.len();
        state.sessions.extend(created);

        info!(
            %week,
            pruned_orphans,
            removed_planned,
            created_sessions,
            "regenerated week"
        );

        RegenerationSummary {
            week,
            pruned_orphans,
            removed_planned,
            created_sessions,
            goals,
        }
    }

    /// Minutes still needed to reach the goal's weekly target.
    ///
    /// Counts every session of the goal inside the week, planned included.
    /// A completed goal needs nothing.
    pub fn remaining_minutes(
        &self,
        state: &PlannerState,
        goal_id: &str,
        week: Week,
    ) -> Result<i64> {
        let goal = lookup(state, goal_id)?;
        if goal.completed {
            return Ok(0);
        }
        Ok((goal.target_minutes() - state.scheduled_minutes(goal_id, week)).max(0))
    }

    pub fn progress(
        &self,
        state: &PlannerState,
        goal_id: &str,
        week: Week,
    ) -> Result<GoalProgress> {
        let goal = lookup(state, goal_id)?;
        let target_minutes = goal.target_minutes();
        let completed_minutes = state.minutes_with_status(goal_id, week, SessionStatus::Completed);
        let scheduled_minutes = state.scheduled_minutes(goal_id, week);

        let percent = if goal.completed {
            100
        } else if target_minutes <= 0 {
            0
        } else {
            let ratio = completed_minutes as f64 / target_minutes as f64;
            (ratio * 100.0).round().clamp(0.0, 100.0) as u8
        };

        Ok(GoalProgress {
            goal_id: goal.id.clone(),
            week,
            target_minutes,
            completed_minutes,
            scheduled_minutes,
            remaining_minutes: self.remaining_minutes(state, goal_id, week)?,
            percent,
        })
    }
}

fn lookup<'a>(state: &'a PlannerState, goal_id: &str) -> Result<&'a Goal> {
    state
        .goal(goal_id)
        .ok_or_else(|| CoreError::not_found(EntityKind::Goal, goal_id))
}
