//! # Studyplan Core Library
//!
//! This library provides the core logic of the weekly study planner. Users
//! register recurring goals ("study 3 hours a week, on Monday mornings and
//! Thursday evenings") and fixed busy events; the planner fills each week
//! with concrete study sessions that respect both. All operations are
//! available through the standalone CLI binary built on this crate.
//!
//! ## Architecture
//!
//! - **Timeline**: Half-open interval algebra, Monday-based weeks and
//!   per-day free time
//! - **Schedule**: Goals, preferred windows, busy events and sessions with
//!   their forward-only status machine
//! - **Scheduler**: Window resolution, the fair round-robin allocator and
//!   week regeneration
//! - **Storage**: SQLite or JSON state snapshots and TOML configuration
//!
//! ## Key Components
//!
//! - [`Planner`]: State, configuration and store behind one API
//! - [`WeeklyScheduler`]: Regenerates the planned sessions of a week
//! - [`StateStore`]: Trait implemented by [`SqliteStore`] and [`JsonStore`]
//! - [`Config`]: Application configuration management

pub mod error;
pub mod planner;
pub mod schedule;
pub mod scheduler;
pub mod state;
pub mod storage;
pub mod timeline;

pub use error::{ConfigError, CoreError, DatabaseError, EntityKind, ValidationError};
pub use planner::Planner;
pub use schedule::{BusyEvent, Goal, PreferredWindow, Session, SessionStatus, TimeBand};
pub use scheduler::{
    GoalAllocation, GoalProgress, RegenerationSummary, SchedulerConfig, StopReason, WeeklyScheduler,
};
pub use state::{PlannerState, UpcomingItem, UpcomingKind};
pub use storage::{Config, JsonStore, SqliteStore, StateStore, StorageBackend};
pub use timeline::{Interval, Week, WeekAvailability};
