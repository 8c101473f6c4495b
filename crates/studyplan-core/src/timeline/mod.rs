//! Time arithmetic and free-time detection.
//!
//! This module provides:
//! - Half-open interval algebra (overlap, subtraction, clipping)
//! - Monday-based calendar weeks
//! - Per-day free time computed from fixed blockers

mod availability;
mod interval;
mod week;

pub use availability::{AvailabilityBuilder, WeekAvailability};
pub use interval::{subtract, Interval};
pub use week::{at_hour, Week};
