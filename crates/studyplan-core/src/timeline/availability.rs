//! Free-time detection for a week.
//!
//! Subtracts busy events and historical sessions from each day's schedulable
//! span. Planned sessions never block: they are about to be discarded.

use chrono::Weekday;
use serde::Serialize;

use super::interval::{subtract, Interval};
use super::week::{at_hour, Week};
use crate::schedule::{BusyEvent, Session};

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Free intervals for each day of a week, Monday first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekAvailability {
    week: Week,
    days: [Vec<Interval>; 7],
}

impl WeekAvailability {
    pub fn week(&self) -> Week {
        self.week
    }

    /// Ordered, non-overlapping free intervals of `weekday`.
    pub fn day(&self, weekday: Weekday) -> &[Interval] {
        &self.days[weekday.num_days_from_monday() as usize]
    }

    /// `(weekday, free intervals)` pairs, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &[Interval])> {
        WEEKDAYS
            .iter()
            .zip(self.days.iter())
            .map(|(day, free)| (*day, free.as_slice()))
    }

    pub fn total_free_minutes(&self) -> i64 {
        self.days
            .iter()
            .flatten()
            .map(Interval::duration_minutes)
            .sum()
    }

    /// Remove `taken` from the free lists so later consumers cannot reuse it.
    pub fn claim(&mut self, taken: Interval) {
        for free in self.days.iter_mut() {
            if !free.iter().any(|f| f.overlaps(&taken)) {
                continue;
            }
            *free = free
                .iter()
                .flat_map(|f| subtract(*f, std::slice::from_ref(&taken)))
                .collect();
        }
    }
}

/// Builds [`WeekAvailability`] from fixed blockers.
#[derive(Debug, Clone)]
pub struct AvailabilityBuilder {
    day_start_hour: u32,
    day_end_hour: u32,
}

impl AvailabilityBuilder {
    /// Create a builder with the default `[06:00, 22:00)` daily span.
    pub fn new() -> Self {
        Self {
            day_start_hour: 6,
            day_end_hour: 22,
        }
    }

    /// Set the schedulable span of every day.
    pub fn with_day_span(mut self, start_hour: u32, end_hour: u32) -> Self {
        self.day_start_hour = start_hour;
        self.day_end_hour = end_hour;
        self
    }

    /// Schedulable span of `weekday` within `week`.
    pub fn day_span(&self, week: Week, weekday: Weekday) -> Interval {
        let date = week.date_of(weekday);
        Interval::new(
            at_hour(date, self.day_start_hour),
            at_hour(date, self.day_end_hour),
        )
    }

    /// Free time per day after removing `blockers`.
    ///
    /// Blockers are clipped to each day's span; the parts outside it have no
    /// effect.
    pub fn build(
        &self,
        week: Week,
        blockers: impl IntoIterator<Item = Interval>,
    ) -> WeekAvailability {
        let mut blockers: Vec<Interval> = blockers.into_iter().collect();
        blockers.sort_by_key(|b| b.start);

        let days = WEEKDAYS.map(|weekday| {
            let span = self.day_span(week, weekday);
            let clipped: Vec<Interval> = blockers.iter().filter_map(|b| b.clip(&span)).collect();
            subtract(span, &clipped)
        });

        WeekAvailability { week, days }
    }

    /// Free time per day after removing busy events and `checked_in` /
    /// `completed` sessions.
    pub fn build_from(
        &self,
        week: Week,
        busy: &[BusyEvent],
        sessions: &[Session],
    ) -> WeekAvailability {
        let blockers = busy.iter().map(BusyEvent::interval).chain(
            sessions
                .iter()
                .filter(|s| s.is_historical())
                .map(Session::interval),
        );
        self.build(week, blockers)
    }
}

impl Default for AvailabilityBuilder {
    fn default() -> Self {
        Self::new()
    }
}
