//! Monday-based calendar weeks.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::Interval;

/// A calendar week, identified by its Monday.
///
/// The week covers `[monday 00:00, next monday 00:00)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "NaiveDate", into = "NaiveDate")]
pub struct Week {
    monday: NaiveDate,
}

impl Week {
    /// The week containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let offset = date.weekday().num_days_from_monday() as i64;
        Self {
            monday: date - Duration::days(offset),
        }
    }

    /// The week containing `instant`.
    pub fn containing_instant(instant: NaiveDateTime) -> Self {
        Self::containing(instant.date())
    }

    pub fn monday(&self) -> NaiveDate {
        self.monday
    }

    pub fn start(&self) -> NaiveDateTime {
        self.monday.and_time(NaiveTime::MIN)
    }

    pub fn end(&self) -> NaiveDateTime {
        self.start() + Duration::days(7)
    }

    pub fn interval(&self) -> Interval {
        Interval::new(self.start(), self.end())
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.interval().contains(instant)
    }

    /// True if the whole of `interval` falls inside this week.
    pub fn encloses(&self, interval: &Interval) -> bool {
        self.interval().encloses(interval)
    }

    /// Calendar date of `weekday` within this week.
    pub fn date_of(&self, weekday: Weekday) -> NaiveDate {
        self.monday + Duration::days(weekday.num_days_from_monday() as i64)
    }

    /// The seven dates of the week, Monday first.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let monday = self.monday;
        (0..7).map(move |offset| monday + Duration::days(offset))
    }

    pub fn offset(&self, weeks: i64) -> Self {
        Self {
            monday: self.monday + Duration::weeks(weeks),
        }
    }

    pub fn previous(&self) -> Self {
        self.offset(-1)
    }

    pub fn next(&self) -> Self {
        self.offset(1)
    }

    /// Previous, this and next week, in that order.
    pub fn around(&self) -> [Week; 3] {
        [self.previous(), *self, self.next()]
    }
}

impl From<NaiveDate> for Week {
    fn from(date: NaiveDate) -> Self {
        Week::containing(date)
    }
}

impl From<Week> for NaiveDate {
    fn from(week: Week) -> Self {
        week.monday
    }
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "week of {}", self.monday.format("%Y-%m-%d"))
    }
}

/// `date` at `hour`:00. Hour 24 is the following midnight.
pub fn at_hour(date: NaiveDate, hour: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::hours(hour as i64)
}
