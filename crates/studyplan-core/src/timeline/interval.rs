//! Half-open interval arithmetic over local calendar instants.
//!
//! Every other component works in terms of [`Interval`]: busy events,
//! sessions, free time and candidate segments are all `[start, end)` spans.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A half-open `[start, end)` span of local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    /// Create an interval without checking its ordering.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Create an interval, returning `None` unless `end > start`.
    pub fn checked(start: NaiveDateTime, end: NaiveDateTime) -> Option<Self> {
        (end > start).then_some(Self { start, end })
    }

    /// Touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Intersection of two intervals, if it has positive length.
    pub fn clip(&self, other: &Interval) -> Option<Interval> {
        Interval::checked(self.start.max(other.start), self.end.min(other.end))
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Length in whole minutes, rounded to the nearest minute.
    pub fn duration_minutes(&self) -> i64 {
        (self.duration().num_milliseconds() + 30_000).div_euclid(60_000)
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant < self.end
    }

    /// True if `other` lies entirely inside this interval.
    pub fn encloses(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Remove every blocker from `window`.
///
/// `blockers` must be sorted by start. The window is scanned once, split at
/// the boundaries of each overlapping blocker; pieces with non-positive
/// length are dropped. The result is ordered and non-overlapping.
pub fn subtract(window: Interval, blockers: &[Interval]) -> Vec<Interval> {
    debug_assert!(
        blockers.windows(2).all(|w| w[0].start <= w[1].start),
        "blockers must be sorted by start"
    );

    let mut free = Vec::new();
    let mut cursor = window.start;

    for blocker in blockers {
        if blocker.end <= cursor {
            continue;
        }
        if blocker.start >= window.end {
            break;
        }
        if blocker.start > cursor {
            free.push(Interval::new(cursor, blocker.start));
        }
        cursor = blocker.end;
        if cursor >= window.end {
            return free;
        }
    }

    if cursor < window.end {
        free.push(Interval::new(cursor, window.end));
    }
    free
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 12)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn span(h1: u32, m1: u32, h2: u32, m2: u32) -> Interval {
        Interval::new(at(h1, m1), at(h2, m2))
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        assert!(!span(6, 0, 7, 0).overlaps(&span(7, 0, 8, 0)));
        assert!(span(6, 0, 7, 1).overlaps(&span(7, 0, 8, 0)));
        assert!(span(6, 0, 12, 0).overlaps(&span(8, 0, 9, 0)));
    }

    #[test]
    fn checked_rejects_empty_and_reversed() {
        assert!(Interval::checked(at(7, 0), at(7, 0)).is_none());
        assert!(Interval::checked(at(8, 0), at(7, 0)).is_none());
        assert!(Interval::checked(at(7, 0), at(8, 0)).is_some());
    }

    #[test]
    fn clip_returns_intersection() {
        let clipped = span(6, 0, 10, 0).clip(&span(9, 0, 12, 0)).unwrap();
        assert_eq!(clipped, span(9, 0, 10, 0));
        assert!(span(6, 0, 9, 0).clip(&span(9, 0, 12, 0)).is_none());
    }

    #[test]
    fn duration_minutes_rounds_to_nearest() {
        let base = at(6, 0);
        assert_eq!(Interval::new(base, base + Duration::seconds(29)).duration_minutes(), 0);
        assert_eq!(Interval::new(base, base + Duration::seconds(30)).duration_minutes(), 1);
        let odd = Interval::new(base, base + Duration::seconds(90 * 60 + 10));
        assert_eq!(odd.duration_minutes(), 90);
    }

    #[test]
    fn subtract_splits_around_blocker() {
        let free = subtract(span(6, 0, 22, 0), &[span(9, 0, 10, 0)]);
        assert_eq!(free, vec![span(6, 0, 9, 0), span(10, 0, 22, 0)]);
    }

    #[test]
    fn subtract_handles_overlapping_and_adjacent_blockers() {
        let blockers = [
            span(6, 0, 7, 0),
            span(8, 0, 9, 30),
            span(9, 0, 10, 0),
            span(10, 0, 11, 0),
        ];
        let free = subtract(span(6, 0, 12, 0), &blockers);
        assert_eq!(free, vec![span(7, 0, 8, 0), span(11, 0, 12, 0)]);
    }

    #[test]
    fn subtract_ignores_blockers_outside_window() {
        let blockers = [span(4, 0, 5, 0), span(23, 0, 23, 30)];
        assert_eq!(subtract(span(6, 0, 22, 0), &blockers), vec![span(6, 0, 22, 0)]);
    }

    #[test]
    fn subtract_fully_covered_window_is_empty() {
        assert!(subtract(span(9, 0, 10, 0), &[span(8, 0, 11, 0)]).is_empty());
    }

    #[test]
    fn subtract_nested_blocker_does_not_rewind_cursor() {
        let blockers = [span(8, 0, 12, 0), span(9, 0, 10, 0)];
        assert_eq!(
            subtract(span(6, 0, 14, 0), &blockers),
            vec![span(6, 0, 8, 0), span(12, 0, 14, 0)]
        );
    }
}
