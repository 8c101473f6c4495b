//! Maps a goal's preferred windows onto concrete free segments.

use std::collections::VecDeque;

use chrono::Duration;

use crate::schedule::{BandTable, PreferredWindow};
use crate::timeline::{at_hour, Interval, WeekAvailability};

/// Candidate segments of one preferred window, earliest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowQueue {
    pub window: PreferredWindow,
    pub candidates: VecDeque<Interval>,
}

impl WindowQueue {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Free minutes still queued for this window.
    pub fn capacity_minutes(&self) -> i64 {
        self.candidates.iter().map(|c| c.duration().num_minutes()).sum()
    }
}

/// Intersects each window's band with that day's free time.
#[derive(Debug, Clone)]
pub struct WindowResolver {
    bands: BandTable,
    min_minutes: i64,
}

impl WindowResolver {
    pub fn new(bands: BandTable, min_minutes: u32) -> Self {
        Self {
            bands,
            min_minutes: i64::from(min_minutes),
        }
    }

    /// Band boundaries of `window` on its date in the availability's week.
    pub fn band_interval(
        &self,
        window: &PreferredWindow,
        availability: &WeekAvailability,
    ) -> Interval {
        let date = availability.week().date_of(window.day);
        let range = self.bands.range(window.band);
        Interval::new(at_hour(date, range.start), at_hour(date, range.end))
    }

    /// One queue per window, in the same order as `windows`.
    ///
    /// Segments shorter than the minimum session length are discarded, so a
    /// queue may be empty. Windows are expected to be deduplicated already.
    pub fn resolve(
        &self,
        windows: &[PreferredWindow],
        availability: &WeekAvailability,
    ) -> Vec<WindowQueue> {
        let min = Duration::minutes(self.min_minutes);
        windows
            .iter()
            .map(|window| {
                let band = self.band_interval(window, availability);
                let candidates = availability
                    .day(window.day)
                    .iter()
                    .filter_map(|free| free.clip(&band))
                    .filter(|segment| segment.duration() >= min)
                    .collect();
                WindowQueue {
                    window: *window,
                    candidates,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::TimeBand;
    use crate::timeline::{AvailabilityBuilder, Week};
    use chrono::{NaiveDate, NaiveDateTime, Weekday};

    fn week() -> Week {
        Week::containing(NaiveDate::from_ymd_opt(2026, 10, 12).unwrap())
    }

    fn on(weekday: Weekday, h: u32, m: u32) -> NaiveDateTime {
        week().date_of(weekday).and_hms_opt(h, m, 0).unwrap()
    }

    fn resolver() -> WindowResolver {
        WindowResolver::new(BandTable::default(), 15)
    }

    #[test]
    fn free_morning_yields_whole_band() {
        let availability = AvailabilityBuilder::new().build(week(), []);
        let queues = resolver().resolve(
            &[PreferredWindow::new(Weekday::Mon, TimeBand::Morning)],
            &availability,
        );
        assert_eq!(queues.len(), 1);
        assert_eq!(
            queues[0].candidates,
            VecDeque::from(vec![Interval::new(on(Weekday::Mon, 6, 0), on(Weekday::Mon, 12, 0))])
        );
        assert_eq!(queues[0].capacity_minutes(), 360);
    }

    #[test]
    fn busy_time_splits_band_and_short_pieces_drop() {
        let blockers = [
            Interval::new(on(Weekday::Tue, 6, 10), on(Weekday::Tue, 13, 0)),
            Interval::new(on(Weekday::Tue, 15, 0), on(Weekday::Tue, 17, 50)),
        ];
        let availability = AvailabilityBuilder::new().build(week(), blockers);
        let queues = resolver().resolve(
            &[
                PreferredWindow::new(Weekday::Tue, TimeBand::Morning),
                PreferredWindow::new(Weekday::Tue, TimeBand::Afternoon),
            ],
            &availability,
        );
        // 06:00-06:10 is too short
        assert!(queues[0].is_empty());
        // 17:50-18:00 is too short
        assert_eq!(
            queues[1].candidates,
            VecDeque::from(vec![Interval::new(on(Weekday::Tue, 13, 0), on(Weekday::Tue, 15, 0))])
        );
    }

    #[test]
    fn queue_order_follows_window_order() {
        let availability = AvailabilityBuilder::new().build(week(), []);
        let windows = [
            PreferredWindow::new(Weekday::Fri, TimeBand::Evening),
            PreferredWindow::new(Weekday::Mon, TimeBand::Afternoon),
        ];
        let queues = resolver().resolve(&windows, &availability);
        assert_eq!(queues[0].window, windows[0]);
        assert_eq!(queues[1].window, windows[1]);
        assert_eq!(queues[0].candidates[0].start, on(Weekday::Fri, 18, 0));
    }

    #[test]
    fn custom_bands_are_honored() {
        let mut bands = BandTable::default();
        bands.evening.end = 23;
        let availability = AvailabilityBuilder::new().with_day_span(6, 23).build(week(), []);
        let queues = WindowResolver::new(bands, 15).resolve(
            &[PreferredWindow::new(Weekday::Sun, TimeBand::Evening)],
            &availability,
        );
        assert_eq!(queues[0].capacity_minutes(), 5 * 60);
    }
}
