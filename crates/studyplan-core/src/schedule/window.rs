//! Preferred study windows: a weekday paired with a named time band.

use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Named part of the day a goal prefers to be studied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBand {
    Morning,
    Afternoon,
    Evening,
}

impl TimeBand {
    pub const ALL: [TimeBand; 3] = [TimeBand::Morning, TimeBand::Afternoon, TimeBand::Evening];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeBand::Morning => "morning",
            TimeBand::Afternoon => "afternoon",
            TimeBand::Evening => "evening",
        }
    }
}

impl fmt::Display for TimeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeBand {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" => Ok(TimeBand::Morning),
            "afternoon" => Ok(TimeBand::Afternoon),
            "evening" => Ok(TimeBand::Evening),
            other => Err(ValidationError::invalid_value(
                "band",
                format!("'{other}' is not one of morning, afternoon, evening"),
            )),
        }
    }
}

/// Clock-hour range `[start, end)` on a 24h local clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourRange {
    pub start: u32,
    pub end: u32,
}

impl HourRange {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.start < self.end && self.end <= 24
    }
}

/// Mapping from each [`TimeBand`] to its clock range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandTable {
    #[serde(default = "default_morning")]
    pub morning: HourRange,
    #[serde(default = "default_afternoon")]
    pub afternoon: HourRange,
    #[serde(default = "default_evening")]
    pub evening: HourRange,
}

fn default_morning() -> HourRange {
    HourRange::new(6, 12)
}
fn default_afternoon() -> HourRange {
    HourRange::new(12, 18)
}
fn default_evening() -> HourRange {
    HourRange::new(18, 22)
}

impl Default for BandTable {
    fn default() -> Self {
        Self {
            morning: default_morning(),
            afternoon: default_afternoon(),
            evening: default_evening(),
        }
    }
}

impl BandTable {
    pub fn range(&self, band: TimeBand) -> HourRange {
        match band {
            TimeBand::Morning => self.morning,
            TimeBand::Afternoon => self.afternoon,
            TimeBand::Evening => self.evening,
        }
    }
}

/// A goal's preferred `(weekday, band)` slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreferredWindow {
    /// Stored as 0 = Sunday ... 6 = Saturday.
    #[serde(with = "sunday_based")]
    pub day: Weekday,
    #[serde(alias = "time")]
    pub band: TimeBand,
}

impl PreferredWindow {
    pub fn new(day: Weekday, band: TimeBand) -> Self {
        Self { day, band }
    }
}

impl fmt::Display for PreferredWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.day, self.band)
    }
}

/// Parses `day:band`, e.g. `mon:morning` or `Wednesday:evening`.
impl FromStr for PreferredWindow {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (day, band) = s.split_once(':').ok_or_else(|| {
            ValidationError::invalid_value("window", format!("expected DAY:BAND, got '{s}'"))
        })?;
        let day = day.trim().parse::<Weekday>().map_err(|_| {
            ValidationError::invalid_value("window", format!("'{day}' is not a weekday"))
        })?;
        Ok(Self::new(day, band.parse()?))
    }
}

/// Remove repeated windows, keeping the first occurrence of each.
pub fn dedup_windows(windows: &mut Vec<PreferredWindow>) {
    let mut seen = std::collections::HashSet::new();
    windows.retain(|w| seen.insert(*w));
}

/// Weekday <-> `0 = Sunday` integer encoding.
pub(crate) mod sunday_based {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn to_index(day: Weekday) -> u8 {
        day.num_days_from_sunday() as u8
    }

    /// Out-of-range values wrap modulo 7.
    pub fn from_index(index: i64) -> Weekday {
        match index.rem_euclid(7) {
            0 => Weekday::Sun,
            1 => Weekday::Mon,
            2 => Weekday::Tue,
            3 => Weekday::Wed,
            4 => Weekday::Thu,
            5 => Weekday::Fri,
            _ => Weekday::Sat,
        }
    }

    pub fn serialize<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(to_index(*day))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        Ok(from_index(i64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_window_accepts_short_and_long_names() {
        let w: PreferredWindow = "mon:morning".parse().unwrap();
        assert_eq!(w, PreferredWindow::new(Weekday::Mon, TimeBand::Morning));
        let w: PreferredWindow = "Wednesday:Evening".parse().unwrap();
        assert_eq!(w, PreferredWindow::new(Weekday::Wed, TimeBand::Evening));
    }

    #[test]
    fn parse_window_rejects_garbage() {
        assert!("monday".parse::<PreferredWindow>().is_err());
        assert!("funday:morning".parse::<PreferredWindow>().is_err());
        assert!("mon:night".parse::<PreferredWindow>().is_err());
    }

    #[test]
    fn window_day_serializes_sunday_based() {
        let window = PreferredWindow::new(Weekday::Mon, TimeBand::Afternoon);
        let json = serde_json::to_string(&window).unwrap();
        assert_eq!(json, r#"{"day":1,"band":"afternoon"}"#);

        let legacy: PreferredWindow =
            serde_json::from_str(r#"{"day":0,"time":"evening"}"#).unwrap();
        assert_eq!(legacy, PreferredWindow::new(Weekday::Sun, TimeBand::Evening));
    }

    #[test]
    fn out_of_range_day_wraps() {
        assert_eq!(sunday_based::from_index(7), Weekday::Sun);
        assert_eq!(sunday_based::from_index(-1), Weekday::Sat);
    }

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        let mut windows = vec![
            PreferredWindow::new(Weekday::Wed, TimeBand::Morning),
            PreferredWindow::new(Weekday::Mon, TimeBand::Morning),
            PreferredWindow::new(Weekday::Wed, TimeBand::Morning),
        ];
        dedup_windows(&mut windows);
        assert_eq!(
            windows,
            vec![
                PreferredWindow::new(Weekday::Wed, TimeBand::Morning),
                PreferredWindow::new(Weekday::Mon, TimeBand::Morning),
            ]
        );
    }

    #[test]
    fn default_band_table_matches_clock() {
        let bands = BandTable::default();
        assert_eq!(bands.range(TimeBand::Morning), HourRange::new(6, 12));
        assert_eq!(bands.range(TimeBand::Afternoon), HourRange::new(12, 18));
        assert_eq!(bands.range(TimeBand::Evening), HourRange::new(18, 22));
    }
}
