pub mod busy;
pub mod config;
pub mod goal;
pub mod plan;
pub mod session;

use std::error::Error;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use studyplan_core::storage::{data_dir, open_store};
use studyplan_core::{Config, Planner, StateStore, Week};
use tracing::debug;

pub type CliResult<T = ()> = Result<T, Box<dyn Error>>;

/// Open the planner on the configured backend, with the week of `today`
/// as its current week.
pub fn open_planner(today: NaiveDate) -> CliResult<Planner<Box<dyn StateStore>>> {
    let dir = data_dir()?;
    let config = Config::load_from(&dir.join("config.toml"))?;
    let backend = config.storage.backend;
    let store = open_store(&config, &dir)?;
    debug!(dir = %dir.display(), ?backend, %today, "opening planner");
    Ok(Planner::open(store, config, Week::containing(today))?)
}

/// Week containing `date`, or the planner's current week.
pub fn week_or_current<S: StateStore>(date: Option<NaiveDate>, planner: &Planner<S>) -> Week {
    date.map(Week::containing)
        .unwrap_or_else(|| planner.current_week())
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_clock(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| format!("invalid time '{s}', expected HH:MM"))
}

/// Combine a date and a clock time. `24:00` is accepted as the next midnight.
pub fn at(date: NaiveDate, clock: &str) -> CliResult<NaiveDateTime> {
    if clock == "24:00" {
        let next = date
            .succ_opt()
            .ok_or_else(|| format!("date out of range: {date}"))?;
        return Ok(next.and_time(NaiveTime::MIN));
    }
    Ok(date.and_time(parse_clock(clock)?))
}

/// Expand an id prefix to the single matching id.
pub fn resolve_id<'a>(
    kind: &str,
    prefix: &str,
    ids: impl Iterator<Item = &'a str>,
) -> CliResult<String> {
    let matches: Vec<&str> = ids.filter(|id| id.starts_with(prefix)).collect();
    match matches.as_slice() {
        [] => Err(format!("{kind} not found: {prefix}").into()),
        [id] => Ok((*id).to_string()),
        many => {
            if let Some(exact) = many.iter().find(|id| **id == prefix) {
                Ok((*exact).to_string())
            } else {
                Err(format!("ambiguous {kind} id '{prefix}' ({} matches)", many.len()).into())
            }
        }
    }
}

/// First eight characters of an id, for tabular output.
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_accepts_minutes_and_seconds() {
        assert_eq!(parse_clock("07:30").unwrap(), NaiveTime::from_hms_opt(7, 30, 0).unwrap());
        assert_eq!(parse_clock("07:30:15").unwrap(), NaiveTime::from_hms_opt(7, 30, 15).unwrap());
        assert!(parse_clock("7h30").is_err());
    }

    #[test]
    fn midnight_end_rolls_over() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 12).unwrap();
        assert_eq!(
            at(date, "24:00").unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 13).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
    }

    #[test]
    fn id_prefix_resolution() {
        let ids = ["abc123", "abd456", "abc"];
        assert_eq!(resolve_id("goal", "abd", ids.iter().copied()).unwrap(), "abd456");
        assert_eq!(resolve_id("goal", "abc", ids.iter().copied()).unwrap(), "abc");
        assert!(resolve_id("goal", "ab", ids.iter().copied()).is_err());
        assert!(resolve_id("goal", "zzz", ids.iter().copied()).is_err());
    }
}
