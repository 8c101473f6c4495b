//! Plan commands: regeneration, free time and progress.

use chrono::{Duration, NaiveDate};
use clap::Subcommand;
use tracing::debug;

use super::goal::find_goal;
use super::{at, open_planner, print_json, week_or_current, CliResult};
use studyplan_core::{UpcomingKind, Week};

#[derive(Subcommand)]
pub enum PlanAction {
    /// Regenerate planned sessions around a week
    Regenerate {
        /// Any date in the week (defaults to the current week)
        #[arg(long)]
        week: Option<NaiveDate>,
        /// Regenerate only that week, not its neighbours
        #[arg(long)]
        only: bool,
    },
    /// Move to another week and regenerate around it
    Week {
        /// Any date in the target week
        date: NaiveDate,
    },
    /// Show free time per day
    Free {
        #[arg(long)]
        week: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show weekly progress of one goal or of all goals
    Progress {
        /// Goal ID (or unique prefix)
        goal: Option<String>,
        #[arg(long)]
        week: Option<NaiveDate>,
    },
    /// Minutes a goal still needs this week
    Remaining {
        /// Goal ID (or unique prefix)
        goal: String,
        #[arg(long)]
        week: Option<NaiveDate>,
    },
    /// Busy events and unfinished sessions coming up
    Upcoming {
        /// Clock time on today's date to start from (HH:MM, defaults to now)
        #[arg(long)]
        at: Option<String>,
        /// How many days ahead to look
        #[arg(long, default_value_t = 7)]
        days: i64,
        /// Maximum number of entries
        #[arg(long, default_value_t = 8)]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: PlanAction, today: NaiveDate) -> CliResult {
    let mut planner = open_planner(today)?;

    match action {
        PlanAction::Regenerate { week, only } => {
            let week = week_or_current(week, &planner);
            if only {
                print_json(&planner.regenerate_week(week)?)?;
            } else {
                print_json(&planner.regenerate_weeks_around(week)?)?;
            }
        }
        PlanAction::Week { date } => {
            let summaries = planner.set_current_week(Week::containing(date))?;
            print_json(&summaries)?;
        }
        PlanAction::Free { week, json } => {
            let week = week_or_current(week, &planner);
            let availability = planner.free_intervals_for_week(week);
            if json {
                print_json(&availability)?;
            } else {
                println!("Free time, {week}");
                for (day, free) in availability.iter() {
                    let spans: Vec<String> = free
                        .iter()
                        .map(|i| format!("{}-{}", i.start.format("%H:%M"), i.end.format("%H:%M")))
                        .collect();
                    println!("  {day}  {}", spans.join(" "));
                }
                println!("  total  {} min", availability.total_free_minutes());
            }
        }
        PlanAction::Progress { goal, week } => {
            let week = week_or_current(week, &planner);
            match goal {
                Some(goal) => {
                    let id = find_goal(&planner, &goal)?;
                    print_json(&planner.progress(&id, week)?)?;
                }
                None => {
                    let all = planner
                        .state()
                        .goals
                        .iter()
                        .map(|g| planner.progress(&g.id, week))
                        .collect::<Result<Vec<_>, _>>()?;
                    print_json(&all)?;
                }
            }
        }
        PlanAction::Remaining { goal, week } => {
            let week = week_or_current(week, &planner);
            let id = find_goal(&planner, &goal)?;
            println!("{}", planner.remaining_minutes(&id, week)?);
        }
        PlanAction::Upcoming {
            at: clock,
            days,
            limit,
            json,
        } => {
            let now = match clock {
                Some(clock) => at(today, &clock)?,
                None => today.and_time(chrono::Local::now().time()),
            };
            debug!(%now, days, limit, "listing upcoming items");
            let items = planner.state().upcoming(now, Duration::days(days), limit);
            if json {
                print_json(&items)?;
            } else {
                for item in items {
                    let marker = match item.kind {
                        UpcomingKind::Busy => "busy ",
                        UpcomingKind::Study => "study",
                    };
                    println!(
                        "{marker}  {} {}-{}  {}",
                        item.start.format("%a %Y-%m-%d"),
                        item.start.format("%H:%M"),
                        item.end.format("%H:%M"),
                        item.title,
                    );
                }
            }
        }
    }
    Ok(())
}
