//! Busy event commands.

use chrono::NaiveDate;
use clap::Subcommand;
use studyplan_core::{Planner, StateStore};

use super::{at, open_planner, print_json, resolve_id, short_id, week_or_current, CliResult};

#[derive(Subcommand)]
pub enum BusyAction {
    /// Add a busy event
    Add {
        /// Event title
        title: String,
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Start time (HH:MM)
        #[arg(long)]
        start: String,
        /// End time (HH:MM, 24:00 for midnight)
        #[arg(long)]
        end: String,
        /// End date when the event runs past midnight
        #[arg(long)]
        end_date: Option<NaiveDate>,
    },
    /// List busy events starting in a week
    List {
        /// Any date in the week (defaults to the current week)
        #[arg(long)]
        week: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit a busy event
    Edit {
        /// Event ID (or unique prefix)
        id: String,
        #[arg(long)]
        title: Option<String>,
        /// New date; keeps the clock times unless given
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    /// Delete a busy event
    Delete {
        /// Event ID (or unique prefix)
        id: String,
    },
}

fn find_busy<S: StateStore>(planner: &Planner<S>, prefix: &str) -> CliResult<String> {
    resolve_id(
        "busy event",
        prefix,
        planner.state().busy_events.iter().map(|b| b.id.as_str()),
    )
}

pub fn run(action: BusyAction, today: NaiveDate) -> CliResult {
    let mut planner = open_planner(today)?;

    match action {
        BusyAction::Add {
            title,
            date,
            start,
            end,
            end_date,
        } => {
            let start = at(date, &start)?;
            let end = at(end_date.unwrap_or(date), &end)?;
            let event = planner.add_busy_event(title, start, end)?;
            println!("Busy event created: {}", event.id);
            print_json(&event)?;
        }
        BusyAction::List { week, json } => {
            let week = week_or_current(week, &planner);
            let events = planner.state().busy_events_in_week(week);
            if json {
                print_json(&events)?;
            } else {
                for event in events {
                    println!(
                        "{}  {} - {}  {}",
                        short_id(&event.id),
                        event.start.format("%a %Y-%m-%d %H:%M"),
                        event.end.format("%H:%M"),
                        event.title,
                    );
                }
            }
        }
        BusyAction::Edit {
            id,
            title,
            date,
            start,
            end,
        } => {
            let id = find_busy(&planner, &id)?;
            let mut event = planner
                .state()
                .busy_event(&id)
                .cloned()
                .ok_or_else(|| format!("busy event not found: {id}"))?;

            let length = event.end - event.start;
            let day = date.unwrap_or(event.start.date());
            let start_clock = start.unwrap_or_else(|| event.start.format("%H:%M:%S").to_string());
            event.start = at(day, &start_clock)?;
            event.end = match end {
                Some(end) => at(day, &end)?,
                None => event.start + length,
            };
            if let Some(title) = title {
                event.title = title;
            }

            let event = planner.update_busy_event(event)?;
            println!("Busy event updated: {}", event.id);
            print_json(&event)?;
        }
        BusyAction::Delete { id } => {
            let id = find_busy(&planner, &id)?;
            let event = planner.delete_busy_event(&id)?;
            println!("Busy event deleted: {} ({})", event.id, event.title);
        }
    }
    Ok(())
}
