//! Study session commands.

use chrono::NaiveDate;
use clap::Subcommand;
use studyplan_core::{Planner, Session, StateStore};

use super::goal::find_goal;
use super::{at, open_planner, print_json, resolve_id, short_id, week_or_current, CliResult};

#[derive(Subcommand)]
pub enum SessionAction {
    /// List sessions starting in a week
    List {
        /// Any date in the week (defaults to the current week)
        #[arg(long)]
        week: Option<NaiveDate>,
        /// Only sessions of this goal
        #[arg(long)]
        goal: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a planned session as started
    CheckIn {
        /// Session ID (or unique prefix)
        id: String,
    },
    /// Mark a session completed
    Complete {
        /// Session ID (or unique prefix)
        id: String,
    },
    /// Move a checked-in or completed session
    Move {
        /// Session ID (or unique prefix)
        id: String,
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Start time (HH:MM)
        #[arg(long)]
        start: String,
        /// End time (HH:MM)
        #[arg(long)]
        end: String,
    },
    /// Delete a session
    Delete {
        /// Session ID (or unique prefix)
        id: String,
    },
}

fn find_session<S: StateStore>(planner: &Planner<S>, prefix: &str) -> CliResult<String> {
    resolve_id(
        "session",
        prefix,
        planner.state().sessions.iter().map(|s| s.id.as_str()),
    )
}

fn print_line<S: StateStore>(planner: &Planner<S>, session: &Session) {
    let title = planner
        .state()
        .goal(&session.goal_id)
        .map(|g| g.title.as_str())
        .unwrap_or("?");
    println!(
        "{}  {} - {}  {:<10}  {}",
        short_id(&session.id),
        session.start.format("%a %Y-%m-%d %H:%M"),
        session.end.format("%H:%M"),
        session.status.as_str(),
        title,
    );
}

pub fn run(action: SessionAction, today: NaiveDate) -> CliResult {
    let mut planner = open_planner(today)?;

    match action {
        SessionAction::List { week, goal, json } => {
            let week = week_or_current(week, &planner);
            let goal_id = goal.map(|g| find_goal(&planner, &g)).transpose()?;
            let sessions: Vec<&Session> = planner
                .state()
                .sessions_in_week(week)
                .into_iter()
                .filter(|s| goal_id.as_deref().map_or(true, |g| s.goal_id == g))
                .collect();
            if json {
                print_json(&sessions)?;
            } else {
                for session in sessions {
                    print_line(&planner, session);
                }
            }
        }
        SessionAction::CheckIn { id } => {
            let id = find_session(&planner, &id)?;
            let session = planner.check_in(&id)?;
            println!("Session checked in: {}", session.id);
        }
        SessionAction::Complete { id } => {
            let id = find_session(&planner, &id)?;
            let session = planner.complete_session(&id)?;
            println!("Session completed: {}", session.id);
        }
        SessionAction::Move {
            id,
            date,
            start,
            end,
        } => {
            let id = find_session(&planner, &id)?;
            let session = planner.reschedule_session(&id, at(date, &start)?, at(date, &end)?)?;
            println!("Session moved: {}", session.id);
            print_json(&session)?;
        }
        SessionAction::Delete { id } => {
            let id = find_session(&planner, &id)?;
            let session = planner.delete_session(&id)?;
            println!("Session deleted: {}", session.id);
        }
    }
    Ok(())
}
