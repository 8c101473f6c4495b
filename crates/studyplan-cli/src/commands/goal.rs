//! Study goal commands.

use chrono::NaiveDate;
use clap::Subcommand;
use serde::Serialize;
use studyplan_core::{Goal, GoalProgress, Planner, PreferredWindow, StateStore};

use super::{open_planner, print_json, resolve_id, short_id, CliResult};

#[derive(Subcommand)]
pub enum GoalAction {
    /// Add a weekly study goal
    Add {
        /// Goal title
        title: String,
        /// Target study hours per week
        #[arg(long, default_value = "5")]
        hours: f64,
        /// Preferred session length in minutes
        #[arg(long, default_value = "60")]
        slot: u32,
        /// Preferred window as DAY:BAND, e.g. mon:morning (repeatable)
        #[arg(long = "window")]
        windows: Vec<PreferredWindow>,
        /// Class or course name
        #[arg(long = "class")]
        class_name: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
    },
    /// List goals
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a goal with this week's progress
    Show {
        /// Goal ID (or unique prefix)
        id: String,
    },
    /// Edit a goal
    Edit {
        /// Goal ID (or unique prefix)
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        hours: Option<f64>,
        #[arg(long)]
        slot: Option<u32>,
        /// Replace the windows with these (repeatable)
        #[arg(long = "window")]
        windows: Vec<PreferredWindow>,
        /// Remove every window
        #[arg(long, conflicts_with = "windows")]
        clear_windows: bool,
        #[arg(long = "class")]
        class_name: Option<String>,
        #[arg(long)]
        due: Option<NaiveDate>,
    },
    /// Mark a goal completed; its planned sessions are removed
    Complete {
        /// Goal ID (or unique prefix)
        id: String,
    },
    /// Reopen a completed goal
    Reopen {
        /// Goal ID (or unique prefix)
        id: String,
    },
    /// Delete a goal and all of its sessions
    Delete {
        /// Goal ID (or unique prefix)
        id: String,
    },
}

#[derive(Serialize)]
struct GoalDetails<'a> {
    #[serde(flatten)]
    goal: &'a Goal,
    progress: GoalProgress,
}

pub(crate) fn find_goal<S: StateStore>(planner: &Planner<S>, prefix: &str) -> CliResult<String> {
    resolve_id("goal", prefix, planner.state().goals.iter().map(|g| g.id.as_str()))
}

pub fn run(action: GoalAction, today: NaiveDate) -> CliResult {
    let mut planner = open_planner(today)?;

    match action {
        GoalAction::Add {
            title,
            hours,
            slot,
            windows,
            class_name,
            due,
        } => {
            let mut goal = Goal::new(title, hours, slot).with_windows(windows);
            goal.class_name = class_name;
            goal.due_date = due;
            let goal = planner.add_goal(goal)?;
            println!("Goal created: {}", goal.id);
            print_json(&goal)?;
        }
        GoalAction::List { json } => {
            let goals = &planner.state().goals;
            if json {
                print_json(goals)?;
            } else {
                let week = planner.current_week();
                for goal in goals {
                    let progress = planner.progress(&goal.id, week)?;
                    let windows: Vec<String> = goal.windows.iter().map(|w| w.to_string()).collect();
                    println!(
                        "{}  {}{}  {}h/week  {}min  [{}]  {}%",
                        short_id(&goal.id),
                        goal.title,
                        if goal.completed { " (completed)" } else { "" },
                        goal.hours_per_week,
                        goal.slot_minutes,
                        windows.join(", "),
                        progress.percent,
                    );
                }
            }
        }
        GoalAction::Show { id } => {
            let id = find_goal(&planner, &id)?;
            let progress = planner.progress(&id, planner.current_week())?;
            let goal = planner
                .state()
                .goal(&id)
                .ok_or_else(|| format!("goal not found: {id}"))?;
            print_json(&GoalDetails { goal, progress })?;
        }
        GoalAction::Edit {
            id,
            title,
            hours,
            slot,
            windows,
            clear_windows,
            class_name,
            due,
        } => {
            let id = find_goal(&planner, &id)?;
            let mut goal = planner
                .state()
                .goal(&id)
                .cloned()
                .ok_or_else(|| format!("goal not found: {id}"))?;
            if let Some(title) = title {
                goal.title = title;
            }
            if let Some(hours) = hours {
                goal.hours_per_week = hours;
            }
            if let Some(slot) = slot {
                goal.slot_minutes = slot;
            }
            if clear_windows {
                goal.windows.clear();
            } else if !windows.is_empty() {
                goal.windows = windows;
            }
            if class_name.is_some() {
                goal.class_name = class_name;
            }
            if due.is_some() {
                goal.due_date = due;
            }
            let goal = planner.update_goal(goal)?;
            println!("Goal updated: {}", goal.id);
            print_json(&goal)?;
        }
        GoalAction::Complete { id } => {
            let id = find_goal(&planner, &id)?;
            planner.set_goal_completed(&id, true)?;
            println!("Goal completed: {id}");
        }
        GoalAction::Reopen { id } => {
            let id = find_goal(&planner, &id)?;
            planner.set_goal_completed(&id, false)?;
            println!("Goal reopened: {id}");
        }
        GoalAction::Delete { id } => {
            let id = find_goal(&planner, &id)?;
            let goal = planner.delete_goal(&id)?;
            println!("Goal deleted: {} ({})", goal.id, goal.title);
        }
    }
    Ok(())
}
