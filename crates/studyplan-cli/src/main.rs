use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "studyplan-cli", version, about = "Weekly study planner CLI")]
struct Cli {
    /// Treat this date (YYYY-MM-DD) as today; selects the current week
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Study goal management
    Goal {
        #[command(subcommand)]
        action: commands::goal::GoalAction,
    },
    /// Busy event management
    Busy {
        #[command(subcommand)]
        action: commands::busy::BusyAction,
    },
    /// Study session tracking
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Weekly plan generation and progress
    Plan {
        #[command(subcommand)]
        action: commands::plan::PlanAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// Log to stderr, filtered by `STUDYPLAN_LOG` (default `warn`).
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("STUDYPLAN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let result = match cli.command {
        Commands::Goal { action } => commands::goal::run(action, today),
        Commands::Busy { action } => commands::busy::run(action, today),
        Commands::Session { action } => commands::session::run(action, today),
        Commands::Plan { action } => commands::plan::run(action, today),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
