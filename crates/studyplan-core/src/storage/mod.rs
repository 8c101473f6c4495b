mod config;
mod database;
mod json_store;

pub use config::{Config, StorageBackend, StorageConfig};
pub use database::SqliteStore;
pub use json_store::JsonStore;

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::state::PlannerState;

/// Loads and saves whole planner snapshots.
///
/// A saved snapshot must load back unchanged. Saves are atomic: a failed save
/// leaves the previous snapshot in place.
pub trait StateStore {
    fn load(&self) -> Result<PlannerState>;
    fn save(&self, state: &PlannerState) -> Result<()>;
}

impl<T: StateStore + ?Sized> StateStore for Box<T> {
    fn load(&self) -> Result<PlannerState> {
        (**self).load()
    }

    fn save(&self, state: &PlannerState) -> Result<()> {
        (**self).save(state)
    }
}

/// Returns the data directory, creating it if needed.
///
/// `STUDYPLAN_HOME` wins when set. Otherwise `~/.config/studyplan`, or
/// `~/.config/studyplan-dev` with `STUDYPLAN_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("STUDYPLAN_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("STUDYPLAN_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("studyplan-dev")
            } else {
                base_dir.join("studyplan")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Open the backend selected in `config`, with its files under `dir`.
pub fn open_store(config: &Config, dir: &Path) -> Result<Box<dyn StateStore>> {
    Ok(match config.storage.backend {
        StorageBackend::Sqlite => Box::new(SqliteStore::open_at(&dir.join("studyplan.db"))?),
        StorageBackend::Json => Box::new(JsonStore::new(dir.join("state.json"))),
    })
}
