//! SQLite-based planner storage.
//!
//! Provides persistent storage for:
//! - Goals, in registration order
//! - Busy events
//! - Sessions of every status
//!
//! A save replaces the whole snapshot inside one transaction.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};

use super::StateStore;
use crate::error::{DatabaseError, Result, ValidationError};
use crate::schedule::{BusyEvent, Goal, PreferredWindow, Session, SessionStatus};
use crate::state::PlannerState;

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

fn format_datetime(dt: NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn parse_datetime(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let text: String = row.get(idx)?;
    text.parse::<NaiveDateTime>()
        .map_err(|e| conversion_error(idx, e))
}

fn parse_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| t.parse::<NaiveDate>().map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn parse_session_status(row: &Row<'_>, idx: usize) -> rusqlite::Result<SessionStatus> {
    let text: String = row.get(idx)?;
    match text.as_str() {
        "planned" => Ok(SessionStatus::Planned),
        "checked_in" => Ok(SessionStatus::CheckedIn),
        "completed" => Ok(SessionStatus::Completed),
        other => Err(conversion_error(
            idx,
            ValidationError::invalid_value("status", format!("unknown session status '{other}'")),
        )),
    }
}

fn format_session_status(status: SessionStatus) -> &'static str {
    status.as_str()
}

fn row_to_goal(row: &Row<'_>) -> rusqlite::Result<Goal> {
    let windows_json: String = row.get(4)?;
    let windows: Vec<PreferredWindow> =
        serde_json::from_str(&windows_json).map_err(|e| conversion_error(4, e))?;

    Ok(Goal {
        id: row.get(0)?,
        title: row.get(1)?,
        hours_per_week: row.get(2)?,
        slot_minutes: row.get(3)?,
        windows,
        completed: row.get(5)?,
        class_name: row.get(6)?,
        due_date: parse_date(row, 7)?,
        created_at: parse_datetime(row, 8)?,
    })
}

fn row_to_busy_event(row: &Row<'_>) -> rusqlite::Result<BusyEvent> {
    Ok(BusyEvent {
        id: row.get(0)?,
        title: row.get(1)?,
        start: parse_datetime(row, 2)?,
        end: parse_datetime(row, 3)?,
    })
}

fn row_to_session(row: &Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get(0)?,
        goal_id: row.get(1)?,
        start: parse_datetime(row, 2)?,
        end: parse_datetime(row, 3)?,
        status: parse_session_status(row, 4)?,
    })
}

/// SQLite-backed [`StateStore`].
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the database at `path`, creating the schema if needed.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS goals (
                id              TEXT PRIMARY KEY,
                position        INTEGER NOT NULL,
                title           TEXT NOT NULL,
                hours_per_week  REAL NOT NULL,
                slot_minutes    INTEGER NOT NULL,
                windows         TEXT NOT NULL DEFAULT '[]',
                completed       INTEGER NOT NULL DEFAULT 0,
                class_name      TEXT,
                due_date        TEXT,
                created_at      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS busy_events (
                id        TEXT PRIMARY KEY,
                position  INTEGER NOT NULL,
                title     TEXT NOT NULL,
                start_at  TEXT NOT NULL,
                end_at    TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sessions (
                id        TEXT PRIMARY KEY,
                position  INTEGER NOT NULL,
                goal_id   TEXT NOT NULL,
                start_at  TEXT NOT NULL,
                end_at    TEXT NOT NULL,
                status    TEXT NOT NULL DEFAULT 'planned'
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_goal_id ON sessions(goal_id);
            CREATE INDEX IF NOT EXISTS idx_sessions_start_at ON sessions(start_at);
            CREATE INDEX IF NOT EXISTS idx_busy_events_start_at ON busy_events(start_at);",
        )?;
        Ok(())
    }

    fn write_snapshot(&self, state: &PlannerState) -> Result<(), rusqlite::Error> {
        self.conn
            .execute_batch("DELETE FROM sessions; DELETE FROM busy_events; DELETE FROM goals;")?;

        let mut stmt = self.conn.prepare(
            "INSERT INTO goals (id, position, title, hours_per_week, slot_minutes, windows,
                                completed, class_name, due_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for (position, goal) in state.goals.iter().enumerate() {
            let windows = serde_json::to_string(&goal.windows)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
            stmt.execute(params![
                goal.id,
                position as i64,
                goal.title,
                goal.hours_per_week,
                goal.slot_minutes,
                windows,
                goal.completed,
                goal.class_name,
                goal.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
                format_datetime(goal.created_at),
            ])?;
        }

        let mut stmt = self.conn.prepare(
            "INSERT INTO busy_events (id, position, title, start_at, end_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for (position, event) in state.busy_events.iter().enumerate() {
            stmt.execute(params![
                event.id,
                position as i64,
                event.title,
                format_datetime(event.start),
                format_datetime(event.end),
            ])?;
        }

        let mut stmt = self.conn.prepare(
            "INSERT INTO sessions (id, position, goal_id, start_at, end_at, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for (position, session) in state.sessions.iter().enumerate() {
            stmt.execute(params![
                session.id,
                position as i64,
                session.goal_id,
                format_datetime(session.start),
                format_datetime(session.end),
                format_session_status(session.status),
            ])?;
        }

        Ok(())
    }
}

impl StateStore for SqliteStore {
    fn load(&self) -> Result<PlannerState> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, hours_per_week, slot_minutes, windows, completed,
                    class_name, due_date, created_at
             FROM goals ORDER BY position",
        )?;
        let goals = stmt
            .query_map([], row_to_goal)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self
            .conn
            .prepare("SELECT id, title, start_at, end_at FROM busy_events ORDER BY position")?;
        let busy_events = stmt
            .query_map([], row_to_busy_event)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT id, goal_id, start_at, end_at, status FROM sessions ORDER BY position",
        )?;
        let sessions = stmt
            .query_map([], row_to_session)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PlannerState {
            goals,
            busy_events,
            sessions,
        })
    }

    /// Replace the stored snapshot. Rolls back on any failure.
    fn save(&self, state: &PlannerState) -> Result<()> {
        self.conn.execute_batch("BEGIN IMMEDIATE TRANSACTION;")?;
        match self.write_snapshot(state) {
            Ok(()) => {
                self.conn.execute_batch("COMMIT;")?;
                Ok(())
            }
            Err(err) => {
                let _ = self.conn.execute_batch("ROLLBACK;");
                Err(err.into())
            }
        }
    }
}
