//! # Planbot Store
//!
//! SQLite-backed plan persistence: one canonical record per date, two merge
//! policies (overwrite renumbers from 1, append continues the numbering
//! sequence), and cleanup of duplicate rows on overwrite.
//!
//! Every read-modify-write runs inside a single transaction, so concurrent
//! merges for the same date never lose an update and no partial write
//! survives a failure.

pub mod numbering;

use std::path::Path;
use std::sync::Mutex;

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;

use planbot_core::error::{PlanbotError, Result};
use planbot_core::traits::PlanDraft;

const DATE_FMT: &str = "%Y-%m-%d";

/// One per-date plan record.
#[derive(Debug, Clone, Serialize)]
pub struct WorkPlan {
    pub id: i64,
    pub date: NaiveDate,
    /// Rendered as a contiguous numbered list ("1. ...", "2. ...").
    pub todo: String,
    pub progress: String,
    pub created_at: String,
}

/// Merge policy for [`PlanStore::add_or_update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Replace the date's content wholesale and renumber from 1.
    Overwrite,
    /// Concatenate after the existing plan, continuing the numbering.
    Append,
}

pub struct PlanStore {
    conn: Mutex<Connection>,
}

impl PlanStore {
    /// Open or create the plan database.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(store_err)?;
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store for tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(store_err)?;
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn migrate(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS work_plans (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                todo TEXT NOT NULL,
                progress TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            CREATE INDEX IF NOT EXISTS idx_work_plans_date ON work_plans(date);",
        )
        .map_err(store_err)
    }

    /// Merge `todo`/`progress` into the canonical row for `date`.
    ///
    /// Overwrite replaces the row's content (renumbered from 1) and prunes
    /// any other rows sharing the date, keeping the earliest-created one.
    /// Append continues the todo numbering from the existing maximum and
    /// concatenates progress as raw text — progress is never renumbered.
    pub fn add_or_update(
        &self,
        date: NaiveDate,
        todo: &str,
        progress: &str,
        mode: MergeMode,
    ) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction().map_err(store_err)?;
        let date_key = date.format(DATE_FMT).to_string();

        let canonical: Option<(i64, String, String)> = tx
            .query_row(
                "SELECT id, todo, progress FROM work_plans
                 WHERE date = ?1 ORDER BY id ASC LIMIT 1",
                [&date_key],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()
            .map_err(store_err)?;

        match canonical {
            Some((id, old_todo, old_progress)) => match mode {
                MergeMode::Overwrite => {
                    tx.execute(
                        "UPDATE work_plans SET todo = ?1, progress = ?2 WHERE id = ?3",
                        rusqlite::params![numbering::renumber(todo, 1), progress, id],
                    )
                    .map_err(store_err)?;
                    // Prune duplicates down to the earliest-created row.
                    tx.execute(
                        "DELETE FROM work_plans WHERE date = ?1 AND id != ?2",
                        rusqlite::params![date_key, id],
                    )
                    .map_err(store_err)?;
                }
                MergeMode::Append => {
                    let next_seq = numbering::next_sequence(&old_todo);
                    let new_todo =
                        format!("{old_todo}\n{}", numbering::renumber(todo, next_seq));
                    let new_progress = if old_progress.is_empty() {
                        progress.to_string()
                    } else {
                        format!("{old_progress}\n{progress}")
                    };
                    tx.execute(
                        "UPDATE work_plans SET todo = ?1, progress = ?2 WHERE id = ?3",
                        rusqlite::params![new_todo, new_progress, id],
                    )
                    .map_err(store_err)?;
                }
            },
            None => {
                tx.execute(
                    "INSERT INTO work_plans (date, todo, progress) VALUES (?1, ?2, ?3)",
                    rusqlite::params![date_key, numbering::renumber(todo, 1), progress],
                )
                .map_err(store_err)?;
            }
        }

        tx.commit().map_err(store_err)
    }

    /// Persist a batch of generated drafts. Overwrite mode with a range
    /// clears the range first, so stale days inside it disappear.
    pub fn save_drafts(
        &self,
        drafts: &[PlanDraft],
        mode: MergeMode,
        clear: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<()> {
        if mode == MergeMode::Overwrite
            && let Some((start, end)) = clear
        {
            self.clear_range(start, end)?;
            tracing::info!("cleared existing plans {start} — {end} before saving drafts");
        }
        for draft in drafts {
            self.add_or_update(draft.date, &draft.todo, &draft.progress, mode)?;
        }
        Ok(())
    }

    /// Delete every plan with a date in `[start, end]` inclusive.
    pub fn clear_range(&self, start: NaiveDate, end: NaiveDate) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM work_plans WHERE date >= ?1 AND date <= ?2",
            rusqlite::params![
                start.format(DATE_FMT).to_string(),
                end.format(DATE_FMT).to_string()
            ],
        )
        .map_err(store_err)?;
        Ok(())
    }

    pub fn clear_all(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM work_plans", []).map_err(store_err)?;
        Ok(())
    }

    /// All rows for a date, id ascending. The first row is the canonical one.
    pub fn plans_for(&self, date: NaiveDate) -> Result<Vec<WorkPlan>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, date, todo, progress, created_at FROM work_plans
                 WHERE date = ?1 ORDER BY id ASC",
            )
            .map_err(store_err)?;
        let rows = stmt
            .query_map([date.format(DATE_FMT).to_string()], row_to_plan)
            .map_err(store_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(store_err)?;
        Ok(rows)
    }

    /// All plans, ordered by date asc then id asc.
    pub fn all_plans(&self) -> Result<Vec<WorkPlan>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, date, todo, progress, created_at FROM work_plans
                 ORDER BY date ASC, id ASC",
            )
            .map_err(store_err)?;
        let rows = stmt
            .query_map([], row_to_plan)
            .map_err(store_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(store_err)?;
        Ok(rows)
    }

    /// Raw overwrite of one row by id — no renumbering.
    pub fn update(&self, id: i64, todo: &str, progress: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE work_plans SET todo = ?1, progress = ?2 WHERE id = ?3",
            rusqlite::params![todo, progress, id],
        )
        .map_err(store_err)?;
        Ok(())
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM work_plans WHERE id = ?1", [id])
            .map_err(store_err)?;
        Ok(())
    }
}

fn row_to_plan(row: &rusqlite::Row<'_>) -> rusqlite::Result<WorkPlan> {
    let date_str: String = row.get(1)?;
    let date = NaiveDate::parse_from_str(&date_str, DATE_FMT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(WorkPlan {
        id: row.get(0)?,
        date,
        todo: row.get(2)?,
        progress: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn store_err(e: rusqlite::Error) -> PlanbotError {
    PlanbotError::Store(e.to_string())
}
