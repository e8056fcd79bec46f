//! SQLite-based sheet storage and mail outbox.
//!
//! Provides persistent storage for:
//! - Monthly sheets and the template, as sparse cell tables
//! - Notification mail queued by the outbox transport

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::data_dir;
use super::store::SheetStore;
use crate::error::{DatabaseError, Result};
use crate::grid::Grid;
use crate::sheet::Sheet;

/// A queued notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxRecord {
    pub id: String,
    pub sender: String,
    pub recipient: String,
    pub cc: Option<String>,
    pub subject: String,
    pub html_body: String,
    pub queued_at: DateTime<Utc>,
}

/// SQLite database holding sheets and the outbox.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/attendance/attendance.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("attendance.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at `path`.
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

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "PRAGMA foreign_keys = ON;

                CREATE TABLE IF NOT EXISTS sheets (
                    id          INTEGER PRIMARY KEY AUTOINCREMENT,
                    name        TEXT NOT NULL UNIQUE,
                    height      INTEGER NOT NULL,
                    width       INTEGER NOT NULL,
                    updated_at  TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS cells (
                    sheet_id    INTEGER NOT NULL REFERENCES sheets(id) ON DELETE CASCADE,
                    row_idx     INTEGER NOT NULL,
                    col_idx     INTEGER NOT NULL,
                    value       TEXT NOT NULL,
                    PRIMARY KEY (sheet_id, row_idx, col_idx)
                );

                CREATE TABLE IF NOT EXISTS outbox (
                    id          TEXT PRIMARY KEY,
                    sender      TEXT NOT NULL,
                    recipient   TEXT NOT NULL,
                    cc          TEXT,
                    subject     TEXT NOT NULL,
                    html_body   TEXT NOT NULL,
                    queued_at   TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_outbox_queued_at ON outbox(queued_at);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    /// Queue a message in the outbox.
    pub fn insert_outbox(&self, record: &OutboxRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO outbox (id, sender, recipient, cc, subject, html_body, queued_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.id,
                record.sender,
                record.recipient,
                record.cc,
                record.subject,
                record.html_body,
                record.queued_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Most recently queued messages first.
    pub fn outbox(&self, limit: usize) -> Result<Vec<OutboxRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, sender, recipient, cc, subject, html_body, queued_at
             FROM outbox
             ORDER BY queued_at DESC, rowid DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            let queued_at: String = row.get(6)?;
            let queued_at = DateTime::parse_from_rfc3339(&queued_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
                })?;
            Ok(OutboxRecord {
                id: row.get(0)?,
                sender: row.get(1)?,
                recipient: row.get(2)?,
                cc: row.get(3)?,
                subject: row.get(4)?,
                html_body: row.get(5)?,
                queued_at,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

impl SheetStore for Database {
    fn sheet(&self, name: &str) -> Result<Option<Sheet>> {
        let header = self
            .conn
            .query_row(
                "SELECT id, height, width FROM sheets WHERE name = ?1",
                params![name],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, usize>(1)?,
                        row.get::<_, usize>(2)?,
                    ))
                },
            )
            .optional()?;
        let Some((id, height, width)) = header else {
            return Ok(None);
        };

        let mut rows = vec![vec![String::new(); width]; height];
        let mut stmt = self
            .conn
            .prepare("SELECT row_idx, col_idx, value FROM cells WHERE sheet_id = ?1")?;
        let cells = stmt.query_map(params![id], |row| {
            Ok((
                row.get::<_, usize>(0)?,
                row.get::<_, usize>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        for cell in cells {
            let (r, c, value) = cell?;
            if r < height && c < width {
                rows[r][c] = value;
            }
        }

        Ok(Some(Sheet::new(name, Grid::from_rows(rows))))
    }

    /// Replaces the sheet's cells in one transaction.
    fn save_sheet(&mut self, sheet: &Sheet) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO sheets (name, height, width, updated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(name) DO UPDATE SET
                height = excluded.height,
                width = excluded.width,
                updated_at = excluded.updated_at",
            params![
                sheet.name,
                sheet.grid.height() as i64,
                sheet.grid.width() as i64,
                Utc::now().to_rfc3339(),
            ],
        )?;
        let id: i64 = tx.query_row(
            "SELECT id FROM sheets WHERE name = ?1",
            params![sheet.name],
            |row| row.get(0),
        )?;
        tx.execute("DELETE FROM cells WHERE sheet_id = ?1", params![id])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO cells (sheet_id, row_idx, col_idx, value) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (r, row) in sheet.grid.to_rows().iter().enumerate() {
                for (c, value) in row.iter().enumerate() {
                    if !value.is_empty() {
                        insert.execute(params![id, r as i64, c as i64, value])?;
                    }
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn sheet_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM sheets ORDER BY id")?;
        let names = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(names.collect::<Result<Vec<_>, _>>()?)
    }
}
