//! SQLite-backed local state.
//!
//! Two tables: a key-value store for cached snapshots (profile, alert,
//! contact list) and the scheduled advisory reminders. Remote truth lives
//! in the document store; everything here is a local convenience.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::data_dir;
use crate::error::{CoreError, DatabaseError};
use crate::reminders::Reminder;

/// SQLite database at `~/.config/vigil/vigil.db`.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database, creating the file and schema if needed.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("vigil.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open a database at an explicit path.
    pub fn open_at(path: &std::path::Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS reminders (
                    id           TEXT PRIMARY KEY,
                    fire_at      TEXT NOT NULL,
                    lead_minutes INTEGER NOT NULL,
                    expiration   TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_reminders_fire_at ON reminders(fire_at);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    // ── Key-value store ──────────────────────────────────────────────

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    // ── Reminders ────────────────────────────────────────────────────

    pub fn insert_reminder(&self, reminder: &Reminder) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO reminders (id, fire_at, lead_minutes, expiration)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                reminder.id,
                reminder.fire_at.to_rfc3339(),
                reminder.lead_minutes,
                reminder.expiration.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn delete_reminders(&self, ids: &[String]) -> Result<(), DatabaseError> {
        for id in ids {
            self.conn
                .execute("DELETE FROM reminders WHERE id = ?1", params![id])?;
        }
        Ok(())
    }

    pub fn list_reminders(&self) -> Result<Vec<Reminder>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, fire_at, lead_minutes, expiration FROM reminders ORDER BY fire_at",
        )?;
        let rows = stmt.query_map([], row_to_reminder)?;
        collect_reminders(rows)
    }

    /// Reminders whose fire time is at or before `now`.
    pub fn due_reminders(&self, now: DateTime<Utc>) -> Result<Vec<Reminder>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, fire_at, lead_minutes, expiration FROM reminders
             WHERE fire_at <= ?1 ORDER BY fire_at",
        )?;
        let rows = stmt.query_map(params![now.to_rfc3339()], row_to_reminder)?;
        collect_reminders(rows)
    }
}

fn row_to_reminder(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, String, i64, String)> {
    Ok((
        row.get::<_, String>(0)?,
        row.get::<_, String>(1)?,
        row.get::<_, i64>(2)?,
        row.get::<_, String>(3)?,
    ))
}

fn collect_reminders(
    rows: impl Iterator<Item = rusqlite::Result<(String, String, i64, String)>>,
) -> Result<Vec<Reminder>, DatabaseError> {
    let mut reminders = Vec::new();
    for row in rows {
        let (id, fire_at, lead_minutes, expiration) = row?;
        reminders.push(Reminder {
            id,
            fire_at: parse_rfc3339(&fire_at)?,
            lead_minutes,
            expiration: parse_rfc3339(&expiration)?,
        });
    }
    Ok(reminders)
}

fn parse_rfc3339(value: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::QueryFailed(format!("bad timestamp '{value}': {e}")))
}
