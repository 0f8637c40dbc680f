//! Database operations using rusqlite.
//!
//! `Database` owns a single connection. Callers open an instance for the
//! scope of their work and drop it when done; there is no shared or ambient
//! connection state.

use crate::storage::schema::{CURRENT_VERSION, SCHEMA, SCHEMA_VERSION_TABLE};
use crate::workouts::types::Workout;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Result as SqliteResult};
use std::path::Path;
use thiserror::Error;

/// Storage format for the `date` column (SQLite `CURRENT_TIMESTAMP`, UTC).
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Database wrapper for SQLite operations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::IoError(e.to_string()))?;
        }

        let conn =
            Connection::open(path).map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn };
        db.ensure_schema()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn };
        db.ensure_schema()?;

        Ok(db)
    }

    /// Create the schema if it is missing.
    ///
    /// Idempotent: runs on every open and is a no-op when the tables already
    /// exist at the current version.
    pub fn ensure_schema(&self) -> Result<(), DatabaseError> {
        // Create schema version table
        self.conn
            .execute_batch(SCHEMA_VERSION_TABLE)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        // Check current version
        let current_version = self.get_schema_version()?;

        if current_version < CURRENT_VERSION {
            self.migrate(current_version)?;
        }

        Ok(())
    }

    /// Get the current schema version.
    fn get_schema_version(&self) -> Result<i32, DatabaseError> {
        let result: SqliteResult<i32> = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        );

        match result {
            Ok(version) => Ok(version),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Run database migrations.
    fn migrate(&self, from_version: i32) -> Result<(), DatabaseError> {
        if from_version < 1 {
            // Initial schema
            self.conn
                .execute_batch(SCHEMA)
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

            // Record version
            self.conn
                .execute(
                    "INSERT INTO schema_version (version, applied_at) VALUES (?, datetime('now'))",
                    [CURRENT_VERSION],
                )
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

            tracing::info!("Database migrated to version {}", CURRENT_VERSION);
        }

        // Future migrations would go here:
        // if from_version < 2 { ... }

        Ok(())
    }

    // ========== Workout Operations ==========

    /// Append one workout row and return its id.
    ///
    /// The id and timestamp are assigned by the store; the timestamp is the
    /// moment of the write. Name emptiness is the caller's concern, the store
    /// accepts any text.
    pub fn insert_workout(&self, name: &str) -> Result<i64, DatabaseError> {
        self.conn
            .execute("INSERT INTO workouts (name) VALUES (?1)", params![name])
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(self.conn.last_insert_rowid())
    }

    /// List up to `limit` workouts, most recent first.
    ///
    /// Equal timestamps are ordered by descending id, so same-second inserts
    /// come back in reverse insertion order. A non-positive limit returns an
    /// empty list without querying.
    pub fn list_recent(&self, limit: i64) -> Result<Vec<Workout>, DatabaseError> {
        if limit <= 0 {
            return Ok(Vec::new());
        }

        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, date FROM workouts
                 ORDER BY date DESC, id DESC LIMIT ?1",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![limit], |row| {
                Ok(WorkoutRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    date: row.get(2)?,
                })
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut workouts = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            workouts.push(row.into_workout()?);
        }

        Ok(workouts)
    }

    /// Count workouts in the database.
    pub fn count_workouts(&self) -> Result<usize, DatabaseError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM workouts", [], |row| row.get(0))
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(count as usize)
    }
}

/// Intermediate struct for reading workout rows from database.
struct WorkoutRow {
    id: i64,
    name: String,
    date: String,
}

impl WorkoutRow {
    fn into_workout(self) -> Result<Workout, DatabaseError> {
        let date = NaiveDateTime::parse_from_str(&self.date, DATE_FORMAT)
            .map(|dt| dt.and_utc())
            .map_err(|e| DatabaseError::DeserializationError(format!("Invalid date: {}", e)))?;

        Ok(Workout {
            id: self.id,
            name: self.name,
            date,
        })
    }
}

/// Database errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_in_memory_database() {
        let db = Database::open_in_memory().expect("Failed to create database");
        let version = db.get_schema_version().expect("Failed to get version");
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_tables_created() {
        let db = Database::open_in_memory().expect("Failed to create database");

        let tables: Vec<String> = db
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"workouts".to_string()));
        assert!(tables.contains(&"schema_version".to_string()));
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let db = Database::open_in_memory().expect("Failed to create database");

        // Second run must not error and must not duplicate the table.
        db.ensure_schema().expect("Second ensure_schema failed");

        let count: i64 = db
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='workouts'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_insert_then_list() {
        let db = Database::open_in_memory().expect("Failed to create database");

        db.insert_workout("Squat").expect("Failed to insert");

        let workouts = db.list_recent(10).expect("Failed to list");
        assert_eq!(workouts.len(), 1);
        assert_eq!(workouts[0].name, "Squat");
    }

    #[test]
    fn test_list_orders_most_recent_first() {
        let db = Database::open_in_memory().expect("Failed to create database");

        // Backdate each row so the timestamps are strictly increasing in
        // insertion order (CURRENT_TIMESTAMP has second granularity).
        for (name, date) in [
            ("A", "2024-05-01 09:00:00"),
            ("B", "2024-05-01 09:05:00"),
            ("C", "2024-05-01 09:10:00"),
        ] {
            let id = db.insert_workout(name).unwrap();
            db.conn
                .execute(
                    "UPDATE workouts SET date = ?1 WHERE id = ?2",
                    params![date, id],
                )
                .unwrap();
        }

        let names: Vec<String> = db
            .list_recent(10)
            .unwrap()
            .into_iter()
            .map(|w| w.name)
            .collect();
        assert_eq!(names, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_equal_timestamps_order_by_id_descending() {
        let db = Database::open_in_memory().expect("Failed to create database");

        // All rows land within the same second, so ordering falls back to
        // the id tie-break.
        for name in ["First", "Second", "Third"] {
            db.insert_workout(name).unwrap();
        }

        let names: Vec<String> = db
            .list_recent(10)
            .unwrap()
            .into_iter()
            .map(|w| w.name)
            .collect();
        assert_eq!(names, vec!["Third", "Second", "First"]);
    }

    #[test]
    fn test_list_respects_limit() {
        let db = Database::open_in_memory().expect("Failed to create database");

        for i in 1..=15 {
            db.insert_workout(&format!("Workout {}", i)).unwrap();
        }

        let workouts = db.list_recent(5).expect("Failed to list");
        assert_eq!(workouts.len(), 5);

        // The five most recent inserts, newest first.
        let names: Vec<String> = workouts.into_iter().map(|w| w.name).collect();
        assert_eq!(
            names,
            vec![
                "Workout 15",
                "Workout 14",
                "Workout 13",
                "Workout 12",
                "Workout 11"
            ]
        );
    }

    #[test]
    fn test_list_with_non_positive_limit_is_empty() {
        let db = Database::open_in_memory().expect("Failed to create database");

        db.insert_workout("Deadlift").unwrap();

        assert!(db.list_recent(0).unwrap().is_empty());
        assert!(db.list_recent(-3).unwrap().is_empty());
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let db = Database::open_in_memory().expect("Failed to create database");

        let mut ids = Vec::new();
        for i in 0..8 {
            ids.push(db.insert_workout(&format!("Set {}", i)).unwrap());
        }

        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1], "ids must increase in insertion order");
        }
    }

    #[test]
    fn test_empty_name_is_accepted_by_the_store() {
        // Presence-of-name is enforced by the web layer, not here.
        let db = Database::open_in_memory().expect("Failed to create database");

        db.insert_workout("").expect("Store rejected empty name");
        assert_eq!(db.count_workouts().unwrap(), 1);
    }

    #[test]
    fn test_reopen_preserves_rows() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("trainlog.db");

        {
            let db = Database::open(&path).expect("Failed to create database");
            db.insert_workout("Bench Press").unwrap();
        }

        // Reopening runs ensure_schema against the existing file.
        let db = Database::open(&path).expect("Failed to reopen database");
        let workouts = db.list_recent(10).unwrap();
        assert_eq!(workouts.len(), 1);
        assert_eq!(workouts[0].name, "Bench Press");
    }

    #[test]
    fn test_stored_date_parses() {
        let db = Database::open_in_memory().expect("Failed to create database");

        db.insert_workout("Row").unwrap();

        // into_workout would fail on an unparseable timestamp.
        let workouts = db.list_recent(1).expect("Failed to read back row");
        assert_eq!(workouts.len(), 1);
    }
}
