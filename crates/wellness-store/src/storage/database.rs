//! SQLite database handle with idempotent schema setup

use anyhow::Result;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::storage::{DATA_DIR_NAME, DB_FILE_NAME};

/// Handle to the single-file plan database.
///
/// Owns only the file path. Every operation opens its own connection,
/// does its work, and drops the connection; nothing is held open between
/// calls. Concurrent access relies on SQLite's own locking.
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Create a database handle at the given path.
    ///
    /// Creates parent directories and the schema eagerly so that a bad
    /// path or unwritable file fails here rather than on first save.
    pub fn new(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let existed = path.exists();
        let db = Self {
            path: path.to_path_buf(),
        };
        db.ensure_schema()?;

        if !existed {
            info!(path = %db.path.display(), "Created plan database");
        }
        Ok(db)
    }

    /// Open the database at its default location (`~/.wellness/wellness.db`).
    ///
    /// Falls back to the current directory when no home directory exists.
    pub fn open_default() -> Result<Self> {
        let dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DATA_DIR_NAME);
        Self::new(&dir.join(DB_FILE_NAME))
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a connection for the duration of one operation.
    pub(crate) fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;

        // Enable WAL mode for better concurrent access
        // This prevents lock contention when multiple instances try to access the database
        conn.pragma_update(None, "journal_mode", "WAL")?;

        // Set busy timeout to avoid immediate failures on lock contention
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        Ok(conn)
    }

    /// Create the plan table if it does not already exist.
    ///
    /// Safe to call any number of times; never touches existing rows.
    /// A corrupted or incompatible file surfaces as a rusqlite error.
    pub fn ensure_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        Self::ensure_schema_on(&conn)
    }

    /// Schema setup on an already-open connection, so store operations
    /// can run it defensively without opening a second connection.
    pub(crate) fn ensure_schema_on(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS fitness_plan (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                profile TEXT NOT NULL,
                plan_text TEXT NOT NULL,
                created_at TEXT NOT NULL,
                source TEXT DEFAULT 'agent',
                day_of_the_week TEXT NOT NULL
            );

            -- Index for the latest-plan lookup
            CREATE INDEX IF NOT EXISTS idx_fitness_plan_profile_day
                ON fitness_plan(profile, day_of_the_week, created_at DESC);
            "#,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::Database;

    /// Helper to create a temporary database for testing
    fn create_test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let db = Database::new(&db_path).expect("Failed to create database");
        (db, temp_dir)
    }

    #[test]
    fn test_plan_table_exists_with_expected_columns() {
        let (db, _temp) = create_test_db();

        let conn = db.connect().expect("Failed to open connection");
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name='fitness_plan'")
            .expect("Failed to prepare query");

        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .expect("Failed to query tables")
            .filter_map(Result::ok)
            .collect();

        assert!(tables.contains(&"fitness_plan".to_string()));

        let mut stmt = conn
            .prepare("PRAGMA table_info(fitness_plan)")
            .expect("Failed to prepare PRAGMA");

        let columns: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("Failed to get columns")
            .filter_map(Result::ok)
            .collect();

        assert!(columns.contains(&"id".to_string()));
        assert!(columns.contains(&"profile".to_string()));
        assert!(columns.contains(&"plan_text".to_string()));
        assert!(columns.contains(&"created_at".to_string()));
        assert!(columns.contains(&"source".to_string()));
        assert!(columns.contains(&"day_of_the_week".to_string()));
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let (db, _temp) = create_test_db();

        // Already ran once in Database::new; repeats must be no-ops
        db.ensure_schema().expect("Second ensure_schema failed");
        db.ensure_schema().expect("Third ensure_schema failed");
    }

    #[test]
    fn test_ensure_schema_preserves_existing_rows() {
        let (db, _temp) = create_test_db();

        let conn = db.connect().expect("Failed to open connection");
        conn.execute(
            "INSERT INTO fitness_plan (profile, plan_text, created_at, source, day_of_the_week)
             VALUES ('p1', 'text', '2026-01-05T09:00:00+00:00', 'agent', 'Monday')",
            [],
        )
        .expect("Failed to insert row");
        drop(conn);

        db.ensure_schema().expect("ensure_schema failed");

        let conn = db.connect().expect("Failed to open connection");
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM fitness_plan", [], |row| row.get(0))
            .expect("Failed to count rows");
        assert_eq!(count, 1, "Existing rows must survive ensure_schema");
    }

    #[test]
    fn test_wal_mode_enabled() {
        let (db, _temp) = create_test_db();

        let conn = db.connect().expect("Failed to open connection");
        let journal_mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .expect("Failed to get journal_mode");

        assert_eq!(
            journal_mode.to_lowercase(),
            "wal",
            "WAL mode should be enabled"
        );
    }

    #[test]
    fn test_new_creates_parent_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("nested").join("dir").join("test.db");

        let db = Database::new(&db_path).expect("Failed to create database");
        assert!(db.path().exists(), "Database file should exist");
    }
}
