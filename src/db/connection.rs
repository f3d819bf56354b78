use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::AppError;

/// Version stamped into `PRAGMA user_version` once the schema is in place.
pub const SCHEMA_VERSION: i64 = 1;

/// Open (creating if needed) the trip database at `path` and make sure the
/// schema is current. `main` calls this once and hands the connection on.
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open SQLite database at {}", path.display()))?;
    ensure_schema(&conn)?;
    info!(path = %path.display(), "opened trip database");
    Ok(conn)
}

/// Same schema as [`open_database`] but nothing touches the disk.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// Create the `trips` table when missing and record the schema version.
/// Files written by a newer release are refused rather than guessed at.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    let version: i64 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read schema version")?;

    if version > SCHEMA_VERSION {
        return Err(AppError::UnsupportedSchema {
            found: version,
            supported: SCHEMA_VERSION,
        }
        .into());
    }

    conn.execute(
        "CREATE TABLE IF NOT EXISTS trips (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            destination TEXT NOT NULL,
            startDate TEXT NOT NULL,
            endDate TEXT NOT NULL,
            description TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create trips table")?;

    if version < SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)
            .context("failed to record schema version")?;
        debug!(from = version, to = SCHEMA_VERSION, "migrated trip schema");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_version(conn: &Connection) -> i64 {
        conn.pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn fresh_database_gets_current_version() {
        let conn = open_in_memory().unwrap();
        assert_eq!(user_version(&conn), SCHEMA_VERSION);
    }

    #[test]
    fn ensure_schema_is_repeatable() {
        let conn = open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        assert_eq!(user_version(&conn), SCHEMA_VERSION);
    }

    #[test]
    fn newer_schema_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", SCHEMA_VERSION + 1)
            .unwrap();

        let err = ensure_schema(&conn).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::UnsupportedSchema { found: 2, supported: 1 })
        ));
    }

    #[test]
    fn open_database_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("trips.sqlite");
        open_database(&path).unwrap();
        assert!(path.exists());
    }
}
