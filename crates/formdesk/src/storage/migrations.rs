//! Schema migrations.
//!
//! The applied version lives in `PRAGMA user_version`. Each step runs in its
//! own transaction together with the version bump, so a failed step leaves
//! the database at the previous version.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::schema::{ADD_UPDATED_AT_COLUMN, CREATE_LOCAL_STORAGE_TABLE};

/// One schema change.
#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

/// Every migration, oldest first. Versions are consecutive from 1.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create local_storage",
        sql: CREATE_LOCAL_STORAGE_TABLE,
    },
    Migration {
        version: 2,
        description: "track last write time",
        sql: ADD_UPDATED_AT_COLUMN,
    },
];

/// The version a fully migrated database is at.
#[must_use]
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Bring the database up to [`latest_version`].
///
/// # Errors
///
/// Returns an error if the database is newer than this build understands or
/// a migration fails.
pub fn migrate(conn: &Connection) -> Result<()> {
    let current = schema_version(conn)?;
    let latest = latest_version();
    if current > latest {
        return Err(Error::DatabaseMigration {
            message: format!("database is at version {current}, newest known is {latest}"),
        });
    }

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        apply(conn, migration)?;
    }
    Ok(())
}

fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    debug!(
        version = migration.version,
        "Applying migration: {}", migration.description
    );
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql)
        .map_err(|e| Error::DatabaseMigration {
            message: format!("version {} ({}): {e}", migration.version, migration.description),
        })?;
    tx.pragma_update(None, "user_version", migration.version)?;
    tx.commit()?;
    info!(version = migration.version, "Migrated database schema");
    Ok(())
}

/// The applied schema version; 0 for a fresh database.
///
/// # Errors
///
/// Returns an error if the pragma cannot be read.
pub fn schema_version(conn: &Connection) -> Result<u32> {
    let version = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_db() -> Connection {
        Connection::open_in_memory().expect("failed to create in-memory database")
    }

    fn columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .unwrap();
        let names: Vec<String> = stmt
            .query_map([], |row| row.get(1))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        names
    }

    #[test]
    fn test_versions_are_consecutive() {
        for (i, migration) in MIGRATIONS.iter().enumerate() {
            assert_eq!(migration.version as usize, i + 1);
        }
    }

    #[test]
    fn test_fresh_database_reaches_latest() {
        let conn = create_test_db();
        assert_eq!(schema_version(&conn).unwrap(), 0);

        migrate(&conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), latest_version());
        assert_eq!(columns(&conn, "local_storage"), vec!["key", "value", "updated_at"]);
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let conn = create_test_db();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), latest_version());
    }

    #[test]
    fn test_upgrade_keeps_v1_rows() {
        let conn = create_test_db();
        apply(&conn, &MIGRATIONS[0]).unwrap();
        conn.execute(
            "INSERT INTO local_storage (key, value) VALUES ('customForms', '[]')",
            [],
        )
        .unwrap();

        migrate(&conn).unwrap();
        let (value, updated_at): (String, Option<String>) = conn
            .query_row(
                "SELECT value, updated_at FROM local_storage WHERE key = 'customForms'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(value, "[]");
        assert_eq!(updated_at, None);
    }

    #[test]
    fn test_newer_database_rejected() {
        let conn = create_test_db();
        conn.pragma_update(None, "user_version", latest_version() + 1)
            .unwrap();

        let err = migrate(&conn).unwrap_err();
        assert!(matches!(err, Error::DatabaseMigration { .. }));
    }
}
