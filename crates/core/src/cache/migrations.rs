//! Cache schema versioning.
//!
//! The schema version lives in SQLite's `user_version` pragma. Each pending
//! migration runs inside its own transaction together with the version bump,
//! so a crash never leaves a half-applied step behind.

use tokio_rusqlite::{Connection, rusqlite};

use super::Error;

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "cache_entries",
    sql: include_str!("../../migrations/001_cache_entries.sql"),
}];

fn latest_version() -> i64 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Bring the schema up to date.
///
/// # Errors
///
/// Fails if a migration does not apply or the file was written by a newer
/// schema than this build knows.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        let current: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        if current > latest_version() {
            return Err(Error::MigrationFailed(format!(
                "cache schema version {current} is newer than supported version {}",
                latest_version()
            )));
        }

        for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
            apply(conn, migration)?;
            tracing::debug!(version = migration.version, name = migration.name, "applied cache migration");
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}

fn apply(conn: &mut rusqlite::Connection, migration: &Migration) -> Result<(), Error> {
    let tx = conn.transaction()?;
    tx.execute_batch(migration.sql)
        .map_err(|e| Error::MigrationFailed(format!("{}: {e}", migration.name)))?;
    tx.pragma_update(None, "user_version", migration.version)?;
    tx.commit()?;
    Ok(())
}
