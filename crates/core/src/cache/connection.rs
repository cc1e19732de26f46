//! SQLite handle for the reference-data cache.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_rusqlite::Connection;

use super::migrations;
use crate::Error;

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
     PRAGMA synchronous=NORMAL;
     PRAGMA busy_timeout=5000;
     PRAGMA temp_store=MEMORY;";

/// Where a [`CacheDb`] keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    File(PathBuf),
    Memory,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::File(path) => write!(f, "{}", path.display()),
            Location::Memory => f.write_str(":memory:"),
        }
    }
}

/// Durable store handle.
///
/// Operations run on tokio-rusqlite's background thread. Clones share the
/// connection, so one handle can back several caches.
#[derive(Clone, Debug)]
pub struct CacheDb {
    pub(crate) conn: Connection,
    location: Arc<Location>,
}

impl CacheDb {
    /// Open (or create) the cache file at `path`, creating missing parent
    /// directories, and bring its schema up to date.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::MigrationFailed(format!("cannot create {}: {e}", parent.display())))?;
        }

        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::prepare(conn, Location::File(path.to_path_buf())).await
    }

    /// Private in-memory store; contents vanish with the last clone.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::prepare(conn, Location::Memory).await
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    async fn prepare(conn: Connection, location: Location) -> Result<Self, Error> {
        conn.call(|conn| -> Result<(), Error> {
            conn.execute_batch(PRAGMAS)?;
            Ok(())
        })
        .await
        .map_err(Error::from)?;

        migrations::run(&conn).await?;
        tracing::debug!(location = %location, "cache database ready");

        Ok(Self { conn, location: Arc::new(location) })
    }
}
