//! Raw cache entry storage.
//!
//! Row-level operations on the `cache_entries` table. Freshness and payload
//! decoding live in [`super::TimedCache`]; this layer only moves envelopes.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A persisted cache row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub key: String,
    /// JSON envelope `{"data": ..., "timestamp": <ms>}`.
    pub envelope: String,
    /// Write time in milliseconds since the Unix epoch.
    pub written_at: i64,
    pub checksum: String,
}

/// Entry metadata without the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMeta {
    pub key: String,
    pub written_at: i64,
    pub size_bytes: i64,
}

impl CacheDb {
    /// Insert or replace the entry stored under `entry.key`.
    pub async fn put_entry(&self, entry: &StoredEntry) -> Result<(), Error> {
        let entry = entry.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO cache_entries (key, envelope, written_at, checksum)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(key) DO UPDATE SET
                        envelope = excluded.envelope,
                        written_at = excluded.written_at,
                        checksum = excluded.checksum",
                    params![entry.key, entry.envelope, entry.written_at, entry.checksum],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get the row stored under `key`.
    ///
    /// Returns None if the key doesn't exist.
    pub async fn get_entry(&self, key: &str) -> Result<Option<StoredEntry>, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<StoredEntry>, Error> {
                let mut stmt =
                    conn.prepare("SELECT key, envelope, written_at, checksum FROM cache_entries WHERE key = ?1")?;

                let result = stmt.query_row(params![key], |row| {
                    Ok(StoredEntry {
                        key: row.get(0)?,
                        envelope: row.get(1)?,
                        written_at: row.get(2)?,
                        checksum: row.get(3)?,
                    })
                });

                match result {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// List entry metadata, newest first.
    pub async fn list_entries(&self) -> Result<Vec<EntryMeta>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<EntryMeta>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT key, written_at, LENGTH(envelope) FROM cache_entries
                    ORDER BY written_at DESC, key ASC",
                )?;
                let rows = stmt.query_map([], |row| {
                    Ok(EntryMeta { key: row.get(0)?, written_at: row.get(1)?, size_bytes: row.get(2)? })
                })?;

                let mut entries = Vec::new();
                for row in rows {
                    entries.push(row?);
                }
                Ok(entries)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete one entry. Returns whether a row was removed.
    pub async fn delete_entry(&self, key: &str) -> Result<bool, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM cache_entries WHERE key = ?1", params![key])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every entry. Returns the number of deleted entries.
    pub async fn clear_entries(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM cache_entries", [])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete entries written strictly before `cutoff_ms`.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_written_before(&self, cutoff_ms: i64) -> Result<u64, Error> {
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM cache_entries WHERE written_at < ?1", params![cutoff_ms])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Purge oldest entries until count <= max_entries.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_oldest_entries(&self, max_entries: usize) -> Result<u64, Error> {
        let max = max_entries as i64;
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM cache_entries", [], |row| row.get(0))?;
                if count <= max {
                    return Ok(0);
                }

                let to_delete = count - max;
                let deleted = conn.execute(
                    "DELETE FROM cache_entries WHERE key IN (
                    SELECT key FROM cache_entries ORDER BY written_at ASC, key ASC LIMIT ?1
                )",
                    params![to_delete],
                )?;
                Ok(deleted as u64)
            })
            .await
            .map_err(Error::from)
    }
}
