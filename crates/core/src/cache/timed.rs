//! Time-to-live cache over the durable store.
//!
//! Entries are persisted as `{"data": ..., "timestamp": <ms>}` envelopes.
//! Expiry is logical: a read at or past `timestamp + ttl` is a miss, but the
//! row stays until the next `set` replaces it or an explicit purge runs.
//! Anything unreadable (storage failure, checksum mismatch, shape mismatch,
//! a timestamp from the future) degrades to a miss.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::clock::{Clock, SystemClock};
use super::connection::CacheDb;
use super::entries::StoredEntry;
use super::hash::{envelope_checksum, verify_checksum};
use crate::Error;

/// Default TTL for every reference collection (24 hours).
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// A decoded cache entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    pub key: String,
    pub payload: T,
    /// Write time in milliseconds since the Unix epoch.
    pub written_at: i64,
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    data: &'a T,
    timestamp: i64,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
    timestamp: i64,
}

/// Key/value cache with a fixed time-to-live.
#[derive(Debug, Clone)]
pub struct TimedCache {
    db: CacheDb,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TimedCache {
    /// Create a cache on `db` using the system clock.
    pub fn new(db: CacheDb, ttl: Duration) -> Self {
        Self::with_clock(db, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(db: CacheDb, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { db, ttl, clock }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    fn ttl_millis(&self) -> i64 {
        i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX)
    }

    /// Payload stored under `key` if present and fresh.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.entry(key).await.map(|entry| entry.payload)
    }

    /// Full entry stored under `key` if present and fresh.
    pub async fn entry<T: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<T>> {
        let row = match self.db.get_entry(key).await {
            Ok(Some(row)) => row,
            Ok(None) => {
                tracing::debug!(key, "cache miss");
                return None;
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "cache store unreadable, treating as miss");
                return None;
            }
        };

        let now = self.clock.now_millis();
        let entry = match decode::<T>(&row, now) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding corrupted cache entry");
                return None;
            }
        };

        let age = now - entry.written_at;
        if age >= self.ttl_millis() {
            tracing::debug!(key, age_ms = age, "cache entry expired");
            return None;
        }

        tracing::debug!(key, age_ms = age, "cache hit");
        Some(entry)
    }

    /// Persist `payload` under `key`, replacing any prior entry.
    ///
    /// Returns the write timestamp.
    pub async fn set<T: Serialize>(&self, key: &str, payload: &T) -> Result<i64, Error> {
        let written_at = self.clock.now_millis();
        let envelope = serde_json::to_string(&EnvelopeRef { data: payload, timestamp: written_at })?;
        let entry = StoredEntry {
            key: key.to_string(),
            checksum: envelope_checksum(key, &envelope),
            envelope,
            written_at,
        };

        self.db.put_entry(&entry).await?;
        tracing::debug!(key, written_at, "cache entry stored");
        Ok(written_at)
    }

    /// Remove `key` regardless of freshness.
    pub async fn invalidate(&self, key: &str) -> Result<bool, Error> {
        self.db.delete_entry(key).await
    }

    /// Physically delete entries whose age has reached the TTL.
    pub async fn purge_expired(&self) -> Result<u64, Error> {
        let cutoff = self.clock.now_millis().saturating_sub(self.ttl_millis()).saturating_add(1);
        self.db.purge_written_before(cutoff).await
    }

    /// Keep only the `max_entries` most recently written entries.
    pub async fn evict_to_capacity(&self, max_entries: usize) -> Result<u64, Error> {
        self.db.purge_oldest_entries(max_entries).await
    }
}

fn decode<T: DeserializeOwned>(row: &StoredEntry, now: i64) -> Result<CacheEntry<T>, Error> {
    if !verify_checksum(&row.key, &row.envelope, &row.checksum) {
        return Err(Error::CacheCorrupted(format!("{}: checksum mismatch", row.key)));
    }

    let envelope: Envelope<T> = serde_json::from_str(&row.envelope)
        .map_err(|e| Error::CacheCorrupted(format!("{}: {e}", row.key)))?;

    if envelope.timestamp > now {
        return Err(Error::CacheCorrupted(format!(
            "{}: timestamp {} is in the future",
            row.key, envelope.timestamp
        )));
    }

    Ok(CacheEntry { key: row.key.clone(), payload: envelope.data, written_at: envelope.timestamp })
}
