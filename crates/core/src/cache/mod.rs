//! SQLite-backed cache for reference collections.
//!
//! This module provides a persistent time-to-live cache using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - One envelope per collection key, checksummed with SHA-256
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Explicit purge strategies (age, capacity, key)

pub mod clock;
pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod timed;

pub use crate::Error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use connection::{CacheDb, Location};
pub use entries::{EntryMeta, StoredEntry};
pub use timed::{CacheEntry, DEFAULT_TTL, TimedCache};
