//! Last-issued-wins sequencing for overlapping requests.
//!
//! Every request takes a [`Ticket`] before it starts. When it finishes, its
//! result is applied only if no newer ticket has been applied yet, so a slow
//! response can never overwrite a faster, more recent one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

/// Issuance order of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// The latest applied value and the ticket that produced it.
#[derive(Debug, Clone)]
pub struct Sequenced<T> {
    pub ticket: Option<Ticket>,
    pub value: Option<T>,
}

/// A value slot that only accepts results newer than the one it holds.
pub struct LatestOnly<T> {
    issued: Arc<AtomicU64>,
    slot: Arc<watch::Sender<Sequenced<T>>>,
}

impl<T> Clone for LatestOnly<T> {
    fn clone(&self) -> Self {
        Self { issued: Arc::clone(&self.issued), slot: Arc::clone(&self.slot) }
    }
}

impl<T> Default for LatestOnly<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LatestOnly<T> {
    pub fn new() -> Self {
        let (slot, _) = watch::channel(Sequenced { ticket: None, value: None });
        Self { issued: Arc::new(AtomicU64::new(0)), slot: Arc::new(slot) }
    }

    /// Take the next ticket.
    pub fn issue(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `ticket` is still the most recently issued one.
    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Apply `value` if `ticket` is newer than the applied one.
    ///
    /// Returns whether the value was applied.
    pub fn complete(&self, ticket: Ticket, value: T) -> bool {
        let applied = self.slot.send_if_modified(|current| {
            if current.ticket.is_some_and(|t| t >= ticket) {
                return false;
            }
            current.ticket = Some(ticket);
            current.value = Some(value);
            true
        });

        if !applied {
            tracing::debug!(ticket = ticket.0, "discarding stale completion");
        }
        applied
    }

    /// Ticket of the applied value.
    pub fn applied(&self) -> Option<Ticket> {
        self.slot.borrow().ticket
    }

    pub fn subscribe(&self) -> watch::Receiver<Sequenced<T>> {
        self.slot.subscribe()
    }
}

impl<T: Clone> LatestOnly<T> {
    /// Snapshot of the applied value.
    pub fn current(&self) -> Option<T> {
        self.slot.borrow().value.clone()
    }
}
