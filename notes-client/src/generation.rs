//! Discarding stale completions.
//!
//! Calls are never cancelled, so a slow response can land after a newer one
//! for the same view. Each load takes a [`Generation`] ticket; only the
//! newest ticket's result is kept.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Ticket identifying one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Monotonic ticket counter.
#[derive(Debug, Default)]
pub struct Generations {
    latest: AtomicU64,
}

impl Generations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket newer than every ticket issued before it.
    pub fn begin(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// True if no newer ticket has been issued since `ticket`.
    #[must_use]
    pub fn is_current(&self, ticket: Generation) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }

    /// Returns `value` if `ticket` is still current, otherwise drops it.
    pub fn accept<T>(&self, ticket: Generation, value: T) -> Option<T> {
        self.is_current(ticket).then_some(value)
    }
}

/// Holds the result of the newest completed load.
///
/// Unlike [`Generations::accept`], a result is kept if no newer load has
/// *completed* yet, so an older call finishing last never overwrites a newer
/// one.
#[derive(Debug)]
pub struct Latest<T> {
    generations: Generations,
    slot: Mutex<Option<(Generation, T)>>,
}

impl<T> Default for Latest<T> {
    fn default() -> Self {
        Self {
            generations: Generations::new(),
            slot: Mutex::new(None),
        }
    }
}

impl<T: Clone> Latest<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket for a new load.
    pub fn begin(&self) -> Generation {
        self.generations.begin()
    }

    /// Stores `value` unless a newer ticket already stored a result.
    /// Returns whether it was stored.
    pub fn complete(&self, ticket: Generation, value: T) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|(stored, _)| *stored > ticket) {
            return false;
        }
        *slot = Some((ticket, value));
        true
    }

    #[must_use]
    pub fn get(&self) -> Option<T> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|(_, value)| value.clone())
    }
}
