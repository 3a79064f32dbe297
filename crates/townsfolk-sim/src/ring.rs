//! Fixed-capacity logs that evict their oldest entry when full.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Bounded FIFO log.
///
/// Pushing into a full log drops the oldest entry. Used for agent
/// memories, the recent-crime log and pending witness reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundedLog<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedLog<T> {
    /// Creates an empty log holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an entry, returning the evicted one if the log was full.
    pub fn push(&mut self, entry: T) -> Option<T> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    /// Maximum number of entries.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest-first iterator.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Oldest-first mutable iterator.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut()
    }

    /// Most recent entry.
    #[must_use]
    pub fn latest(&self) -> Option<&T> {
        self.entries.back()
    }

    /// Keeps only the entries matching the predicate, preserving order.
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, f: F) {
        self.entries.retain(f);
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replaces the contents, keeping only the newest `capacity` entries.
    pub fn replace_with<I: IntoIterator<Item = T>>(&mut self, items: I) {
        self.entries.clear();
        for item in items {
            self.push(item);
        }
    }
}

impl<T: Clone> BoundedLog<T> {
    /// Copies the entries into a vector, oldest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }
}
