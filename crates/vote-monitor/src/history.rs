//! Bounded tick history

use std::collections::VecDeque;

/// Default history length (100 ticks = 5 s at 20 Hz)
pub const DEFAULT_HISTORY_LEN: usize = 100;

/// Fixed-capacity window; pushing past capacity evicts the oldest entry
#[derive(Debug, Clone)]
pub struct History<T> {
    data: VecDeque<T>,
    capacity: usize,
}

impl<T> History<T> {
    /// Create a window holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.data.len() >= self.capacity {
            self.data.pop_front();
        }
        self.data.push_back(item);
    }

    /// Most recent entry
    pub fn back(&self) -> Option<&T> {
        self.data.back()
    }

    /// Entries oldest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// Last `count` entries, most recent first
    pub fn read_last(&self, count: usize) -> impl Iterator<Item = &T> {
        self.data.iter().rev().take(count)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LEN)
    }
}
