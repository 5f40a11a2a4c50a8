use std::collections::VecDeque;

/// Default number of dossiers and content pieces kept in memory.
pub const DEFAULT_RETENTION: usize = 100;

/// Bounded, oldest-first buffer. Pushing at capacity evicts the oldest item.
#[derive(Debug, Clone)]
pub struct Retention<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> Retention<T> {
    /// A zero capacity is bumped to one so the latest item is always readable.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns the evicted item, if any.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() >= self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.items.iter()
    }

    /// Newest to oldest.
    pub fn newest_first(&self) -> impl Iterator<Item = &T> {
        self.items.iter().rev()
    }
}

impl<T> Default for Retention<T> {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION)
    }
}
