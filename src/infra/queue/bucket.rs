//! Bucketed priority queue with FIFO order inside each priority.

use std::collections::{btree_map, vec_deque, BTreeMap, VecDeque};

use crate::core::DispatchError;

/// Numeric priority. Lower values are dequeued first.
pub type Priority = i32;

/// Priority used by plain [`PriorityBucketQueue::enqueue`]; serviced last.
pub const LOWEST_PRECEDENCE: Priority = Priority::MAX;

/// Priority used by [`PriorityBucketQueue::enqueue_first`]; serviced first.
pub const HIGHEST_PRECEDENCE: Priority = Priority::MIN;

/// Ordered mapping from priority to a FIFO bucket of items.
///
/// Buckets are visited in ascending priority order and items within a bucket
/// in list order. A bucket that becomes empty is removed, so every stored
/// bucket holds at least one item.
///
/// The queue does no locking of its own; the dispatch engine serializes
/// access through its lock.
#[derive(Debug, Clone)]
pub struct PriorityBucketQueue<T> {
    buckets: BTreeMap<Priority, VecDeque<T>>,
    len: usize,
}

impl<T> Default for PriorityBucketQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PriorityBucketQueue<T> {
    /// Create an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buckets: BTreeMap::new(),
            len: 0,
        }
    }

    /// Number of queued items across all buckets.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True when no items are queued.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append at [`LOWEST_PRECEDENCE`].
    pub fn enqueue(&mut self, item: T) {
        self.enqueue_with_priority(item, LOWEST_PRECEDENCE);
    }

    /// Append to the bucket for `priority`, creating it if absent.
    pub fn enqueue_with_priority(&mut self, item: T, priority: Priority) {
        self.buckets.entry(priority).or_default().push_back(item);
        self.len += 1;
    }

    /// Insert at `position` inside the bucket for `priority`.
    ///
    /// `position` may equal the bucket length (append). An absent bucket has
    /// length zero.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::PositionOutOfRange`] when `position` is past
    /// the end of the bucket; the queue is left untouched.
    pub fn enqueue_at(
        &mut self,
        item: T,
        priority: Priority,
        position: usize,
    ) -> Result<(), DispatchError> {
        let len = self.buckets.get(&priority).map_or(0, VecDeque::len);
        if position > len {
            return Err(DispatchError::PositionOutOfRange {
                priority,
                position,
                len,
            });
        }
        self.buckets.entry(priority).or_default().insert(position, item);
        self.len += 1;
        Ok(())
    }

    /// Insert ahead of everything else. Repeated calls come out in reverse
    /// order of insertion.
    pub fn enqueue_first(&mut self, item: T) {
        self.buckets
            .entry(HIGHEST_PRECEDENCE)
            .or_default()
            .push_front(item);
        self.len += 1;
    }

    /// Remove every item matching `remove`, then insert `item` in the slot of
    /// the earliest one removed. Falls back to appending at
    /// [`LOWEST_PRECEDENCE`] when nothing matched.
    ///
    /// Returns the number of removed items.
    pub fn enqueue_remove<F>(&mut self, item: T, remove: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        self.enqueue_remove_with(item, remove, LOWEST_PRECEDENCE, false)
    }

    /// Remove every item matching `remove` from every bucket and reinsert
    /// `item`.
    ///
    /// The replacement takes the position of the first removed item in the
    /// lowest priority bucket that had a match. It is appended at `priority`
    /// instead when `dedup_to_end` is set or when nothing matched.
    ///
    /// Returns the number of removed items.
    pub fn enqueue_remove_with<F>(
        &mut self,
        item: T,
        mut remove: F,
        priority: Priority,
        dedup_to_end: bool,
    ) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let mut slot: Option<(Priority, usize)> = None;
        let mut removed = 0;

        // BTreeMap::retain walks keys in ascending order, so the first bucket
        // with a match is the lowest priority one.
        self.buckets.retain(|&bucket_priority, bucket| {
            let before = bucket.len();
            let mut index = 0;
            let mut first_removed = None;
            bucket.retain(|queued| {
                let keep = !remove(queued);
                if !keep && first_removed.is_none() {
                    first_removed = Some(index);
                }
                index += 1;
                keep
            });
            if slot.is_none() {
                slot = first_removed.map(|i| (bucket_priority, i));
            }
            removed += before - bucket.len();
            !bucket.is_empty()
        });
        self.len -= removed;

        match slot {
            Some((slot_priority, index)) if !dedup_to_end => {
                // Nothing before the first removal was dropped, so `index` is
                // still within bounds (the bucket may have been recreated empty).
                self.buckets
                    .entry(slot_priority)
                    .or_default()
                    .insert(index, item);
                self.len += 1;
            }
            _ => self.enqueue_with_priority(item, priority),
        }
        removed
    }

    /// Remove and return the front item of the lowest priority bucket.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::EmptyQueue`] when nothing is queued.
    pub fn dequeue(&mut self) -> Result<T, DispatchError> {
        self.try_dequeue().ok_or(DispatchError::EmptyQueue)
    }

    /// Remove and return the front item, or `None` when empty.
    pub fn try_dequeue(&mut self) -> Option<T> {
        let mut entry = self.buckets.first_entry()?;
        let item = entry.get_mut().pop_front();
        if entry.get().is_empty() {
            entry.remove();
        }
        if item.is_some() {
            self.len -= 1;
        }
        item
    }

    /// The item the next dequeue would return.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.buckets.values().next().and_then(VecDeque::front)
    }

    /// Drop every bucket.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.len = 0;
    }

    /// Items in dequeue order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.buckets.values().flat_map(VecDeque::iter)
    }
}

impl<'a, T> IntoIterator for &'a PriorityBucketQueue<T> {
    type Item = &'a T;
    type IntoIter = std::iter::FlatMap<
        btree_map::Values<'a, Priority, VecDeque<T>>,
        vec_deque::Iter<'a, T>,
        fn(&'a VecDeque<T>) -> vec_deque::Iter<'a, T>,
    >;

    fn into_iter(self) -> Self::IntoIter {
        let bucket_iter: fn(&'a VecDeque<T>) -> vec_deque::Iter<'a, T> = VecDeque::iter;
        self.buckets.values().flat_map(bucket_iter)
    }
}

impl<T> Extend<T> for PriorityBucketQueue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.enqueue(item);
        }
    }
}
