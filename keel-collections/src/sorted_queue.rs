//! Priority queue kept as a fully sorted [`Sequence`].
//!
//! `offer` binary-searches for the slot just past every element that does
//! not compare greater, then inserts there. Equal elements therefore keep
//! their offer order, and the smallest element is always at the front, so
//! `poll` and `peek` are O(1).

use std::fmt;

use crate::{Empty, PriorityQueue, Sequence, sequence};

/// An ascending priority queue backed by a sorted ring buffer.
///
/// # Example
///
/// ```
/// use keel_collections::SortedPriorityQueue;
///
/// let mut queue = SortedPriorityQueue::new();
/// queue.offer(3);
/// queue.offer(1);
/// queue.offer(2);
///
/// assert_eq!(queue.poll(), Some(1));
/// assert_eq!(queue.poll(), Some(2));
/// assert_eq!(queue.poll(), Some(3));
/// assert_eq!(queue.poll(), None);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SortedPriorityQueue<E> {
    items: Sequence<E>,
}

impl<E> Default for SortedPriorityQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> SortedPriorityQueue<E> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            items: Sequence::new(),
        }
    }

    /// Returns the number of queued elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing is queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Removes and returns the smallest element.
    #[inline]
    pub fn poll(&mut self) -> Option<E> {
        self.items.pop_front()
    }

    /// Returns the smallest element.
    #[inline]
    pub fn peek(&self) -> Option<&E> {
        self.items.first()
    }

    /// Like [`poll`](Self::poll), but an empty queue is an error.
    ///
    /// # Errors
    ///
    /// Returns [`Empty`] if the queue has no elements.
    pub fn remove(&mut self) -> Result<E, Empty> {
        self.poll().ok_or(Empty)
    }

    /// Like [`peek`](Self::peek), but an empty queue is an error.
    ///
    /// # Errors
    ///
    /// Returns [`Empty`] if the queue has no elements.
    pub fn element(&self) -> Result<&E, Empty> {
        self.peek().ok_or(Empty)
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Iterates in removal order.
    pub fn iter(&self) -> sequence::Iter<'_, E> {
        self.items.iter()
    }
}

impl<E: Ord> SortedPriorityQueue<E> {
    /// Inserts `value` after every element that is not greater than it.
    /// Always returns `true`.
    pub fn offer(&mut self, value: E) -> bool {
        let pos = self.upper_bound(&value);
        self.items.insert(pos, value).is_ok()
    }

    fn upper_bound(&self, value: &E) -> usize {
        let (mut lo, mut hi) = (0, self.items.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if *value < self.items[mid] {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        lo
    }
}

impl<E: Ord> Extend<E> for SortedPriorityQueue<E> {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        for value in iter {
            self.offer(value);
        }
    }
}

impl<E: Ord> FromIterator<E> for SortedPriorityQueue<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        let mut queue = Self::new();
        queue.extend(iter);
        queue
    }
}

impl<'a, E> IntoIterator for &'a SortedPriorityQueue<E> {
    type Item = &'a E;
    type IntoIter = sequence::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<E> IntoIterator for SortedPriorityQueue<E> {
    type Item = E;
    type IntoIter = sequence::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<E: fmt::Debug> fmt::Debug for SortedPriorityQueue<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<E: Ord> PriorityQueue<E> for SortedPriorityQueue<E> {
    fn offer(&mut self, value: E) -> bool {
        SortedPriorityQueue::offer(self, value)
    }

    fn poll(&mut self) -> Option<E> {
        SortedPriorityQueue::poll(self)
    }

    fn peek(&self) -> Option<&E> {
        SortedPriorityQueue::peek(self)
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &E> + '_> {
        Box::new(self.items.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    /// Ordered by `priority` only, so `id` exposes tie handling.
    #[derive(Debug, Clone, Copy)]
    struct Task {
        priority: u8,
        id: u32,
    }

    impl PartialEq for Task {
        fn eq(&self, other: &Self) -> bool {
            self.priority == other.priority
        }
    }

    impl Eq for Task {}

    impl PartialOrd for Task {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    impl Ord for Task {
        fn cmp(&self, other: &Self) -> Ordering {
            self.priority.cmp(&other.priority)
        }
    }

    #[test]
    fn new_is_empty() {
        let mut queue: SortedPriorityQueue<u32> = SortedPriorityQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.peek(), None);
        assert_eq!(queue.poll(), None);
        assert_eq!(queue.element(), Err(Empty));
        assert_eq!(queue.remove(), Err(Empty));
    }

    #[test]
    fn polls_ascending() {
        let mut queue = SortedPriorityQueue::new();
        assert!(queue.offer(3));
        assert!(queue.offer(1));
        assert!(queue.offer(2));
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.poll(), Some(1));
        assert_eq!(queue.poll(), Some(2));
        assert_eq!(queue.poll(), Some(3));
        assert!(queue.is_empty());
    }

    #[test]
    fn equal_priorities_leave_in_offer_order() {
        let mut queue = SortedPriorityQueue::new();
        for (id, priority) in [2, 1, 2, 0, 1, 2].into_iter().enumerate() {
            queue.offer(Task {
                priority,
                id: id as u32,
            });
        }

        let order: Vec<_> = std::iter::from_fn(|| queue.poll())
            .map(|t| (t.priority, t.id))
            .collect();
        assert_eq!(order, vec![(0, 3), (1, 1), (1, 4), (2, 0), (2, 2), (2, 5)]);
    }

    #[test]
    fn stays_sorted_after_every_offer() {
        let mut queue = SortedPriorityQueue::new();
        for value in [50, 10, 40, 10, 90, 0, 60, 30, 30, 70, 20, 80] {
            queue.offer(value);
            let items: Vec<_> = queue.iter().collect();
            assert!(items.windows(2).all(|w| w[0] <= w[1]), "{items:?}");
        }
        assert_eq!(queue.peek(), Some(&0));
    }

    #[test]
    fn peek_and_element() {
        let mut queue: SortedPriorityQueue<_> = [5, 4].into_iter().collect();
        assert_eq!(queue.peek(), Some(&4));
        assert_eq!(queue.element(), Ok(&4));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.remove(), Ok(4));
        assert_eq!(queue.remove(), Ok(5));
    }

    #[test]
    fn clear_then_reuse() {
        let mut queue: SortedPriorityQueue<_> = (0..30).rev().collect();
        assert_eq!(queue.len(), 30);
        queue.clear();
        assert!(queue.is_empty());
        queue.offer(7);
        assert_eq!(queue.peek(), Some(&7));
    }

    #[test]
    fn iterators() {
        let queue: SortedPriorityQueue<_> = [3, 1, 2].into_iter().collect();
        assert_eq!((&queue).into_iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(queue.clone().into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(format!("{queue:?}"), "[1, 2, 3]");
    }

    #[test]
    fn trait_object_dispatch() {
        let mut queue: Box<dyn PriorityQueue<u32>> = Box::new(SortedPriorityQueue::<u32>::new());
        queue.offer(9);
        queue.offer(4);
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![4, 9]);
        assert_eq!(queue.element(), Ok(&4));
        assert_eq!(queue.poll(), Some(4));
        assert_eq!(queue.len(), 1);
    }
}
