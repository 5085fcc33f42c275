//! The priority-queue contract shared by [`Heap`](crate::Heap) and
//! [`SortedPriorityQueue`](crate::SortedPriorityQueue).
//!
//! Both are FIFO-stable: elements of equal priority leave in the order they
//! were offered. They differ in cost profile:
//!
//! | Queue | `offer` | `poll` | `peek` |
//! |-------|---------|--------|--------|
//! | [`Heap`](crate::Heap) | O(log n) | O(log n) | O(1) |
//! | [`SortedPriorityQueue`](crate::SortedPriorityQueue) | O(log n) search + O(n) shift | O(1) | O(1) |

use crate::Empty;

/// Operations every priority queue in this crate supports.
pub trait PriorityQueue<E> {
    /// Adds an element. Never rejects; always returns `true`.
    fn offer(&mut self, value: E) -> bool;

    /// Removes and returns the highest-priority element, or `None` if empty.
    fn poll(&mut self) -> Option<E>;

    /// Returns the highest-priority element, or `None` if empty.
    fn peek(&self) -> Option<&E>;

    /// Like [`poll`](Self::poll), but an empty queue is an error.
    ///
    /// # Errors
    ///
    /// Returns [`Empty`] if the queue has no elements.
    fn remove(&mut self) -> Result<E, Empty> {
        self.poll().ok_or(Empty)
    }

    /// Like [`peek`](Self::peek), but an empty queue is an error.
    ///
    /// # Errors
    ///
    /// Returns [`Empty`] if the queue has no elements.
    fn element(&self) -> Result<&E, Empty> {
        self.peek().ok_or(Empty)
    }

    /// Returns the number of queued elements.
    fn len(&self) -> usize;

    /// Returns `true` if nothing is queued.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visits the queued elements without removing them.
    ///
    /// A [`SortedPriorityQueue`](crate::SortedPriorityQueue) yields removal
    /// order. A [`Heap`](crate::Heap) yields its level order, which starts
    /// with the next element to leave but is otherwise only heap-ordered.
    fn iter(&self) -> Box<dyn Iterator<Item = &E> + '_>;
}
