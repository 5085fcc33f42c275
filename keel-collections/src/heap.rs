//! Binary-heap priority queue with FIFO tie-breaking, plus heap sort.
//!
//! Elements are kept in a [`Sequence`] laid out as an implicit complete
//! binary tree: the children of slot `i` are `2i + 1` and `2i + 2`, its
//! parent is `(i - 1) / 2`.
//!
//! Every offered element is stamped with an arrival tag from a counter that
//! only [`Heap::clear`] resets. The heap is ordered by the pair
//! `(priority, tag)`, so elements of equal priority leave in the order they
//! arrived and [`sort`] is stable.

use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;

use crate::{Empty, PriorityQueue, Sequence};

/// Which end of the comparator's order leaves the heap first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HeapOrder {
    /// Smallest first (min-heap).
    #[default]
    Ascending,
    /// Largest first (max-heap).
    Descending,
}

impl HeapOrder {
    #[inline]
    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            HeapOrder::Ascending => ord,
            HeapOrder::Descending => ord.reverse(),
        }
    }
}

#[derive(Debug, Clone)]
struct Tracked<E> {
    value: E,
    tag: u64,
}

/// A binary heap ordered by a comparator and a [`HeapOrder`].
///
/// `F` defaults to a plain function pointer, which is what [`Heap::new`]
/// stores (`Ord::cmp`). Any `Fn(&E, &E) -> Ordering` closure works through
/// [`Heap::with_comparator`].
///
/// # Example
///
/// ```
/// use keel_collections::{Heap, HeapOrder};
///
/// let mut jobs = Heap::with_comparator(HeapOrder::Ascending, |a: &(u8, char), b: &(u8, char)| {
///     a.0.cmp(&b.0)
/// });
/// for job in [(5, 'a'), (1, 'b'), (5, 'c'), (2, 'd'), (1, 'e')] {
///     jobs.offer(job);
/// }
///
/// let order: String = jobs.drain().map(|(_, id)| id).collect();
/// assert_eq!(order, "bedac");
/// ```
#[derive(Clone)]
pub struct Heap<E, F = fn(&E, &E) -> Ordering> {
    slots: Sequence<Tracked<E>>,
    order: HeapOrder,
    cmp: F,
    next_tag: u64,
}

impl<E: Ord> Heap<E> {
    /// Creates an empty heap using the element's natural order.
    pub fn new(order: HeapOrder) -> Self {
        let cmp: fn(&E, &E) -> Ordering = Ord::cmp;
        Self::with_comparator(order, cmp)
    }
}

impl<E: Ord> Default for Heap<E> {
    fn default() -> Self {
        Self::new(HeapOrder::Ascending)
    }
}

impl<E, F> Heap<E, F>
where
    F: Fn(&E, &E) -> Ordering,
{
    /// Creates an empty heap ordered by `cmp`.
    pub fn with_comparator(order: HeapOrder, cmp: F) -> Self {
        Self {
            slots: Sequence::new(),
            order,
            cmp,
            next_tag: 0,
        }
    }

    /// Returns the number of queued elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if nothing is queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the configured order.
    #[inline]
    pub fn order(&self) -> HeapOrder {
        self.order
    }

    /// Adds an element. Always returns `true`.
    pub fn offer(&mut self, value: E) -> bool {
        let tag = self.next_tag;
        self.next_tag += 1;
        self.slots.push_back(Tracked { value, tag });
        self.trickle_up(self.slots.len() - 1);
        true
    }

    /// Removes and returns the element at the top of the heap.
    pub fn poll(&mut self) -> Option<E> {
        let last = self.slots.len().checked_sub(1)?;
        self.slots.swap(0, last);
        let top = self.slots.pop_back()?;
        if !self.slots.is_empty() {
            self.trickle_down(0);
        }
        Some(top.value)
    }

    /// Returns the element at the top of the heap.
    #[inline]
    pub fn peek(&self) -> Option<&E> {
        self.slots.first().map(|t| &t.value)
    }

    /// Like [`poll`](Self::poll), but an empty heap is an error.
    ///
    /// # Errors
    ///
    /// Returns [`Empty`] if the heap has no elements.
    pub fn remove(&mut self) -> Result<E, Empty> {
        self.poll().ok_or(Empty)
    }

    /// Like [`peek`](Self::peek), but an empty heap is an error.
    ///
    /// # Errors
    ///
    /// Returns [`Empty`] if the heap has no elements.
    pub fn element(&self) -> Result<&E, Empty> {
        self.peek().ok_or(Empty)
    }

    /// Removes every element and restarts the arrival counter.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.next_tag = 0;
    }

    /// Visits elements in heap array order.
    ///
    /// The first element is the one [`peek`](Self::peek) returns; the rest
    /// are only partially ordered.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &E> + DoubleEndedIterator + '_ {
        self.slots.iter().map(|t| &t.value)
    }

    /// Removes elements in priority order as the iterator is advanced.
    ///
    /// Elements not yet yielded when the iterator is dropped stay queued.
    pub fn drain(&mut self) -> Drain<'_, E, F> {
        Drain { heap: self }
    }

    /// Removes elements in priority order while `pred` accepts the top.
    ///
    /// ```
    /// use keel_collections::Heap;
    ///
    /// let mut deadlines: Heap<u64> = [40, 10, 70, 20].into_iter().collect();
    /// let due: Vec<_> = deadlines.drain_while(|&at| at <= 30).collect();
    /// assert_eq!(due, vec![10, 20]);
    /// assert_eq!(deadlines.peek(), Some(&40));
    /// ```
    pub fn drain_while<P>(&mut self, pred: P) -> DrainWhile<'_, E, F, P>
    where
        P: FnMut(&E) -> bool,
    {
        DrainWhile { heap: self, pred }
    }

    /// Consumes the heap, returning its elements in removal order.
    pub fn into_sorted_vec(mut self) -> Vec<E> {
        let mut out = Vec::with_capacity(self.len());
        out.extend(self.drain());
        out
    }

    /// `true` if slot `a` must sit above slot `b`.
    #[inline]
    fn precedes(&self, a: usize, b: usize) -> bool {
        let (a, b) = (&self.slots[a], &self.slots[b]);
        self.order
            .apply((self.cmp)(&a.value, &b.value))
            .then(a.tag.cmp(&b.tag))
            .is_lt()
    }

    fn trickle_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !self.precedes(pos, parent) {
                break;
            }
            self.slots.swap(pos, parent);
            pos = parent;
        }
    }

    fn trickle_down(&mut self, mut pos: usize) {
        let len = self.slots.len();
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len && self.precedes(right, left) {
                right
            } else {
                left
            };
            if !self.precedes(child, pos) {
                break;
            }
            self.slots.swap(pos, child);
            pos = child;
        }
    }
}

impl<E, F> Extend<E> for Heap<E, F>
where
    F: Fn(&E, &E) -> Ordering,
{
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        for value in iter {
            self.offer(value);
        }
    }
}

/// Collects into an ascending (min) heap.
impl<E: Ord> FromIterator<E> for Heap<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        let mut heap = Self::new(HeapOrder::Ascending);
        heap.extend(iter);
        heap
    }
}

impl<E: fmt::Debug, F> fmt::Debug for Heap<E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heap")
            .field("order", &self.order)
            .field("elements", &DebugElements(&self.slots))
            .finish()
    }
}

struct DebugElements<'a, E>(&'a Sequence<Tracked<E>>);

impl<E: fmt::Debug> fmt::Debug for DebugElements<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter().map(|t| &t.value)).finish()
    }
}

impl<E, F> PriorityQueue<E> for Heap<E, F>
where
    F: Fn(&E, &E) -> Ordering,
{
    fn offer(&mut self, value: E) -> bool {
        Heap::offer(self, value)
    }

    fn poll(&mut self) -> Option<E> {
        Heap::poll(self)
    }

    fn peek(&self) -> Option<&E> {
        Heap::peek(self)
    }

    fn len(&self) -> usize {
        self.slots.len()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &E> + '_> {
        Box::new(Heap::iter(self))
    }
}

/// Iterator returned by [`Heap::drain`].
pub struct Drain<'a, E, F>
where
    F: Fn(&E, &E) -> Ordering,
{
    heap: &'a mut Heap<E, F>,
}

impl<E, F> Iterator for Drain<'_, E, F>
where
    F: Fn(&E, &E) -> Ordering,
{
    type Item = E;

    #[inline]
    fn next(&mut self) -> Option<E> {
        self.heap.poll()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.heap.len();
        (len, Some(len))
    }
}

impl<E, F> ExactSizeIterator for Drain<'_, E, F> where F: Fn(&E, &E) -> Ordering {}

impl<E, F> FusedIterator for Drain<'_, E, F> where F: Fn(&E, &E) -> Ordering {}

/// Iterator returned by [`Heap::drain_while`].
pub struct DrainWhile<'a, E, F, P>
where
    F: Fn(&E, &E) -> Ordering,
    P: FnMut(&E) -> bool,
{
    heap: &'a mut Heap<E, F>,
    pred: P,
}

impl<E, F, P> Iterator for DrainWhile<'_, E, F, P>
where
    F: Fn(&E, &E) -> Ordering,
    P: FnMut(&E) -> bool,
{
    type Item = E;

    fn next(&mut self) -> Option<E> {
        let top = self.heap.peek()?;
        if (self.pred)(top) {
            self.heap.poll()
        } else {
            None
        }
    }
}

// =============================================================================
// Heap sort
// =============================================================================

/// Sorts `values` ascending by their natural order.
///
/// Equal elements keep their relative order, and sorting an already sorted
/// vector leaves it unchanged.
pub fn sort<T: Ord>(values: &mut Vec<T>) {
    sort_by(values, T::cmp);
}

/// Sorts `values` ascending by `cmp`. Stable.
///
/// ```
/// use keel_collections::heap;
///
/// let mut words = vec!["pear", "fig", "apple", "kiwi"];
/// heap::sort_by(&mut words, |a, b| a.len().cmp(&b.len()));
/// assert_eq!(words, vec!["fig", "pear", "kiwi", "apple"]);
/// ```
pub fn sort_by<T, F>(values: &mut Vec<T>, cmp: F)
where
    F: Fn(&T, &T) -> Ordering,
{
    let mut heap = Heap::with_comparator(HeapOrder::Ascending, cmp);
    heap.extend(values.drain(..));
    values.extend(heap.drain());
}
