//! Growable ring buffer with O(1) access at both ends.
//!
//! A [`Sequence`] is a logical list stored in a fixed slot array that is
//! treated as a ring. Logical position `i` lives in physical slot
//! `(front + i) % capacity`, so pushing or popping at either end only moves
//! `front` or `len`, never the elements.
//!
//! ```text
//! capacity = 8, front = 6, len = 4
//!
//! physical: [ c ][ d ][   ][   ][   ][   ][ a ][ b ]
//!             2    3                        0    1     <- logical
//! ```
//!
//! Interior inserts and removes shift whichever side of the position is
//! shorter, so they cost `min(i, len - i)` moves.
//!
//! # Growth
//!
//! After an insertion leaves the buffer more than 3/4 full, capacity doubles
//! and the ring is re-linearized (`front` resets to 0). The buffer never
//! shrinks.
//!
//! # Example
//!
//! ```
//! use keel_collections::Sequence;
//!
//! let mut seq = Sequence::new();
//! seq.push_back(2);
//! seq.push_back(3);
//! seq.push_front(1);
//!
//! assert_eq!(seq.get(0), Some(&1));
//! assert_eq!(seq.pop_back(), Some(3));
//! assert!(seq.set(5, 10).is_err());
//! ```

use std::fmt;
use std::iter::FusedIterator;
use std::ops::{Index, IndexMut};

use crate::OutOfRange;

/// Capacity of a sequence created with [`Sequence::new`].
pub const DEFAULT_CAPACITY: usize = 20;

/// A growable circular buffer.
#[derive(Clone)]
pub struct Sequence<E> {
    /// Ring storage. Slots outside the logical range are always `None`.
    slots: Vec<Option<E>>,
    /// Physical slot of logical position 0.
    front: usize,
    len: usize,
}

impl<E> Default for Sequence<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Sequence<E> {
    /// Creates an empty sequence with [`DEFAULT_CAPACITY`] slots.
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty sequence with room for `capacity` slots.
    ///
    /// A capacity of 0 is rounded up to 1.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::new();
        slots.resize_with(capacity.max(1), || None);
        Self {
            slots,
            front: 0,
            len: 0,
        }
    }

    /// Returns the number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the sequence holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots in the ring.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    // ========================================================================
    // Positional access
    // ========================================================================

    /// Returns the element at logical position `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&E> {
        if index >= self.len {
            return None;
        }
        self.slots[self.physical(index)].as_ref()
    }

    /// Returns a mutable reference to the element at logical position `index`.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut E> {
        if index >= self.len {
            return None;
        }
        let slot = self.physical(index);
        self.slots[slot].as_mut()
    }

    /// Like [`get`](Self::get), but reports the failure as an error.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange`] if `index >= len`.
    #[inline]
    pub fn try_get(&self, index: usize) -> Result<&E, OutOfRange> {
        self.get(index).ok_or(OutOfRange {
            index,
            len: self.len,
        })
    }

    /// Replaces the element at `index`, returning the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange`] if `index >= len`; the sequence is unchanged.
    pub fn set(&mut self, index: usize, value: E) -> Result<E, OutOfRange> {
        self.check_index(index)?;
        let slot = self.physical(index);
        Ok(self.slots[slot].replace(value).expect("live slot within bounds"))
    }

    /// Inserts `value` at logical position `index`, shifting later
    /// elements back by one.
    ///
    /// `index == len` appends. Whichever side of `index` is shorter is the
    /// side that moves.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange`] if `index > len`; the sequence is unchanged.
    pub fn insert(&mut self, index: usize, value: E) -> Result<(), OutOfRange> {
        if index > self.len {
            return Err(OutOfRange {
                index,
                len: self.len,
            });
        }
        self.insert_at(index, value);
        Ok(())
    }

    /// Removes and returns the element at `index`, closing the gap.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange`] if `index >= len`; the sequence is unchanged.
    pub fn remove(&mut self, index: usize) -> Result<E, OutOfRange> {
        self.check_index(index)?;
        Ok(self.remove_at(index))
    }

    /// Swaps the elements at logical positions `a` and `b`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    #[inline]
    pub fn swap(&mut self, a: usize, b: usize) {
        assert!(
            a < self.len && b < self.len,
            "swap ({a}, {b}) out of range for length {}",
            self.len
        );
        let (pa, pb) = (self.physical(a), self.physical(b));
        self.slots.swap(pa, pb);
    }

    // ========================================================================
    // End operations
    // ========================================================================

    /// Prepends an element. O(1) amortized.
    #[inline]
    pub fn push_front(&mut self, value: E) {
        self.insert_at(0, value);
    }

    /// Appends an element. O(1) amortized.
    #[inline]
    pub fn push_back(&mut self, value: E) {
        self.insert_at(self.len, value);
    }

    /// Removes and returns the first element.
    #[inline]
    pub fn pop_front(&mut self) -> Option<E> {
        if self.is_empty() {
            None
        } else {
            Some(self.remove_at(0))
        }
    }

    /// Removes and returns the last element.
    #[inline]
    pub fn pop_back(&mut self) -> Option<E> {
        if self.is_empty() {
            None
        } else {
            Some(self.remove_at(self.len - 1))
        }
    }

    /// Returns the first element.
    #[inline]
    pub fn first(&self) -> Option<&E> {
        self.get(0)
    }

    /// Returns the last element.
    #[inline]
    pub fn last(&self) -> Option<&E> {
        self.len.checked_sub(1).and_then(|i| self.get(i))
    }

    /// Drops every element. Capacity is kept.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.front = 0;
        self.len = 0;
    }

    /// Returns a front-to-back iterator.
    #[inline]
    pub fn iter(&self) -> Iter<'_, E> {
        Iter {
            seq: self,
            head: 0,
            tail: self.len,
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    #[inline]
    fn physical(&self, index: usize) -> usize {
        (self.front + index) % self.slots.len()
    }

    #[inline]
    fn check_index(&self, index: usize) -> Result<(), OutOfRange> {
        if index < self.len {
            Ok(())
        } else {
            Err(OutOfRange {
                index,
                len: self.len,
            })
        }
    }

    /// Inserts at `index <= len`.
    fn insert_at(&mut self, index: usize, value: E) {
        debug_assert!(index <= self.len);
        // The load-factor check after every insert keeps one slot free, but
        // a capacity-1 ring starts out at the limit.
        if self.len == self.slots.len() {
            self.grow();
        }

        let cap = self.slots.len();
        if index < self.len - index {
            // Open a slot before the front and walk the hole forward.
            self.front = (self.front + cap - 1) % cap;
            for i in 0..index {
                let (hole, next) = (self.physical(i), self.physical(i + 1));
                self.slots.swap(hole, next);
            }
        } else {
            // Walk the hole at the back down to `index`.
            for i in (index..self.len).rev() {
                let (hole, prev) = (self.physical(i + 1), self.physical(i));
                self.slots.swap(hole, prev);
            }
        }

        let slot = self.physical(index);
        debug_assert!(self.slots[slot].is_none());
        self.slots[slot] = Some(value);
        self.len += 1;

        if self.len * 4 > self.slots.len() * 3 {
            self.grow();
        }
    }

    /// Removes at `index < len`. The vacated slot is left `None`.
    fn remove_at(&mut self, index: usize) -> E {
        debug_assert!(index < self.len);
        let slot = self.physical(index);
        let value = self.slots[slot].take().expect("live slot within bounds");

        if index < self.len - 1 - index {
            // Walk the hole back to the front, then advance past it.
            for i in (0..index).rev() {
                let (hole, prev) = (self.physical(i + 1), self.physical(i));
                self.slots.swap(hole, prev);
            }
            self.front = (self.front + 1) % self.slots.len();
        } else {
            for i in index + 1..self.len {
                let (hole, next) = (self.physical(i - 1), self.physical(i));
                self.slots.swap(hole, next);
            }
        }

        self.len -= 1;
        if self.len == 0 {
            self.front = 0;
        }
        value
    }

    /// Doubles capacity and re-linearizes so that `front == 0`.
    fn grow(&mut self) {
        let old_cap = self.slots.len();
        let new_cap = old_cap * 2;

        let mut slots = Vec::with_capacity(new_cap);
        for i in 0..self.len {
            let slot = self.physical(i);
            slots.push(self.slots[slot].take());
        }
        slots.resize_with(new_cap, || None);

        log::trace!(
            "sequence grow: {} -> {} slots (len {})",
            old_cap,
            new_cap,
            self.len
        );

        self.slots = slots;
        self.front = 0;
    }
}

impl<E> Index<usize> for Sequence<E> {
    type Output = E;

    fn index(&self, index: usize) -> &E {
        match self.get(index) {
            Some(value) => value,
            None => panic!("index {index} out of range for length {}", self.len),
        }
    }
}

impl<E> IndexMut<usize> for Sequence<E> {
    fn index_mut(&mut self, index: usize) -> &mut E {
        let len = self.len;
        match self.get_mut(index) {
            Some(value) => value,
            None => panic!("index {index} out of range for length {len}"),
        }
    }
}

impl<E: PartialEq> PartialEq for Sequence<E> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<E: Eq> Eq for Sequence<E> {}

impl<E: fmt::Debug> fmt::Debug for Sequence<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<E> FromIterator<E> for Sequence<E> {
    /// Collects into a sequence with [`DEFAULT_CAPACITY`] spare slots beyond
    /// the iterator's lower size bound.
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut seq = Self::with_capacity(iter.size_hint().0 + DEFAULT_CAPACITY);
        seq.extend(iter);
        seq
    }
}

impl<E> Extend<E> for Sequence<E> {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        for value in iter {
            self.push_back(value);
        }
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Borrowing iterator over a [`Sequence`], front to back.
pub struct Iter<'a, E> {
    seq: &'a Sequence<E>,
    head: usize,
    tail: usize,
}

impl<'a, E> Iterator for Iter<'a, E> {
    type Item = &'a E;

    #[inline]
    fn next(&mut self) -> Option<&'a E> {
        if self.head == self.tail {
            return None;
        }
        let item = self.seq.get(self.head);
        self.head += 1;
        item
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.tail - self.head;
        (n, Some(n))
    }
}

impl<'a, E> DoubleEndedIterator for Iter<'a, E> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a E> {
        if self.head == self.tail {
            return None;
        }
        self.tail -= 1;
        self.seq.get(self.tail)
    }
}

impl<E> ExactSizeIterator for Iter<'_, E> {}

impl<E> FusedIterator for Iter<'_, E> {}

impl<'a, E> IntoIterator for &'a Sequence<E> {
    type Item = &'a E;
    type IntoIter = Iter<'a, E>;

    fn into_iter(self) -> Iter<'a, E> {
        self.iter()
    }
}

/// Owning iterator over a [`Sequence`], front to back.
pub struct IntoIter<E> {
    seq: Sequence<E>,
}

impl<E> Iterator for IntoIter<E> {
    type Item = E;

    #[inline]
    fn next(&mut self) -> Option<E> {
        self.seq.pop_front()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.seq.len(), Some(self.seq.len()))
    }
}

impl<E> DoubleEndedIterator for IntoIter<E> {
    #[inline]
    fn next_back(&mut self) -> Option<E> {
        self.seq.pop_back()
    }
}

impl<E> ExactSizeIterator for IntoIter<E> {}

impl<E> FusedIterator for IntoIter<E> {}

impl<E> IntoIterator for Sequence<E> {
    type Item = E;
    type IntoIter = IntoIter<E>;

    fn into_iter(self) -> IntoIter<E> {
        IntoIter { seq: self }
    }
}
