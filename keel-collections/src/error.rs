//! Error types for container operations.
//!
//! Only precondition violations are errors. Plain absence (a missing key, an
//! empty queue on `poll`) is reported through `Option` or `bool` instead.

use thiserror::Error;

/// Positional access outside `[0, len)` (or `[0, len]` for insertion).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("index {index} out of range for length {len}")]
pub struct OutOfRange {
    /// The index that was requested.
    pub index: usize,
    /// Length of the sequence at the time of the call.
    pub len: usize,
}

/// The failing accessor of a queue was called while the queue was empty.
///
/// Returned by [`PriorityQueue::remove`](crate::PriorityQueue::remove) and
/// [`PriorityQueue::element`](crate::PriorityQueue::element). Use `poll`/`peek`
/// when emptiness is an expected state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("queue is empty")]
pub struct Empty;
