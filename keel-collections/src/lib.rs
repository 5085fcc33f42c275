//! General-purpose containers behind two small contracts.
//!
//! Every structure here owns its elements. Positional storage is a growable
//! ring buffer, [`Sequence`], and the priority queues are built on top of it.
//! The maps are independent of it: [`HashMap`] chains entries into prime-sized
//! bucket tables, and [`TreeMap`] links nodes inside a slab arena.
//!
//! ```text
//! Sequence ──┬── Heap                  (PriorityQueue)
//!            └── SortedPriorityQueue   (PriorityQueue)
//!
//! HashMap                              (Map)
//! TreeMap ── slab::Slab<Node>          (Map)
//! ```
//!
//! # Quick Start
//!
//! ```
//! use keel_collections::{Heap, HeapOrder, TreeMap};
//!
//! let mut index: TreeMap<&str, u32> = TreeMap::new();
//! index.add("gamma", 3);
//! index.add("alpha", 1);
//! assert_eq!(index.first(), Some((&"alpha", &1)));
//!
//! let mut tasks = Heap::new(HeapOrder::Descending);
//! tasks.offer(2);
//! tasks.offer(7);
//! assert_eq!(tasks.poll(), Some(7));
//! ```
//!
//! # Data Structures
//!
//! | Structure | Contract | Key Operations |
//! |-----------|----------|----------------|
//! | [`Sequence`] | positional | O(1) amortized push/pop at both ends, insert/remove shift the shorter side |
//! | [`HashMap`] | [`Map`] | O(1) expected lookup, resizes to primes on load thresholds |
//! | [`TreeMap`] | [`Map`] | O(height) lookup, ascending iteration, no rebalancing |
//! | [`Heap`] | [`PriorityQueue`] | O(log n) offer/poll, FIFO among equal priorities |
//! | [`SortedPriorityQueue`] | [`PriorityQueue`] | O(n) offer, O(1) poll, FIFO among equal priorities |
//!
//! # Errors
//!
//! Absence is reported with `Option` or `bool`. The two conditions callers
//! usually want to propagate have their own error types: [`OutOfRange`] for
//! positional access past the end of a [`Sequence`], and [`Empty`] for
//! `remove`/`element` on an empty queue.
//!
//! # Logging
//!
//! Resizes are reported through the [`log`] facade: `debug` for hash table
//! rehashes and `trace` for ring buffer growth. Nothing is logged unless the
//! application installs a logger.

#![warn(missing_docs)]

pub mod error;
pub mod hash_map;
pub mod heap;
mod index;
pub mod map;
pub mod queue;
pub mod sequence;
pub mod sorted_queue;
pub mod tree_map;

pub use error::{Empty, OutOfRange};
pub use hash_map::{HashMap, ResizePolicy, ShrinkTarget};
pub use heap::{Heap, HeapOrder};
pub use map::Map;
pub use queue::PriorityQueue;
pub use sequence::Sequence;
pub use sorted_queue::SortedPriorityQueue;
pub use tree_map::TreeMap;
