//! The key/value mapping contract shared by [`HashMap`](crate::HashMap) and
//! [`TreeMap`](crate::TreeMap).
//!
//! The trait is object safe so the backing structure can be picked at
//! runtime:
//!
//! ```
//! use keel_collections::{HashMap, Map, TreeMap};
//!
//! fn build(sorted: bool) -> Box<dyn Map<u32, &'static str>> {
//!     if sorted {
//!         Box::new(TreeMap::<u32, &'static str>::new())
//!     } else {
//!         Box::new(HashMap::<u32, &'static str>::new())
//!     }
//! }
//!
//! let mut map = build(true);
//! map.add(2, "two");
//! map.add(1, "one");
//! assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
//! ```

/// Operations every map in this crate supports.
pub trait Map<K, V> {
    /// Returns `true` if `key` is present.
    fn contains(&self, key: &K) -> bool;

    /// Associates `value` with `key`.
    ///
    /// Returns the value previously associated with `key`, or `None` if the
    /// key is new. See each implementation for how an existing key is
    /// treated.
    fn add(&mut self, key: K, value: V) -> Option<V>;

    /// Removes `key` and its value. Returns `false` if the key was absent.
    fn delete(&mut self, key: &K) -> bool;

    /// Returns the value for `key`, or `None` if absent.
    fn get_value(&self, key: &K) -> Option<&V>;

    /// Returns the first key whose value equals `value`.
    ///
    /// This is a linear scan in the order of [`keys`](Self::keys).
    fn get_key(&self, value: &V) -> Option<&K>
    where
        V: PartialEq;

    /// Returns the number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if there are no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry.
    fn clear(&mut self);

    /// Iterates the keys. Sorted maps yield ascending order.
    fn keys(&self) -> Box<dyn Iterator<Item = &K> + '_>;

    /// Iterates the values, positionally aligned with [`keys`](Self::keys).
    fn values(&self) -> Box<dyn Iterator<Item = &V> + '_>;
}
