//! Separate-chaining hash map with prime bucket counts.
//!
//! Entries live in an array of buckets; each bucket is an unordered list of
//! `(K, V)` pairs. The bucket for a key is `hash(key) % bucket_count`.
//!
//! # Resizing
//!
//! After every insert or delete that changes the entry count, the load
//! factor `len / bucket_count` is checked against a [`ResizePolicy`]:
//!
//! - above `grow_at` (default 0.75): the bucket count becomes the smallest
//!   prime greater than twice the current count;
//! - below `shrink_at` (default 0.15): the bucket count drops to the target
//!   chosen by [`ShrinkTarget`].
//!
//! Every resize rebuilds the bucket array and moves each entry to its new
//! bucket. Entries are moved, never cloned.
//!
//! # Example
//!
//! ```
//! use keel_collections::HashMap;
//!
//! let mut map = HashMap::new();
//! assert_eq!(map.bucket_count(), 3);
//!
//! for i in 0..10 {
//!     assert_eq!(map.add(i, i * 10), None);
//! }
//! assert!(map.bucket_count() > 3);
//!
//! assert_eq!(map.add(4, 44), Some(40));
//! assert_eq!(map.get_value(&4), Some(&44));
//! assert!(map.delete(&4));
//! assert!(!map.delete(&4));
//! ```

use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::iter::FusedIterator;

use crate::Map;

/// Bucket count of a map created with [`HashMap::new`].
pub const DEFAULT_BUCKETS: usize = 3;

/// How far the bucket array shrinks once the load factor drops below
/// [`ResizePolicy::shrink_at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShrinkTarget {
    /// Smallest prime bucket count that keeps the load factor at or below
    /// 0.5, but never below the map's initial bucket count.
    ///
    /// The post-shrink load factor sits between the default thresholds, so
    /// a single insert or delete cannot immediately trigger the opposite
    /// resize.
    #[default]
    HalfLoad,
    /// The bucket count the map had before its most recent growth.
    ///
    /// A map that has never grown does not shrink. Near the thresholds this
    /// can alternate between growing and shrinking on consecutive calls.
    PreviousPrime,
}

/// Load-factor thresholds that drive resizing.
///
/// # Example
///
/// ```
/// use keel_collections::{HashMap, ResizePolicy, ShrinkTarget};
///
/// let policy = ResizePolicy {
///     grow_at: 1.0,
///     shrink_at: 0.1,
///     shrink_to: ShrinkTarget::PreviousPrime,
/// };
/// let map: HashMap<u32, u32> = HashMap::with_policy(policy);
/// assert_eq!(map.policy().grow_at, 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizePolicy {
    /// Grow when the load factor rises strictly above this value.
    pub grow_at: f64,
    /// Shrink when the load factor falls strictly below this value.
    pub shrink_at: f64,
    /// Where a shrink lands.
    pub shrink_to: ShrinkTarget,
}

impl Default for ResizePolicy {
    fn default() -> Self {
        Self {
            grow_at: 0.75,
            shrink_at: 0.15,
            shrink_to: ShrinkTarget::HalfLoad,
        }
    }
}

impl ResizePolicy {
    fn validate(&self) {
        assert!(
            self.grow_at.is_finite() && self.grow_at > 0.0,
            "grow_at must be a positive finite load factor"
        );
        assert!(
            self.shrink_at >= 0.0 && self.shrink_at < self.grow_at,
            "shrink_at must be in [0, grow_at)"
        );
    }
}

/// A hash map with separate chaining and prime-sized bucket arrays.
///
/// `S` is the hasher factory, as with [`std::collections::HashMap`].
#[derive(Clone)]
pub struct HashMap<K, V, S = RandomState> {
    buckets: Vec<Vec<(K, V)>>,
    len: usize,
    /// Bucket count before the most recent growth; 0 if never grown.
    last_prime: usize,
    /// Bucket count restored by `clear` and floor for `HalfLoad` shrinks.
    initial_buckets: usize,
    policy: ResizePolicy,
    hasher: S,
}

impl<K, V> HashMap<K, V, RandomState> {
    /// Creates an empty map with [`DEFAULT_BUCKETS`] buckets.
    pub fn new() -> Self {
        Self::with_buckets(DEFAULT_BUCKETS)
    }

    /// Creates an empty map with `buckets` buckets (at least 1).
    pub fn with_buckets(buckets: usize) -> Self {
        Self::with_buckets_and_hasher(buckets, RandomState::new())
    }

    /// Creates an empty map with a custom resize policy.
    ///
    /// # Panics
    ///
    /// Panics if the policy thresholds are not `0 <= shrink_at < grow_at`.
    pub fn with_policy(policy: ResizePolicy) -> Self {
        Self::with_buckets_policy_and_hasher(DEFAULT_BUCKETS, policy, RandomState::new())
    }
}

impl<K, V, S> HashMap<K, V, S> {
    /// Creates an empty map using `hasher` to hash keys.
    pub fn with_buckets_and_hasher(buckets: usize, hasher: S) -> Self {
        Self::with_buckets_policy_and_hasher(buckets, ResizePolicy::default(), hasher)
    }

    /// Creates an empty map with every knob specified.
    ///
    /// # Panics
    ///
    /// Panics if the policy thresholds are not `0 <= shrink_at < grow_at`.
    pub fn with_buckets_policy_and_hasher(buckets: usize, policy: ResizePolicy, hasher: S) -> Self {
        policy.validate();
        let buckets = buckets.max(1);
        Self {
            buckets: empty_buckets(buckets),
            len: 0,
            last_prime: 0,
            initial_buckets: buckets,
            policy,
            hasher,
        }
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the map has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the current number of buckets.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `len / bucket_count`.
    #[inline]
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.buckets.len() as f64
    }

    /// Returns the resize policy.
    #[inline]
    pub fn policy(&self) -> &ResizePolicy {
        &self.policy
    }

    /// Returns the hasher factory.
    #[inline]
    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Removes every entry and restores the initial bucket count.
    pub fn clear(&mut self) {
        self.buckets = empty_buckets(self.initial_buckets);
        self.len = 0;
        self.last_prime = 0;
    }

    /// Iterates `(key, value)` pairs in bucket order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            current: Default::default(),
            remaining: self.len,
        }
    }

    /// Iterates keys in bucket order.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    /// Iterates values in the same order as [`keys`](Self::keys).
    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Returns the first key (in bucket order) whose value equals `value`.
    pub fn get_key(&self, value: &V) -> Option<&K>
    where
        V: PartialEq,
    {
        self.iter().find(|(_, v)| *v == value).map(|(k, _)| k)
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Returns `true` if `key` is present.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_value(key).is_some()
    }

    /// Returns the value for `key`.
    pub fn get_value<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let bucket = self.bucket_of(key);
        self.buckets[bucket]
            .iter()
            .find(|(k, _)| k.borrow() == key)
            .map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value for `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let bucket = self.bucket_of(key);
        self.buckets[bucket]
            .iter_mut()
            .find(|(k, _)| k.borrow() == key)
            .map(|(_, v)| v)
    }

    /// Inserts or overwrites the value for `key`.
    ///
    /// Returns the previous value if the key was present. Overwriting keeps
    /// the entry count unchanged and never resizes.
    pub fn add(&mut self, key: K, value: V) -> Option<V> {
        let bucket = self.bucket_of(&key);
        if let Some((_, slot)) = self.buckets[bucket].iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(slot, value));
        }

        self.buckets[bucket].push((key, value));
        self.len += 1;
        self.rebalance();
        None
    }

    /// Removes `key`, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let bucket = self.bucket_of(key);
        let pos = self.buckets[bucket]
            .iter()
            .position(|(k, _)| k.borrow() == key)?;

        // Bucket order is not significant.
        let (_, value) = self.buckets[bucket].swap_remove(pos);
        self.len -= 1;
        self.rebalance();
        Some(value)
    }

    /// Removes `key`. Returns `false` if it was absent.
    #[inline]
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove(key).is_some()
    }

    #[inline]
    fn bucket_of<Q: Hash + ?Sized>(&self, key: &Q) -> usize {
        bucket_index(&self.hasher, key, self.buckets.len())
    }

    fn rebalance(&mut self) {
        let load = self.load_factor();
        if load > self.policy.grow_at {
            self.grow();
        } else if load < self.policy.shrink_at {
            self.shrink();
        }
    }

    fn grow(&mut self) {
        let current = self.buckets.len();
        let target = next_prime_above(current * 2);
        self.last_prime = current;
        self.rehash(target, "grow");
    }

    fn shrink(&mut self) {
        let current = self.buckets.len();
        let target = match self.policy.shrink_to {
            ShrinkTarget::HalfLoad => prime_at_least((self.len * 2).max(self.initial_buckets)),
            ShrinkTarget::PreviousPrime => self.last_prime,
        };
        if target == 0 || target >= current {
            return;
        }
        self.rehash(target, "shrink");
    }

    fn rehash(&mut self, bucket_count: usize, reason: &'static str) {
        let old = std::mem::replace(&mut self.buckets, empty_buckets(bucket_count));
        let old_count = old.len();

        for (key, value) in old.into_iter().flatten() {
            let bucket = bucket_index(&self.hasher, &key, bucket_count);
            self.buckets[bucket].push((key, value));
        }

        log::debug!(
            "hash map {}: {} -> {} buckets (len {}, load {:.3})",
            reason,
            old_count,
            bucket_count,
            self.len,
            self.load_factor()
        );
    }
}

impl<K, V> Default for HashMap<K, V, RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> fmt::Debug for HashMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.add(key, value);
        }
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for HashMap<K, V, RandomState> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K, V, S> Map<K, V> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn contains(&self, key: &K) -> bool {
        HashMap::contains(self, key)
    }

    fn add(&mut self, key: K, value: V) -> Option<V> {
        HashMap::add(self, key, value)
    }

    fn delete(&mut self, key: &K) -> bool {
        HashMap::delete(self, key)
    }

    fn get_value(&self, key: &K) -> Option<&V> {
        HashMap::get_value(self, key)
    }

    fn get_key(&self, value: &V) -> Option<&K>
    where
        V: PartialEq,
    {
        HashMap::get_key(self, value)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        HashMap::clear(self);
    }

    fn keys(&self) -> Box<dyn Iterator<Item = &K> + '_> {
        Box::new(HashMap::keys(self))
    }

    fn values(&self) -> Box<dyn Iterator<Item = &V> + '_> {
        Box::new(HashMap::values(self))
    }
}

// =============================================================================
// Iterator
// =============================================================================

/// Iterator over the entries of a [`HashMap`], in bucket order.
pub struct Iter<'a, K, V> {
    buckets: std::slice::Iter<'a, Vec<(K, V)>>,
    current: std::slice::Iter<'a, (K, V)>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((k, v)) = self.current.next() {
                self.remaining -= 1;
                return Some((k, v));
            }
            self.current = self.buckets.next()?.iter();
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

// =============================================================================
// Helpers
// =============================================================================

fn empty_buckets<K, V>(count: usize) -> Vec<Vec<(K, V)>> {
    let mut buckets = Vec::with_capacity(count);
    buckets.resize_with(count, Vec::new);
    buckets
}

/// The hash is unsigned, so the remainder is always a valid bucket.
#[inline]
fn bucket_index<S: BuildHasher, Q: Hash + ?Sized>(hasher: &S, key: &Q, count: usize) -> usize {
    (hasher.hash_one(key) % count as u64) as usize
}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut divisor = 3;
    while divisor * divisor <= n {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}

/// Smallest prime strictly greater than `n`.
fn next_prime_above(n: usize) -> usize {
    let mut candidate = n + 1;
    while !is_prime(candidate) {
        candidate += 1;
    }
    candidate
}

/// Smallest prime greater than or equal to `n`.
fn prime_at_least(n: usize) -> usize {
    next_prime_above(n.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::hash::{BuildHasherDefault, Hasher};

    /// Sends every key to the same bucket.
    #[derive(Default)]
    struct Collide;

    impl Hasher for Collide {
        fn finish(&self) -> u64 {
            0
        }
        fn write(&mut self, _: &[u8]) {}
    }

    /// Hashes an integer key to its own bit pattern.
    #[derive(Default)]
    struct Identity(u64);

    impl Hasher for Identity {
        fn finish(&self) -> u64 {
            self.0
        }
        fn write(&mut self, bytes: &[u8]) {
            for &b in bytes {
                self.0 = (self.0 << 8) | u64::from(b);
            }
        }
        fn write_u64(&mut self, n: u64) {
            self.0 = n;
        }
        fn write_i64(&mut self, n: i64) {
            self.0 = n as u64;
        }
    }

    #[test]
    fn primes() {
        let found: Vec<_> = (0..30).filter(|&n| is_prime(n)).collect();
        assert_eq!(found, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);

        assert_eq!(next_prime_above(6), 7);
        assert_eq!(next_prime_above(7), 11);
        assert_eq!(next_prime_above(14), 17);
        assert_eq!(prime_at_least(7), 7);
        assert_eq!(prime_at_least(8), 11);
        assert_eq!(prime_at_least(0), 2);
    }

    #[test]
    fn new_is_empty() {
        let map: HashMap<u32, u32> = HashMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert_eq!(map.bucket_count(), DEFAULT_BUCKETS);
        assert_eq!(map.get_value(&1), None);
        assert_eq!(map.iter().count(), 0);
    }

    #[test]
    fn ten_keys_grow_and_resolve() {
        let mut map = HashMap::new();
        for i in 0..10u32 {
            map.add(i, format!("v{i}"));
        }

        assert_eq!(map.len(), 10);
        assert!(map.bucket_count() > DEFAULT_BUCKETS);
        for i in 0..10u32 {
            assert_eq!(map.get_value(&i), Some(&format!("v{i}")));
        }
    }

    #[test]
    fn growth_sequence_is_next_prime_above_double() {
        let mut map = HashMap::new();
        let mut seen = vec![map.bucket_count()];
        for i in 0..25u32 {
            map.add(i, ());
            if *seen.last().unwrap() != map.bucket_count() {
                seen.push(map.bucket_count());
            }
        }
        assert_eq!(seen, vec![3, 7, 17, 37]);
    }

    #[test]
    fn upsert_returns_previous() {
        let mut map = HashMap::new();
        assert_eq!(map.add("k", 1), None);
        assert_eq!(map.add("k", 2), Some(1));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get_value("k"), Some(&2));
    }

    #[test]
    fn delete_reports_removal() {
        let mut map = HashMap::new();
        map.add(1, "a");
        map.add(2, "b");

        assert!(map.delete(&1));
        assert!(!map.delete(&1));
        assert!(!map.contains(&1));
        assert!(map.contains(&2));
        assert_eq!(map.len(), 1);
        assert_eq!(map.remove(&2), Some("b"));
        assert!(map.is_empty());
    }

    #[test]
    fn borrowed_lookup() {
        let mut map: HashMap<String, u32> = HashMap::new();
        map.add("alpha".to_string(), 1);
        assert_eq!(map.get_value("alpha"), Some(&1));
        *map.get_mut("alpha").unwrap() += 1;
        assert_eq!(map.get_value("alpha"), Some(&2));
        assert!(map.delete("alpha"));
    }

    #[test]
    fn half_load_shrink() {
        let mut map = HashMap::new();
        for i in 0..10u32 {
            map.add(i, i);
        }
        assert_eq!(map.bucket_count(), 17);

        for i in 0..8u32 {
            map.delete(&i);
        }
        // 2 / 17 < 0.15: smallest prime >= 2 * 2
        assert_eq!(map.bucket_count(), 5);
        assert!(map.load_factor() <= 0.5);

        map.delete(&8);
        map.delete(&9);
        // Never below the initial bucket count
        assert_eq!(map.bucket_count(), DEFAULT_BUCKETS);
    }

    #[test]
    fn previous_prime_shrink() {
        let policy = ResizePolicy {
            shrink_to: ShrinkTarget::PreviousPrime,
            ..ResizePolicy::default()
        };
        let mut map = HashMap::with_policy(policy);
        for i in 0..10u32 {
            map.add(i, i);
        }
        assert_eq!(map.bucket_count(), 17);

        for i in 0..10u32 {
            map.delete(&i);
        }
        // Shrinks once to the size it grew from, then stays there.
        assert_eq!(map.bucket_count(), 7);
    }

    #[test]
    fn never_grown_map_does_not_shrink_to_zero() {
        let policy = ResizePolicy {
            shrink_to: ShrinkTarget::PreviousPrime,
            ..ResizePolicy::default()
        };
        let mut map = HashMap::with_policy(policy);
        map.add(1, 1);
        map.delete(&1);
        assert_eq!(map.bucket_count(), DEFAULT_BUCKETS);
    }

    #[test]
    fn presized_map_keeps_its_buckets() {
        let mut map = HashMap::with_buckets(101);
        map.add(1, 1);
        map.delete(&1);
        assert_eq!(map.bucket_count(), 101);
    }

    #[test]
    fn resize_round_trip_preserves_entries() {
        let mut map = HashMap::new();
        for i in 0..200u32 {
            map.add(i, i * 3);
        }
        for i in (0..200u32).filter(|i| i % 10 != 0) {
            assert!(map.delete(&i));
        }

        assert_eq!(map.len(), 20);
        for i in (0..200u32).step_by(10) {
            assert_eq!(map.get_value(&i), Some(&(i * 3)));
        }
        for i in (0..200u32).filter(|i| i % 10 != 0) {
            assert!(!map.contains(&i));
        }
    }

    #[test]
    fn full_collisions_stay_correct() {
        let mut map: HashMap<u32, u32, BuildHasherDefault<Collide>> =
            HashMap::with_buckets_and_hasher(DEFAULT_BUCKETS, BuildHasherDefault::default());
        for i in 0..50 {
            map.add(i, i + 1);
        }
        assert_eq!(map.add(25, 0), Some(26));
        assert!(map.delete(&10));
        assert_eq!(map.len(), 49);
        for i in (0..50).filter(|&i| i != 10 && i != 25) {
            assert_eq!(map.get_value(&i), Some(&(i + 1)));
        }
    }

    #[test]
    fn negative_keys_land_in_range() {
        let mut map: HashMap<i64, &str, BuildHasherDefault<Identity>> =
            HashMap::with_buckets_and_hasher(7, BuildHasherDefault::default());
        map.add(-1, "minus one");
        map.add(i64::MIN, "min");
        map.add(-7, "minus seven");

        assert_eq!(map.get_value(&-1), Some(&"minus one"));
        assert_eq!(map.get_value(&i64::MIN), Some(&"min"));
        assert_eq!(map.get_value(&-7), Some(&"minus seven"));
    }

    #[test]
    fn get_key_scans_values() {
        let mut map = HashMap::new();
        map.add("a", 1);
        map.add("b", 2);
        assert_eq!(map.get_key(&2), Some(&"b"));
        assert_eq!(map.get_key(&3), None);
    }

    #[test]
    fn keys_and_values_align() {
        let map: HashMap<u32, u32> = (0..25).map(|i| (i, i * i)).collect();
        let keys: Vec<_> = map.keys().copied().collect();
        let values: Vec<_> = map.values().copied().collect();

        assert_eq!(keys.len(), 25);
        assert_eq!(map.keys().len(), 25);
        for (k, v) in keys.iter().zip(&values) {
            assert_eq!(k * k, *v);
        }
    }

    #[test]
    fn clear_resets() {
        let mut map = HashMap::new();
        for i in 0..20 {
            map.add(i, i);
        }
        map.clear();

        assert!(map.is_empty());
        assert_eq!(map.bucket_count(), DEFAULT_BUCKETS);
        assert_eq!(map.keys().count(), 0);

        map.add(1, 1);
        assert_eq!(map.get_value(&1), Some(&1));
    }

    #[test]
    #[should_panic(expected = "shrink_at")]
    fn rejects_inverted_thresholds() {
        let _: HashMap<u32, u32> = HashMap::with_policy(ResizePolicy {
            grow_at: 0.2,
            shrink_at: 0.5,
            shrink_to: ShrinkTarget::HalfLoad,
        });
    }

    #[test]
    fn debug_format() {
        let mut map = HashMap::new();
        map.add(1, "one");
        assert_eq!(format!("{map:?}"), r#"{1: "one"}"#);
    }
}
