//! Unbalanced binary-search-tree map over a node arena.
//!
//! Nodes live in a [`slab::Slab`] and link to each other by slab key. Every
//! node records its `left`, `right` and `parent`; the parent link is purely
//! navigational, so there is no ownership cycle. Removing a node relinks its
//! neighbours in place and then frees the slot.
//!
//! No balancing is performed. Inserting keys in sorted order produces a
//! chain of depth `n`.
//!
//! # Deletion
//!
//! ```text
//! leaf            only right       only left        two children
//!
//!   P               P                P                P
//!   |               |                |                |
//!   X      ->  -    X      ->  R     X      ->  L     X       ->   D
//!                    \              /                / \          / \
//!                     R            L                L   R        L   R
//!                                                    \            \
//!                                                     ..           ..
//!                                                      \            \
//!                                                       D            C
//!                                                      /
//!                                                     C
//! ```
//!
//! In the two-children case `D` is the in-order predecessor (rightmost node
//! of the left subtree). `D`'s own left subtree `C` takes `D`'s old place,
//! then `D` takes `X`'s place and adopts both of `X`'s children.
//!
//! # Example
//!
//! ```
//! use keel_collections::TreeMap;
//!
//! let mut map = TreeMap::new();
//! for key in [5, 3, 8, 1, 4] {
//!     map.add(key, key.to_string());
//! }
//!
//! assert!(map.delete(&3));
//! assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![1, 4, 5, 8]);
//! ```

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;

use slab::Slab;

use crate::Map;
use crate::index::NodeIndex;

#[derive(Debug, Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    left: NodeIndex,
    right: NodeIndex,
    parent: NodeIndex,
}

/// An ordered map backed by a plain binary search tree.
#[derive(Clone)]
pub struct TreeMap<K, V> {
    nodes: Slab<Node<K, V>>,
    root: NodeIndex,
}

impl<K, V> Default for TreeMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> TreeMap<K, V> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            nodes: Slab::new(),
            root: NodeIndex::NONE,
        }
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the map has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = NodeIndex::NONE;
    }

    /// Iterates `(key, value)` pairs in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter {
            nodes: &self.nodes,
            stack: Vec::new(),
            remaining: self.nodes.len(),
        };
        iter.push_left_spine(self.root);
        iter
    }

    /// Iterates keys in ascending order.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    /// Iterates values in ascending key order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Returns the entry with the smallest key.
    pub fn first(&self) -> Option<(&K, &V)> {
        let idx = self.leftmost(self.root).get()?;
        let node = &self.nodes[idx];
        Some((&node.key, &node.value))
    }

    /// Returns the entry with the largest key.
    pub fn last(&self) -> Option<(&K, &V)> {
        let idx = self.rightmost(self.root).get()?;
        let node = &self.nodes[idx];
        Some((&node.key, &node.value))
    }

    /// Returns the number of nodes on the longest root-to-leaf path.
    ///
    /// An empty tree has height 0.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack = Vec::new();
        if let Some(root) = self.root.get() {
            stack.push((root, 1));
        }
        while let Some((idx, depth)) = stack.pop() {
            height = height.max(depth);
            let node = &self.nodes[idx];
            for child in [node.left, node.right] {
                if let Some(child) = child.get() {
                    stack.push((child, depth + 1));
                }
            }
        }
        height
    }

    /// Returns the first key (in ascending order) whose value equals `value`.
    pub fn get_key(&self, value: &V) -> Option<&K>
    where
        V: PartialEq,
    {
        self.iter().find(|(_, v)| *v == value).map(|(k, _)| k)
    }

    #[inline]
    fn leftmost(&self, mut idx: NodeIndex) -> NodeIndex {
        while let Some(i) = idx.get() {
            let left = self.nodes[i].left;
            if left.is_none() {
                break;
            }
            idx = left;
        }
        idx
    }

    #[inline]
    fn rightmost(&self, mut idx: NodeIndex) -> NodeIndex {
        while let Some(i) = idx.get() {
            let right = self.nodes[i].right;
            if right.is_none() {
                break;
            }
            idx = right;
        }
        idx
    }

    /// Points `parent`'s link to `old` (or the root) at `new` instead, and
    /// sets `new`'s parent link.
    fn replace_child(&mut self, parent: NodeIndex, old: NodeIndex, new: NodeIndex) {
        match parent.get() {
            None => self.root = new,
            Some(p) => {
                let parent_node = &mut self.nodes[p];
                if parent_node.left == old {
                    parent_node.left = new;
                } else {
                    debug_assert_eq!(parent_node.right, old, "broken parent link");
                    parent_node.right = new;
                }
            }
        }
        if let Some(n) = new.get() {
            self.nodes[n].parent = parent;
        }
    }
}

impl<K: Ord, V> TreeMap<K, V> {
    /// Inserts `key` with `value` if the key is new.
    ///
    /// Returns `None` on insertion. If the key is already present, the tree
    /// is left untouched, the offered key and value are dropped, and the
    /// existing value is returned.
    pub fn add(&mut self, key: K, value: V) -> Option<&V> {
        let mut parent = NodeIndex::NONE;
        let mut cur = self.root;
        let mut left_of_parent = false;
        let mut existing = None;

        while let Some(i) = cur.get() {
            let node = &self.nodes[i];
            match key.cmp(&node.key) {
                Ordering::Less => {
                    parent = cur;
                    cur = node.left;
                    left_of_parent = true;
                }
                Ordering::Greater => {
                    parent = cur;
                    cur = node.right;
                    left_of_parent = false;
                }
                Ordering::Equal => {
                    existing = Some(i);
                    break;
                }
            }
        }

        if let Some(i) = existing {
            return Some(&self.nodes[i].value);
        }

        let idx = NodeIndex::new(self.nodes.insert(Node {
            key,
            value,
            left: NodeIndex::NONE,
            right: NodeIndex::NONE,
            parent,
        }));

        match parent.get() {
            None => self.root = idx,
            Some(p) if left_of_parent => self.nodes[p].left = idx,
            Some(p) => self.nodes[p].right = idx,
        }
        None
    }

    /// Returns `true` if `key` is present.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Returns the value for `key`.
    pub fn get_value<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let idx = self.find(key).get()?;
        Some(&self.nodes[idx].value)
    }

    /// Returns a mutable reference to the value for `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let idx = self.find(key).get()?;
        Some(&mut self.nodes[idx].value)
    }

    /// Removes `key`, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let target = self.find(key);
        let t = target.get()?;
        let Node {
            left,
            right,
            parent,
            ..
        } = self.nodes[t];

        match (left.is_some(), right.is_some()) {
            (false, false) => self.replace_child(parent, target, NodeIndex::NONE),
            (false, true) => self.replace_child(parent, target, right),
            (true, false) => self.replace_child(parent, target, left),
            (true, true) => {
                let pred = self.rightmost(left);
                if pred != left {
                    // Splice the predecessor out; its left subtree takes its place.
                    let Node {
                        left: pred_left,
                        parent: pred_parent,
                        ..
                    } = self.nodes[pred.key()];
                    self.nodes[pred_parent.key()].right = pred_left;
                    if let Some(pl) = pred_left.get() {
                        self.nodes[pl].parent = pred_parent;
                    }

                    self.nodes[pred.key()].left = left;
                    self.nodes[left.key()].parent = pred;
                }
                self.nodes[pred.key()].right = right;
                self.nodes[right.key()].parent = pred;
                self.replace_child(parent, target, pred);
            }
        }

        Some(self.nodes.remove(t).value)
    }

    /// Removes `key`. Returns `false` if it was absent.
    #[inline]
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove(key).is_some()
    }

    fn find<Q>(&self, key: &Q) -> NodeIndex
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cur = self.root;
        while let Some(i) = cur.get() {
            let node = &self.nodes[i];
            match key.cmp(node.key.borrow()) {
                Ordering::Less => cur = node.left,
                Ordering::Greater => cur = node.right,
                Ordering::Equal => return cur,
            }
        }
        NodeIndex::NONE
    }

    /// Checks links and ordering; panics with a description on violation.
    #[cfg(test)]
    fn assert_valid(&self) {
        if let Some(root) = self.root.get() {
            assert!(self.nodes[root].parent.is_none(), "root has a parent");
        }

        let mut reachable = 0;
        let mut stack: Vec<usize> = self.root.get().into_iter().collect();
        while let Some(i) = stack.pop() {
            reachable += 1;
            let node = &self.nodes[i];
            for child in [node.left, node.right] {
                if let Some(c) = child.get() {
                    assert_eq!(self.nodes[c].parent.get(), Some(i), "stale parent link");
                    stack.push(c);
                }
            }
            if let Some(l) = node.left.get() {
                assert!(self.nodes[l].key < node.key, "left child not smaller");
            }
            if let Some(r) = node.right.get() {
                assert!(self.nodes[r].key > node.key, "right child not larger");
            }
        }
        assert_eq!(reachable, self.nodes.len(), "unreachable nodes in arena");

        let keys: Vec<_> = self.keys().collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]), "in-order walk not ascending");
    }
}

impl<K, V> fmt::Debug for TreeMap<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> Extend<(K, V)> for TreeMap<K, V> {
    /// Inserts each pair; pairs with an already-present key are dropped.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.add(key, value);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for TreeMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, K, V> IntoIterator for &'a TreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

/// Duplicate keys are rejected: `add` returns a clone of the value already
/// stored and changes nothing.
impl<K: Ord, V: Clone> Map<K, V> for TreeMap<K, V> {
    fn contains(&self, key: &K) -> bool {
        TreeMap::contains(self, key)
    }

    fn add(&mut self, key: K, value: V) -> Option<V> {
        TreeMap::add(self, key, value).cloned()
    }

    fn delete(&mut self, key: &K) -> bool {
        TreeMap::delete(self, key)
    }

    fn get_value(&self, key: &K) -> Option<&V> {
        TreeMap::get_value(self, key)
    }

    fn get_key(&self, value: &V) -> Option<&K>
    where
        V: PartialEq,
    {
        TreeMap::get_key(self, value)
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }

    fn clear(&mut self) {
        TreeMap::clear(self);
    }

    fn keys(&self) -> Box<dyn Iterator<Item = &K> + '_> {
        Box::new(TreeMap::keys(self))
    }

    fn values(&self) -> Box<dyn Iterator<Item = &V> + '_> {
        Box::new(TreeMap::values(self))
    }
}

// =============================================================================
// Iterator
// =============================================================================

/// In-order iterator over a [`TreeMap`].
///
/// Holds the left spine of the unvisited part of the tree on an explicit
/// stack, so memory is bounded by the tree height.
pub struct Iter<'a, K, V> {
    nodes: &'a Slab<Node<K, V>>,
    stack: Vec<usize>,
    remaining: usize,
}

impl<K, V> Iter<'_, K, V> {
    fn push_left_spine(&mut self, mut idx: NodeIndex) {
        while let Some(i) = idx.get() {
            self.stack.push(i);
            idx = self.nodes[i].left;
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.stack.pop()?;
        let nodes = self.nodes;
        let node = &nodes[i];
        self.push_left_spine(node.right);
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn tree(keys: &[i32]) -> TreeMap<i32, String> {
        let mut map = TreeMap::new();
        for &k in keys {
            assert_eq!(map.add(k, format!("v{k}")), None);
        }
        map.assert_valid();
        map
    }

    fn keys(map: &TreeMap<i32, String>) -> Vec<i32> {
        map.keys().copied().collect()
    }

    #[test]
    fn new_is_empty() {
        let map: TreeMap<i32, i32> = TreeMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert_eq!(map.height(), 0);
        assert_eq!(map.first(), None);
        assert_eq!(map.iter().next(), None);
    }

    #[test]
    fn delete_two_children_from_sample() {
        let mut map = tree(&[5, 3, 8, 1, 4]);
        assert!(map.delete(&3));
        map.assert_valid();
        assert_eq!(keys(&map), vec![1, 4, 5, 8]);
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn delete_leaf() {
        let mut map = tree(&[5, 3, 8]);
        assert!(map.delete(&8));
        map.assert_valid();
        assert_eq!(keys(&map), vec![3, 5]);
        assert!(map.delete(&3));
        map.assert_valid();
        assert_eq!(keys(&map), vec![5]);
    }

    #[test]
    fn delete_only_right_child() {
        let mut map = tree(&[5, 3, 4, 8]);
        assert!(map.delete(&3));
        map.assert_valid();
        assert_eq!(keys(&map), vec![4, 5, 8]);
    }

    #[test]
    fn delete_only_left_child() {
        let mut map = tree(&[5, 8, 7, 3]);
        assert!(map.delete(&8));
        map.assert_valid();
        assert_eq!(keys(&map), vec![3, 5, 7]);
    }

    #[test]
    fn delete_two_children_deep_predecessor_with_left_subtree() {
        //        50
        //       /  \
        //     20    60
        //    /  \
        //  10    40
        //       /
        //     30
        //       \
        //        35   <- predecessor of 50 is 40, whose left subtree is 30
        let mut map = tree(&[50, 20, 60, 10, 40, 30, 35]);
        assert!(map.delete(&50));
        map.assert_valid();
        assert_eq!(keys(&map), vec![10, 20, 30, 35, 40, 60]);
        assert_eq!(map.get_value(&30), Some(&"v30".to_string()));
    }

    #[test]
    fn delete_root_in_every_shape() {
        let mut leaf = tree(&[1]);
        assert!(leaf.delete(&1));
        leaf.assert_valid();
        assert!(leaf.is_empty());

        let mut right_only = tree(&[1, 2, 3]);
        assert!(right_only.delete(&1));
        right_only.assert_valid();
        assert_eq!(keys(&right_only), vec![2, 3]);

        let mut left_only = tree(&[3, 2, 1]);
        assert!(left_only.delete(&3));
        left_only.assert_valid();
        assert_eq!(keys(&left_only), vec![1, 2]);

        let mut both = tree(&[2, 1, 3]);
        assert!(both.delete(&2));
        both.assert_valid();
        assert_eq!(keys(&both), vec![1, 3]);
        assert_eq!(both.first().map(|(k, _)| *k), Some(1));
    }

    #[test]
    fn delete_missing() {
        let mut map = tree(&[2, 1, 3]);
        assert!(!map.delete(&4));
        assert_eq!(map.remove(&0), None);
        assert_eq!(map.len(), 3);

        let mut empty: TreeMap<i32, String> = TreeMap::new();
        assert!(!empty.delete(&1));
    }

    #[test]
    fn duplicate_add_is_a_no_op() {
        let mut map = tree(&[2, 1, 3]);
        assert_eq!(map.add(1, "replacement".to_string()), Some(&"v1".to_string()));
        map.assert_valid();
        assert_eq!(map.len(), 3);
        assert_eq!(map.get_value(&1), Some(&"v1".to_string()));
    }

    #[test]
    fn map_trait_add_clones_existing() {
        let mut map: TreeMap<i32, String> = TreeMap::new();
        assert_eq!(Map::add(&mut map, 1, "a".to_string()), None);
        assert_eq!(Map::add(&mut map, 1, "b".to_string()), Some("a".to_string()));
        assert_eq!(Map::len(&map), 1);
    }

    #[test]
    fn lookups() {
        let mut map = tree(&[5, 3, 8, 1, 4]);
        assert!(map.contains(&4));
        assert!(!map.contains(&6));
        assert_eq!(map.get_value(&8), Some(&"v8".to_string()));
        assert_eq!(map.get_value(&9), None);

        map.get_mut(&8).unwrap().push('!');
        assert_eq!(map.get_value(&8), Some(&"v8!".to_string()));

        assert_eq!(map.get_key(&"v4".to_string()), Some(&4));
        assert_eq!(map.get_key(&"nope".to_string()), None);
    }

    #[test]
    fn get_key_returns_smallest_matching_key() {
        let mut map = TreeMap::new();
        map.add(9, "same");
        map.add(2, "same");
        map.add(5, "same");
        assert_eq!(map.get_key(&"same"), Some(&2));
    }

    #[test]
    fn borrowed_lookup() {
        let mut map = TreeMap::new();
        map.add("beta".to_string(), 2);
        map.add("alpha".to_string(), 1);
        assert_eq!(map.get_value("alpha"), Some(&1));
        assert!(map.delete("beta"));
    }

    #[test]
    fn values_follow_key_order() {
        let map = tree(&[5, 3, 8, 1, 4]);
        let values: Vec<_> = map.values().cloned().collect();
        assert_eq!(values, vec!["v1", "v3", "v4", "v5", "v8"]);
        assert_eq!(map.keys().len(), 5);
    }

    #[test]
    fn first_last() {
        let map = tree(&[5, 3, 8, 1, 4]);
        assert_eq!(map.first().map(|(k, _)| *k), Some(1));
        assert_eq!(map.last().map(|(k, _)| *k), Some(8));
    }

    #[test]
    fn sorted_insert_degenerates() {
        let map = tree(&(0..64).collect::<Vec<_>>());
        assert_eq!(map.height(), 64);
    }

    #[test]
    fn clear_resets() {
        let mut map = tree(&[5, 3, 8]);
        map.clear();
        assert!(map.is_empty());
        assert_eq!(keys(&map), Vec::<i32>::new());
        map.add(1, "one".into());
        map.assert_valid();
        assert_eq!(keys(&map), vec![1]);
    }

    #[test]
    fn slots_are_reused() {
        let mut map = tree(&[5, 3, 8]);
        let capacity = map.nodes.capacity();
        map.delete(&3);
        map.add(4, "v4".into());
        map.assert_valid();
        assert_eq!(map.nodes.capacity(), capacity);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn debug_format() {
        let map: TreeMap<i32, &str> = [(2, "b"), (1, "a")].into_iter().collect();
        assert_eq!(format!("{map:?}"), r#"{1: "a", 2: "b"}"#);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(u8),
        Delete(u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![any::<u8>().prop_map(Op::Add), any::<u8>().prop_map(Op::Delete)]
    }

    proptest! {
        #[test]
        fn matches_btreemap(ops in proptest::collection::vec(op(), 0..300)) {
            let mut map = TreeMap::new();
            let mut model = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Add(k) => {
                        let expected = model.get(&k).copied();
                        prop_assert_eq!(map.add(k, u32::from(k) * 2).copied(), expected);
                        model.entry(k).or_insert(u32::from(k) * 2);
                    }
                    Op::Delete(k) => {
                        prop_assert_eq!(map.delete(&k), model.remove(&k).is_some());
                    }
                }
                map.assert_valid();
                prop_assert_eq!(map.len(), model.len());
            }

            let ours: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
            let theirs: Vec<_> = model.into_iter().collect();
            prop_assert_eq!(ours, theirs);
        }
    }
}
