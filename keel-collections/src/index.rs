//! Sentinel-based node handles for arena-backed trees.
//!
//! Tree links are indices into a slab rather than pointers. A reserved
//! sentinel (`usize::MAX`) stands for "no node" so a link is a plain `usize`
//! instead of `Option<usize>`, which halves the size of every link field.

/// Handle to a node slot in a tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeIndex(usize);

impl NodeIndex {
    /// The "no node" link.
    pub(crate) const NONE: Self = NodeIndex(usize::MAX);

    /// Wraps a slab key.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `key` collides with the sentinel.
    #[inline]
    pub(crate) fn new(key: usize) -> Self {
        debug_assert_ne!(key, usize::MAX, "slab key collides with sentinel");
        NodeIndex(key)
    }

    #[inline]
    pub(crate) fn is_none(self) -> bool {
        self == Self::NONE
    }

    #[inline]
    pub(crate) fn is_some(self) -> bool {
        !self.is_none()
    }

    /// Returns the slab key, or `None` for the sentinel.
    #[inline]
    pub(crate) fn get(self) -> Option<usize> {
        if self.is_none() { None } else { Some(self.0) }
    }

    /// Returns the raw slab key. The caller must have checked `is_some`.
    #[inline]
    pub(crate) fn key(self) -> usize {
        debug_assert!(self.is_some(), "dereferenced NONE node index");
        self.0
    }
}

impl Default for NodeIndex {
    fn default() -> Self {
        Self::NONE
    }
}
