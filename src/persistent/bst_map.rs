//! Persistent (immutable) ordered map based on an unbalanced binary search tree.
//!
//! This module provides [`PersistentBstMap`], an immutable ordered map that
//! uses path-copying and structural sharing.
//!
//! # Overview
//!
//! Every write (`put`, `delete`, `delete_min`, `delete_max`) returns a new map.
//! Only the nodes on the path from the root to the change point are
//! allocated again; every subtree off that path is shared with the previous
//! version, which stays valid and unchanged.
//!
//! - O(h) get / contains / floor
//! - O(h) put / delete / `delete_min`
//! - O(h) select / rank (order statistics over cached subtree sizes)
//! - O(1) len and `is_empty`
//!
//! where h is the height of the tree. The tree is never rebalanced, so h is
//! whatever the insertion order produces (up to N for sorted input).
//!
//! # Examples
//!
//! ```rust
//! use bstmaps::persistent::PersistentBstMap;
//!
//! let map = PersistentBstMap::new()
//!     .put(3, "C")
//!     .put(2, "B")
//!     .put(5, "E");
//!
//! let keys: Vec<&i32> = map.keys().collect();
//! assert_eq!(keys, vec![&2, &3, &5]);
//!
//! // The previous version is untouched
//! let smaller = map.delete(&3).unwrap();
//! assert_eq!(map.len(), 3);
//! assert_eq!(smaller.len(), 2);
//! ```
//!
//! # Internal Structure
//!
//! A tree is either `Empty` or a reference-counted `Node` holding a key, a
//! value, two subtrees and the cached size of the subtree rooted at it:
//!
//! 1. Every key in `left` is less than the node key
//! 2. Every key in `right` is greater than the node key
//! 3. `size == left.size + right.size + 1`
//!
//! Nodes are never mutated after construction, so the cached size of a
//! shared node is valid for every version that references it.

use super::ReferenceCounter;
use crate::error::OrderedMapError;
use crate::render;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

// =============================================================================
// Tree Definition
// =============================================================================

/// Internal node of the tree.
struct Node<K, V> {
    key: K,
    value: V,
    left: Tree<K, V>,
    right: Tree<K, V>,
    size: usize,
}

/// Either the empty tree or a shared node.
enum Tree<K, V> {
    Empty,
    Node(ReferenceCounter<Node<K, V>>),
}

impl<K, V> Clone for Tree<K, V> {
    fn clone(&self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Node(node) => Self::Node(ReferenceCounter::clone(node)),
        }
    }
}

impl<K, V> Tree<K, V> {
    /// Builds a node over two subtrees, computing its size from theirs.
    fn branch(key: K, value: V, left: Self, right: Self) -> Self {
        let size = left.size() + right.size() + 1;
        Self::Node(ReferenceCounter::new(Node {
            key,
            value,
            left,
            right,
            size,
        }))
    }

    fn leaf(key: K, value: V) -> Self {
        Self::branch(key, value, Self::Empty, Self::Empty)
    }

    fn size(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Node(node) => node.size,
        }
    }

    fn leftmost(&self) -> Option<&Node<K, V>> {
        let Self::Node(root) = self else {
            return None;
        };
        let mut node: &Node<K, V> = root;
        while let Self::Node(left) = &node.left {
            node = left;
        }
        Some(node)
    }

    fn rightmost(&self) -> Option<&Node<K, V>> {
        let Self::Node(root) = self else {
            return None;
        };
        let mut node: &Node<K, V> = root;
        while let Self::Node(right) = &node.right {
            node = right;
        }
        Some(node)
    }

    /// Finds the node holding exactly `key`.
    fn find<Q>(&self, key: &Q) -> Option<&Node<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self;
        while let Self::Node(node) = current {
            match key.cmp(node.key.borrow()) {
                Ordering::Less => current = &node.left,
                Ordering::Greater => current = &node.right,
                Ordering::Equal => return Some(&**node),
            }
        }
        None
    }
}

// =============================================================================
// PersistentBstMap Definition
// =============================================================================

/// A persistent (immutable) ordered map based on an unbalanced binary search tree.
///
/// `PersistentBstMap` never mutates a node once it has been built. Writes
/// copy the root-to-target path and share the rest of the tree, so any
/// number of versions can coexist and be read independently.
///
/// Keys must implement `Ord`. Values are cloned only for the ancestors that a
/// write rebuilds.
///
/// # Time Complexity
///
/// | Operation             | Complexity |
/// |-----------------------|------------|
/// | `new`                 | O(1)       |
/// | `get` / `contains`    | O(h)       |
/// | `put`                 | O(h)       |
/// | `delete`              | O(h)       |
/// | `delete_min`          | O(h)       |
/// | `min` / `max`         | O(h)       |
/// | `floor`               | O(h)       |
/// | `select` / `rank`     | O(h)       |
/// | `len` / `is_empty`    | O(1)       |
///
/// # Examples
///
/// ```rust
/// use bstmaps::persistent::PersistentBstMap;
///
/// let map = PersistentBstMap::new()
///     .put(3, "C")
///     .put(2, "B")
///     .put(5, "E")
///     .put(4, "D")
///     .put(1, "A");
///
/// assert_eq!(map.len(), 5);
/// assert_eq!(map.min(), Ok(&1));
/// assert_eq!(map.select(3), Ok(&3));
/// assert_eq!(map.rank(&4), Ok(4));
/// ```
pub struct PersistentBstMap<K, V> {
    root: Tree<K, V>,
}

impl<K, V> Clone for PersistentBstMap<K, V> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
        }
    }
}

impl<K, V> PersistentBstMap<K, V> {
    /// Creates a new empty map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bstmaps::persistent::PersistentBstMap;
    ///
    /// let map: PersistentBstMap<i32, String> = PersistentBstMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { root: Tree::Empty }
    }

    /// Returns the number of entries in the map.
    ///
    /// Read from the cached size of the root node.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.size()
    }

    /// Alias of [`len`](Self::len).
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.len()
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self.root, Tree::Empty)
    }

    /// Returns `true` if both maps share the same root node.
    ///
    /// Two empty maps are always pointer-equal. This is a structural check,
    /// not an equality check: maps built separately with identical entries
    /// are not pointer-equal.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bstmaps::persistent::PersistentBstMap;
    ///
    /// let map = PersistentBstMap::new().put(1, "one");
    /// let unchanged = map.delete(&2).unwrap();
    /// assert!(map.ptr_eq(&unchanged));
    /// ```
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (Tree::Empty, Tree::Empty) => true,
            (Tree::Node(left), Tree::Node(right)) => ReferenceCounter::ptr_eq(left, right),
            _ => false,
        }
    }

    /// Returns an iterator over entries in ascending key order.
    ///
    /// The iterator walks the tree lazily with an explicit stack of at most
    /// h node references.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bstmaps::persistent::PersistentBstMap;
    ///
    /// let map = PersistentBstMap::new().put(2, "two").put(1, "one");
    /// let entries: Vec<(&i32, &&str)> = map.iter().collect();
    /// assert_eq!(entries, vec![(&1, &"one"), (&2, &"two")]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> PersistentBstMapIterator<'_, K, V> {
        let mut iterator = PersistentBstMapIterator {
            stack: Vec::new(),
            remaining: self.len(),
        };
        iterator.push_left_spine(&self.root);
        iterator
    }

    /// Entries in pre-order; putting them in this order rebuilds the same shape.
    #[cfg(feature = "mutable")]
    pub(crate) fn preorder(&self) -> Vec<(&K, &V)> {
        let mut order = Vec::with_capacity(self.len());
        let mut stack: Vec<&Node<K, V>> = Vec::new();
        if let Tree::Node(root) = &self.root {
            stack.push(root);
        }
        while let Some(node) = stack.pop() {
            order.push((&node.key, &node.value));
            if let Tree::Node(right) = &node.right {
                stack.push(right);
            }
            if let Tree::Node(left) = &node.left {
                stack.push(left);
            }
        }
        order
    }

    /// Returns an iterator over keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over values in ascending key order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }
}

// =============================================================================
// Read Path
// =============================================================================

impl<K: Ord, V> PersistentBstMap<K, V> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// A missing key, including any key of an empty map, is `None` and never
    /// an error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bstmaps::persistent::PersistentBstMap;
    ///
    /// let map = PersistentBstMap::new().put("hello".to_string(), 42);
    ///
    /// // Can use &str to look up String keys
    /// assert_eq!(map.get("hello"), Some(&42));
    /// assert_eq!(map.get("world"), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.root.find(key).map(|node| &node.value)
    }

    /// Returns `true` if the map contains a value for the key.
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.root.find(key).is_some()
    }

    /// Returns the smallest key.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::EmptyMap`] if the map is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bstmaps::persistent::PersistentBstMap;
    ///
    /// let map = PersistentBstMap::new().put(3, "C").put(1, "A").put(2, "B");
    /// assert_eq!(map.min(), Ok(&1));
    /// ```
    pub fn min(&self) -> Result<&K, OrderedMapError> {
        self.root
            .leftmost()
            .map(|node| &node.key)
            .ok_or(OrderedMapError::empty("min"))
    }

    /// Returns the largest key.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::EmptyMap`] if the map is empty.
    pub fn max(&self) -> Result<&K, OrderedMapError> {
        self.root
            .rightmost()
            .map(|node| &node.key)
            .ok_or(OrderedMapError::empty("max"))
    }

    /// Returns the entry with the smallest key.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::EmptyMap`] if the map is empty.
    pub fn min_entry(&self) -> Result<(&K, &V), OrderedMapError> {
        self.root
            .leftmost()
            .map(|node| (&node.key, &node.value))
            .ok_or(OrderedMapError::empty("min_entry"))
    }

    /// Returns the entry with the largest key.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::EmptyMap`] if the map is empty.
    pub fn max_entry(&self) -> Result<(&K, &V), OrderedMapError> {
        self.root
            .rightmost()
            .map(|node| (&node.key, &node.value))
            .ok_or(OrderedMapError::empty("max_entry"))
    }

    /// Returns the greatest key less than or equal to `key`.
    ///
    /// `Ok(None)` means every key in the map is greater than `key`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::EmptyMap`] if the map is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bstmaps::persistent::PersistentBstMap;
    ///
    /// let map = PersistentBstMap::new().put(10, ()).put(20, ()).put(30, ());
    /// assert_eq!(map.floor(&25), Ok(Some(&20)));
    /// assert_eq!(map.floor(&20), Ok(Some(&20)));
    /// assert_eq!(map.floor(&5), Ok(None));
    /// ```
    pub fn floor<Q>(&self, key: &Q) -> Result<Option<&K>, OrderedMapError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if self.is_empty() {
            return Err(OrderedMapError::empty("floor"));
        }

        let mut best = None;
        let mut current = &self.root;
        while let Tree::Node(node) = current {
            match key.cmp(node.key.borrow()) {
                Ordering::Less => current = &node.left,
                Ordering::Equal => return Ok(Some(&node.key)),
                Ordering::Greater => {
                    best = Some(&node.key);
                    current = &node.right;
                }
            }
        }
        Ok(best)
    }

    /// Returns the largest key in the left subtree of the node holding `key`.
    ///
    /// This is the key that [`delete`](Self::delete) promotes into the
    /// position of `key`. It is the in-order predecessor only when the node
    /// has a left subtree: a node without one yields `None` even if smaller
    /// keys exist higher up the tree. An absent `key` also yields `None`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::EmptyMap`] if the map is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bstmaps::persistent::PersistentBstMap;
    ///
    /// let map = PersistentBstMap::new().put(3, "C").put(1, "A").put(2, "B").put(4, "D");
    /// assert_eq!(map.subtree_predecessor(&3), Ok(Some(&2)));
    /// // 4 has no left subtree
    /// assert_eq!(map.subtree_predecessor(&4), Ok(None));
    /// ```
    pub fn subtree_predecessor<Q>(&self, key: &Q) -> Result<Option<&K>, OrderedMapError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if self.is_empty() {
            return Err(OrderedMapError::empty("subtree_predecessor"));
        }

        Ok(self
            .root
            .find(key)
            .and_then(|node| node.left.rightmost())
            .map(|node| &node.key))
    }

    /// Returns the key at 1-based position `index` in ascending key order.
    ///
    /// Walks down the tree comparing `index` with the size of the left
    /// subtree plus one, so no key list is materialised.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::EmptyMap`] if the map is empty, and
    /// [`OrderedMapError::IndexOutOfRange`] if `index` is 0 or greater than
    /// [`len`](Self::len).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bstmaps::persistent::PersistentBstMap;
    /// use bstmaps::error::OrderedMapError;
    ///
    /// let map = PersistentBstMap::new().put(30, ()).put(10, ()).put(20, ());
    /// assert_eq!(map.select(1), Ok(&10));
    /// assert_eq!(map.select(3), Ok(&30));
    /// assert_eq!(
    ///     map.select(4),
    ///     Err(OrderedMapError::IndexOutOfRange { index: 4, len: 3 })
    /// );
    /// ```
    pub fn select(&self, index: usize) -> Result<&K, OrderedMapError> {
        let len = self.len();
        if len == 0 {
            return Err(OrderedMapError::empty("select"));
        }
        let out_of_range = OrderedMapError::IndexOutOfRange { index, len };
        if index == 0 || index > len {
            return Err(out_of_range);
        }

        let mut remaining = index;
        let mut current = &self.root;
        while let Tree::Node(node) = current {
            let position = node.left.size() + 1;
            match remaining.cmp(&position) {
                Ordering::Less => current = &node.left,
                Ordering::Equal => return Ok(&node.key),
                Ordering::Greater => {
                    remaining -= position;
                    current = &node.right;
                }
            }
        }
        Err(out_of_range)
    }

    /// Returns the 1-based position of `key` in ascending key order, or 0 if
    /// the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::EmptyMap`] if the map is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bstmaps::persistent::PersistentBstMap;
    ///
    /// let map = PersistentBstMap::new().put(30, ()).put(10, ()).put(20, ());
    /// assert_eq!(map.rank(&20), Ok(2));
    /// assert_eq!(map.rank(&25), Ok(0));
    /// ```
    pub fn rank<Q>(&self, key: &Q) -> Result<usize, OrderedMapError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if self.is_empty() {
            return Err(OrderedMapError::empty("rank"));
        }

        let mut preceding = 0;
        let mut current = &self.root;
        while let Tree::Node(node) = current {
            match key.cmp(node.key.borrow()) {
                Ordering::Less => current = &node.left,
                Ordering::Equal => return Ok(preceding + node.left.size() + 1),
                Ordering::Greater => {
                    preceding += node.left.size() + 1;
                    current = &node.right;
                }
            }
        }
        Ok(0)
    }
}

// =============================================================================
// Write Path
// =============================================================================

impl<K: Clone + Ord, V: Clone> PersistentBstMap<K, V> {
    /// Creates a map containing a single key-value pair.
    #[inline]
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self {
        Self {
            root: Tree::leaf(key, value),
        }
    }

    /// Inserts a key-value pair, returning the new version of the map.
    ///
    /// If the key is already present its value is replaced and the length
    /// is unchanged. Only the ancestors of the affected node are rebuilt.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bstmaps::persistent::PersistentBstMap;
    ///
    /// let map1 = PersistentBstMap::new().put(1, "one");
    /// let map2 = map1.put(1, "ONE");
    ///
    /// assert_eq!(map1.get(&1), Some(&"one")); // Original unchanged
    /// assert_eq!(map2.get(&1), Some(&"ONE")); // New version
    /// assert_eq!(map2.len(), 1);
    /// ```
    #[must_use]
    pub fn put(&self, key: K, value: V) -> Self {
        let (root, inserted) = Self::put_into(&self.root, key, value);
        tracing::trace!(operation = "put", inserted, len = root.size());
        Self { root }
    }

    /// Recursive helper for put.
    /// Returns (`new_tree`, `inserted`) where `inserted` is false for a replaced value.
    fn put_into(tree: &Tree<K, V>, key: K, value: V) -> (Tree<K, V>, bool) {
        let Tree::Node(node) = tree else {
            return (Tree::leaf(key, value), true);
        };

        match key.cmp(&node.key) {
            Ordering::Less => {
                let (left, inserted) = Self::put_into(&node.left, key, value);
                let rebuilt =
                    Tree::branch(node.key.clone(), node.value.clone(), left, node.right.clone());
                (rebuilt, inserted)
            }
            Ordering::Greater => {
                let (right, inserted) = Self::put_into(&node.right, key, value);
                let rebuilt =
                    Tree::branch(node.key.clone(), node.value.clone(), node.left.clone(), right);
                (rebuilt, inserted)
            }
            Ordering::Equal => {
                let replaced = Node {
                    key,
                    value,
                    left: node.left.clone(),
                    right: node.right.clone(),
                    size: node.size,
                };
                (Tree::Node(ReferenceCounter::new(replaced)), false)
            }
        }
    }

    /// Removes the entry with the smallest key, returning the new version.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::EmptyMap`] if the map is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bstmaps::persistent::PersistentBstMap;
    ///
    /// let map = PersistentBstMap::new().put(2, "B").put(1, "A").put(3, "C");
    /// let rest = map.delete_min().unwrap();
    /// assert_eq!(rest.min(), Ok(&2));
    /// assert_eq!(map.min(), Ok(&1));
    /// ```
    pub fn delete_min(&self) -> Result<Self, OrderedMapError> {
        let Tree::Node(node) = &self.root else {
            return Err(OrderedMapError::empty("delete_min"));
        };
        let root = Self::delete_min_from(node);
        tracing::trace!(operation = "delete_min", len = root.size());
        Ok(Self { root })
    }

    /// Removes the entry with the largest key, returning the new version.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::EmptyMap`] if the map is empty.
    pub fn delete_max(&self) -> Result<Self, OrderedMapError> {
        let Tree::Node(node) = &self.root else {
            return Err(OrderedMapError::empty("delete_max"));
        };
        let root = Self::delete_max_from(node);
        tracing::trace!(operation = "delete_max", len = root.size());
        Ok(Self { root })
    }

    fn delete_min_from(node: &Node<K, V>) -> Tree<K, V> {
        match &node.left {
            Tree::Empty => node.right.clone(),
            Tree::Node(left) => Tree::branch(
                node.key.clone(),
                node.value.clone(),
                Self::delete_min_from(left),
                node.right.clone(),
            ),
        }
    }

    fn delete_max_from(node: &Node<K, V>) -> Tree<K, V> {
        match &node.right {
            Tree::Empty => node.left.clone(),
            Tree::Node(right) => Tree::branch(
                node.key.clone(),
                node.value.clone(),
                node.left.clone(),
                Self::delete_max_from(right),
            ),
        }
    }

    /// Removes `key`, returning the new version.
    ///
    /// When the removed node has a left subtree, the largest entry of that
    /// subtree takes its place; otherwise its right subtree does. Removing a
    /// key that is not present is a no-op: the result shares the receiver's
    /// root and nothing is allocated.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::EmptyMap`] if the map is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bstmaps::persistent::PersistentBstMap;
    ///
    /// let map = PersistentBstMap::new().put(1, "one").put(2, "two");
    /// let removed = map.delete(&1).unwrap();
    ///
    /// assert_eq!(map.len(), 2);     // Original unchanged
    /// assert_eq!(removed.len(), 1); // New version
    /// assert_eq!(removed.get(&1), None);
    /// ```
    pub fn delete<Q>(&self, key: &Q) -> Result<Self, OrderedMapError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if self.is_empty() {
            return Err(OrderedMapError::empty("delete"));
        }

        match Self::delete_from(&self.root, key) {
            Some(root) => {
                tracing::trace!(operation = "delete", removed = true, len = root.size());
                Ok(Self { root })
            }
            None => {
                tracing::trace!(operation = "delete", removed = false, len = self.len());
                Ok(self.clone())
            }
        }
    }

    /// Recursive helper for delete. Returns `None` if the key is absent.
    fn delete_from<Q>(tree: &Tree<K, V>, key: &Q) -> Option<Tree<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Tree::Node(node) = tree else {
            return None;
        };

        match key.cmp(node.key.borrow()) {
            Ordering::Less => Self::delete_from(&node.left, key).map(|left| {
                Tree::branch(node.key.clone(), node.value.clone(), left, node.right.clone())
            }),
            Ordering::Greater => Self::delete_from(&node.right, key).map(|right| {
                Tree::branch(node.key.clone(), node.value.clone(), node.left.clone(), right)
            }),
            Ordering::Equal => Some(Self::excise(node)),
        }
    }

    /// Replaces `node` by its left subtree's maximum, or by its right subtree.
    fn excise(node: &Node<K, V>) -> Tree<K, V> {
        match &node.left {
            Tree::Empty => node.right.clone(),
            Tree::Node(left) => {
                let mut predecessor: &Node<K, V> = left;
                while let Tree::Node(right) = &predecessor.right {
                    predecessor = right;
                }
                Tree::branch(
                    predecessor.key.clone(),
                    predecessor.value.clone(),
                    Self::delete_max_from(left),
                    node.right.clone(),
                )
            }
        }
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over key-value pairs of a [`PersistentBstMap`] in ascending key order.
pub struct PersistentBstMapIterator<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
    remaining: usize,
}

impl<'a, K, V> PersistentBstMapIterator<'a, K, V> {
    fn push_left_spine(&mut self, mut tree: &'a Tree<K, V>) {
        while let Tree::Node(node) = tree {
            self.stack.push(node);
            tree = &node.left;
        }
    }
}

impl<'a, K, V> Iterator for PersistentBstMapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(&node.right);
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for PersistentBstMapIterator<'_, K, V> {}

/// An owning iterator over key-value pairs of a [`PersistentBstMap`].
///
/// Entries are cloned out of the (possibly shared) tree.
pub struct PersistentBstMapIntoIterator<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for PersistentBstMapIntoIterator<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> ExactSizeIterator for PersistentBstMapIntoIterator<K, V> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for PersistentBstMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Ord, V: Clone> FromIterator<(K, V)> for PersistentBstMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Clone + Ord, V: Clone> Extend<(K, V)> for PersistentBstMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            *self = self.put(key, value);
        }
    }
}

impl<K: Clone, V: Clone> IntoIterator for PersistentBstMap<K, V> {
    type Item = (K, V);
    type IntoIter = PersistentBstMapIntoIterator<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let entries: Vec<(K, V)> = self
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        PersistentBstMapIntoIterator {
            entries: entries.into_iter(),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a PersistentBstMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = PersistentBstMapIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for PersistentBstMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        // Same entries in the same order, regardless of tree shape.
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for PersistentBstMap<K, V> {}

impl<K: Hash, V: Hash> Hash for PersistentBstMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (key, value) in self {
            key.hash(state);
            value.hash(state);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for PersistentBstMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

/// Renders the entries in ascending key order, one `key --> value` line each.
///
/// # Examples
///
/// ```rust
/// use bstmaps::persistent::PersistentBstMap;
///
/// let empty: PersistentBstMap<i32, &str> = PersistentBstMap::new();
/// assert_eq!(empty.to_string(), "");
///
/// let map = PersistentBstMap::new().put(2, "B").put(1, "A");
/// assert_eq!(map.to_string(), "\n\n***\n1 --> A\n2 --> B\n***\n\n");
/// ```
impl<K: fmt::Display, V: fmt::Display> fmt::Display for PersistentBstMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        render::write_entries(formatter, self.iter())
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V> serde::Serialize for PersistentBstMap<K, V>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct PersistentBstMapVisitor<K, V> {
    marker: std::marker::PhantomData<(K, V)>,
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::de::Visitor<'de> for PersistentBstMapVisitor<K, V>
where
    K: serde::Deserialize<'de> + Clone + Ord,
    V: serde::Deserialize<'de> + Clone,
{
    type Value = PersistentBstMap<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut map = PersistentBstMap::new();
        while let Some((key, value)) = access.next_entry()? {
            map = map.put(key, value);
        }
        Ok(map)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for PersistentBstMap<K, V>
where
    K: serde::Deserialize<'de> + Clone + Ord,
    V: serde::Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(PersistentBstMapVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
