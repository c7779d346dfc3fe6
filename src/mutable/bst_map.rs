//! Mutable ordered map based on an arena-backed binary search tree.
//!
//! [`MutableBstMap`] keeps its nodes in a single `Vec` and links them by
//! index. Writes happen in place: there is no sharing between versions,
//! and a `&mut` borrow is the only way to change the map.
//!
//! The arena stays dense. When a node is removed, the last node of the
//! arena is moved into the freed index and the link that pointed to it is
//! redirected, so `entries.len() == len()` at all times.
//!
//! Descents record the link they arrived through (a `LinkSlot`) and the
//! indices of the ancestors passed on the way, so parents never have to be
//! stored in the nodes.

use crate::error::OrderedMapError;
use crate::render;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::iter::FromIterator;

type Link = Option<usize>;

#[derive(Clone)]
struct Entry<K, V> {
    key: K,
    value: V,
    left: Link,
    right: Link,
    size: usize,
}

/// The link a node hangs from: the root, or a child link of a parent node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LinkSlot {
    Root,
    Left(usize),
    Right(usize),
}

/// A mutable ordered map based on an unbalanced binary search tree.
///
/// It offers the same queries as
/// [`PersistentBstMap`](crate::persistent::PersistentBstMap) and removes
/// entries with the same predecessor promotion, but every write changes
/// the map in place.
///
/// # Examples
///
/// ```rust
/// use bstmaps::mutable::MutableBstMap;
///
/// let mut map = MutableBstMap::new();
/// map.put(3, "C");
/// map.put(1, "A");
/// map.put(2, "B");
///
/// assert_eq!(map.put(2, "b"), Some("B"));
/// assert_eq!(map.len(), 3);
/// assert_eq!(map.delete(&3), Ok(Some("C")));
/// assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
/// ```
#[derive(Clone)]
pub struct MutableBstMap<K, V> {
    entries: Vec<Entry<K, V>>,
    root: Link,
}

impl<K, V> MutableBstMap<K, V> {
    /// Creates a new empty map.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            root: None,
        }
    }

    /// Creates a new empty map with room for `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            root: None,
        }
    }

    /// Returns the number of entries in the map.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Removes every entry, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.root = None;
    }

    /// Returns an iterator over entries in ascending key order.
    #[must_use]
    pub fn iter(&self) -> MutableBstMapIterator<'_, K, V> {
        let mut iterator = MutableBstMapIterator {
            map: self,
            stack: Vec::new(),
            remaining: self.len(),
        };
        iterator.push_left_spine(self.root);
        iterator
    }

    /// Returns an iterator over keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over values in ascending key order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }

    fn size_of(&self, link: Link) -> usize {
        link.map_or(0, |index| self.entries[index].size)
    }

    fn link(&self, slot: LinkSlot) -> Link {
        match slot {
            LinkSlot::Root => self.root,
            LinkSlot::Left(parent) => self.entries[parent].left,
            LinkSlot::Right(parent) => self.entries[parent].right,
        }
    }

    fn set_link(&mut self, slot: LinkSlot, link: Link) {
        match slot {
            LinkSlot::Root => self.root = link,
            LinkSlot::Left(parent) => self.entries[parent].left = link,
            LinkSlot::Right(parent) => self.entries[parent].right = link,
        }
    }

    fn leftmost(&self) -> Option<usize> {
        let mut index = self.root?;
        while let Some(left) = self.entries[index].left {
            index = left;
        }
        Some(index)
    }

    fn rightmost_from(&self, mut index: usize) -> usize {
        while let Some(right) = self.entries[index].right {
            index = right;
        }
        index
    }

    /// Node indices in pre-order; re-inserting keys in this order rebuilds the same shape.
    fn preorder(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.len());
        let mut stack: Vec<usize> = self.root.into_iter().collect();
        while let Some(index) = stack.pop() {
            order.push(index);
            let entry = &self.entries[index];
            stack.extend(entry.right);
            stack.extend(entry.left);
        }
        order
    }
}

impl<K: Ord, V> MutableBstMap<K, V> {
    /// Descends toward `key`, returning the link where it is or would be,
    /// and the ancestors passed on the way (root first).
    fn search<Q>(&self, key: &Q) -> (LinkSlot, Vec<usize>)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut slot = LinkSlot::Root;
        let mut path = Vec::new();
        while let Some(index) = self.link(slot) {
            slot = match key.cmp(self.entries[index].key.borrow()) {
                Ordering::Less => LinkSlot::Left(index),
                Ordering::Greater => LinkSlot::Right(index),
                Ordering::Equal => break,
            };
            path.push(index);
        }
        (slot, path)
    }

    fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(index) = current {
            current = match key.cmp(self.entries[index].key.borrow()) {
                Ordering::Less => self.entries[index].left,
                Ordering::Greater => self.entries[index].right,
                Ordering::Equal => return Some(index),
            };
        }
        None
    }

    /// Returns a reference to the value corresponding to the key.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|index| &self.entries[index].value)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|index| &mut self.entries[index].value)
    }

    /// Returns `true` if the map contains a value for the key.
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Inserts a key-value pair, returning the value it replaced.
    ///
    /// A new key is attached as a leaf and the cached sizes of its ancestors
    /// grow by one. An existing key keeps its node and only the value changes.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let (slot, path) = self.search(&key);
        if let Some(index) = self.link(slot) {
            tracing::trace!(operation = "put", inserted = false, len = self.len());
            return Some(std::mem::replace(&mut self.entries[index].value, value));
        }

        let index = self.entries.len();
        self.entries.push(Entry {
            key,
            value,
            left: None,
            right: None,
            size: 1,
        });
        self.set_link(slot, Some(index));
        for ancestor in path {
            self.entries[ancestor].size += 1;
        }
        tracing::trace!(operation = "put", inserted = true, len = self.len());
        None
    }

    /// Returns the smallest key.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::EmptyMap`] if the map is empty.
    pub fn min(&self) -> Result<&K, OrderedMapError> {
        self.leftmost()
            .map(|index| &self.entries[index].key)
            .ok_or(OrderedMapError::empty("min"))
    }

    /// Returns the largest key.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::EmptyMap`] if the map is empty.
    pub fn max(&self) -> Result<&K, OrderedMapError> {
        self.root
            .map(|root| &self.entries[self.rightmost_from(root)].key)
            .ok_or(OrderedMapError::empty("max"))
    }

    /// Returns the greatest key less than or equal to `key`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::EmptyMap`] if the map is empty.
    pub fn floor<Q>(&self, key: &Q) -> Result<Option<&K>, OrderedMapError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if self.is_empty() {
            return Err(OrderedMapError::empty("floor"));
        }

        let mut best = None;
        let mut current = self.root;
        while let Some(index) = current {
            let entry = &self.entries[index];
            current = match key.cmp(entry.key.borrow()) {
                Ordering::Less => entry.left,
                Ordering::Equal => return Ok(Some(&entry.key)),
                Ordering::Greater => {
                    best = Some(&entry.key);
                    entry.right
                }
            };
        }
        Ok(best)
    }

    /// Returns the largest key in the left subtree of the node holding `key`.
    ///
    /// `Ok(None)` if `key` is absent or its node has no left subtree.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::EmptyMap`] if the map is empty.
    pub fn subtree_predecessor<Q>(&self, key: &Q) -> Result<Option<&K>, OrderedMapError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if self.is_empty() {
            return Err(OrderedMapError::empty("subtree_predecessor"));
        }

        Ok(self
            .find(key)
            .and_then(|index| self.entries[index].left)
            .map(|left| &self.entries[self.rightmost_from(left)].key))
    }

    /// Returns the key at 1-based position `index` in ascending key order.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::EmptyMap`] if the map is empty, and
    /// [`OrderedMapError::IndexOutOfRange`] if `index` is 0 or greater than
    /// [`len`](Self::len).
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
        let mut current = self.root;
        while let Some(node) = current {
            let entry = &self.entries[node];
            let position = self.size_of(entry.left) + 1;
            current = match remaining.cmp(&position) {
                Ordering::Less => entry.left,
                Ordering::Equal => return Ok(&entry.key),
                Ordering::Greater => {
                    remaining -= position;
                    entry.right
                }
            };
        }
        Err(out_of_range)
    }

    /// Returns the 1-based position of `key`, or 0 if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::EmptyMap`] if the map is empty.
    pub fn rank<Q>(&self, key: &Q) -> Result<usize, OrderedMapError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if self.is_empty() {
            return Err(OrderedMapError::empty("rank"));
        }

        let mut preceding = 0;
        let mut current = self.root;
        while let Some(index) = current {
            let entry = &self.entries[index];
            current = match key.cmp(entry.key.borrow()) {
                Ordering::Less => entry.left,
                Ordering::Equal => return Ok(preceding + self.size_of(entry.left) + 1),
                Ordering::Greater => {
                    preceding += self.size_of(entry.left) + 1;
                    entry.right
                }
            };
        }
        Ok(0)
    }

    /// Removes and returns the entry with the smallest key.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::EmptyMap`] if the map is empty.
    pub fn delete_min(&mut self) -> Result<(K, V), OrderedMapError> {
        let Some(mut index) = self.root else {
            return Err(OrderedMapError::empty("delete_min"));
        };

        let mut slot = LinkSlot::Root;
        let mut path = Vec::new();
        while let Some(left) = self.entries[index].left {
            path.push(index);
            slot = LinkSlot::Left(index);
            index = left;
        }

        let entry = self.remove_at(slot, index, &path);
        tracing::trace!(operation = "delete_min", len = self.len());
        Ok((entry.key, entry.value))
    }

    /// Removes `key`, returning its value, or `Ok(None)` if it was absent.
    ///
    /// When the removed node has a left subtree, the largest entry of that
    /// subtree takes its place; otherwise its right subtree does.
    ///
    /// # Errors
    ///
    /// Returns [`OrderedMapError::EmptyMap`] if the map is empty.
    pub fn delete<Q>(&mut self, key: &Q) -> Result<Option<V>, OrderedMapError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if self.is_empty() {
            return Err(OrderedMapError::empty("delete"));
        }

        let (slot, path) = self.search(key);
        let Some(index) = self.link(slot) else {
            tracing::trace!(operation = "delete", removed = false, len = self.len());
            return Ok(None);
        };

        let entry = self.remove_at(slot, index, &path);
        tracing::trace!(operation = "delete", removed = true, len = self.len());
        Ok(Some(entry.value))
    }

    /// Unlinks the node at `index`, hanging from `slot` below `path`, and
    /// frees its arena index.
    fn remove_at(&mut self, slot: LinkSlot, index: usize, path: &[usize]) -> Entry<K, V> {
        let replacement = match self.entries[index].left {
            None => self.entries[index].right,
            Some(left) => {
                // Detach the maximum of the left subtree.
                let mut predecessor_slot = LinkSlot::Left(index);
                let mut predecessor = left;
                let mut inner_path = Vec::new();
                while let Some(right) = self.entries[predecessor].right {
                    inner_path.push(predecessor);
                    predecessor_slot = LinkSlot::Right(predecessor);
                    predecessor = right;
                }
                self.set_link(predecessor_slot, self.entries[predecessor].left);
                for ancestor in inner_path {
                    self.entries[ancestor].size -= 1;
                }

                let removed = &self.entries[index];
                let (left, right, size) = (removed.left, removed.right, removed.size - 1);
                let promoted = &mut self.entries[predecessor];
                promoted.left = left;
                promoted.right = right;
                promoted.size = size;
                Some(predecessor)
            }
        };

        self.set_link(slot, replacement);
        for &ancestor in path {
            self.entries[ancestor].size -= 1;
        }
        self.release(index)
    }

    /// Removes the unlinked node at `index` from the arena, moving the last
    /// node into its place.
    fn release(&mut self, index: usize) -> Entry<K, V> {
        let moved_from = self.entries.len() - 1;
        if index != moved_from {
            let slot = self.slot_of(moved_from);
            self.set_link(slot, Some(index));
        }
        self.entries.swap_remove(index)
    }

    /// Returns the link pointing at the linked node `target`.
    fn slot_of(&self, target: usize) -> LinkSlot {
        let key = &self.entries[target].key;
        let mut slot = LinkSlot::Root;
        while let Some(current) = self.link(slot) {
            if current == target {
                break;
            }
            slot = match key.cmp(&self.entries[current].key) {
                Ordering::Less => LinkSlot::Left(current),
                _ => LinkSlot::Right(current),
            };
        }
        slot
    }
}

impl<K: Clone + Ord, V: Clone> MutableBstMap<K, V> {
    /// Builds a persistent map with the same entries and the same tree shape.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bstmaps::mutable::MutableBstMap;
    ///
    /// let map: MutableBstMap<i32, &str> = [(2, "B"), (1, "A"), (3, "C")].into_iter().collect();
    /// let snapshot = map.to_persistent();
    /// assert_eq!(snapshot.len(), 3);
    /// assert_eq!(snapshot.to_string(), map.to_string());
    /// ```
    #[cfg(feature = "persistent")]
    #[must_use]
    pub fn to_persistent(&self) -> crate::persistent::PersistentBstMap<K, V> {
        self.preorder()
            .into_iter()
            .map(|index| {
                let entry = &self.entries[index];
                (entry.key.clone(), entry.value.clone())
            })
            .collect()
    }
}

#[cfg(feature = "persistent")]
impl<K: Clone + Ord, V: Clone> From<&crate::persistent::PersistentBstMap<K, V>>
    for MutableBstMap<K, V>
{
    fn from(map: &crate::persistent::PersistentBstMap<K, V>) -> Self {
        let mut result = Self::with_capacity(map.len());
        for (key, value) in map.preorder() {
            result.put(key.clone(), value.clone());
        }
        result
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over key-value pairs of a [`MutableBstMap`] in ascending key order.
pub struct MutableBstMapIterator<'a, K, V> {
    map: &'a MutableBstMap<K, V>,
    stack: Vec<usize>,
    remaining: usize,
}

impl<K, V> MutableBstMapIterator<'_, K, V> {
    fn push_left_spine(&mut self, mut link: Link) {
        while let Some(index) = link {
            self.stack.push(index);
            link = self.map.entries[index].left;
        }
    }
}

impl<'a, K, V> Iterator for MutableBstMapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let entry = &self.map.entries[index];
        self.push_left_spine(entry.right);
        self.remaining -= 1;
        Some((&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for MutableBstMapIterator<'_, K, V> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for MutableBstMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for MutableBstMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for MutableBstMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a MutableBstMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = MutableBstMapIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for MutableBstMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for MutableBstMap<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for MutableBstMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for MutableBstMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        render::write_entries(formatter, self.iter())
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V> serde::Serialize for MutableBstMap<K, V>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_map(self.iter())
    }
}

#[cfg(feature = "serde")]
struct MutableBstMapVisitor<K, V> {
    marker: std::marker::PhantomData<(K, V)>,
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::de::Visitor<'de> for MutableBstMapVisitor<K, V>
where
    K: serde::Deserialize<'de> + Ord,
    V: serde::Deserialize<'de>,
{
    type Value = MutableBstMap<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut map = MutableBstMap::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry()? {
            map.put(key, value);
        }
        Ok(map)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for MutableBstMap<K, V>
where
    K: serde::Deserialize<'de> + Ord,
    V: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(MutableBstMapVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
