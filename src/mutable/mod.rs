//! Mutable ordered map.
//!
//! [`MutableBstMap`] is the in-place sibling of
//! [`PersistentBstMap`](crate::persistent::PersistentBstMap): the same
//! unbalanced binary search tree and the same queries, stored in an arena
//! of index-linked nodes and changed through `&mut self`.
//!
//! # Examples
//!
//! ```rust
//! use bstmaps::mutable::MutableBstMap;
//!
//! let mut map = MutableBstMap::new();
//! map.put(3, "three");
//! map.put(1, "one");
//!
//! assert_eq!(map.delete_min(), Ok((1, "one")));
//! assert_eq!(map.min(), Ok(&3));
//! ```

mod bst_map;

pub use bst_map::MutableBstMap;
pub use bst_map::MutableBstMapIterator;
