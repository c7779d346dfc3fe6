//! Persistent (immutable) ordered map.
//!
//! [`PersistentBstMap`] is an unbalanced binary search tree whose writes
//! return new versions through path-copying:
//!
//! - `put`, `delete` and `delete_min` rebuild only the root-to-target path
//! - every subtree off that path is shared with the previous version
//! - previous versions stay valid and unchanged
//!
//! # Examples
//!
//! ```rust
//! use bstmaps::persistent::PersistentBstMap;
//!
//! let map = PersistentBstMap::new()
//!     .put(3, "three")
//!     .put(1, "one")
//!     .put(2, "two");
//!
//! // Entries are always in sorted order
//! let keys: Vec<&i32> = map.keys().collect();
//! assert_eq!(keys, vec![&1, &2, &3]);
//!
//! // Structural sharing: the original map is preserved
//! let updated = map.put(1, "ONE");
//! assert_eq!(map.get(&1), Some(&"one"));     // Original unchanged
//! assert_eq!(updated.get(&1), Some(&"ONE")); // New version
//!
//! // Order statistics
//! assert_eq!(map.select(2), Ok(&2));
//! assert_eq!(map.rank(&3), Ok(3));
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled (the default), this is `std::sync::Arc`:
/// reference counts are updated atomically and map versions can be shared
/// between threads.
///
/// When the `arc` feature is disabled, this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

mod bst_map;

pub use bst_map::PersistentBstMap;
pub use bst_map::PersistentBstMapIntoIterator;
pub use bst_map::PersistentBstMapIterator;

// =============================================================================
// Tests
// =============================================================================
