//! # bstmaps
//!
//! Ordered key-value maps backed by unbalanced binary search trees.
//!
//! ## Overview
//!
//! - **Persistent map**: [`persistent::PersistentBstMap`] returns a new
//!   version from every write through path-copying. Older versions stay
//!   valid and share every subtree the write did not touch.
//! - **Mutable map**: [`mutable::MutableBstMap`] is the in-place variant,
//!   stored in an arena of index-linked nodes.
//!
//! Both maps support lookup, insertion, minimum/maximum, floor, order
//! statistics (`select`/`rank`), delete-minimum and delete. The trees are
//! never rebalanced: their shape is whatever the insertion order produces.
//!
//! ## Feature Flags
//!
//! - `persistent`: The persistent map (default)
//! - `mutable`: The arena-backed mutable map (default)
//! - `arc`: Share persistent nodes through `Arc` instead of `Rc`, making maps
//!   `Send + Sync` (default)
//! - `serde`: Serialization support for both maps
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use bstmaps::prelude::*;
//!
//! let map = PersistentBstMap::new()
//!     .put(3, "C")
//!     .put(2, "B")
//!     .put(5, "E")
//!     .put(4, "D")
//!     .put(1, "A");
//!
//! let without_three = map.delete(&3).unwrap();
//! assert_eq!(map.len(), 5);
//! assert_eq!(without_three.len(), 4);
//! assert!(!without_three.contains(&3));
//!
//! assert_eq!(map.min(), Ok(&1));
//! assert_eq!(map.select(3), Ok(&3));
//! assert_eq!(map.rank(&4), Ok(4));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports the map types and the error type.
///
/// # Usage
///
/// ```rust
/// use bstmaps::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::OrderedMapError;

    #[cfg(feature = "persistent")]
    pub use crate::persistent::*;

    #[cfg(feature = "mutable")]
    pub use crate::mutable::*;
}

pub mod error;

mod render;

#[cfg(feature = "persistent")]
pub mod persistent;

#[cfg(feature = "mutable")]
pub mod mutable;
