//! Error types for the ordered maps.
//!
//! Lookups (`get`, `contains`) never fail: a missing key is reported as
//! `None`/`false`. The operations that presuppose at least one entry, and
//! `select` with an index outside `1..=len`, report an [`OrderedMapError`].

use std::fmt;

/// Represents errors returned by the ordered map operations.
///
/// # Examples
///
/// ```rust
/// use bstmaps::error::OrderedMapError;
/// use bstmaps::persistent::PersistentBstMap;
///
/// let map: PersistentBstMap<i32, &str> = PersistentBstMap::new();
/// assert_eq!(
///     map.min(),
///     Err(OrderedMapError::EmptyMap { operation: "min" })
/// );
/// assert_eq!(format!("{}", map.min().unwrap_err()), "min: empty map");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderedMapError {
    /// The operation requires at least one entry but the map is empty.
    EmptyMap {
        /// The name of the operation that was invoked.
        operation: &'static str,
    },
    /// A 1-based index passed to `select` is outside `1..=len`.
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The number of entries in the map.
        len: usize,
    },
}

impl OrderedMapError {
    pub(crate) const fn empty(operation: &'static str) -> Self {
        Self::EmptyMap { operation }
    }
}

impl fmt::Display for OrderedMapError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMap { operation } => write!(formatter, "{operation}: empty map"),
            Self::IndexOutOfRange { index, len } => {
                write!(formatter, "select: index {index} out of range 1..={len}")
            }
        }
    }
}

impl std::error::Error for OrderedMapError {}
