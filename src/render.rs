//! In-order textual rendering shared by both map variants.
//!
//! An empty map renders as the empty string. A non-empty map renders as a
//! block delimited by `***` markers with one `key --> value` line per entry
//! in ascending key order:
//!
//! ```text
//!
//!
//! ***
//! 1 --> A
//! 2 --> B
//! ***
//!
//! ```

use std::fmt;

const HEADER: &str = "\n\n***\n";
const FOOTER: &str = "***\n\n";

/// Writes `entries` (already in ascending key order) in the delimited block format.
pub(crate) fn write_entries<'a, K, V, I>(
    formatter: &mut fmt::Formatter<'_>,
    entries: I,
) -> fmt::Result
where
    K: fmt::Display + 'a,
    V: fmt::Display + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    let mut entries = entries.into_iter().peekable();
    if entries.peek().is_none() {
        return Ok(());
    }

    formatter.write_str(HEADER)?;
    for (key, value) in entries {
        writeln!(formatter, "{key} --> {value}")?;
    }
    formatter.write_str(FOOTER)
}
