//! Error types for the `compact-hash` crate

use std::fmt;

/// Errors raised by the mutable maps and their cursors.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The map was structurally modified outside of this cursor.
    ///
    /// Every insertion, removal, clear, or (for access-ordered maps) recency
    /// update bumps the map's modification count. A cursor remembers the count
    /// it last observed and refuses to step once the two disagree.
    #[error("map was modified outside of this cursor")]
    ConcurrentModification,

    /// The operation would grow the map past what a slot index can address,
    /// or the allocator refused to grow the entry arrays.
    #[error("map cannot hold more than {max} entries")]
    CapacityExceeded {
        /// The entry limit.
        max: usize,
    },

    /// `cursor_remove` was called before `cursor_next`, or twice for the same
    /// element.
    #[error("no element to remove: advance the cursor first")]
    InvalidRemoveState,

    /// A load factor that is not a positive, finite number.
    #[error("illegal load factor: {0}")]
    InvalidLoadFactor(f64),
}

/// Errors raised when building an immutable map or bimap.
///
/// The conflicting pairs are handed back in submission order so callers can
/// report or recover them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildError<K, V> {
    /// Two submitted entries had equal keys.
    DuplicateKey {
        /// The entry that was submitted first.
        existing: (K, V),
        /// The later entry whose key repeats `existing`'s.
        conflicting: (K, V),
    },

    /// Two submitted entries had equal values (bimaps only).
    DuplicateValue {
        /// The entry that was submitted first.
        existing: (K, V),
        /// The later entry whose value repeats `existing`'s.
        conflicting: (K, V),
    },

    /// More entries than a table index can address.
    CapacityExceeded {
        /// Number of submitted entries.
        len: usize,
        /// The entry limit.
        max: usize,
    },
}

// `Debug` bounds live on the formatting impls, never on the enum.
impl<K: fmt::Debug, V: fmt::Debug> fmt::Display for BuildError<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::DuplicateKey {
                existing,
                conflicting,
            } => write!(
                f,
                "multiple entries with same key: {existing:?} and {conflicting:?}"
            ),
            BuildError::DuplicateValue {
                existing,
                conflicting,
            } => write!(
                f,
                "multiple entries with same value: {existing:?} and {conflicting:?}"
            ),
            BuildError::CapacityExceeded { len, max } => {
                write!(f, "cannot build a map of {len} entries, the limit is {max}")
            }
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> std::error::Error for BuildError<K, V> {}

pub type Result<T> = std::result::Result<T, Error>;
