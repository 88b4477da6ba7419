//! # compact-hash
//!
//! Memory-compact hash maps built on dense parallel arrays.
//!
//! - [`CompactHashMap`]: an unordered map with one packed `u64` link word per
//!   entry and no tombstones. Removal moves the last entry into the hole.
//! - [`CompactLinkedHashMap`]: the same engine plus a doubly-linked order
//!   chain, iterating in insertion order or (for LRU caches) access order.
//! - [`ImmutableMap`] / [`ImmutableBiMap`]: read-only maps built once from a
//!   batch. Repeated keys (or bimap values) are reported, not overwritten, and
//!   pathological hash collisions switch the map to a fallback index instead
//!   of degrading lookups.
//!
//! ## Example
//!
//! ```rust
//! use compact_hash::{CompactHashMap, CompactLinkedHashMap, ImmutableBiMap};
//!
//! let mut map = CompactHashMap::new();
//! map.insert("hello", 1);
//! map.insert("world", 2);
//! assert_eq!(map.get("hello"), Some(&1));
//!
//! let mut linked = CompactLinkedHashMap::new();
//! linked.insert("b", 2);
//! linked.insert("a", 1);
//! assert_eq!(linked.keys().copied().collect::<Vec<_>>(), ["b", "a"]);
//!
//! let bimap = ImmutableBiMap::try_from_iter([("one", 1), ("two", 2)]).unwrap();
//! assert_eq!(bimap.inverse().get(&2), Some(&"two"));
//! ```

#![forbid(unsafe_code)]

pub mod config;
mod error;
pub mod hashing;
pub mod immutable;
pub mod iter;
mod link;
mod linked;
mod map;
mod order;
mod raw;

pub use config::{Config, LinkOrder};
pub use error::{BuildError, Error, Result};
pub use immutable::bimap::{ImmutableBiMap, ImmutableBiMapBuilder, Inverse};
pub use immutable::map::{ImmutableMap, ImmutableMapBuilder};
pub use iter::Cursor;
pub use link::MAX_ENTRIES;
pub use linked::CompactLinkedHashMap;
pub use map::CompactHashMap;

/// Hasher used by every map unless another `BuildHasher` is supplied.
pub type DefaultHashBuilder = ahash::RandomState;

#[cfg(test)]
mod proptests;
