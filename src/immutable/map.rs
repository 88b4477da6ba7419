//! `ImmutableMap` and its builder.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::ops::Index;

use super::{check_len, key_of, Entries, Iter, Keys, Lookup, Values};
use crate::error::BuildError;
use crate::iter::IntoIter;
use crate::DefaultHashBuilder;

/// A hash map fixed at construction.
///
/// Built by [`ImmutableMapBuilder`] (or [`try_from_iter`](Self::try_from_iter)),
/// which rejects duplicate keys instead of overwriting them. Iteration yields
/// entries in the order they were submitted, or sorted by value if the
/// builder was asked to.
///
/// ## Example
///
/// ```rust
/// use compact_hash::{BuildError, ImmutableMap};
///
/// let map = ImmutableMap::builder()
///     .put("a", 1)
///     .put("b", 2)
///     .build()
///     .unwrap();
/// assert_eq!(map.get("a"), Some(&1));
///
/// let err = ImmutableMap::builder().put("a", 1).put("a", 3).build();
/// assert_eq!(
///     err,
///     Err(BuildError::DuplicateKey {
///         existing: ("a", 1),
///         conflicting: ("a", 3),
///     })
/// );
/// ```
#[derive(Clone)]
pub struct ImmutableMap<K, V, S = DefaultHashBuilder> {
    pub(crate) entries: Entries<K, V>,
    pub(crate) index: Lookup,
    pub(crate) hash_builder: S,
}

impl<K, V> ImmutableMap<K, V, DefaultHashBuilder> {
    pub fn builder() -> ImmutableMapBuilder<K, V, DefaultHashBuilder> {
        ImmutableMapBuilder::new()
    }

    /// The empty map.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K, V> ImmutableMap<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
{
    /// Builds a map from `iter`, failing on the first repeated key.
    pub fn try_from_iter<I>(iter: I) -> Result<Self, BuildError<K, V>>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        ImmutableMapBuilder::new().put_all(iter).build()
    }
}

impl<K, V, S> ImmutableMap<K, V, S> {
    /// Indexes `entries` by key. On a repeated key, both offending entries
    /// are handed back.
    pub(crate) fn from_entries(
        entries: Vec<(K, V)>,
        hash_builder: S,
    ) -> Result<Self, BuildError<K, V>>
    where
        K: Hash + Eq,
        S: BuildHasher,
    {
        check_len(&entries)?;
        match Lookup::build(&entries, key_of, &hash_builder) {
            Ok(index) => Ok(Self {
                entries: Entries::from_vec(entries),
                index,
                hash_builder,
            }),
            Err(conflict) => Err(conflict.duplicate_key(entries)),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.as_slice().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.entries.as_slice().iter(),
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Whether any entry holds `value`. Scans every entry.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|v| v == value)
    }
}

impl<K, V, S> ImmutableMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index
            .find(self.entries.as_slice(), key_of, &self.hash_builder, key)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (k, v) = &self.entries.as_slice()[self.find(key)?];
        Some((k, v))
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(key).is_some()
    }
}

impl<K, V, S: Default> Default for ImmutableMap<K, V, S> {
    fn default() -> Self {
        Self {
            entries: Entries::Empty,
            index: Lookup::Trivial,
            hash_builder: S::default(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for ImmutableMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Map equality: same keys with equal values, in any order.
impl<K, V, S> PartialEq for ImmutableMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> Eq for ImmutableMap<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, Q, V, S> Index<&Q> for ImmutableMap<K, V, S>
where
    K: Hash + Eq + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(v) => v,
            None => panic!("key not found in ImmutableMap"),
        }
    }
}

impl<K, V, S> IntoIterator for ImmutableMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.entries.into_vec().into_iter(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a ImmutableMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

/// Orders entries by value before they are indexed.
pub(crate) type ValueComparator<V> = Box<dyn Fn(&V, &V) -> Ordering>;

/// Collects entries for an [`ImmutableMap`].
///
/// Entries are only checked when [`build`](Self::build) runs, so a builder
/// happily accepts repeated keys until then.
pub struct ImmutableMapBuilder<K, V, S = DefaultHashBuilder> {
    entries: Vec<(K, V)>,
    value_comparator: Option<ValueComparator<V>>,
    hash_builder: S,
}

impl<K, V> ImmutableMapBuilder<K, V, DefaultHashBuilder> {
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    pub fn with_capacity(expected_size: usize) -> Self {
        Self::with_capacity_and_hasher(expected_size, DefaultHashBuilder::default())
    }
}

impl<K, V, S> ImmutableMapBuilder<K, V, S> {
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    pub fn with_capacity_and_hasher(expected_size: usize, hash_builder: S) -> Self {
        Self {
            entries: Vec::with_capacity(expected_size),
            value_comparator: None,
            hash_builder,
        }
    }

    /// Number of entries submitted so far, duplicates included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn put(mut self, key: K, value: V) -> Self {
        self.entries.push((key, value));
        self
    }

    pub fn put_all<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.entries.extend(entries);
        self
    }

    /// Appends every entry of `other`, after this builder's own. `other`'s
    /// hasher and value ordering are dropped.
    pub fn combine<S2>(mut self, other: ImmutableMapBuilder<K, V, S2>) -> Self {
        self.entries.extend(other.entries);
        self
    }

    /// Makes the built map iterate in ascending value order (ties keep their
    /// submission order). Lookups are unaffected.
    ///
    /// # Panics
    ///
    /// Panics if a value ordering was already set.
    pub fn order_entries_by_value<F>(mut self, compare: F) -> Self
    where
        F: Fn(&V, &V) -> Ordering + 'static,
    {
        assert!(
            self.value_comparator.is_none(),
            "value ordering was already set"
        );
        self.value_comparator = Some(Box::new(compare));
        self
    }

    /// Applies the value ordering, if any, and hands back the raw parts.
    pub(crate) fn into_sorted_parts(self) -> (Vec<(K, V)>, S) {
        let Self {
            mut entries,
            value_comparator,
            hash_builder,
        } = self;
        if let Some(compare) = value_comparator {
            entries.sort_by(|a, b| compare(&a.1, &b.1));
        }
        (entries, hash_builder)
    }
}

impl<K, V, S> ImmutableMapBuilder<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Builds the map, failing with [`BuildError::DuplicateKey`] on the first
    /// entry whose key was already submitted.
    pub fn build(self) -> Result<ImmutableMap<K, V, S>, BuildError<K, V>> {
        let (entries, hash_builder) = self.into_sorted_parts();
        ImmutableMap::from_entries(entries, hash_builder)
    }
}

impl<K, V, S: Default> Default for ImmutableMapBuilder<K, V, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for ImmutableMapBuilder<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImmutableMapBuilder")
            .field("entries", &self.entries)
            .field("ordered_by_value", &self.value_comparator.is_some())
            .finish()
    }
}

impl<K, V, S> Extend<(K, V)> for ImmutableMapBuilder<K, V, S> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}
