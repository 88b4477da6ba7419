//! `ImmutableBiMap`: an immutable map whose values are unique too.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::ops::Index;

use super::map::{ImmutableMap, ImmutableMapBuilder};
use super::{check_len, key_of, value_of, Entries, Iter, Keys, Lookup, Values};
use crate::error::BuildError;
use crate::iter::IntoIter;
use crate::DefaultHashBuilder;

/// A one-to-one immutable map, with lookups in both directions.
///
/// The forward map is an ordinary [`ImmutableMap`]; a second index over the
/// same entry array answers value-to-key queries through [`inverse`].
///
/// ## Example
///
/// ```rust
/// use compact_hash::ImmutableBiMap;
///
/// let codes = ImmutableBiMap::try_from_iter([("a", 1), ("b", 2)]).unwrap();
/// assert_eq!(codes.get("a"), Some(&1));
/// assert_eq!(codes.inverse().get(&2), Some(&"b"));
/// assert!(ImmutableBiMap::try_from_iter([("a", 1), ("b", 1)]).is_err());
/// ```
///
/// [`inverse`]: ImmutableBiMap::inverse
#[derive(Clone)]
pub struct ImmutableBiMap<K, V, S = DefaultHashBuilder> {
    pub(crate) forward: ImmutableMap<K, V, S>,
    /// Index over the values of `forward`'s entries.
    pub(crate) by_value: Lookup,
}

impl<K, V> ImmutableBiMap<K, V, DefaultHashBuilder> {
    pub fn builder() -> ImmutableBiMapBuilder<K, V, DefaultHashBuilder> {
        ImmutableBiMapBuilder::new()
    }

    pub fn new() -> Self {
        Self::default()
    }
}

impl<K, V> ImmutableBiMap<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
    V: Hash + Eq,
{
    /// Builds a bimap from `iter`, failing on the first repeated key or value.
    pub fn try_from_iter<I>(iter: I) -> Result<Self, BuildError<K, V>>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        ImmutableBiMapBuilder::new().put_all(iter).build()
    }
}

impl<K, V, S> ImmutableBiMap<K, V, S> {
    #[inline]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn hasher(&self) -> &S {
        self.forward.hasher()
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        self.forward.iter()
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        self.forward.keys()
    }

    pub fn values(&self) -> Values<'_, K, V> {
        self.forward.values()
    }

    /// The forward direction as a plain immutable map.
    pub fn as_map(&self) -> &ImmutableMap<K, V, S> {
        &self.forward
    }

    /// A borrowed value-to-key view.
    pub fn inverse(&self) -> Inverse<'_, K, V, S> {
        Inverse { bimap: self }
    }

    /// Turns the bimap around. Entries are moved, not rehashed: the two
    /// indexes trade places.
    pub fn into_inverse(self) -> ImmutableBiMap<V, K, S> {
        let ImmutableMap {
            entries,
            index,
            hash_builder,
        } = self.forward;
        ImmutableBiMap {
            forward: ImmutableMap {
                entries: entries.flip(),
                index: self.by_value,
                hash_builder,
            },
            by_value: index,
        }
    }
}

impl<K, V, S> ImmutableBiMap<K, V, S>
where
    K: Hash + Eq,
    V: Hash + Eq,
    S: BuildHasher,
{
    fn from_entries(entries: Vec<(K, V)>, hash_builder: S) -> Result<Self, BuildError<K, V>> {
        check_len(&entries)?;
        let by_key = Lookup::build(&entries, key_of, &hash_builder);
        let by_value = Lookup::build(&entries, value_of, &hash_builder);
        match (by_key, by_value) {
            (Ok(index), Ok(by_value)) => Ok(Self {
                forward: ImmutableMap {
                    entries: Entries::from_vec(entries),
                    index,
                    hash_builder,
                },
                by_value,
            }),
            // Report whichever entry came first; a key clash wins a tie.
            (Err(key), Err(value)) if value.conflicting < key.conflicting => {
                Err(value.duplicate_value(entries))
            }
            (Err(key), _) => Err(key.duplicate_key(entries)),
            (Ok(_), Err(value)) => Err(value.duplicate_value(entries)),
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.forward.get(key)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.forward.get_key_value(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.forward.contains_key(key)
    }

    /// Hashed lookup, unlike [`ImmutableMap::contains_value`].
    pub fn contains_value<Q>(&self, value: &Q) -> bool
    where
        V: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inverse().contains_key(value)
    }
}

impl<K, V, S: Default> Default for ImmutableBiMap<K, V, S> {
    fn default() -> Self {
        Self {
            forward: ImmutableMap::default(),
            by_value: Lookup::Trivial,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for ImmutableBiMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> PartialEq for ImmutableBiMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.forward == other.forward
    }
}

impl<K, V, S> Eq for ImmutableBiMap<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, Q, V, S> Index<&Q> for ImmutableBiMap<K, V, S>
where
    K: Hash + Eq + Borrow<Q>,
    V: Hash + Eq,
    Q: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(v) => v,
            None => panic!("key not found in ImmutableBiMap"),
        }
    }
}

impl<K, V, S> IntoIterator for ImmutableBiMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        self.forward.into_iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a ImmutableBiMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

/// Value-to-key view of an [`ImmutableBiMap`], created by
/// [`ImmutableBiMap::inverse`].
pub struct Inverse<'a, K, V, S> {
    bimap: &'a ImmutableBiMap<K, V, S>,
}

impl<K, V, S> Clone for Inverse<'_, K, V, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, S> Copy for Inverse<'_, K, V, S> {}

impl<'a, K, V, S> Inverse<'a, K, V, S> {
    pub fn len(&self) -> usize {
        self.bimap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bimap.is_empty()
    }

    /// The forward bimap this view was taken from.
    pub fn inverse(&self) -> &'a ImmutableBiMap<K, V, S> {
        self.bimap
    }

    /// `(value, key)` pairs, in the forward map's order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&'a V, &'a K)> + ExactSizeIterator {
        self.bimap.iter().map(|(k, v)| (v, k))
    }

    pub fn keys(&self) -> Values<'a, K, V> {
        self.bimap.values()
    }

    pub fn values(&self) -> Keys<'a, K, V> {
        self.bimap.keys()
    }
}

impl<'a, K, V, S> Inverse<'a, K, V, S>
where
    V: Hash + Eq,
    S: BuildHasher,
{
    fn find<Q>(&self, value: &Q) -> Option<usize>
    where
        V: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let forward = &self.bimap.forward;
        self.bimap
            .by_value
            .find(forward.entries.as_slice(), value_of, &forward.hash_builder, value)
    }

    /// The key mapped to `value`.
    pub fn get<Q>(&self, value: &Q) -> Option<&'a K>
    where
        V: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(value).map(|(_, k)| k)
    }

    pub fn get_key_value<Q>(&self, value: &Q) -> Option<(&'a V, &'a K)>
    where
        V: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = self.find(value)?;
        let (k, v) = &self.bimap.forward.entries.as_slice()[slot];
        Some((v, k))
    }

    pub fn contains_key<Q>(&self, value: &Q) -> bool
    where
        V: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find(value).is_some()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for Inverse<'_, K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Collects entries for an [`ImmutableBiMap`].
pub struct ImmutableBiMapBuilder<K, V, S = DefaultHashBuilder> {
    inner: ImmutableMapBuilder<K, V, S>,
}

impl<K, V> ImmutableBiMapBuilder<K, V, DefaultHashBuilder> {
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    pub fn with_capacity(expected_size: usize) -> Self {
        Self::with_capacity_and_hasher(expected_size, DefaultHashBuilder::default())
    }
}

impl<K, V, S> ImmutableBiMapBuilder<K, V, S> {
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(0, hash_builder)
    }

    pub fn with_capacity_and_hasher(expected_size: usize, hash_builder: S) -> Self {
        Self {
            inner: ImmutableMapBuilder::with_capacity_and_hasher(expected_size, hash_builder),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn put(self, key: K, value: V) -> Self {
        Self {
            inner: self.inner.put(key, value),
        }
    }

    pub fn put_all<I>(self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            inner: self.inner.put_all(entries),
        }
    }

    pub fn combine<S2>(self, other: ImmutableBiMapBuilder<K, V, S2>) -> Self {
        Self {
            inner: self.inner.combine(other.inner),
        }
    }

    /// See [`ImmutableMapBuilder::order_entries_by_value`].
    pub fn order_entries_by_value<F>(self, compare: F) -> Self
    where
        F: Fn(&V, &V) -> Ordering + 'static,
    {
        Self {
            inner: self.inner.order_entries_by_value(compare),
        }
    }
}

impl<K, V, S> ImmutableBiMapBuilder<K, V, S>
where
    K: Hash + Eq,
    V: Hash + Eq,
    S: BuildHasher,
{
    /// Builds the bimap, failing on the first entry (in submission order)
    /// that repeats an earlier key or value.
    pub fn build(self) -> Result<ImmutableBiMap<K, V, S>, BuildError<K, V>> {
        let (entries, hash_builder) = self.inner.into_sorted_parts();
        ImmutableBiMap::from_entries(entries, hash_builder)
    }
}

impl<K, V, S: Default> Default for ImmutableBiMapBuilder<K, V, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for ImmutableBiMapBuilder<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ImmutableBiMapBuilder")
            .field(&self.inner)
            .finish()
    }
}

impl<K, V, S> Extend<(K, V)> for ImmutableBiMapBuilder<K, V, S> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.inner.extend(iter);
    }
}
