//! `CompactHashMap`: an unordered map over dense parallel arrays.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::ops::Index;

use crate::config::{Config, DEFAULT_SIZE};
use crate::error::{Error, Result};
use crate::iter::{Cursor, IntoIter, IntoKeys, IntoValues, Iter, IterMut, Keys, Values, ValuesMut};
use crate::order::DenseOrder;
use crate::raw::RawCompactMap;
use crate::DefaultHashBuilder;

/// A hash map that stores its entries in dense arrays instead of one
/// allocation per entry.
///
/// Each entry costs one key, one value and one packed `u64` link word, plus
/// one `u32` bucket head per table cell. Removal moves the last entry into the
/// freed slot, so there are never tombstones and iteration visits `len`
/// contiguous slots. Iteration order is unspecified and changes on removal.
///
/// ## Example
///
/// ```rust
/// use compact_hash::CompactHashMap;
///
/// let mut map = CompactHashMap::new();
/// map.insert("apple", 3);
/// map.insert("pear", 5);
/// assert_eq!(map.insert("apple", 4), Some(3));
/// assert_eq!(map.get("apple"), Some(&4));
/// assert_eq!(map.remove("pear"), Some(5));
/// assert_eq!(map.len(), 1);
/// ```
#[derive(Clone)]
pub struct CompactHashMap<K, V, S = DefaultHashBuilder> {
    raw: RawCompactMap<K, V, S, DenseOrder>,
}

/// Panics with the message of a capacity error, like `Vec` does on overflow.
#[cold]
#[track_caller]
pub(crate) fn capacity_overflow(err: Error) -> ! {
    panic!("{err}")
}

impl<K, V> CompactHashMap<K, V, DefaultHashBuilder> {
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates a map that holds `expected_size` entries without reallocating.
    pub fn with_capacity(expected_size: usize) -> Self {
        Self::with_capacity_and_hasher(expected_size, DefaultHashBuilder::default())
    }
}

impl<K, V, S> CompactHashMap<K, V, S> {
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_SIZE, hash_builder)
    }

    /// Hints above [`MAX_ENTRIES`](crate::MAX_ENTRIES) are clamped.
    pub fn with_capacity_and_hasher(expected_size: usize, hash_builder: S) -> Self {
        Self {
            raw: RawCompactMap::from_parts(
                Config::with_expected_size(expected_size),
                hash_builder,
                DenseOrder,
            ),
        }
    }

    /// Creates a map from an explicit [`Config`], rejecting invalid load
    /// factors and oversized hints.
    pub fn with_config(config: Config, hash_builder: S) -> Result<Self> {
        Ok(Self {
            raw: RawCompactMap::with_config(config, hash_builder, DenseOrder)?,
        })
    }

    #[cfg(test)]
    pub(crate) fn raw(&self) -> &RawCompactMap<K, V, S, DenseOrder> {
        &self.raw
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    /// Number of entries the map holds before its entry arrays reallocate.
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    pub fn load_factor(&self) -> f64 {
        self.raw.load_factor
    }

    pub fn hasher(&self) -> &S {
        &self.raw.hash_builder
    }

    /// Removes every entry, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Shrinks the entry arrays to `len` and the bucket table to the smallest
    /// size that respects the load factor.
    pub fn shrink_to_fit(&mut self) {
        self.raw.shrink_to_fit();
    }

    /// Keeps only the entries for which `f` returns `true`.
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.raw.retain(f);
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            keys: &self.raw.keys,
            values: &self.raw.values,
            walk: self.raw.walk(),
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Iterates with mutable access to the values, in slot order.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.raw.keys.iter().zip(self.raw.values.iter_mut()),
        }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    pub fn into_keys(self) -> IntoKeys<K, V> {
        IntoKeys {
            inner: self.into_iter(),
        }
    }

    pub fn into_values(self) -> IntoValues<K, V> {
        IntoValues {
            inner: self.into_iter(),
        }
    }

    /// Returns a detached cursor positioned before the first entry.
    pub fn cursor(&self) -> Cursor {
        self.raw.cursor()
    }

    /// Advances `cursor`, failing with [`Error::ConcurrentModification`] if
    /// the map changed since the cursor last synchronised with it.
    pub fn cursor_next(&self, cursor: &mut Cursor) -> Result<Option<(&K, &V)>> {
        self.raw.cursor_next(cursor)
    }

    /// Removes the entry `cursor` returned last. The cursor stays valid and
    /// will still visit every entry it has not yet returned.
    pub fn cursor_remove(&mut self, cursor: &mut Cursor) -> Result<(K, V)> {
        self.raw.cursor_remove(cursor)
    }

    /// Whether any entry holds `value`. Scans every entry.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.raw.values.iter().any(|v| v == value)
    }
}

impl<K, V, S> CompactHashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Inserts `key -> value`, returning the value it replaced.
    ///
    /// # Panics
    ///
    /// Panics if the map already holds [`MAX_ENTRIES`](crate::MAX_ENTRIES)
    /// entries or the entry arrays cannot grow. Use
    /// [`try_insert`](Self::try_insert) to handle that case.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.try_insert(key, value) {
            Ok(old) => old,
            Err(err) => capacity_overflow(err),
        }
    }

    /// Like [`insert`](Self::insert), but reports
    /// [`Error::CapacityExceeded`] instead of panicking. The map is left
    /// untouched on error.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        self.raw.try_insert_full(key, value).map(|(_, old)| old)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.raw.find(key).map(|slot| &self.raw.values[slot])
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.raw.find(key).map(|slot| self.raw.entry_at(slot))
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = self.raw.find(key)?;
        Some(&mut self.raw.values[slot])
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.raw.find(key).is_some()
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.raw.remove(key).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.raw.remove(key)
    }

    /// Makes room for at least `additional` more entries.
    ///
    /// # Panics
    ///
    /// Panics if the new size exceeds [`MAX_ENTRIES`](crate::MAX_ENTRIES).
    pub fn reserve(&mut self, additional: usize) {
        if let Err(err) = self.try_reserve(additional) {
            capacity_overflow(err);
        }
    }

    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        self.raw.reserve(additional)
    }
}

impl<K, V, S: Default> Default for CompactHashMap<K, V, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for CompactHashMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> PartialEq for CompactHashMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.raw.eq_entries(&other.raw)
    }
}

impl<K, V, S> Eq for CompactHashMap<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, Q, V, S> Index<&Q> for CompactHashMap<K, V, S>
where
    K: Hash + Eq + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present.
    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(v) => v,
            None => panic!("key not found in CompactHashMap"),
        }
    }
}

impl<K, V, S> Extend<(K, V)> for CompactHashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K, V, S> Extend<(&'a K, &'a V)> for CompactHashMap<K, V, S>
where
    K: Hash + Eq + Copy,
    V: Copy,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: I) {
        self.extend(iter.into_iter().map(|(&k, &v)| (k, v)));
    }
}

impl<K, V, S> FromIterator<(K, V)> for CompactHashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, S> IntoIterator for CompactHashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.raw.into_entries().into_iter(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a CompactHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut CompactHashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}
