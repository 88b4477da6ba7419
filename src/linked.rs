//! `CompactLinkedHashMap`: the compact map with a predictable iteration order.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::ops::Index;

use crate::config::{Config, LinkOrder, DEFAULT_SIZE};
use crate::error::Result;
use crate::iter::{Cursor, IntoIter, IntoKeys, IntoValues, Iter, Keys, Values};
use crate::map::capacity_overflow;
use crate::order::{EntryOrder, LinkedOrder};
use crate::raw::RawCompactMap;
use crate::DefaultHashBuilder;

/// A [`CompactHashMap`](crate::CompactHashMap) that also threads a
/// doubly-linked list through its slots, costing one more `u64` per entry.
///
/// In [`LinkOrder::Insertion`] mode, iteration follows the order in which keys
/// were first inserted; overwriting a value keeps its position, while removing
/// and re-inserting a key moves it to the back. In [`LinkOrder::Access`] mode,
/// [`get`](Self::get), [`get_mut`](Self::get_mut) and overwriting
/// [`insert`](Self::insert) also move the entry to the back, so
/// [`pop_front`](Self::pop_front) evicts the least recently used entry.
///
/// ## Example
///
/// ```rust
/// use compact_hash::{CompactLinkedHashMap, LinkOrder};
///
/// let mut lru = CompactLinkedHashMap::with_order(LinkOrder::Access);
/// lru.insert("a", 1);
/// lru.insert("b", 2);
/// lru.insert("c", 3);
/// lru.get("a");
///
/// assert_eq!(lru.pop_front(), Some(("b", 2)));
/// assert_eq!(lru.keys().copied().collect::<Vec<_>>(), ["c", "a"]);
/// ```
#[derive(Clone)]
pub struct CompactLinkedHashMap<K, V, S = DefaultHashBuilder> {
    raw: RawCompactMap<K, V, S, LinkedOrder>,
}

impl<K, V> CompactLinkedHashMap<K, V, DefaultHashBuilder> {
    /// Creates an insertion-ordered map.
    pub fn new() -> Self {
        Self::with_order(LinkOrder::Insertion)
    }

    pub fn with_order(order: LinkOrder) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_SIZE, order, DefaultHashBuilder::default())
    }

    pub fn with_capacity(expected_size: usize) -> Self {
        Self::with_capacity_and_hasher(
            expected_size,
            LinkOrder::Insertion,
            DefaultHashBuilder::default(),
        )
    }
}

impl<K, V, S> CompactLinkedHashMap<K, V, S> {
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_SIZE, LinkOrder::Insertion, hash_builder)
    }

    /// Hints above [`MAX_ENTRIES`](crate::MAX_ENTRIES) are clamped.
    pub fn with_capacity_and_hasher(
        expected_size: usize,
        order: LinkOrder,
        hash_builder: S,
    ) -> Self {
        let config = Config::with_expected_size(expected_size);
        let links = LinkedOrder::new(order, config.expected_size.min(crate::MAX_ENTRIES));
        Self {
            raw: RawCompactMap::from_parts(config, hash_builder, links),
        }
    }

    pub fn with_config(config: Config, order: LinkOrder, hash_builder: S) -> Result<Self> {
        config.validate()?;
        let links = LinkedOrder::new(order, config.expected_size);
        Ok(Self {
            raw: RawCompactMap::from_parts(config, hash_builder, links),
        })
    }

    #[cfg(test)]
    pub(crate) fn raw(&self) -> &RawCompactMap<K, V, S, LinkedOrder> {
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

    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    pub fn load_factor(&self) -> f64 {
        self.raw.load_factor
    }

    pub fn hasher(&self) -> &S {
        &self.raw.hash_builder
    }

    /// The iteration order this map was created with.
    pub fn order(&self) -> LinkOrder {
        self.raw.order.order
    }

    pub fn clear(&mut self) {
        self.raw.clear();
    }

    pub fn shrink_to_fit(&mut self) {
        self.raw.shrink_to_fit();
    }

    /// Keeps only the entries for which `f` returns `true`, visiting them in
    /// link order. Does not count as an access.
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.raw.retain(f);
    }

    /// The first entry in iteration order (the eldest, in access mode).
    pub fn front(&self) -> Option<(&K, &V)> {
        let slot = self.raw.order.first(self.len())?;
        Some(self.raw.entry_at(slot))
    }

    /// The last entry in iteration order (the most recent, in access mode).
    pub fn back(&self) -> Option<(&K, &V)> {
        let slot = self.raw.order.last(self.len())?;
        Some(self.raw.entry_at(slot))
    }

    pub fn pop_front(&mut self) -> Option<(K, V)> {
        let slot = self.raw.order.first(self.len());
        self.raw.pop_at(slot)
    }

    pub fn pop_back(&mut self) -> Option<(K, V)> {
        let slot = self.raw.order.last(self.len());
        self.raw.pop_at(slot)
    }

    /// Iterates in link order without touching access order.
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

    /// Calls `f` on every entry in link order with mutable access to the
    /// value. Does not count as an access.
    pub fn for_each_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V),
    {
        let raw = &mut self.raw;
        for slot in raw.order.walk(raw.links.len()) {
            f(&raw.keys[slot], &mut raw.values[slot]);
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

    /// Returns a detached cursor positioned before the first entry in link
    /// order. See [`Cursor`].
    pub fn cursor(&self) -> Cursor {
        self.raw.cursor()
    }

    pub fn cursor_next(&self, cursor: &mut Cursor) -> Result<Option<(&K, &V)>> {
        self.raw.cursor_next(cursor)
    }

    pub fn cursor_remove(&mut self, cursor: &mut Cursor) -> Result<(K, V)> {
        self.raw.cursor_remove(cursor)
    }

    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.raw.values.iter().any(|v| v == value)
    }
}

impl<K, V, S> CompactLinkedHashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Inserts `key -> value`, returning the value it replaced. A new key goes
    /// to the back; an existing one keeps its position unless the map is in
    /// access order.
    ///
    /// # Panics
    ///
    /// Panics on [`Error::CapacityExceeded`](crate::Error::CapacityExceeded).
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.try_insert(key, value) {
            Ok(old) => old,
            Err(err) => capacity_overflow(err),
        }
    }

    pub fn try_insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        self.raw.try_insert_full(key, value).map(|(_, old)| old)
    }

    /// Looks up `key`, counting as an access in [`LinkOrder::Access`] mode.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = self.raw.find(key)?;
        self.raw.touch(slot);
        Some(&self.raw.values[slot])
    }

    /// Like [`get`](Self::get), but never changes the iteration order.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
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

    /// Mutable lookup, counting as an access in [`LinkOrder::Access`] mode.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = self.raw.find(key)?;
        self.raw.touch(slot);
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

impl<K, V, S: Default> Default for CompactLinkedHashMap<K, V, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for CompactLinkedHashMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Map equality: same keys with equal values, in any order.
impl<K, V, S> PartialEq for CompactLinkedHashMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.raw.eq_entries(&other.raw)
    }
}

impl<K, V, S> Eq for CompactLinkedHashMap<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

/// Indexing never counts as an access.
impl<K, Q, V, S> Index<&Q> for CompactLinkedHashMap<K, V, S>
where
    K: Hash + Eq + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        match self.peek(key) {
            Some(v) => v,
            None => panic!("key not found in CompactLinkedHashMap"),
        }
    }
}

impl<K, V, S> Extend<(K, V)> for CompactLinkedHashMap<K, V, S>
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

impl<'a, K, V, S> Extend<(&'a K, &'a V)> for CompactLinkedHashMap<K, V, S>
where
    K: Hash + Eq + Copy,
    V: Copy,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: I) {
        self.extend(iter.into_iter().map(|(&k, &v)| (k, v)));
    }
}

impl<K, V, S> FromIterator<(K, V)> for CompactLinkedHashMap<K, V, S>
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

impl<K, V, S> IntoIterator for CompactLinkedHashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Yields entries in link order.
    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.raw.into_entries().into_iter(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a CompactLinkedHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn keys<K: Copy, V, S>(m: &CompactLinkedHashMap<K, V, S>) -> Vec<K> {
        m.keys().copied().collect()
    }

    #[test]
    fn test_insertion_order() {
        let mut m = CompactLinkedHashMap::new();
        for k in ["d", "a", "c", "b"] {
            m.insert(k, k.len());
        }
        assert_eq!(keys(&m), ["d", "a", "c", "b"]);
        assert_eq!(m.iter().rev().map(|(k, _)| *k).collect::<Vec<_>>(), ["b", "c", "a", "d"]);

        // Overwrite keeps the position.
        m.insert("a", 10);
        assert_eq!(keys(&m), ["d", "a", "c", "b"]);
        assert_eq!(m.get("a"), Some(&10));
        assert_eq!(keys(&m), ["d", "a", "c", "b"]);
    }

    #[test]
    fn test_insertion_order_survives_removal() {
        let mut m = CompactLinkedHashMap::new();
        for i in 0..10u32 {
            m.insert(i, i);
        }
        // Removing early keys moves late slots into the holes.
        m.remove(&0);
        m.remove(&3);
        m.remove(&4);
        assert_eq!(keys(&m), [1, 2, 5, 6, 7, 8, 9]);

        // A reinserted key appears at its new insertion point.
        m.insert(3, 33);
        m.insert(0, 0);
        assert_eq!(keys(&m), [1, 2, 5, 6, 7, 8, 9, 3, 0]);
        assert_eq!(m.front(), Some((&1, &1)));
        assert_eq!(m.back(), Some((&0, &0)));
    }

    #[test]
    fn test_access_order() {
        let mut m = CompactLinkedHashMap::with_order(LinkOrder::Access);
        assert_eq!(m.order(), LinkOrder::Access);
        for i in 0..5u32 {
            m.insert(i, i);
        }
        m.get(&1);
        assert_eq!(keys(&m), [0, 2, 3, 4, 1]);
        m.insert(0, 100);
        assert_eq!(keys(&m), [2, 3, 4, 1, 0]);
        *m.get_mut(&3).unwrap() += 1;
        assert_eq!(keys(&m), [2, 4, 1, 0, 3]);

        // Neither peek, contains_key nor iteration counts as an access.
        assert_eq!(m.peek(&2), Some(&2));
        assert!(m.contains_key(&4));
        assert_eq!(m[&2], 2);
        assert_eq!(keys(&m), [2, 4, 1, 0, 3]);

        // A miss leaves the order alone.
        assert_eq!(m.get(&42), None);
        assert_eq!(keys(&m), [2, 4, 1, 0, 3]);
    }

    #[test]
    fn test_lru_eviction() {
        let capacity = 3;
        let mut cache = CompactLinkedHashMap::with_order(LinkOrder::Access);
        let mut evicted = Vec::new();
        for key in [1u32, 2, 3, 1, 4, 2, 5, 1] {
            if cache.get(&key).is_none() {
                if cache.len() == capacity {
                    evicted.push(cache.pop_front().unwrap().0);
                }
                cache.insert(key, ());
            }
        }
        assert_eq!(evicted, [2, 3, 1, 4]);
        assert_eq!(keys(&cache), [2, 5, 1]);
    }

    #[test]
    fn test_pop_front_and_back() {
        let mut m: CompactLinkedHashMap<u32, u32> = (0..4).map(|i| (i, i * 10)).collect();
        assert_eq!(m.pop_back(), Some((3, 30)));
        assert_eq!(m.pop_front(), Some((0, 0)));
        assert_eq!(keys(&m), [1, 2]);
        assert_eq!(m.pop_front(), Some((1, 10)));
        assert_eq!(m.pop_front(), Some((2, 20)));
        assert_eq!(m.pop_front(), None);
        assert_eq!(m.pop_back(), None);
        assert_eq!(m.front(), None);
        assert!(m.is_empty());
    }

    #[test]
    fn test_access_bumps_modification_count() {
        let mut m = CompactLinkedHashMap::with_order(LinkOrder::Access);
        m.insert(1, 1);
        m.insert(2, 2);
        let mut cursor = m.cursor();
        assert_eq!(m.cursor_next(&mut cursor), Ok(Some((&1, &1))));
        m.get(&1);
        assert_eq!(m.cursor_next(&mut cursor), Err(Error::ConcurrentModification));

        // Insertion order ignores lookups.
        let mut m = CompactLinkedHashMap::new();
        m.insert(1, 1);
        m.insert(2, 2);
        let mut cursor = m.cursor();
        m.cursor_next(&mut cursor).unwrap();
        m.get(&1);
        assert_eq!(m.cursor_next(&mut cursor), Ok(Some((&2, &2))));
    }

    #[test]
    fn test_cursor_remove_in_link_order() {
        let mut m = CompactLinkedHashMap::new();
        for i in 0..12u32 {
            m.insert(i, i);
        }
        m.remove(&2);
        m.insert(2, 2);

        let mut cursor = m.cursor();
        let mut seen = Vec::new();
        while let Some((&k, _)) = m.cursor_next(&mut cursor).unwrap() {
            seen.push(k);
            if k % 3 == 0 {
                m.cursor_remove(&mut cursor).unwrap();
            }
        }
        assert_eq!(seen, [0, 1, 3, 4, 5, 6, 7, 8, 9, 10, 11, 2]);
        assert_eq!(keys(&m), [1, 4, 5, 7, 8, 10, 11, 2]);
    }

    #[test]
    fn test_retain_and_for_each_mut_in_order() {
        let mut m: CompactLinkedHashMap<u32, u32> = (0..10).rev().map(|i| (i, i)).collect();
        let mut visited = Vec::new();
        m.retain(|k, _| {
            visited.push(*k);
            k % 2 == 1
        });
        assert_eq!(visited, [9, 8, 7, 6, 5, 4, 3, 2, 1, 0]);
        assert_eq!(keys(&m), [9, 7, 5, 3, 1]);

        let mut order = Vec::new();
        m.for_each_mut(|k, v| {
            order.push(*k);
            *v *= 2;
        });
        assert_eq!(order, [9, 7, 5, 3, 1]);
        assert_eq!(m.into_values().collect::<Vec<_>>(), [18, 14, 10, 6, 2]);
    }

    #[test]
    fn test_into_iter_in_link_order() {
        let mut m = CompactLinkedHashMap::new();
        for k in ["x", "y", "z", "w"] {
            m.insert(k, ());
        }
        m.remove("x");
        m.insert("x", ());
        let owned: Vec<_> = m.clone().into_iter().map(|(k, _)| k).collect();
        assert_eq!(owned, ["y", "z", "w", "x"]);
        assert_eq!(m.into_keys().collect::<Vec<_>>(), ["y", "z", "w", "x"]);
    }

    #[test]
    fn test_equality_and_debug() {
        let a: CompactLinkedHashMap<u32, u32> = [(1, 1), (2, 2)].into_iter().collect();
        let b: CompactLinkedHashMap<u32, u32> = [(2, 2), (1, 1)].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(format!("{a:?}"), "{1: 1, 2: 2}");
        assert_eq!(format!("{b:?}"), "{2: 2, 1: 1}");
    }

    #[test]
    fn test_random_against_ordered_model() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(7);
        let mut m = CompactLinkedHashMap::with_order(LinkOrder::Access);
        // Model: keys ordered from least to most recently used.
        let mut model: Vec<(u8, u32)> = Vec::new();

        for step in 0..5_000u32 {
            let key = rng.gen_range(0..64u8);
            let pos = model.iter().position(|(k, _)| *k == key);
            match rng.gen_range(0..3) {
                0 => {
                    let old = pos.map(|p| model.remove(p).1);
                    model.push((key, step));
                    assert_eq!(m.insert(key, step), old);
                }
                1 => {
                    let old = pos.map(|p| model.remove(p).1);
                    assert_eq!(m.remove(&key), old);
                }
                _ => {
                    let expected = pos.map(|p| {
                        let entry = model.remove(p);
                        model.push(entry);
                        entry.1
                    });
                    assert_eq!(m.get(&key).copied(), expected);
                }
            }
            assert_eq!(m.len(), model.len());
        }
        let actual: Vec<_> = m.iter().map(|(&k, &v)| (k, v)).collect();
        assert_eq!(actual, model);
    }
}
