//! The open-hashing engine shared by [`CompactHashMap`](crate::CompactHashMap)
//! and [`CompactLinkedHashMap`](crate::CompactLinkedHashMap).
//!
//! Layout:
//!
//! ```text
//! table:  [head slot | UNSET] * 2^k          bucket -> first slot of its chain
//! links:  [hash:32][next:32]  * len          per-slot packed hash + chain link
//! keys:   K                   * len
//! values: V                   * len
//! order:  EntryOrder                         iteration policy (dense or linked)
//! ```
//!
//! Slots are always `0..len` with no holes: a removal moves the last slot into
//! the vacated one and rewires whichever chain link pointed at it.

use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};
use std::mem;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::hashing::{closed_table_size, needs_resizing, smeared_hash};
use crate::iter::Cursor;
use crate::link::{HashLink, MAX_ENTRIES, UNSET};
use crate::order::{EntryOrder, Walk};

#[derive(Clone)]
pub(crate) struct RawCompactMap<K, V, S, O> {
    /// Bucket heads; length is always a power of two.
    pub(crate) table: Box<[u32]>,
    pub(crate) links: Vec<HashLink>,
    pub(crate) keys: Vec<K>,
    pub(crate) values: Vec<V>,
    pub(crate) order: O,
    pub(crate) load_factor: f64,
    /// Bumped on every structural change; cursors compare against it.
    pub(crate) mod_count: u32,
    pub(crate) hash_builder: S,
}

const CAPACITY_EXCEEDED: Error = Error::CapacityExceeded { max: MAX_ENTRIES };

impl<K, V, S, O: EntryOrder> RawCompactMap<K, V, S, O> {
    pub(crate) fn with_config(config: Config, hash_builder: S, order: O) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, hash_builder, order))
    }

    /// Builds an empty map from an already validated (or clamped) config.
    pub(crate) fn from_parts(config: Config, hash_builder: S, order: O) -> Self {
        let expected = config.expected_size.min(MAX_ENTRIES);
        let buckets = closed_table_size(expected, config.load_factor);
        Self {
            table: vec![UNSET; buckets].into_boxed_slice(),
            links: Vec::with_capacity(expected),
            keys: Vec::with_capacity(expected),
            values: Vec::with_capacity(expected),
            order,
            load_factor: config.load_factor,
            mod_count: 0,
            hash_builder,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.links.len()
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.links.capacity()
    }

    #[inline]
    fn mask(&self) -> usize {
        self.table.len() - 1
    }

    #[inline]
    fn bump(&mut self) {
        self.mod_count = self.mod_count.wrapping_add(1);
    }

    pub(crate) fn touch(&mut self, slot: usize) {
        if self.order.on_access(slot as u32) {
            self.bump();
        }
    }

    // =============================================================================
    // Capacity
    // =============================================================================

    /// Grows the entry arrays by roughly 1.5x if `min_len` slots do not fit.
    fn grow_entries(&mut self, min_len: usize) -> Result<()> {
        if min_len > MAX_ENTRIES {
            return Err(CAPACITY_EXCEEDED);
        }
        let cap = self.capacity();
        if min_len <= cap {
            return Ok(());
        }
        let new_cap = (cap + (cap >> 1).max(1)).clamp(min_len, MAX_ENTRIES);
        self.reserve_entries(new_cap)
    }

    fn reserve_entries(&mut self, new_cap: usize) -> Result<()> {
        let additional = new_cap.saturating_sub(self.len());
        self.links
            .try_reserve_exact(additional)
            .map_err(|_| CAPACITY_EXCEEDED)?;
        self.keys
            .try_reserve_exact(additional)
            .map_err(|_| CAPACITY_EXCEEDED)?;
        self.values
            .try_reserve_exact(additional)
            .map_err(|_| CAPACITY_EXCEEDED)?;
        self.order
            .try_reserve_exact(additional)
            .map_err(|_| CAPACITY_EXCEEDED)
    }

    pub(crate) fn reserve(&mut self, additional: usize) -> Result<()> {
        let new_len = self
            .len()
            .checked_add(additional)
            .filter(|&n| n <= MAX_ENTRIES)
            .ok_or(CAPACITY_EXCEEDED)?;
        if new_len > self.capacity() {
            self.reserve_entries(new_len)?;
        }
        let buckets = closed_table_size(new_len, self.load_factor);
        if buckets > self.table.len() {
            self.resize_table(buckets);
        }
        Ok(())
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        self.links.shrink_to_fit();
        self.keys.shrink_to_fit();
        self.values.shrink_to_fit();
        self.order.shrink_to_fit();
        let buckets = closed_table_size(self.len(), self.load_factor);
        if buckets < self.table.len() {
            self.resize_table(buckets);
        }
    }

    /// Rebuilds every chain for a table of `new_len` buckets. Hashes are read
    /// back from the links; keys are never rehashed.
    fn resize_table(&mut self, new_len: usize) {
        debug_assert!(new_len.is_power_of_two());
        log::trace!(
            "compact map: bucket table {} -> {} ({} entries)",
            self.table.len(),
            new_len,
            self.len()
        );
        let mut table = vec![UNSET; new_len].into_boxed_slice();
        let mask = new_len - 1;
        for (slot, link) in self.links.iter_mut().enumerate() {
            let bucket = link.hash() as usize & mask;
            *link = link.with_next(table[bucket]);
            table[bucket] = slot as u32;
        }
        self.table = table;
    }

    // =============================================================================
    // Removal
    // =============================================================================

    /// Removes the entry at `slot`, locating its chain predecessor by index.
    pub(crate) fn remove_at(&mut self, slot: usize) -> (K, V) {
        let bucket = self.links[slot].hash() as usize & self.mask();
        let mut prev = UNSET;
        let mut cur = self.table[bucket];
        while cur as usize != slot {
            debug_assert_ne!(cur, UNSET, "slot {slot} missing from its bucket");
            prev = cur;
            cur = self.links[cur as usize].next();
        }
        self.remove_found(bucket, slot, prev)
    }

    fn remove_found(&mut self, bucket: usize, slot: usize, prev: u32) -> (K, V) {
        let next = self.links[slot].next();
        if prev == UNSET {
            self.table[bucket] = next;
        } else {
            let p = prev as usize;
            self.links[p] = self.links[p].with_next(next);
        }
        self.move_last_into(slot)
    }

    /// Fills the (already unchained) `dst` slot with the last slot's entry.
    fn move_last_into(&mut self, dst: usize) -> (K, V) {
        let last = self.len() - 1;
        self.order.on_remove(dst as u32, last as u32);
        if dst < last {
            let bucket = self.links[last].hash() as usize & self.mask();
            self.repoint(bucket, last as u32, dst as u32);
        }
        self.links.swap_remove(dst);
        let key = self.keys.swap_remove(dst);
        let value = self.values.swap_remove(dst);
        self.bump();
        (key, value)
    }

    /// Rewrites the chain link in `bucket` that points at `from` to point at `to`.
    fn repoint(&mut self, bucket: usize, from: u32, to: u32) {
        let mut cur = self.table[bucket];
        if cur == from {
            self.table[bucket] = to;
            return;
        }
        loop {
            debug_assert_ne!(cur, UNSET, "slot {from} missing from its bucket");
            let link = self.links[cur as usize];
            if link.next() == from {
                self.links[cur as usize] = link.with_next(to);
                return;
            }
            cur = link.next();
        }
    }

    pub(crate) fn clear(&mut self) {
        self.bump();
        self.links.clear();
        self.keys.clear();
        self.values.clear();
        self.table.fill(UNSET);
        self.order.clear();
    }

    pub(crate) fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut next = self.order.first(self.len());
        while let Some(slot) = next {
            let succ = self.order.successor(slot, self.len());
            if f(&self.keys[slot], &mut self.values[slot]) {
                next = succ;
            } else {
                self.remove_at(slot);
                next = self.order.adjust_after_remove(succ, slot, self.len());
            }
        }
    }

    pub(crate) fn pop_at(&mut self, slot: Option<usize>) -> Option<(K, V)> {
        slot.map(|slot| self.remove_at(slot))
    }

    // =============================================================================
    // Iteration
    // =============================================================================

    #[inline]
    pub(crate) fn walk(&self) -> Walk<'_> {
        self.order.walk(self.len())
    }

    #[inline]
    pub(crate) fn entry_at(&self, slot: usize) -> (&K, &V) {
        (&self.keys[slot], &self.values[slot])
    }

    /// Consumes the map, yielding its entries in iteration order.
    pub(crate) fn into_entries(self) -> Vec<(K, V)> {
        let walk = self.order.walk(self.links.len());
        let slots: Vec<usize> = match walk {
            Walk::Dense(_) => return self.keys.into_iter().zip(self.values).collect(),
            walk => walk.collect(),
        };
        let mut entries: Vec<Option<(K, V)>> =
            self.keys.into_iter().zip(self.values).map(Some).collect();
        slots
            .into_iter()
            .filter_map(|slot| entries[slot].take())
            .collect()
    }

    pub(crate) fn cursor(&self) -> Cursor {
        Cursor::new(self.order.first(self.len()), self.mod_count)
    }

    pub(crate) fn cursor_next(&self, cursor: &mut Cursor) -> Result<Option<(&K, &V)>> {
        cursor.check(self.mod_count)?;
        let Some(slot) = cursor.next else {
            return Ok(None);
        };
        if slot >= self.len() {
            return Err(Error::ConcurrentModification);
        }
        cursor.last_returned = Some(slot);
        cursor.next = self.order.successor(slot, self.len());
        Ok(Some(self.entry_at(slot)))
    }

    pub(crate) fn cursor_remove(&mut self, cursor: &mut Cursor) -> Result<(K, V)> {
        cursor.check(self.mod_count)?;
        let slot = cursor
            .last_returned
            .take()
            .ok_or(Error::InvalidRemoveState)?;
        if slot >= self.len() {
            return Err(Error::ConcurrentModification);
        }
        let removed = self.remove_at(slot);
        cursor.next = self.order.adjust_after_remove(cursor.next, slot, self.len());
        cursor.expected_mod_count = self.mod_count;
        Ok(removed)
    }
}

impl<K, V, S, O> RawCompactMap<K, V, S, O>
where
    K: Hash + Eq,
    S: BuildHasher,
    O: EntryOrder,
{
    #[inline]
    fn hash_of<Q: Hash + ?Sized>(&self, key: &Q) -> u32 {
        smeared_hash(&self.hash_builder, key)
    }

    pub(crate) fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_of(key);
        let mut cur = self.table[hash as usize & self.mask()];
        while cur != UNSET {
            let link = self.links[cur as usize];
            if link.hash() == hash && self.keys[cur as usize].borrow() == key {
                return Some(cur as usize);
            }
            cur = link.next();
        }
        None
    }

    /// Inserts or overwrites, returning the entry's slot and the replaced value.
    ///
    /// New entries are appended to the tail of their bucket chain. Fails without
    /// touching the map if the entry arrays cannot grow.
    pub(crate) fn try_insert_full(&mut self, key: K, value: V) -> Result<(usize, Option<V>)> {
        let hash = self.hash_of(&key);
        let bucket = hash as usize & self.mask();

        let mut tail = UNSET;
        let mut cur = self.table[bucket];
        while cur != UNSET {
            let slot = cur as usize;
            let link = self.links[slot];
            if link.hash() == hash && self.keys[slot] == key {
                let old = mem::replace(&mut self.values[slot], value);
                self.touch(slot);
                return Ok((slot, Some(old)));
            }
            tail = cur;
            cur = link.next();
        }

        let slot = self.len();
        self.grow_entries(slot + 1)?;

        if tail == UNSET {
            self.table[bucket] = slot as u32;
        } else {
            let t = tail as usize;
            self.links[t] = self.links[t].with_next(slot as u32);
        }
        self.links.push(HashLink::new(hash));
        self.keys.push(key);
        self.values.push(value);
        self.order.on_insert(slot as u32);
        self.bump();

        if needs_resizing(self.len(), self.table.len(), self.load_factor) {
            self.resize_table(self.table.len() * 2);
        }
        Ok((slot, None))
    }

    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_of(key);
        let bucket = hash as usize & self.mask();
        let mut prev = UNSET;
        let mut cur = self.table[bucket];
        while cur != UNSET {
            let slot = cur as usize;
            let link = self.links[slot];
            if link.hash() == hash && self.keys[slot].borrow() == key {
                return Some(self.remove_found(bucket, slot, prev));
            }
            prev = cur;
            cur = link.next();
        }
        None
    }

    pub(crate) fn eq_entries<O2: EntryOrder>(&self, other: &RawCompactMap<K, V, S, O2>) -> bool
    where
        V: PartialEq,
    {
        self.len() == other.len()
            && self
                .keys
                .iter()
                .zip(&self.values)
                .all(|(k, v)| other.find(k).is_some_and(|slot| other.values[slot] == *v))
    }
}
