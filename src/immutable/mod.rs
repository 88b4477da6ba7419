//! Read-only maps built once from a batch of entries.
//!
//! Entries are stored in submission order. Lookups go through a [`Lookup`]
//! index over that array, which is one of:
//!
//! - `Trivial`: zero or one entry, compared directly;
//! - `Closed`: a fixed power-of-two bucket table whose chains are threaded
//!   through one [`HashLink`] per entry, sized for [`MAX_LOAD_FACTOR`];
//! - `Fallback`: a `hashbrown::HashTable` of entry indices, used once some
//!   bucket would chain more than [`MAX_HASH_BUCKET_LENGTH`] entries.
//!
//! All three answer the same queries, so the choice never shows outside the
//! crate except in lookup cost.

use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};
use std::iter::FusedIterator;

use hashbrown::hash_table::{Entry, HashTable};

use crate::error::BuildError;
use crate::hashing::{closed_table_size, smeared_hash};
use crate::link::{HashLink, MAX_ENTRIES, UNSET};

pub mod bimap;
pub mod map;

/// Target load factor of a closed table. Tables are never resized, so this is
/// tighter than the mutable map's growth threshold.
pub const MAX_LOAD_FACTOR: f64 = 1.2;

/// Longest bucket chain a closed table may hold.
pub const MAX_HASH_BUCKET_LENGTH: usize = 8;

/// Entry storage with dedicated shapes for zero and one entries.
#[derive(Clone)]
pub(crate) enum Entries<K, V> {
    Empty,
    Singleton((K, V)),
    Many(Box<[(K, V)]>),
}

impl<K, V> Entries<K, V> {
    pub(crate) fn from_vec(mut entries: Vec<(K, V)>) -> Self {
        match entries.len() {
            0 => Entries::Empty,
            1 => Entries::Singleton(entries.swap_remove(0)),
            _ => Entries::Many(entries.into_boxed_slice()),
        }
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[(K, V)] {
        match self {
            Entries::Empty => &[],
            Entries::Singleton(entry) => std::slice::from_ref(entry),
            Entries::Many(entries) => entries,
        }
    }

    pub(crate) fn into_vec(self) -> Vec<(K, V)> {
        match self {
            Entries::Empty => Vec::new(),
            Entries::Singleton(entry) => vec![entry],
            Entries::Many(entries) => entries.into_vec(),
        }
    }

    /// Swaps the roles of keys and values, keeping the order.
    pub(crate) fn flip(self) -> Entries<V, K> {
        match self {
            Entries::Empty => Entries::Empty,
            Entries::Singleton((k, v)) => Entries::Singleton((v, k)),
            Entries::Many(entries) => Entries::Many(
                entries
                    .into_vec()
                    .into_iter()
                    .map(|(k, v)| (v, k))
                    .collect(),
            ),
        }
    }
}

/// Two entries whose indexed halves are equal; `existing < conflicting`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Conflict {
    pub(crate) existing: usize,
    pub(crate) conflicting: usize,
}

impl Conflict {
    /// Moves both conflicting entries out of `entries`, earlier one first.
    pub(crate) fn take<K, V>(self, mut entries: Vec<(K, V)>) -> ((K, V), (K, V)) {
        // Removing the higher index first leaves the lower one in place.
        let conflicting = entries.swap_remove(self.conflicting);
        let existing = entries.swap_remove(self.existing);
        (existing, conflicting)
    }

    pub(crate) fn duplicate_key<K, V>(self, entries: Vec<(K, V)>) -> BuildError<K, V> {
        let (existing, conflicting) = self.take(entries);
        BuildError::DuplicateKey {
            existing,
            conflicting,
        }
    }

    pub(crate) fn duplicate_value<K, V>(self, entries: Vec<(K, V)>) -> BuildError<K, V> {
        let (existing, conflicting) = self.take(entries);
        BuildError::DuplicateValue {
            existing,
            conflicting,
        }
    }
}

pub(crate) fn key_of<K, V>(entry: &(K, V)) -> &K {
    &entry.0
}

pub(crate) fn value_of<K, V>(entry: &(K, V)) -> &V {
    &entry.1
}

/// Rejects batches whose indices would not fit a `u32` slot.
pub(crate) fn check_len<K, V>(entries: &[(K, V)]) -> Result<(), BuildError<K, V>> {
    if entries.len() > MAX_ENTRIES {
        return Err(BuildError::CapacityExceeded {
            len: entries.len(),
            max: MAX_ENTRIES,
        });
    }
    Ok(())
}

/// Hash index over one half (keys or values) of an entry array.
#[derive(Clone)]
pub(crate) enum Lookup {
    Trivial,
    Closed {
        /// Bucket heads; length is a power of two.
        heads: Box<[u32]>,
        /// Per entry: smeared hash and next entry in the same bucket.
        links: Box<[HashLink]>,
    },
    Fallback(HashTable<u32>),
}

impl Lookup {
    /// Indexes `project(e)` for every entry, rejecting the first entry (in
    /// submission order) whose indexed half repeats an earlier one.
    pub(crate) fn build<E, T, S, P>(
        entries: &[E],
        project: P,
        hash_builder: &S,
    ) -> Result<Self, Conflict>
    where
        T: Hash + Eq + ?Sized,
        S: BuildHasher,
        P: Fn(&E) -> &T,
    {
        if entries.len() < 2 {
            return Ok(Lookup::Trivial);
        }
        match Self::closed(entries, &project, hash_builder)? {
            Some(closed) => Ok(closed),
            None => Self::fallback(entries, &project, hash_builder),
        }
    }

    /// Threads every entry into a closed table, or returns `None` as soon as
    /// a chain would exceed [`MAX_HASH_BUCKET_LENGTH`].
    fn closed<E, T, S, P>(
        entries: &[E],
        project: &P,
        hash_builder: &S,
    ) -> Result<Option<Self>, Conflict>
    where
        T: Hash + Eq + ?Sized,
        S: BuildHasher,
        P: Fn(&E) -> &T,
    {
        let table_len = closed_table_size(entries.len(), MAX_LOAD_FACTOR);
        let mask = table_len - 1;
        let mut heads = vec![UNSET; table_len].into_boxed_slice();
        let mut links = Vec::with_capacity(entries.len());

        for (i, entry) in entries.iter().enumerate() {
            let item = project(entry);
            let hash = smeared_hash(hash_builder, item);
            let bucket = hash as usize & mask;

            // Scan the whole chain for a conflict before judging its length.
            let mut chain_len = 1;
            let mut cur = heads[bucket];
            while cur != UNSET {
                let link: HashLink = links[cur as usize];
                if link.hash() == hash && project(&entries[cur as usize]) == item {
                    return Err(Conflict {
                        existing: cur as usize,
                        conflicting: i,
                    });
                }
                chain_len += 1;
                cur = link.next();
            }
            if chain_len > MAX_HASH_BUCKET_LENGTH {
                log::debug!(
                    "immutable map: bucket {bucket} would chain {chain_len} of {} entries, \
                     using fallback index",
                    entries.len()
                );
                return Ok(None);
            }

            links.push(HashLink::new(hash).with_next(heads[bucket]));
            heads[bucket] = i as u32;
        }

        Ok(Some(Lookup::Closed {
            heads,
            links: links.into_boxed_slice(),
        }))
    }

    pub(crate) fn fallback<E, T, S, P>(
        entries: &[E],
        project: &P,
        hash_builder: &S,
    ) -> Result<Self, Conflict>
    where
        T: Hash + Eq + ?Sized,
        S: BuildHasher,
        P: Fn(&E) -> &T,
    {
        let rehash = |&j: &u32| hash_builder.hash_one(project(&entries[j as usize]));
        let mut index = HashTable::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            let item = project(entry);
            let hash = hash_builder.hash_one(item);
            match index.entry(hash, |&j: &u32| project(&entries[j as usize]) == item, rehash) {
                Entry::Occupied(found) => {
                    return Err(Conflict {
                        existing: *found.get() as usize,
                        conflicting: i,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(i as u32);
                }
            }
        }
        Ok(Lookup::Fallback(index))
    }

    /// Index of the entry whose indexed half equals `key`.
    pub(crate) fn find<E, T, Q, S, P>(
        &self,
        entries: &[E],
        project: P,
        hash_builder: &S,
        key: &Q,
    ) -> Option<usize>
    where
        T: Borrow<Q> + ?Sized,
        Q: Hash + Eq + ?Sized,
        S: BuildHasher,
        P: Fn(&E) -> &T,
    {
        match self {
            Lookup::Trivial => entries.iter().position(|e| project(e).borrow() == key),
            Lookup::Closed { heads, links } => {
                let hash = smeared_hash(hash_builder, key);
                let mut cur = heads[hash as usize & (heads.len() - 1)];
                while cur != UNSET {
                    let link = links[cur as usize];
                    if link.hash() == hash && project(&entries[cur as usize]).borrow() == key {
                        return Some(cur as usize);
                    }
                    cur = link.next();
                }
                None
            }
            Lookup::Fallback(index) => index
                .find(hash_builder.hash_one(key), |&j| {
                    project(&entries[j as usize]).borrow() == key
                })
                .map(|&j| j as usize),
        }
    }

    #[cfg(test)]
    pub(crate) fn is_fallback(&self) -> bool {
        matches!(self, Lookup::Fallback(_))
    }
}

/// Iterator over the entries of an immutable map, in submission order.
pub struct Iter<'a, K, V> {
    pub(crate) inner: std::slice::Iter<'a, (K, V)>,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (k, v))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Keys of an immutable map, in submission order.
pub struct Keys<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// Values of an immutable map, in submission order.
pub struct Values<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
