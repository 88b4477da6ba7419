//! Iterators over the mutable maps, plus the detached [`Cursor`].

use std::iter::FusedIterator;

use crate::error::{Error, Result};
use crate::order::Walk;

/// A detached, fail-fast position in a mutable map.
///
/// Unlike [`Iter`], a cursor does not borrow its map: it only records the next
/// slot to visit and the map's modification count at the time it last
/// synchronised. Stepping with `cursor_next` after the map was changed by
/// anything other than the cursor's own `cursor_remove` reports
/// [`Error::ConcurrentModification`] instead of yielding stale data.
///
/// ```rust
/// use compact_hash::{CompactHashMap, Error};
///
/// let mut map = CompactHashMap::new();
/// map.insert("a", 1);
/// map.insert("b", 2);
///
/// let mut cursor = map.cursor();
/// while let Some((_, v)) = map.cursor_next(&mut cursor).unwrap() {
///     if *v == 1 {
///         map.cursor_remove(&mut cursor).unwrap();
///     }
/// }
/// assert_eq!(map.len(), 1);
///
/// let mut stale = map.cursor();
/// map.insert("c", 3);
/// assert_eq!(map.cursor_next(&mut stale), Err(Error::ConcurrentModification));
/// ```
///
/// A cursor must only be used with the map that created it.
#[derive(Clone, Debug)]
pub struct Cursor {
    pub(crate) next: Option<usize>,
    pub(crate) last_returned: Option<usize>,
    pub(crate) expected_mod_count: u32,
}

impl Cursor {
    pub(crate) fn new(first: Option<usize>, mod_count: u32) -> Self {
        Self {
            next: first,
            last_returned: None,
            expected_mod_count: mod_count,
        }
    }

    #[inline]
    pub(crate) fn check(&self, mod_count: u32) -> Result<()> {
        if self.expected_mod_count != mod_count {
            return Err(Error::ConcurrentModification);
        }
        Ok(())
    }

    /// Whether a following `cursor_next` could yield an element.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// Iterator over `(&K, &V)` in map order.
pub struct Iter<'a, K, V> {
    pub(crate) keys: &'a [K],
    pub(crate) values: &'a [V],
    pub(crate) walk: Walk<'a>,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            keys: self.keys,
            values: self.values,
            walk: self.walk.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.walk.next()?;
        Some((&self.keys[slot], &self.values[slot]))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.walk.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        let slot = self.walk.next_back()?;
        Some((&self.keys[slot], &self.values[slot]))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K: std::fmt::Debug, V: std::fmt::Debug> std::fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// Iterator over keys in map order.
pub struct Keys<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
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
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// Iterator over values in map order.
pub struct Values<'a, K, V> {
    pub(crate) inner: Iter<'a, K, V>,
}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
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
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}

/// Mutable iterator over a [`CompactHashMap`](crate::CompactHashMap), in slot order.
pub struct IterMut<'a, K, V> {
    pub(crate) inner: std::iter::Zip<std::slice::Iter<'a, K>, std::slice::IterMut<'a, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// Mutable iterator over the values of a [`CompactHashMap`](crate::CompactHashMap).
pub struct ValuesMut<'a, K, V> {
    pub(crate) inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    #[inline]
    fn next(&mut self) -> Option<&'a mut V> {
        self.inner.next().map(|(_, v)| v)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}
impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

/// Owning iterator, in map order.
pub struct IntoIter<K, V> {
    pub(crate) inner: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    #[inline]
    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<(K, V)> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

/// Owning iterator over keys.
pub struct IntoKeys<K, V> {
    pub(crate) inner: IntoIter<K, V>,
}

impl<K, V> Iterator for IntoKeys<K, V> {
    type Item = K;

    #[inline]
    fn next(&mut self) -> Option<K> {
        self.inner.next().map(|(k, _)| k)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IntoKeys<K, V> {}

/// Owning iterator over values.
pub struct IntoValues<K, V> {
    pub(crate) inner: IntoIter<K, V>,
}

impl<K, V> Iterator for IntoValues<K, V> {
    type Item = V;

    #[inline]
    fn next(&mut self) -> Option<V> {
        self.inner.next().map(|(_, v)| v)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IntoValues<K, V> {}
