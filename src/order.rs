//! Iteration order policies for the shared compact-map engine.
//!
//! The engine keeps entries dense in slots `0..len` and moves the last slot into
//! every hole left by a removal. An [`EntryOrder`] decides how that physical
//! layout is presented to iterators:
//!
//! - [`DenseOrder`] walks slots `0..len` directly and needs no storage.
//! - [`LinkedOrder`] threads a doubly-linked list through a parallel array of
//!   [`OrderLink`] words so iteration follows insertion (or access) order no
//!   matter where entries physically live.

use std::collections::TryReserveError;

use crate::config::LinkOrder;
use crate::link::{OrderLink, ENDPOINT};

/// Hooks the engine calls on every structural change.
pub(crate) trait EntryOrder: Clone {
    fn try_reserve_exact(&mut self, additional: usize) -> Result<(), TryReserveError>;

    fn shrink_to_fit(&mut self);

    /// `slot` was appended at the end of the entry arrays.
    fn on_insert(&mut self, slot: u32);

    /// A lookup or overwrite hit `slot`. Returns whether the order changed.
    fn on_access(&mut self, slot: u32) -> bool;

    /// `dst` is being removed and the entry at `last` (the final slot) is about
    /// to be moved into it. Called before the entry arrays shrink.
    fn on_remove(&mut self, dst: u32, last: u32);

    fn clear(&mut self);

    fn first(&self, len: usize) -> Option<usize>;

    fn last(&self, len: usize) -> Option<usize>;

    fn successor(&self, slot: usize, len: usize) -> Option<usize>;

    /// Repairs a cursor's pending `next` slot after `removed` was vacated and
    /// the map shrank to `len`.
    fn adjust_after_remove(&self, next: Option<usize>, removed: usize, len: usize)
        -> Option<usize>;

    fn walk(&self, len: usize) -> Walk<'_>;
}

// =============================================================================
// Dense order
// =============================================================================

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct DenseOrder;

impl EntryOrder for DenseOrder {
    fn try_reserve_exact(&mut self, _additional: usize) -> Result<(), TryReserveError> {
        Ok(())
    }

    fn shrink_to_fit(&mut self) {}

    #[inline]
    fn on_insert(&mut self, _slot: u32) {}

    #[inline]
    fn on_access(&mut self, _slot: u32) -> bool {
        false
    }

    #[inline]
    fn on_remove(&mut self, _dst: u32, _last: u32) {}

    fn clear(&mut self) {}

    #[inline]
    fn first(&self, len: usize) -> Option<usize> {
        (len > 0).then_some(0)
    }

    #[inline]
    fn last(&self, len: usize) -> Option<usize> {
        len.checked_sub(1)
    }

    #[inline]
    fn successor(&self, slot: usize, len: usize) -> Option<usize> {
        (slot + 1 < len).then_some(slot + 1)
    }

    #[inline]
    fn adjust_after_remove(
        &self,
        next: Option<usize>,
        _removed: usize,
        _len: usize,
    ) -> Option<usize> {
        // The old last slot now sits one position back, where the removed
        // entry was.
        next.map(|n| n - 1)
    }

    fn walk(&self, len: usize) -> Walk<'_> {
        Walk::Dense(0..len)
    }
}

// =============================================================================
// Linked order
// =============================================================================

/// Doubly-linked order over slots. `first`/`last` hold [`ENDPOINT`] when the
/// map is empty.
#[derive(Clone, Debug)]
pub(crate) struct LinkedOrder {
    pub(crate) links: Vec<OrderLink>,
    pub(crate) first: u32,
    pub(crate) last: u32,
    pub(crate) order: LinkOrder,
}

impl LinkedOrder {
    pub(crate) fn new(order: LinkOrder, capacity: usize) -> Self {
        Self {
            links: Vec::with_capacity(capacity),
            first: ENDPOINT,
            last: ENDPOINT,
            order,
        }
    }

    /// Makes `succ` follow `pred`, either of which may be [`ENDPOINT`].
    fn set_succeeds(&mut self, pred: u32, succ: u32) {
        if pred == ENDPOINT {
            self.first = succ;
        } else {
            let p = pred as usize;
            self.links[p] = self.links[p].with_successor(succ);
        }
        if succ == ENDPOINT {
            self.last = pred;
        } else {
            let s = succ as usize;
            self.links[s] = self.links[s].with_predecessor(pred);
        }
    }

    fn unsplice(&mut self, slot: u32) {
        let link = self.links[slot as usize];
        self.set_succeeds(link.predecessor(), link.successor());
    }

    fn append(&mut self, slot: u32) {
        self.set_succeeds(self.last, slot);
        self.set_succeeds(slot, ENDPOINT);
    }

    #[inline]
    fn slot(raw: u32) -> Option<usize> {
        (raw != ENDPOINT).then_some(raw as usize)
    }
}

impl EntryOrder for LinkedOrder {
    fn try_reserve_exact(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.links.try_reserve_exact(additional)
    }

    fn shrink_to_fit(&mut self) {
        self.links.shrink_to_fit();
    }

    fn on_insert(&mut self, slot: u32) {
        debug_assert_eq!(slot as usize, self.links.len());
        self.links.push(OrderLink::UNLINKED);
        self.append(slot);
    }

    fn on_access(&mut self, slot: u32) -> bool {
        if self.order != LinkOrder::Access {
            return false;
        }
        self.unsplice(slot);
        self.append(slot);
        true
    }

    fn on_remove(&mut self, dst: u32, last: u32) {
        self.unsplice(dst);
        if dst < last {
            // Re-point the moved entry's neighbours at its new slot.
            let moved = self.links[last as usize];
            self.set_succeeds(moved.predecessor(), dst);
            self.set_succeeds(dst, moved.successor());
        }
        self.links.pop();
    }

    fn clear(&mut self) {
        self.links.clear();
        self.first = ENDPOINT;
        self.last = ENDPOINT;
    }

    #[inline]
    fn first(&self, _len: usize) -> Option<usize> {
        Self::slot(self.first)
    }

    #[inline]
    fn last(&self, _len: usize) -> Option<usize> {
        Self::slot(self.last)
    }

    #[inline]
    fn successor(&self, slot: usize, _len: usize) -> Option<usize> {
        Self::slot(self.links[slot].successor())
    }

    fn adjust_after_remove(
        &self,
        next: Option<usize>,
        removed: usize,
        len: usize,
    ) -> Option<usize> {
        // If the pending slot was the physical last one, it moved into the hole.
        next.map(|n| if n >= len { removed } else { n })
    }

    fn walk(&self, len: usize) -> Walk<'_> {
        Walk::Linked {
            links: &self.links,
            front: self.first,
            back: self.last,
            remaining: len,
        }
    }
}

// =============================================================================
// Walk
// =============================================================================

/// Slot sequence produced by an [`EntryOrder`], front to back.
#[derive(Clone, Debug)]
pub(crate) enum Walk<'a> {
    Dense(std::ops::Range<usize>),
    Linked {
        links: &'a [OrderLink],
        front: u32,
        back: u32,
        remaining: usize,
    },
}

impl Iterator for Walk<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        match self {
            Walk::Dense(range) => range.next(),
            Walk::Linked {
                links,
                front,
                remaining,
                ..
            } => {
                if *remaining == 0 {
                    return None;
                }
                let slot = *front as usize;
                *front = links[slot].successor();
                *remaining -= 1;
                Some(slot)
            }
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = match self {
            Walk::Dense(range) => range.len(),
            Walk::Linked { remaining, .. } => *remaining,
        };
        (n, Some(n))
    }
}

impl DoubleEndedIterator for Walk<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<usize> {
        match self {
            Walk::Dense(range) => range.next_back(),
            Walk::Linked {
                links,
                back,
                remaining,
                ..
            } => {
                if *remaining == 0 {
                    return None;
                }
                let slot = *back as usize;
                *back = links[slot].predecessor();
                *remaining -= 1;
                Some(slot)
            }
        }
    }
}

impl ExactSizeIterator for Walk<'_> {}

impl std::iter::FusedIterator for Walk<'_> {}
