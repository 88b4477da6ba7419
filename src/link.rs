//! Packed 64-bit link words.
//!
//! Both mutable maps keep one `u64` per slot that stores two 32-bit fields side
//! by side, so following a chain touches a single word per step.

/// Slot value meaning "no slot".
pub(crate) const UNSET: u32 = u32::MAX;

/// Order-chain value standing for both "before first" and "after last".
pub(crate) const ENDPOINT: u32 = u32::MAX - 1;

/// Upper bound on live entries; keeps every slot index below the sentinels.
pub const MAX_ENTRIES: usize = i32::MAX as usize;

const LOW_MASK: u64 = 0xFFFF_FFFF;
const HIGH_MASK: u64 = !LOW_MASK;

/// `[hash:32][next:32]`: the smeared hash of the slot's key and the next slot
/// in the same bucket chain (or [`UNSET`]).
///
/// The hash half never changes after the slot is written; only `next` is
/// rewritten on splices and rehashes.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) struct HashLink(u64);

impl HashLink {
    #[inline]
    pub(crate) fn new(hash: u32) -> Self {
        Self((u64::from(hash) << 32) | u64::from(UNSET))
    }

    #[inline]
    pub(crate) fn hash(self) -> u32 {
        (self.0 >> 32) as u32
    }

    #[inline]
    pub(crate) fn next(self) -> u32 {
        self.0 as u32
    }

    #[inline]
    pub(crate) fn with_next(self, next: u32) -> Self {
        Self((self.0 & HIGH_MASK) | u64::from(next))
    }
}

impl std::fmt::Debug for HashLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HashLink({:#010x} -> {})", self.hash(), SlotDisplay(self.next()))
    }
}

/// `[predecessor:32][successor:32]` in the linked map's order chain.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) struct OrderLink(u64);

impl OrderLink {
    pub(crate) const UNLINKED: OrderLink = OrderLink(u64::MAX);

    #[inline]
    pub(crate) fn predecessor(self) -> u32 {
        (self.0 >> 32) as u32
    }

    #[inline]
    pub(crate) fn successor(self) -> u32 {
        self.0 as u32
    }

    #[inline]
    pub(crate) fn with_predecessor(self, pred: u32) -> Self {
        Self((self.0 & LOW_MASK) | (u64::from(pred) << 32))
    }

    #[inline]
    pub(crate) fn with_successor(self, succ: u32) -> Self {
        Self((self.0 & HIGH_MASK) | u64::from(succ))
    }
}

impl std::fmt::Debug for OrderLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "OrderLink({} <- . -> {})",
            SlotDisplay(self.predecessor()),
            SlotDisplay(self.successor())
        )
    }
}

struct SlotDisplay(u32);

impl std::fmt::Display for SlotDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            UNSET => f.write_str("unset"),
            ENDPOINT => f.write_str("end"),
            slot => write!(f, "{slot}"),
        }
    }
}
