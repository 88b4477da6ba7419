//! Hash mixing and table sizing shared by every table in the crate.

use std::hash::{BuildHasher, Hash};

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;

/// Largest bucket table any map will allocate.
pub const MAX_TABLE_SIZE: usize = 1 << 30;

/// Spreads the entropy of a hash code across all 32 bits.
///
/// Tables mask the smeared value with `len - 1`, so hash codes that only differ
/// in their high bits would otherwise all land in bucket zero.
#[inline]
pub fn smear(hash_code: u32) -> u32 {
    C2.wrapping_mul(hash_code.wrapping_mul(C1).rotate_left(15))
}

/// Smallest power of two (at least 2) whose table holds `expected_entries`
/// without exceeding `load_factor`, capped at [`MAX_TABLE_SIZE`].
pub fn closed_table_size(expected_entries: usize, load_factor: f64) -> usize {
    debug_assert!(load_factor > 0.0);
    let min_buckets = (expected_entries as f64 / load_factor).ceil();
    // Saturating float -> int cast; the clamp keeps next_power_of_two in range.
    let min_buckets = (min_buckets as usize).clamp(2, MAX_TABLE_SIZE);
    min_buckets.next_power_of_two()
}

#[inline]
pub fn needs_resizing(size: usize, table_size: usize, load_factor: f64) -> bool {
    size as f64 > load_factor * table_size as f64 && table_size < MAX_TABLE_SIZE
}

/// Folds the 64-bit hasher output into the 32-bit hash code `smear` consumes.
#[inline]
pub(crate) fn fold(hash: u64) -> u32 {
    (hash ^ (hash >> 32)) as u32
}

#[inline]
pub(crate) fn smeared_hash<S: BuildHasher, Q: Hash + ?Sized>(hash_builder: &S, key: &Q) -> u32 {
    smear(fold(hash_builder.hash_one(key)))
}
