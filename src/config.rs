//! Construction parameters for the mutable maps.

use crate::error::{Error, Result};

/// Initial number of entry slots when no size hint is given.
pub const DEFAULT_SIZE: usize = 3;

/// Entries per bucket tolerated before the bucket table doubles.
pub const DEFAULT_LOAD_FACTOR: f64 = 1.0;

/// Configuration for [`CompactHashMap`](crate::CompactHashMap) and
/// [`CompactLinkedHashMap`](crate::CompactLinkedHashMap).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Number of entries the map should hold before its first resize.
    pub expected_size: usize,
    /// Maximum average chain length before the bucket table doubles.
    pub load_factor: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            expected_size: DEFAULT_SIZE,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }
}

impl Config {
    pub fn with_expected_size(expected_size: usize) -> Self {
        Self {
            expected_size,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.load_factor.is_finite() && self.load_factor > 0.0) {
            return Err(Error::InvalidLoadFactor(self.load_factor));
        }
        if self.expected_size > crate::link::MAX_ENTRIES {
            return Err(Error::CapacityExceeded {
                max: crate::link::MAX_ENTRIES,
            });
        }
        Ok(())
    }
}

/// Iteration order of a [`CompactLinkedHashMap`](crate::CompactLinkedHashMap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkOrder {
    /// Entries iterate in the order their keys were first inserted.
    #[default]
    Insertion,
    /// Entries iterate from least to most recently accessed.
    Access,
}
