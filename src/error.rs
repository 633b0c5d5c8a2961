//! Error type shared by both map variants and the derived set.

use thiserror::Error;

/// Failures surfaced by map and set operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    /// The requested key is not present.
    #[error("key not found")]
    KeyNotFound,
    /// A probe sequence wrapped around the whole table without finding a
    /// usable slot, or the table could not grow any further. The load factor
    /// threshold makes this unreachable in a consistent table.
    #[error("open-address table exhausted at capacity {capacity}")]
    CapacityExhausted { capacity: usize },
    /// A table must have at least one slot.
    #[error("table capacity must be positive")]
    InvalidCapacity,
    /// The open-address growth threshold must lie strictly between 0 and 1.
    #[error("load factor {factor} is outside (0, 1)")]
    InvalidLoadFactor { factor: f64 },
}

pub type Result<T> = core::result::Result<T, MapError>;
