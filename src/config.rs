//! Construction parameters shared by both table variants.

use crate::error::{MapError, Result};

/// Number of buckets/slots a table starts with when none is given.
pub const DEFAULT_INITIAL_CAPACITY: usize = 10;

/// Fill ratio at which the open-address table doubles before inserting.
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.75;

/// Initial sizing and growth threshold for a table.
///
/// The chained map only reads `initial_capacity`; it never resizes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableConfig {
    pub initial_capacity: usize,
    pub max_load_factor: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn with_max_load_factor(mut self, factor: f64) -> Self {
        self.max_load_factor = factor;
        self
    }

    /// Rejects a zero capacity and a load factor outside `(0, 1)`.
    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity == 0 {
            return Err(MapError::InvalidCapacity);
        }
        // NaN fails both comparisons.
        if !(self.max_load_factor > 0.0 && self.max_load_factor < 1.0) {
            return Err(MapError::InvalidLoadFactor {
                factor: self.max_load_factor,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = TableConfig::default();
        assert_eq!(cfg.initial_capacity, 10);
        assert_eq!(cfg.max_load_factor, 0.75);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_capacity_rejected() {
        let cfg = TableConfig::new().with_initial_capacity(0);
        assert_eq!(cfg.validate(), Err(MapError::InvalidCapacity));
    }

    #[test]
    fn load_factor_bounds() {
        for bad in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            let cfg = TableConfig::new().with_max_load_factor(bad);
            assert!(
                matches!(cfg.validate(), Err(MapError::InvalidLoadFactor { .. })),
                "factor {} should be rejected",
                bad
            );
        }
        assert!(TableConfig::new().with_max_load_factor(0.5).validate().is_ok());
    }
}
