use crate::error::{Error, Result};

/// Default upper occupancy bound: a node holding more records or links splits.
pub const MAX_THRESHOLD: usize = 30;

/// Default lower occupancy bound: a non-root node holding fewer tries to merge.
pub const MIN_THRESHOLD: usize = 5;

/// Occupancy bounds shared by every node of a tree.
///
/// Occupancy is the record count of a leaf and the link count of an inner node (the
/// heir is not counted). A node is too big above `max` and too small below `min`; the
/// root is never merged away for being small.
///
/// # Examples
///
/// ```
/// use heirloom_index::{MAX_THRESHOLD, MIN_THRESHOLD, Thresholds};
///
/// let defaults = Thresholds::default();
/// assert_eq!((defaults.max(), defaults.min()), (MAX_THRESHOLD, MIN_THRESHOLD));
///
/// let tiny = Thresholds::new(3, 1).unwrap();
/// assert!(tiny.is_too_big(4));
/// assert!(Thresholds::new(10, 6).is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Thresholds {
    max: usize,
    min: usize,
}

impl Thresholds {
    /// Validates a pair of bounds.
    ///
    /// Both halves of a split hold at least `max / 2` entries, so `min` may not exceed
    /// that, and `min` must be positive so that an emptied node always asks for a merge.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidThresholds`] when `max < 2`, `min == 0` or `min > max / 2`.
    pub const fn new(max: usize, min: usize) -> Result<Self> {
        if max < 2 || min == 0 || min > max / 2 {
            return Err(Error::InvalidThresholds { min, max });
        }
        Ok(Self { max, min })
    }

    #[must_use]
    pub const fn max(&self) -> usize {
        self.max
    }

    #[must_use]
    pub const fn min(&self) -> usize {
        self.min
    }

    /// Returns true if a node of this occupancy must split.
    #[must_use]
    pub const fn is_too_big(&self, occupancy: usize) -> bool {
        occupancy > self.max
    }

    /// Returns true if a non-root node of this occupancy should merge.
    #[must_use]
    pub const fn is_too_small(&self, occupancy: usize) -> bool {
        occupancy < self.min
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max: MAX_THRESHOLD,
            min: MIN_THRESHOLD,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        assert_eq!(Thresholds::new(MAX_THRESHOLD, MIN_THRESHOLD), Ok(Thresholds::default()));
    }

    #[test]
    fn rejects_bounds_that_split_below_minimum() {
        assert_eq!(Thresholds::new(1, 1), Err(Error::InvalidThresholds { min: 1, max: 1 }));
        assert_eq!(Thresholds::new(10, 0), Err(Error::InvalidThresholds { min: 0, max: 10 }));
        assert_eq!(Thresholds::new(10, 6), Err(Error::InvalidThresholds { min: 6, max: 10 }));
        assert!(Thresholds::new(3, 1).is_ok());
        assert!(Thresholds::new(2, 1).is_ok());
    }

    #[test]
    fn bounds_are_exclusive() {
        let t = Thresholds::default();
        assert!(!t.is_too_big(30));
        assert!(t.is_too_big(31));
        assert!(!t.is_too_small(5));
        assert!(t.is_too_small(4));
    }
}
