//! Candidate lag ranges for warping.

use crate::error::WarpError;

/// A fixed inclusive range of integer candidate lags `[min, max]`.
///
/// Lag index `l` maps to the shift value `min + l` samples; all lag indices
/// stay within `0..count()` during accumulation and backtracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LagRange {
    min: i64,
    max: i64,
}

impl LagRange {
    /// Create a lag range.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`WarpError::InvalidLagRange`] | `min > max` |
    pub fn new(min: i64, max: i64) -> Result<Self, WarpError> {
        if min > max {
            return Err(WarpError::InvalidLagRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Create the symmetric range `[-radius, radius]`.
    ///
    /// # Errors
    ///
    /// Returns [`WarpError::InvalidLagRange`] if `radius` is negative.
    pub fn symmetric(radius: i64) -> Result<Self, WarpError> {
        Self::new(-radius, radius)
    }

    /// Return the minimum lag in samples.
    #[must_use]
    pub fn min(&self) -> i64 {
        self.min
    }

    /// Return the maximum lag in samples.
    #[must_use]
    pub fn max(&self) -> i64 {
        self.max
    }

    /// Return the number of candidate lags.
    #[must_use]
    pub fn count(&self) -> usize {
        (self.max - self.min + 1) as usize
    }

    /// Return the shift value in samples for lag index `l`.
    #[must_use]
    pub fn lag(&self, l: usize) -> i64 {
        self.min + l as i64
    }

    /// Iterate over `(lag index, shift in samples)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, i64)> + '_ {
        (0..self.count()).map(|l| (l, self.lag(l)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_range() {
        assert!(matches!(
            LagRange::new(5, -5),
            Err(WarpError::InvalidLagRange { min: 5, max: -5 })
        ));
    }

    #[test]
    fn symmetric_range() {
        let r = LagRange::symmetric(10).unwrap();
        assert_eq!(r.min(), -10);
        assert_eq!(r.max(), 10);
        assert_eq!(r.count(), 21);
    }

    #[test]
    fn symmetric_rejects_negative_radius() {
        assert!(LagRange::symmetric(-1).is_err());
    }

    #[test]
    fn index_to_shift() {
        let r = LagRange::new(-5, 5).unwrap();
        assert_eq!(r.lag(0), -5);
        assert_eq!(r.lag(5), 0);
        assert_eq!(r.lag(10), 5);
    }

    #[test]
    fn one_sided_range() {
        let r = LagRange::new(0, 160).unwrap();
        assert_eq!(r.count(), 161);
        assert_eq!(r.lag(0), 0);
    }

    #[test]
    fn single_lag_range() {
        let r = LagRange::new(3, 3).unwrap();
        assert_eq!(r.count(), 1);
        assert_eq!(r.lag(0), 3);
    }
}
