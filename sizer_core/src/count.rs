//! Saturating counters.

use serde::Serialize;
use std::fmt;
use std::ops::{Add, AddAssign};

/// A count of something, capped at `u64::MAX`.
///
/// Every sum saturates: once a counter reaches the maximum it stays there
/// instead of wrapping around to a small value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Count(u64);

impl Count {
    /// The zero count.
    pub const ZERO: Count = Count(0);

    /// The largest representable count.
    pub const MAX: Count = Count(u64::MAX);

    /// Create a count from a raw value.
    pub const fn new(value: u64) -> Self {
        Count(value)
    }

    /// Get the raw value.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns `self + other`, capped at `Count::MAX`.
    pub const fn add_capped(self, other: Count) -> Count {
        Count(self.0.saturating_add(other.0))
    }

    /// Returns `self + 1`, capped at `Count::MAX`.
    pub const fn increment(self) -> Count {
        self.add_capped(Count(1))
    }

    /// Returns true if the counter has saturated.
    pub const fn is_saturated(self) -> bool {
        self.0 == u64::MAX
    }
}

impl From<u64> for Count {
    fn from(value: u64) -> Self {
        Count(value)
    }
}

impl From<usize> for Count {
    fn from(value: usize) -> Self {
        Count(u64::try_from(value).unwrap_or(u64::MAX))
    }
}

impl From<Count> for u64 {
    fn from(count: Count) -> Self {
        count.0
    }
}

impl Add for Count {
    type Output = Count;

    fn add(self, other: Count) -> Count {
        self.add_capped(other)
    }
}

impl AddAssign for Count {
    fn add_assign(&mut self, other: Count) {
        *self = self.add_capped(other);
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_capped() {
        assert_eq!(Count::new(2) + Count::new(3), Count::new(5));
        assert_eq!(Count::MAX + Count::new(1), Count::MAX);
        assert_eq!(Count::new(u64::MAX - 1) + Count::new(5), Count::MAX);
        assert!(Count::MAX.increment().is_saturated());
    }

    #[test]
    fn test_add_assign_saturates() {
        let mut count = Count::new(u64::MAX - 2);
        count += Count::new(1);
        assert_eq!(count.get(), u64::MAX - 1);
        count += Count::new(10);
        assert_eq!(count, Count::MAX);
    }

    #[test]
    fn test_from_usize() {
        assert_eq!(Count::from(42usize), Count::new(42));
    }

    #[test]
    fn test_serialize_transparent() {
        let json = serde_json::to_string(&Count::new(17)).unwrap();
        assert_eq!(json, "17");
    }

    // Property-based tests
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            max_shrink_iters: 10000,
            ..ProptestConfig::default()
        })]

        /// Sums never wrap below the larger operand
        #[test]
        fn prop_sum_never_wraps(a: u64, b: u64) {
            let sum = Count::new(a) + Count::new(b);
            prop_assert!(sum >= Count::new(a.max(b)));
            match a.checked_add(b) {
                Some(exact) => prop_assert_eq!(sum.get(), exact),
                None => prop_assert_eq!(sum, Count::MAX),
            }
        }

        /// Addition is commutative under saturation
        #[test]
        fn prop_sum_commutative(a: u64, b: u64) {
            prop_assert_eq!(Count::new(a) + Count::new(b), Count::new(b) + Count::new(a));
        }
    }
}
