// src/miner/target.rs
//! Acceptance threshold derived from task difficulty

use primitive_types::{U256, U512};
use serde::Serialize;
use std::fmt;

/// Numeric threshold a hash value must fall strictly below
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Target(U256);

impl Target {
    /// A target no hash value can clear
    pub const ZERO: Target = Target(U256([0; 4]));

    /// Computes `floor(2^256 / difficulty)`
    ///
    /// `difficulty = 1` saturates to `2^256 - 1`. A zero difficulty is
    /// treated as `1`; [`crate::TaskDescriptor`] never carries one.
    pub fn from_difficulty(difficulty: U256) -> Self {
        if difficulty <= U256::one() {
            return Target(U256::MAX);
        }

        let quotient = (U512::one() << 256) / U512::from(difficulty);
        let mut wide = [0u8; 64];
        quotient.to_big_endian(&mut wide);
        // difficulty >= 2 keeps the quotient within the low 256 bits
        Target(U256::from_big_endian(&wide[32..]))
    }

    /// Wraps a raw threshold
    pub fn from_raw(value: U256) -> Self {
        Target(value)
    }

    /// The threshold as an integer
    pub fn value(&self) -> U256 {
        self.0
    }

    /// Whether a hash value qualifies as a solution
    #[inline]
    pub fn is_met_by(&self, hash: &U256) -> bool {
        *hash < self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_one_is_near_maximal() {
        assert_eq!(Target::from_difficulty(U256::one()).value(), U256::MAX);
    }

    #[test]
    fn exact_floor_division() {
        assert_eq!(
            Target::from_difficulty(U256::from(2)).value(),
            U256::one() << 255
        );
        assert_eq!(
            Target::from_difficulty(U256::from(3)).value(),
            U256::MAX / U256::from(3)
        );
        assert_eq!(
            Target::from_difficulty(U256::one() << 200).value(),
            U256::one() << 56
        );
        assert_eq!(Target::from_difficulty(U256::MAX).value(), U256::one());
    }

    #[test]
    fn non_increasing_in_difficulty() {
        let mut last = Target::from_difficulty(U256::one());
        for d in 2u64..500 {
            let next = Target::from_difficulty(U256::from(d));
            assert!(next < last, "target did not shrink at difficulty {}", d);
            last = next;
        }
    }

    #[test]
    fn zero_target_rejects_everything() {
        assert!(!Target::ZERO.is_met_by(&U256::zero()));
        let target = Target::from_raw(U256::from(10));
        assert!(target.is_met_by(&U256::from(9)));
        assert!(!target.is_met_by(&U256::from(10)));
    }
}
