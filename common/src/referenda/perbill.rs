use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::serializer::*;

const ACCURACY: u32 = 1_000_000_000;

/// A fraction in parts per billion, saturating at one
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Perbill(u32);

impl Perbill {
    pub const ACCURACY: u32 = ACCURACY;

    pub const fn zero() -> Self {
        Perbill(0)
    }

    pub const fn one() -> Self {
        Perbill(ACCURACY)
    }

    pub const fn from_parts(parts: u32) -> Self {
        if parts > ACCURACY {
            Perbill(ACCURACY)
        } else {
            Perbill(parts)
        }
    }

    pub const fn from_percent(percent: u32) -> Self {
        Self::from_parts(percent.saturating_mul(ACCURACY / 100))
    }

    /// `numerator / denominator`, rounded down and saturated at one.
    /// A zero denominator yields zero.
    pub fn from_rational(numerator: u128, denominator: u128) -> Self {
        if denominator == 0 {
            return Perbill::zero();
        }
        if numerator >= denominator {
            return Perbill::one();
        }

        let parts = U256::from(numerator) * U256::from(ACCURACY) / U256::from(denominator);
        Perbill(parts.low_u32())
    }

    pub fn deconstruct(self) -> u32 {
        self.0
    }

    pub fn saturating_sub(self, other: Perbill) -> Perbill {
        Perbill(self.0.saturating_sub(other.0))
    }

    /// `self * other`, rounded down
    pub fn saturating_mul(self, other: Perbill) -> Perbill {
        Perbill((self.0 as u64 * other.0 as u64 / ACCURACY as u64) as u32)
    }

    /// `self / other`, rounded down and saturated at one
    pub fn saturating_div(self, other: Perbill) -> Perbill {
        Perbill::from_rational(self.0 as u128, other.0 as u128)
    }
}

impl fmt::Display for Perbill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:07}%", self.0 / 10_000_000, self.0 % 10_000_000)
    }
}

impl Serializer for Perbill {
    fn read(reader: &mut Reader) -> Result<Self, ReaderError> {
        let parts = reader.read_u32()?;
        if parts > ACCURACY {
            return Err(ReaderError::InvalidValue);
        }
        Ok(Perbill(parts))
    }

    fn write(&self, writer: &mut Writer) {
        writer.write_u32(self.0);
    }

    fn size(&self) -> usize {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rational() {
        assert_eq!(Perbill::from_rational(1, 2), Perbill::from_percent(50));
        assert_eq!(Perbill::from_rational(5, 3), Perbill::one());
        assert_eq!(Perbill::from_rational(1, 0), Perbill::zero());
        assert_eq!(
            Perbill::from_rational(999_999, 1_000_000),
            Perbill::from_parts(999_999_000)
        );
    }

    #[test]
    fn test_from_rational_large_values() {
        let total = u128::MAX;
        let part = Perbill::from_rational(total - 1, total);
        assert_eq!(part, Perbill::from_parts(ACCURACY - 1));
    }

    #[test]
    fn test_display() {
        assert_eq!(Perbill::from_percent(50).to_string(), "50.0000000%");
    }
}
