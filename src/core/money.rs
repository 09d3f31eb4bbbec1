use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// An amount of money in minor currency units (paise, cents).
///
/// All arithmetic is exact integer arithmetic. Positive and negative
/// values are both meaningful: a net balance of `-500` means the
/// participant owes 500 minor units to the group.
///
/// # Examples
///
/// ```
/// use group_ledger::core::money::Money;
///
/// let lunch = Money::new(1_250);
/// let coffee = Money::new(180);
/// assert_eq!(lunch + coffee, Money::new(1_430));
/// assert_eq!((lunch + coffee).format_major(2), "14.30");
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn new(minor_units: i64) -> Self {
        Self(minor_units)
    }

    /// The raw amount in minor units.
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Render in major units with `decimals` fractional digits,
    /// e.g. `1234` with 2 decimals is `12.34`.
    pub fn format_major(self, decimals: u32) -> String {
        if decimals == 0 {
            return self.0.to_string();
        }
        let scale = 10i64.pow(decimals);
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = scale as u64;
        format!(
            "{}{}.{:0width$}",
            sign,
            abs / scale,
            abs % scale,
            width = decimals as usize
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Money {
    fn from(minor_units: i64) -> Self {
        Self(minor_units)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_arithmetic() {
        let a = Money::new(500);
        let b = Money::new(300);
        assert_eq!(a + b, Money::new(800));
        assert_eq!(a - b, Money::new(200));
        assert_eq!(b - a, Money::new(-200));
        assert_eq!(-a, Money::new(-500));
    }

    #[test]
    fn test_money_sum() {
        let amounts = vec![Money::new(1), Money::new(2), Money::new(-3)];
        let total: Money = amounts.iter().sum();
        assert!(total.is_zero());
    }

    #[test]
    fn test_money_format_major() {
        assert_eq!(Money::new(1234).format_major(2), "12.34");
        assert_eq!(Money::new(5).format_major(2), "0.05");
        assert_eq!(Money::new(-1205).format_major(2), "-12.05");
        assert_eq!(Money::new(42).format_major(0), "42");
    }

    #[test]
    fn test_money_serializes_as_integer() {
        let json = serde_json::to_string(&Money::new(999)).unwrap();
        assert_eq!(json, "999");
        let back: Money = serde_json::from_str("-17").unwrap();
        assert_eq!(back, Money::new(-17));
    }
}
