//! Fixed-point money type
//!
//! Amounts are stored as a signed count of cents so that splitting and
//! balance arithmetic never accumulates floating-point drift.

use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use crate::types::{SplitError, SplitResult};

/// Signed monetary amount in cents (hundredths of the currency unit)
///
/// # Examples
/// ```
/// use group_split_core::Money;
///
/// let amount = Money::from_cents(1050);
/// assert_eq!(amount.to_string(), "$10.50");
/// assert_eq!("10.5".parse::<Money>().unwrap(), amount);
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest magnitude accepted for a single amount (one trillion units).
    /// Sums of many such amounts still fit in an `i64`.
    pub const MAX: Money = Money(100_000_000_000_000);

    /// Create an amount from cents
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create an amount from whole units and cents, e.g. `(10, 50)` is $10.50
    pub const fn from_units_cents(units: i64, cents: i64) -> Self {
        Self(units * 100 + cents)
    }

    /// Raw value in cents
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole units, truncated toward zero
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Cents portion (0-99)
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// True when `self` is no further than `tolerance` from zero
    pub fn is_within(&self, tolerance: Money) -> bool {
        self.abs() <= tolerance
    }

    /// Reject amounts whose magnitude exceeds [`Money::MAX`]
    pub fn ensure_in_range(self) -> SplitResult<Self> {
        if self.0.unsigned_abs() > Self::MAX.0.unsigned_abs() {
            return Err(SplitError::InvalidAmount(format!(
                "amount exceeds the maximum of {}: {self}",
                Self::MAX
            )));
        }
        Ok(self)
    }

    /// Checked addition (returns `None` on overflow)
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Checked subtraction (returns `None` on overflow)
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Convert a decimal amount in currency units, rounding half-up to the cent
    pub fn from_decimal(value: &BigDecimal) -> SplitResult<Self> {
        let scaled = (value * BigDecimal::from(100)).with_scale_round(0, RoundingMode::HalfUp);
        scaled
            .to_i64()
            .map(Self)
            .ok_or_else(|| SplitError::InvalidAmount(format!("amount too large: {value}")))?
            .ensure_in_range()
    }

    /// Decimal representation in currency units with two fractional digits
    pub fn to_decimal(&self) -> BigDecimal {
        BigDecimal::new(self.0.into(), 2)
    }

    /// Format with a currency symbol, e.g. `€12.00`
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        format!(
            "{sign}{symbol}{}.{:02}",
            self.units().abs(),
            self.cents_part()
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_with_symbol("$"))
    }
}

impl FromStr for Money {
    type Err = SplitError;

    /// Parse a decimal string such as `"12.5"`, `"-3"` or `"$40.00"`.
    ///
    /// At most two fractional digits are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SplitError::InvalidAmount(format!("invalid amount: '{s}'"));

        let trimmed = s.trim();
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let rest = rest.strip_prefix('$').unwrap_or(rest);
        if rest.is_empty() {
            return Err(invalid());
        }

        let (units_str, frac_str) = match rest.split_once('.') {
            Some((units, frac)) => (units, frac),
            None => (rest, ""),
        };
        if units_str.is_empty()
            || !units_str.chars().all(|c| c.is_ascii_digit())
            || !frac_str.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        if frac_str.len() > 2 {
            return Err(SplitError::InvalidAmount(format!(
                "too many decimals: '{s}'"
            )));
        }

        let units: i64 = units_str.parse().map_err(|_| invalid())?;
        let cents: i64 = match frac_str.len() {
            0 => 0,
            1 => frac_str.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac_str.parse().map_err(|_| invalid())?,
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(|| SplitError::InvalidAmount(format!("amount too large: '{s}'")))?;

        Self(if negative { -total } else { total }).ensure_in_range()
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
