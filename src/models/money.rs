//! Money type for representing currency amounts
//!
//! Amounts are stored as integer cents, so derived balances never carry
//! floating-point residue: a balance that nets out is exactly zero.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Cents per whole currency unit
const UNIT: i64 = 100;

/// A monetary amount stored as cents (hundredths of the currency unit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Largest amount accepted from input: one trillion units
    ///
    /// Leaves enough headroom in `i64` cents that summing a whole ledger of
    /// such amounts cannot overflow.
    pub const MAX: Money = Money(1_000_000_000_000 * UNIT);

    /// Create a Money amount from cents
    ///
    /// # Examples
    /// ```
    /// use envelope_plan::models::Money;
    /// let amount = Money::from_cents(1050); // $10.50
    /// assert_eq!(amount.cents(), 1050);
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a Money amount from whole currency units
    pub const fn from_units(units: i64) -> Self {
        Self(units * UNIT)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the amount in cents
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole units, truncated toward zero
    pub const fn units(&self) -> i64 {
        self.0 / UNIT
    }

    /// The cents portion (0-99)
    pub const fn cents_part(&self) -> i64 {
        (self.0 % UNIT).abs()
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

    /// Whether the amount lies within `-MAX..=MAX`
    pub const fn is_within_limit(&self) -> bool {
        self.0 >= -Self::MAX.0 && self.0 <= Self::MAX.0
    }

    /// `self + other`, or `None` when the sum leaves `-MAX..=MAX`
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .filter(Self::is_within_limit)
    }

    /// `self - other`, or `None` when the difference leaves `-MAX..=MAX`
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .filter(Self::is_within_limit)
    }

    /// Divide into `parts` equal shares, rounding each share up to a whole unit
    ///
    /// `Money::from_units(1000).ceil_share(6)` is `$167.00`. Returns zero for
    /// non-positive amounts and treats `parts < 1` as a single share.
    ///
    /// ```
    /// use envelope_plan::models::Money;
    /// assert_eq!(Money::from_units(1000).ceil_share(6), Money::from_units(167));
    /// ```
    pub fn ceil_share(self, parts: i64) -> Self {
        if self.0 <= 0 {
            return Self::zero();
        }
        let divisor = parts.max(1) * UNIT;
        Self(((self.0 + divisor - 1) / divisor) * UNIT)
    }

    /// Parse a money amount from a string
    ///
    /// Accepts "10.50", "-10.50", "$10.50", "1,250.00" and "10" (whole units).
    /// Digits past the second decimal place are truncated. Amounts beyond
    /// `Money::MAX` are rejected.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let raw = s.trim();
        let invalid = || MoneyParseError::InvalidFormat(raw.to_string());

        let (negative, rest) = match raw.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, raw),
        };
        let rest = rest.strip_prefix('$').unwrap_or(rest).replace(',', "");
        if rest.is_empty() {
            return Err(invalid());
        }

        let (whole, frac) = match rest.split_once('.') {
            Some((w, f)) => (w, f),
            None => (rest.as_str(), ""),
        };

        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }

        let units: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };

        let cents: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac[..2].parse().map_err(|_| invalid())?,
        };

        let total = units
            .checked_mul(UNIT)
            .and_then(|v| v.checked_add(cents))
            .map(Self)
            .filter(Self::is_within_limit)
            .ok_or_else(|| MoneyParseError::OutOfRange(raw.to_string()))?;

        Ok(if negative { -total } else { total })
    }

    /// Format with a currency symbol
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        format!(
            "{}{}{}.{:02}",
            sign,
            symbol,
            self.units().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.format_with_symbol("$"))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> std::iter::Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
    OutOfRange(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: '{}'", s),
            MoneyParseError::OutOfRange(s) => {
                write!(f, "Amount '{}' is larger than {}", s, Money::MAX)
            }
        }
    }
}

impl std::error::Error for MoneyParseError {}

impl From<MoneyParseError> for crate::error::PlanError {
    fn from(err: MoneyParseError) -> Self {
        crate::error::PlanError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_and_cents() {
        let m = Money::from_cents(1050);
        assert_eq!(m.units(), 10);
        assert_eq!(m.cents_part(), 50);
        assert_eq!(Money::from_units(12).cents(), 1200);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1050).to_string(), "$10.50");
        assert_eq!(Money::zero().to_string(), "$0.00");
        assert_eq!(Money::from_cents(-1050).to_string(), "-$10.50");
        assert_eq!(Money::from_cents(-5).to_string(), "-$0.05");
        assert_eq!(format!("{:>8}", Money::from_cents(5)), "   $0.05");
    }

    #[test]
    fn test_format_with_symbol() {
        assert_eq!(Money::from_cents(-250).format_with_symbol("€"), "-€2.50");
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("10.50").unwrap().cents(), 1050);
        assert_eq!(Money::parse("$10.50").unwrap().cents(), 1050);
        assert_eq!(Money::parse("-10.50").unwrap().cents(), -1050);
        assert_eq!(Money::parse("10").unwrap().cents(), 1000);
        assert_eq!(Money::parse("10.5").unwrap().cents(), 1050);
        assert_eq!(Money::parse(".75").unwrap().cents(), 75);
        assert_eq!(Money::parse("1,250.00").unwrap().cents(), 125000);
        assert_eq!(Money::parse("-0.50").unwrap().cents(), -50);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Money::parse("").is_err());
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("1.2.3").is_err());
        assert!(Money::parse("12e3").is_err());
        assert!(Money::parse("$").is_err());
        assert!(Money::parse(".").is_err());
        assert!(Money::parse("$.").is_err());
        assert!(Money::parse("-.").is_err());
    }

    #[test]
    fn test_parse_rejects_amounts_beyond_max() {
        assert_eq!(Money::parse("1000000000000").unwrap(), Money::MAX);
        assert_eq!(Money::parse("-1000000000000").unwrap(), -Money::MAX);
        assert!(matches!(
            Money::parse("1000000000000.01"),
            Err(MoneyParseError::OutOfRange(_))
        ));
        assert!(matches!(
            Money::parse("90000000000000000"),
            Err(MoneyParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_checked_arithmetic_respects_max() {
        let near = Money::MAX - Money::from_cents(1);
        assert_eq!(near.checked_add(Money::from_cents(1)), Some(Money::MAX));
        assert_eq!(Money::MAX.checked_add(Money::from_cents(1)), None);
        assert_eq!((-Money::MAX).checked_sub(Money::from_cents(1)), None);
        assert_eq!(
            Money::from_units(5).checked_sub(Money::from_units(8)),
            Some(Money::from_units(-3))
        );
    }

    #[test]
    fn test_operators_saturate_instead_of_panicking() {
        let huge = Money::from_cents(i64::MAX);
        assert_eq!(huge + huge, huge);
        assert_eq!(Money::from_cents(i64::MIN) - huge, Money::from_cents(i64::MIN));
    }

    #[test]
    fn test_ceil_share() {
        // (1200 - 200) / 6 months = 166.67 -> 167
        assert_eq!(Money::from_units(1000).ceil_share(6), Money::from_units(167));
        assert_eq!(Money::from_units(600).ceil_share(6), Money::from_units(100));
        assert_eq!(Money::from_cents(1).ceil_share(3), Money::from_units(1));
        assert_eq!(Money::from_units(-50).ceil_share(2), Money::zero());
        assert_eq!(Money::from_units(10).ceil_share(0), Money::from_units(10));
    }

    #[test]
    fn test_offsetting_amounts_are_exactly_zero() {
        let total = Money::from_cents(10) + Money::from_cents(20) - Money::from_cents(30);
        assert!(total.is_zero());
        assert_eq!(total.to_string(), "$0.00");
    }

    #[test]
    fn test_sum() {
        let amounts = [Money::from_cents(100), Money::from_cents(200)];
        let owned: Money = amounts.into_iter().sum();
        let borrowed: Money = amounts.iter().sum();
        assert_eq!(owned.cents(), 300);
        assert_eq!(borrowed, owned);
    }

    #[test]
    fn test_serialization_is_cents() {
        let json = serde_json::to_string(&Money::from_cents(1050)).unwrap();
        assert_eq!(json, "1050");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back.cents(), 1050);
    }
}
