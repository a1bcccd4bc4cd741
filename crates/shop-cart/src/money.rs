//! Money type for representing monetary values.
//!
//! Uses cents-based integer representation to avoid floating-point
//! precision issues that plague monetary calculations. The cart works in a
//! single currency, so there is no currency tag to carry around.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of fractional digits in a displayed amount.
pub const DECIMAL_PLACES: u32 = 2;

const CENTS_PER_UNIT: i64 = 100;

/// Currency symbol used when displaying amounts.
pub const CURRENCY_SYMBOL: &str = "$";

/// Error returned when a decimal amount cannot be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid amount '{input}': {reason}")]
pub struct ParseMoneyError {
    /// The rejected input.
    pub input: String,
    /// Why it was rejected.
    pub reason: &'static str,
}

/// A monetary value.
///
/// Amounts are stored in cents. Ordering and equality compare the cent
/// amounts exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money {
    /// Amount in cents.
    pub amount_cents: i64,
}

impl Money {
    /// Create a new Money value from cents.
    pub const fn from_cents(amount_cents: i64) -> Self {
        Self { amount_cents }
    }

    /// Create a zero amount.
    pub const fn zero() -> Self {
        Self::from_cents(0)
    }

    /// Create a Money value from a whole number of currency units.
    pub const fn from_units(units: i64) -> Self {
        Self::from_cents(units * CENTS_PER_UNIT)
    }

    /// Create a Money value from a decimal amount, rounding to the nearest cent.
    ///
    /// Only used when reading JSON numbers back; prefer [`Money::parse`]
    /// for user input.
    ///
    /// ```
    /// use shop_cart::money::Money;
    /// let price = Money::from_decimal(49.99);
    /// assert_eq!(price.amount_cents, 4999);
    /// ```
    pub fn from_decimal(amount: f64) -> Self {
        Self::from_cents((amount * CENTS_PER_UNIT as f64).round() as i64)
    }

    /// Parse an exact decimal amount such as `"19.99"`, `"10"` or `"$5.5"`.
    ///
    /// At most two fractional digits are accepted. No floating point is
    /// involved, so the result is exactly what was written.
    pub fn parse(input: &str) -> Result<Self, ParseMoneyError> {
        let err = |reason| ParseMoneyError {
            input: input.to_string(),
            reason,
        };

        let mut s = input.trim();
        let negative = s.starts_with('-');
        if negative {
            s = &s[1..];
        }
        s = s.strip_prefix(CURRENCY_SYMBOL).unwrap_or(s);

        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (s, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(err("no digits"));
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(err("not a decimal number"));
        }
        if frac.len() > DECIMAL_PLACES as usize {
            return Err(err("more than two decimal places"));
        }

        let units: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| err("amount too large"))?
        };
        let mut cents: i64 = if frac.is_empty() {
            0
        } else {
            frac.parse().map_err(|_| err("not a decimal number"))?
        };
        if frac.len() == 1 {
            cents *= 10;
        }

        let total = units
            .checked_mul(CENTS_PER_UNIT)
            .and_then(|c| c.checked_add(cents))
            .ok_or_else(|| err("amount too large"))?;

        Ok(Self::from_cents(if negative { -total } else { total }))
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.amount_cents > 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_cents < 0
    }

    /// Convert to a decimal value.
    pub fn to_decimal(&self) -> f64 {
        self.amount_cents as f64 / CENTS_PER_UNIT as f64
    }

    /// Format as a display string (e.g., "$49.99").
    pub fn display(&self) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        format!("{}{}{}", sign, CURRENCY_SYMBOL, self.unsigned_amount())
    }

    /// Format as a display string without symbol (e.g., "49.99").
    pub fn display_amount(&self) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        format!("{}{}", sign, self.unsigned_amount())
    }

    fn unsigned_amount(&self) -> String {
        let abs = self.amount_cents.unsigned_abs();
        let per_unit = CENTS_PER_UNIT as u64;
        format!("{}.{:02}", abs / per_unit, abs % per_unit)
    }

    /// Try to add another Money value, returning None on overflow.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        self.amount_cents
            .checked_add(other.amount_cents)
            .map(Money::from_cents)
    }

    /// Try to subtract another Money value, returning None on overflow.
    pub fn try_subtract(&self, other: &Money) -> Option<Money> {
        self.amount_cents
            .checked_sub(other.amount_cents)
            .map(Money::from_cents)
    }

    /// Try to multiply by a scalar, returning None on overflow.
    pub fn try_multiply(&self, factor: i64) -> Option<Money> {
        self.amount_cents
            .checked_mul(factor)
            .map(Money::from_cents)
    }

    /// Sum an iterator of Money values, returning None on overflow.
    pub fn try_sum<'a>(mut iter: impl Iterator<Item = &'a Money>) -> Option<Money> {
        iter.try_fold(Money::zero(), |acc, m| acc.try_add(m))
    }

    /// Clamp a negative amount to zero.
    pub fn floor_zero(self) -> Money {
        self.max(Money::zero())
    }
}

impl FromStr for Money {
    type Err = ParseMoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

// Persisted as a plain decimal number (`19.99`), the shape the presentation
// layer reads and writes. Amounts too large to survive the trip through an
// `f64` are written as exact decimal text instead.
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let decimal = self.to_decimal();
        if Money::from_decimal(decimal) == *self {
            serializer.serialize_f64(decimal)
        } else {
            serializer.serialize_str(&self.display_amount())
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Units(i64),
            Number(f64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Units(units) => units
                .checked_mul(CENTS_PER_UNIT)
                .map(Money::from_cents)
                .ok_or_else(|| serde::de::Error::custom("amount too large")),
            Repr::Number(n) if n.is_finite() => Ok(Money::from_decimal(n)),
            Repr::Number(_) => Err(serde::de::Error::custom("amount is not finite")),
            Repr::Text(s) => Money::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_cents() {
        let m = Money::from_cents(4999);
        assert_eq!(m.amount_cents, 4999);
        assert_eq!(Money::from_units(10).amount_cents, 1000);
    }

    #[test]
    fn test_money_from_decimal() {
        assert_eq!(Money::from_decimal(49.99).amount_cents, 4999);
        assert_eq!(Money::from_decimal(19.99).amount_cents, 1999);
        assert_eq!(Money::from_decimal(0.1 + 0.2).amount_cents, 30);
    }

    #[test]
    fn test_money_parse() {
        assert_eq!(Money::parse("19.99").unwrap().amount_cents, 1999);
        assert_eq!(Money::parse("10").unwrap().amount_cents, 1000);
        assert_eq!(Money::parse("5.5").unwrap().amount_cents, 550);
        assert_eq!(Money::parse(".25").unwrap().amount_cents, 25);
        assert_eq!(Money::parse(" $24.99 ").unwrap().amount_cents, 2499);
        assert_eq!(Money::parse("-3.00").unwrap().amount_cents, -300);
    }

    #[test]
    fn test_money_parse_rejects_garbage() {
        assert!(Money::parse("").is_err());
        assert!(Money::parse(".").is_err());
        assert!(Money::parse("1.999").is_err());
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("1.2.3").is_err());
        assert!(Money::parse("99999999999999999999").is_err());
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(4999).display(), "$49.99");
        assert_eq!(Money::from_cents(5).display(), "$0.05");
        assert_eq!(Money::from_cents(-1000).display(), "-$10.00");
        assert_eq!(Money::from_cents(8997).display_amount(), "89.97");
    }

    #[test]
    fn test_money_checked_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(300);
        assert_eq!(a.try_add(&b), Some(Money::from_cents(1300)));
        assert_eq!(a.try_subtract(&b), Some(Money::from_cents(700)));
        assert_eq!(a.try_multiply(3), Some(Money::from_cents(3000)));
        assert_eq!(Money::from_cents(i64::MAX).try_add(&b), None);
        assert_eq!(Money::from_cents(i64::MAX).try_multiply(2), None);
    }

    #[test]
    fn test_money_try_sum() {
        let values = [Money::from_cents(1999), Money::from_cents(4999)];
        assert_eq!(Money::try_sum(values.iter()), Some(Money::from_cents(6998)));
        assert_eq!(Money::try_sum([].iter()), Some(Money::zero()));
    }

    #[test]
    fn test_money_floor_zero() {
        assert_eq!(Money::from_cents(-500).floor_zero(), Money::zero());
        assert_eq!(Money::from_cents(500).floor_zero(), Money::from_cents(500));
    }

    #[test]
    fn test_money_serde() {
        let json = serde_json::to_string(&Money::from_cents(1999)).unwrap();
        assert_eq!(json, "19.99");

        let m: Money = serde_json::from_str("49.99").unwrap();
        assert_eq!(m.amount_cents, 4999);
        let m: Money = serde_json::from_str("10").unwrap();
        assert_eq!(m.amount_cents, 1000);
        let m: Money = serde_json::from_str(r#""24.99""#).unwrap();
        assert_eq!(m.amount_cents, 2499);
    }

    #[test]
    fn test_money_serde_large_amount_is_exact() {
        let big = Money::from_cents(9_007_199_254_740_993);
        let json = serde_json::to_string(&big).unwrap();
        assert_eq!(json, r#""90071992547409.93""#);
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, big);

        let negative = Money::from_cents(-9_007_199_254_740_993);
        let back: Money = serde_json::from_str(&serde_json::to_string(&negative).unwrap()).unwrap();
        assert_eq!(back, negative);
    }
}
