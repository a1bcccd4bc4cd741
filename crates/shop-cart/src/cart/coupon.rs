//! Coupon codes and the coupon part of cart state.

use crate::error::CartError;
use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normalize a user-entered code: surrounding whitespace trimmed, upper-cased.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Recognized coupon codes and the fixed amount each takes off the total.
///
/// Codes are stored normalized, so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Money>",
    into = "BTreeMap<String, Money>"
)]
pub struct CouponTable {
    codes: BTreeMap<String, Money>,
}

impl CouponTable {
    /// An empty table; every code is rejected.
    pub fn empty() -> Self {
        Self {
            codes: BTreeMap::new(),
        }
    }

    /// Add a code. Fails if the normalized code is blank or the amount is negative.
    pub fn with_coupon(mut self, code: &str, amount: Money) -> Result<Self, CartError> {
        let code = normalize_code(code);
        if code.is_empty() || amount.is_negative() {
            return Err(CartError::InvalidCoupon(code));
        }
        self.codes.insert(code, amount);
        Ok(self)
    }

    /// Build a table from `(code, amount)` pairs.
    pub fn from_entries<'a>(
        entries: impl IntoIterator<Item = (&'a str, Money)>,
    ) -> Result<Self, CartError> {
        entries
            .into_iter()
            .try_fold(Self::empty(), |table, (code, amount)| {
                table.with_coupon(code, amount)
            })
    }

    /// Resolve a raw code to its normalized form and discount.
    pub fn lookup(&self, raw: &str) -> Result<(String, Money), CartError> {
        let code = normalize_code(raw);
        match self.codes.get(&code) {
            Some(amount) => Ok((code, *amount)),
            None => Err(CartError::InvalidCoupon(code)),
        }
    }

    /// Check if a code is recognized.
    pub fn contains(&self, raw: &str) -> bool {
        self.codes.contains_key(&normalize_code(raw))
    }

    /// Iterate over `(code, amount)` in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Money)> {
        self.codes.iter().map(|(c, a)| (c.as_str(), *a))
    }

    /// Number of recognized codes.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Check if no codes are recognized.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for CouponTable {
    /// `SAVE10` takes $10.00 off, `SAVE20` takes $20.00 off.
    fn default() -> Self {
        let mut codes = BTreeMap::new();
        codes.insert("SAVE10".to_string(), Money::from_units(10));
        codes.insert("SAVE20".to_string(), Money::from_units(20));
        Self { codes }
    }
}

impl TryFrom<BTreeMap<String, Money>> for CouponTable {
    type Error = CartError;

    fn try_from(map: BTreeMap<String, Money>) -> Result<Self, Self::Error> {
        Self::from_entries(map.iter().map(|(code, amount)| (code.as_str(), *amount)))
    }
}

impl From<CouponTable> for BTreeMap<String, Money> {
    fn from(table: CouponTable) -> Self {
        table.codes
    }
}

/// The coupon currently applied to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CouponState {
    /// Code that was accepted, in normalized form; empty when none.
    pub code: String,
    /// Amount taken off the total; zero when no coupon is applied.
    pub discount_amount: Money,
    /// Confirmation text for the applied coupon; empty when none. A rejected
    /// code leaves it as it was.
    pub message: String,
}

impl CouponState {
    /// No coupon applied.
    pub fn none() -> Self {
        Self::default()
    }

    /// A successfully applied coupon.
    pub fn applied(code: impl Into<String>, discount_amount: Money) -> Self {
        Self {
            code: code.into(),
            discount_amount,
            message: confirmation_message(discount_amount),
        }
    }

    /// Check if a discount is in effect.
    pub fn is_active(&self) -> bool {
        self.discount_amount.is_positive()
    }
}

/// Text shown after a coupon is accepted, e.g. `"$10.00 discount applied!"`.
pub fn confirmation_message(amount: Money) -> String {
    format!("{} discount applied!", amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  save10 "), "SAVE10");
        assert_eq!(normalize_code("Save20"), "SAVE20");
        assert_eq!(normalize_code(""), "");
    }

    #[test]
    fn test_default_table() {
        let table = CouponTable::default();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.lookup("SAVE10").unwrap(),
            ("SAVE10".to_string(), Money::from_units(10))
        );
        assert_eq!(table.lookup("save20").unwrap().1, Money::from_units(20));
    }

    #[test]
    fn test_lookup_unknown_code() {
        let table = CouponTable::default();
        assert_eq!(
            table.lookup(" bogus "),
            Err(CartError::InvalidCoupon("BOGUS".to_string()))
        );
        assert!(!table.contains("SAVE30"));
    }

    #[test]
    fn test_custom_table() {
        let table = CouponTable::from_entries([("half", Money::from_cents(50))]).unwrap();
        assert!(table.contains("HALF"));
        assert!(!table.contains("SAVE10"));

        assert!(CouponTable::empty()
            .with_coupon("neg", Money::from_cents(-1))
            .is_err());
        assert!(CouponTable::empty()
            .with_coupon("   ", Money::from_cents(1))
            .is_err());
    }

    #[test]
    fn test_applied_state() {
        let state = CouponState::applied("SAVE10", Money::from_units(10));
        assert_eq!(state.code, "SAVE10");
        assert_eq!(state.message, "$10.00 discount applied!");
        assert!(state.is_active());
        assert!(!CouponState::none().is_active());
    }

    #[test]
    fn test_table_deserializes_from_config_map() {
        let table: CouponTable =
            serde_json::from_str(r#"{"save10": 10, "VIP": "25.50"}"#).unwrap();
        assert_eq!(table.lookup("vip").unwrap().1, Money::from_cents(2550));
        assert_eq!(table.lookup("SAVE10").unwrap().1, Money::from_units(10));

        let bad: Result<CouponTable, _> = serde_json::from_str(r#"{"X": -1}"#);
        assert!(bad.is_err());
    }
}
