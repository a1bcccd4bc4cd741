//! Cart pricing calculations.

use crate::ids::ItemId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Complete pricing breakdown for a cart.
///
/// `discount` is the part of the coupon amount that actually applied, so
/// `subtotal - discount == total` holds even when the coupon is worth more
/// than the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CartPricing {
    /// Sum of line subtotals.
    pub subtotal: Money,
    /// Effective discount, capped at the subtotal.
    pub discount: Money,
    /// Amount payable, never negative.
    pub total: Money,
    /// Per-line breakdown in cart order.
    pub lines: Vec<LinePricing>,
}

impl CartPricing {
    /// Check if any discount is taken off.
    pub fn has_discount(&self) -> bool {
        self.discount.is_positive()
    }

    /// Get discount percentage of subtotal.
    pub fn discount_percentage(&self) -> f64 {
        if self.subtotal.is_zero() {
            return 0.0;
        }
        (self.discount.amount_cents as f64 / self.subtotal.amount_cents as f64) * 100.0
    }
}

/// Pricing breakdown for a single line item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LinePricing {
    /// Line item ID.
    pub id: ItemId,
    /// Display label.
    pub name: String,
    /// Unit price.
    pub unit_price: Money,
    /// Quantity.
    pub quantity: i64,
    /// Subtotal (unit_price * quantity).
    pub subtotal: Money,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_percentage() {
        let pricing = CartPricing {
            subtotal: Money::from_cents(10000),
            discount: Money::from_cents(1000),
            total: Money::from_cents(9000),
            lines: vec![],
        };

        assert!(pricing.has_discount());
        assert!((pricing.discount_percentage() - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_discount_percentage_empty_cart() {
        let pricing = CartPricing {
            subtotal: Money::zero(),
            discount: Money::zero(),
            total: Money::zero(),
            lines: vec![],
        };

        assert!(!pricing.has_discount());
        assert_eq!(pricing.discount_percentage(), 0.0);
    }
}
