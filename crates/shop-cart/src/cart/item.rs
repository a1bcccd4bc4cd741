//! Line item type and the built-in sample catalogue.

use crate::error::CartError;
use crate::ids::ItemId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A line item in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Stable identifier, never reassigned.
    pub id: ItemId,
    /// Display label.
    pub name: String,
    /// Price of one unit.
    pub unit_price: Money,
    /// Quantity.
    pub quantity: i64,
}

impl LineItem {
    /// Create a new line item.
    pub fn new(
        id: impl Into<ItemId>,
        name: impl Into<String>,
        unit_price: Money,
        quantity: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    /// Check that this item may be added to a cart.
    ///
    /// Returns an error if:
    /// - The id is blank
    /// - Quantity is not positive
    /// - Unit price is negative
    /// - The subtotal would overflow
    pub fn validate_candidate(&self) -> Result<(), CartError> {
        if self.id.is_blank() {
            return Err(CartError::invalid_item(&self.id, "id must not be blank"));
        }
        if self.quantity <= 0 {
            return Err(CartError::invalid_item(
                &self.id,
                format!("quantity must be positive, got {}", self.quantity),
            ));
        }
        if self.unit_price.is_negative() {
            return Err(CartError::invalid_item(
                &self.id,
                format!("unit price must not be negative, got {}", self.unit_price),
            ));
        }
        self.subtotal()?;
        Ok(())
    }

    /// Unit price times quantity.
    pub fn subtotal(&self) -> Result<Money, CartError> {
        self.unit_price
            .try_multiply(self.quantity)
            .ok_or(CartError::Overflow)
    }
}

/// Items a fresh session starts with when nothing was persisted.
pub fn default_items() -> Vec<LineItem> {
    vec![
        LineItem::new(1u64, "T-Shirt", Money::from_cents(1999), 2),
        LineItem::new(2u64, "Jeans", Money::from_cents(4999), 1),
        LineItem::new(3u64, "Sneakers", Money::from_cents(8999), 1),
    ]
}

/// A single "Hat" with a freshly generated id, for the add-sample action.
pub fn sample_item() -> LineItem {
    LineItem::new(ItemId::generate(), "Hat", Money::from_cents(2499), 1)
}
