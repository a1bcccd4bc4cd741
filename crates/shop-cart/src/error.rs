//! Cart error types.

use crate::ids::ItemId;
use thiserror::Error;

/// Validation failures raised by cart transitions.
///
/// Every variant is recoverable: the transition that produced it left the
/// cart untouched and nothing was handed to the persistence surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Candidate line item rejected by `add_item`.
    #[error("Invalid item {id}: {reason}")]
    InvalidItem { id: ItemId, reason: String },

    /// Negative target quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Unrecognized coupon code (normalized form).
    #[error("Invalid coupon code: {0}")]
    InvalidCoupon(String),

    /// Coupon offered while the cart holds no items (normalized code).
    #[error("Cannot apply coupon {0} to an empty cart")]
    EmptyCart(String),

    /// Arithmetic overflow in a quantity or money calculation.
    #[error("Arithmetic overflow in cart calculation")]
    Overflow,
}

impl CartError {
    pub(crate) fn invalid_item(id: &ItemId, reason: impl Into<String>) -> Self {
        CartError::InvalidItem {
            id: id.clone(),
            reason: reason.into(),
        }
    }

    /// Short machine-readable tag for the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CartError::InvalidItem { .. } => "invalid_item",
            CartError::InvalidQuantity(_) => "invalid_quantity",
            CartError::InvalidCoupon(_) => "invalid_coupon",
            CartError::EmptyCart(_) => "empty_cart",
            CartError::Overflow => "overflow",
        }
    }
}
