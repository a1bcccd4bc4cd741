//! Cart state aggregate and its in-place edit primitives.
//!
//! The edit methods are crate-private: callers go through [`crate::CartStore`],
//! which applies them to a scratch copy and only swaps it in when every step
//! succeeded.

use crate::cart::{CartPricing, CouponState, LineItem, LinePricing};
use crate::error::CartError;
use crate::ids::ItemId;
use crate::money::Money;
use serde::Serialize;

/// Line items in insertion order plus the applied coupon.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    pub(crate) items: Vec<LineItem>,
    pub(crate) coupon: CouponState,
}

impl CartState {
    /// An empty cart with no coupon.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// The applied coupon.
    pub fn coupon(&self) -> &CouponState {
        &self.coupon
    }

    /// Get an item by ID.
    pub fn get(&self, id: &ItemId) -> Option<&LineItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Check if an item with this ID is in the cart.
    pub fn contains(&self, id: &ItemId) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|i| &i.id == id)
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |acc, i| acc.saturating_add(i.quantity))
    }

    /// Get number of distinct line items.
    pub fn unique_item_count(&self) -> usize {
        self.items.len()
    }

    /// Whether checkout may proceed: only a non-empty cart can be checked out.
    pub fn can_checkout(&self) -> bool {
        !self.is_empty()
    }

    /// Sum of `unit_price * quantity` over all items.
    pub fn subtotal(&self) -> Result<Money, CartError> {
        self.items.iter().try_fold(Money::zero(), |acc, item| {
            acc.try_add(&item.subtotal()?).ok_or(CartError::Overflow)
        })
    }

    /// Amount payable: subtotal minus discount, floored at zero.
    ///
    /// Every committed state has a representable subtotal, so the saturating
    /// arithmetic here never changes the result of a state reached through
    /// [`crate::CartStore`].
    pub fn calculate_total(&self) -> Money {
        let subtotal = self.items.iter().fold(0i64, |acc, item| {
            acc.saturating_add(item.unit_price.amount_cents.saturating_mul(item.quantity))
        });
        Money::from_cents(subtotal.saturating_sub(self.coupon.discount_amount.amount_cents))
            .floor_zero()
    }

    /// Full pricing breakdown.
    pub fn pricing(&self) -> Result<CartPricing, CartError> {
        let lines = self
            .items
            .iter()
            .map(|item| {
                Ok(LinePricing {
                    id: item.id.clone(),
                    name: item.name.clone(),
                    unit_price: item.unit_price,
                    quantity: item.quantity,
                    subtotal: item.subtotal()?,
                })
            })
            .collect::<Result<Vec<_>, CartError>>()?;

        let subtotal = Money::try_sum(lines.iter().map(|l| &l.subtotal)).ok_or(CartError::Overflow)?;
        let discount = self.coupon.discount_amount.min(subtotal).floor_zero();
        let total = subtotal
            .try_subtract(&discount)
            .ok_or(CartError::Overflow)?;

        Ok(CartPricing {
            subtotal,
            discount,
            total,
            lines,
        })
    }

    /// Build a state from items and coupon, enforcing the cart invariants:
    /// unique non-blank ids, non-negative prices, no negative quantities and
    /// a representable subtotal. Zero-quantity rows are dropped, and a state
    /// left without items drops its coupon.
    pub fn from_parts(items: Vec<LineItem>, coupon: CouponState) -> Result<Self, CartError> {
        let mut state = Self {
            items: Vec::with_capacity(items.len()),
            coupon: CouponState::none(),
        };

        for item in items {
            if item.quantity < 0 {
                return Err(CartError::invalid_item(
                    &item.id,
                    format!("quantity must not be negative, got {}", item.quantity),
                ));
            }
            if item.quantity == 0 {
                continue;
            }
            item.validate_candidate()?;
            if state.contains(&item.id) {
                return Err(CartError::invalid_item(&item.id, "duplicate id"));
            }
            state.items.push(item);
        }

        if coupon.discount_amount.is_negative() {
            return Err(CartError::InvalidCoupon(coupon.code));
        }
        state.coupon = coupon;
        state.reset_coupon_if_empty();
        state.subtotal()?;
        Ok(state)
    }

    /// Merge by id or append at the end.
    pub(crate) fn merge_item(&mut self, candidate: LineItem) -> Result<(), CartError> {
        candidate.validate_candidate()?;

        match self.position(&candidate.id) {
            Some(idx) => {
                let existing = &mut self.items[idx];
                existing.quantity = existing
                    .quantity
                    .checked_add(candidate.quantity)
                    .ok_or(CartError::Overflow)?;
            }
            None => self.items.push(candidate),
        }

        self.subtotal()?;
        Ok(())
    }

    /// Remove by id. Returns whether an item was removed.
    pub(crate) fn remove_item(&mut self, id: &ItemId) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| &i.id != id);
        let removed = self.items.len() < len_before;
        if removed {
            self.reset_coupon_if_empty();
        }
        removed
    }

    /// Set quantity in place; zero removes. Returns whether anything changed.
    pub(crate) fn set_quantity(&mut self, id: &ItemId, quantity: i64) -> Result<bool, CartError> {
        if quantity < 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }
        if quantity == 0 {
            return Ok(self.remove_item(id));
        }

        let Some(idx) = self.position(id) else {
            return Ok(false);
        };
        if self.items[idx].quantity == quantity {
            return Ok(false);
        }
        self.items[idx].quantity = quantity;
        self.subtotal()?;
        Ok(true)
    }

    pub(crate) fn set_coupon(&mut self, coupon: CouponState) {
        self.coupon = coupon;
    }

    /// A cart with no items carries no discount and no coupon message.
    pub(crate) fn reset_coupon_if_empty(&mut self) {
        if self.items.is_empty() {
            self.coupon = CouponState::none();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::default_items;

    fn item(id: &str, cents: i64, qty: i64) -> LineItem {
        LineItem::new(id, format!("Item {}", id), Money::from_cents(cents), qty)
    }

    #[test]
    fn test_merge_appends_in_order() {
        let mut state = CartState::empty();
        state.merge_item(item("b", 100, 1)).unwrap();
        state.merge_item(item("a", 200, 1)).unwrap();
        let ids: Vec<&str> = state.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_merge_accumulates_by_id() {
        let mut state = CartState::empty();
        state.merge_item(item("a", 100, 2)).unwrap();
        state.merge_item(item("a", 100, 3)).unwrap();
        assert_eq!(state.unique_item_count(), 1);
        assert_eq!(state.get(&ItemId::new("a")).unwrap().quantity, 5);
    }

    #[test]
    fn test_merge_quantity_overflow() {
        let mut state = CartState::empty();
        state.merge_item(item("a", 0, i64::MAX)).unwrap();
        assert_eq!(state.merge_item(item("a", 0, 1)), Err(CartError::Overflow));
    }

    #[test]
    fn test_set_quantity_keeps_position() {
        let mut state = CartState::from_parts(default_items(), CouponState::none()).unwrap();
        assert!(state.set_quantity(&ItemId::new("2"), 4).unwrap());
        assert_eq!(state.items()[1].id, ItemId::new("2"));
        assert_eq!(state.items()[1].quantity, 4);
    }

    #[test]
    fn test_set_quantity_negative() {
        let mut state = CartState::from_parts(default_items(), CouponState::none()).unwrap();
        assert_eq!(
            state.set_quantity(&ItemId::new("1"), -1),
            Err(CartError::InvalidQuantity(-1))
        );
    }

    #[test]
    fn test_set_quantity_unknown_id() {
        let mut state = CartState::from_parts(default_items(), CouponState::none()).unwrap();
        assert!(!state.set_quantity(&ItemId::new("404"), 3).unwrap());
    }

    #[test]
    fn test_remove_last_item_resets_coupon() {
        let coupon = CouponState::applied("SAVE10", Money::from_units(10));
        let mut state = CartState::from_parts(vec![item("a", 100, 1)], coupon).unwrap();
        assert!(state.coupon().is_active());
        assert!(state.remove_item(&ItemId::new("a")));
        assert_eq!(state.coupon(), &CouponState::none());
    }

    #[test]
    fn test_total_floors_at_zero() {
        let coupon = CouponState::applied("SAVE20", Money::from_units(20));
        let state = CartState::from_parts(vec![item("a", 500, 1)], coupon).unwrap();
        assert_eq!(state.calculate_total(), Money::zero());

        let pricing = state.pricing().unwrap();
        assert_eq!(pricing.subtotal, Money::from_cents(500));
        assert_eq!(pricing.discount, Money::from_cents(500));
        assert_eq!(pricing.total, Money::zero());
    }

    #[test]
    fn test_default_items_total() {
        let state = CartState::from_parts(default_items(), CouponState::none()).unwrap();
        // 19.99*2 + 49.99 + 89.99
        assert_eq!(state.calculate_total(), Money::from_cents(17996));
        assert_eq!(state.item_count(), 4);
        assert!(state.can_checkout());
    }

    #[test]
    fn test_from_parts_validation() {
        let dup = vec![item("a", 100, 1), item("a", 100, 1)];
        assert!(matches!(
            CartState::from_parts(dup, CouponState::none()),
            Err(CartError::InvalidItem { .. })
        ));

        let negative = vec![item("a", 100, -1)];
        assert!(CartState::from_parts(negative, CouponState::none()).is_err());

        let zero_row = vec![item("a", 100, 0), item("b", 100, 1)];
        let state = CartState::from_parts(zero_row, CouponState::none()).unwrap();
        assert_eq!(state.unique_item_count(), 1);
    }

    #[test]
    fn test_from_parts_empty_cart_has_no_coupon() {
        let coupon = CouponState::applied("SAVE10", Money::from_units(10));
        let state = CartState::from_parts(vec![item("a", 0, 0)], coupon.clone()).unwrap();
        assert_eq!(state.coupon(), &CouponState::none());
        assert_eq!(state.calculate_total(), Money::zero());
        assert!(!state.can_checkout());

        let state = CartState::from_parts(vec![item("a", 100, 1)], coupon.clone()).unwrap();
        assert_eq!(state.coupon(), &coupon);
    }
}
