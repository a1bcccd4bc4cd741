//! The cart store: sole owner and writer of a [`CartState`].
//!
//! Every transition runs against a scratch copy of the state. The copy is
//! swapped in only when the whole transition succeeded, and only then are
//! the registered sinks handed a snapshot. A failing sink is logged and
//! otherwise ignored; it never rolls the in-memory state back.
//!
//! Transitions take `&mut self`, so the borrow checker already serializes
//! them. Callers that share a store across threads wrap it in a mutex.

use crate::cart::{default_items, CartPricing, CartState, CouponState, CouponTable, LineItem};
use crate::error::CartError;
use crate::ids::ItemId;
use crate::money::Money;
use crate::snapshot::{CartSnapshot, SnapshotSink};
use std::fmt;
use tracing::{debug, info, warn};

/// Owns one cart and exposes its transition operations.
pub struct CartStore {
    state: CartState,
    coupons: CouponTable,
    sinks: Vec<Box<dyn SnapshotSink>>,
}

impl CartStore {
    /// Create a store over an existing state.
    pub fn new(state: CartState, coupons: CouponTable) -> Self {
        Self {
            state,
            coupons,
            sinks: Vec::new(),
        }
    }

    /// The sample items with the default coupon table.
    pub fn with_defaults() -> Self {
        Self::new(default_state(), CouponTable::default())
    }

    /// Seed from a persisted snapshot, or from the sample items when there is none.
    ///
    /// A persisted coupon is kept only if `coupons` still recognizes its code
    /// at the same amount; anything else is dropped, so a seeded cart never
    /// carries a discount this store could not have granted.
    pub fn seeded(
        snapshot: Option<CartSnapshot>,
        coupons: CouponTable,
    ) -> Result<Self, CartError> {
        let state = match snapshot {
            Some(snapshot) => {
                let mut state = snapshot.into_state()?;
                let coupon = recognized_coupon(state.coupon(), &coupons);
                state.set_coupon(coupon);
                state
            }
            None => {
                debug!("no persisted cart, seeding sample items");
                default_state()
            }
        };
        Ok(Self::new(state, coupons))
    }

    /// Register a sink and return the store.
    pub fn with_sink(mut self, sink: impl SnapshotSink + 'static) -> Self {
        self.add_sink(sink);
        self
    }

    /// Register a sink.
    pub fn add_sink(&mut self, sink: impl SnapshotSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    /// Current state.
    pub fn state(&self) -> &CartState {
        &self.state
    }

    /// Coupon codes this store accepts.
    pub fn coupons(&self) -> &CouponTable {
        &self.coupons
    }

    /// Snapshot of the current state.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::from(&self.state)
    }

    /// Amount payable; see [`CartState::calculate_total`].
    pub fn calculate_total(&self) -> Money {
        self.state.calculate_total()
    }

    /// Pricing breakdown of the current state.
    pub fn pricing(&self) -> Result<CartPricing, CartError> {
        self.state.pricing()
    }

    /// Add a line item, merging quantities when the id is already present.
    ///
    /// Fails with `InvalidItem` when quantity <= 0 or the unit price is
    /// negative, and with `Overflow` when the merged quantity or the cart
    /// subtotal would not fit.
    pub fn add_item(&mut self, candidate: LineItem) -> Result<&CartState, CartError> {
        let id = candidate.id.clone();
        let quantity = candidate.quantity;
        self.transition("add_item", |state| state.merge_item(candidate))?;
        debug!(item_id = %id, quantity, "item added");
        Ok(&self.state)
    }

    /// Remove an item. Absent ids are a no-op. Emptying the cart clears the coupon.
    pub fn remove_item(&mut self, id: &ItemId) -> &CartState {
        let mut removed = false;
        self.commit("remove_item", |state| removed = state.remove_item(id));
        debug!(item_id = %id, removed, "item removed");
        &self.state
    }

    /// Set an item's quantity in place. Zero removes the item, negative fails
    /// with `InvalidQuantity`, absent ids are a no-op.
    pub fn update_quantity(
        &mut self,
        id: &ItemId,
        quantity: i64,
    ) -> Result<&CartState, CartError> {
        let mut changed = false;
        self.transition("update_quantity", |state| {
            changed = state.set_quantity(id, quantity)?;
            Ok(())
        })?;
        debug!(item_id = %id, quantity, changed, "quantity updated");
        Ok(&self.state)
    }

    /// Increase an item's quantity by one. Absent ids are a no-op.
    pub fn increment(&mut self, id: &ItemId) -> Result<&CartState, CartError> {
        let current = self.state.get(id).map(|i| i.quantity);
        match current {
            Some(current) => {
                let next = current.checked_add(1).ok_or(CartError::Overflow)?;
                self.update_quantity(id, next)
            }
            None => Ok(&self.state),
        }
    }

    /// Decrease an item's quantity by one, never below one. Removing an item
    /// is always an explicit [`CartStore::remove_item`].
    pub fn decrement(&mut self, id: &ItemId) -> Result<&CartState, CartError> {
        let current = self.state.get(id).map(|i| i.quantity);
        match current {
            Some(current) if current > 1 => self.update_quantity(id, current - 1),
            Some(_) => {
                debug!(item_id = %id, "decrement ignored at quantity 1");
                Ok(&self.state)
            }
            None => Ok(&self.state),
        }
    }

    /// Apply a coupon code. The code is trimmed and upper-cased before lookup.
    ///
    /// Unknown codes fail with `InvalidCoupon` and leave the cart, including
    /// any previously applied coupon and its message, untouched. An empty
    /// cart carries no discount, so any code fails there with `EmptyCart`.
    pub fn apply_coupon(&mut self, raw_code: &str) -> Result<&CartState, CartError> {
        let (code, amount) = match self.coupons.lookup(raw_code) {
            Ok(found) => found,
            Err(e) => {
                warn!(code = raw_code, "coupon rejected");
                return Err(e);
            }
        };
        if self.state.is_empty() {
            warn!(code = %code, "coupon rejected, cart is empty");
            return Err(CartError::EmptyCart(code));
        }

        self.transition("apply_coupon", |state| {
            state.set_coupon(CouponState::applied(code.as_str(), amount));
            Ok(())
        })?;
        info!(code = %code, discount = %amount, "coupon applied");
        Ok(&self.state)
    }

    /// Drop the applied coupon, if any.
    pub fn clear_coupon(&mut self) -> &CartState {
        self.commit("clear_coupon", |state| state.set_coupon(CouponState::none()));
        &self.state
    }

    /// Apply `edit` to a copy of the state; commit and notify only on success.
    fn transition<F>(&mut self, op: &'static str, edit: F) -> Result<(), CartError>
    where
        F: FnOnce(&mut CartState) -> Result<(), CartError>,
    {
        let mut next = self.state.clone();
        if let Err(e) = edit(&mut next) {
            warn!(op, kind = e.kind(), error = %e, "cart transition rejected");
            return Err(e);
        }

        self.swap_in(op, next);
        Ok(())
    }

    /// Apply an edit that cannot fail to a copy of the state and commit it.
    fn commit<F>(&mut self, op: &'static str, edit: F)
    where
        F: FnOnce(&mut CartState),
    {
        let mut next = self.state.clone();
        edit(&mut next);
        self.swap_in(op, next);
    }

    fn swap_in(&mut self, op: &'static str, next: CartState) {
        self.state = next;
        self.notify(op);
    }

    fn notify(&self, op: &'static str) {
        if self.sinks.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for sink in &self.sinks {
            if let Err(e) = sink.persist(&snapshot) {
                warn!(op, error = %e, "snapshot sink failed; in-memory cart kept");
            }
        }
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &self.state)
            .field("coupons", &self.coupons)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

/// The coupon a seeded cart may keep: `coupon` itself, re-derived from the
/// table, when its code is recognized at the same amount; otherwise none.
fn recognized_coupon(coupon: &CouponState, coupons: &CouponTable) -> CouponState {
    if *coupon == CouponState::none() {
        return CouponState::none();
    }
    match coupons.lookup(&coupon.code) {
        Ok((code, amount)) if amount == coupon.discount_amount => {
            CouponState::applied(code, amount)
        }
        _ => {
            warn!(
                code = %coupon.code,
                discount = %coupon.discount_amount,
                "dropping unrecognized persisted coupon"
            );
            CouponState::none()
        }
    }
}

fn default_state() -> CartState {
    CartState {
        items: default_items(),
        coupon: CouponState::none(),
    }
}
