//! Shopping cart state management.
//!
//! This crate owns the cart logic of the online shop:
//!
//! - **Money**: exact cents-based amounts, never floating point
//! - **Cart**: line items, coupon state, pricing breakdown
//! - **Store**: [`CartStore`], the single writer that validates every
//!   transition and mirrors committed state to [`SnapshotSink`]s
//!
//! # Example
//!
//! ```
//! use shop_cart::prelude::*;
//!
//! let sink = RecordingSink::new();
//! let mut store = CartStore::with_defaults().with_sink(sink.clone());
//!
//! store.apply_coupon("save10").unwrap();
//! store.update_quantity(&ItemId::new("3"), 0).unwrap();
//!
//! // 19.99 * 2 + 49.99 - 10.00
//! assert_eq!(store.calculate_total(), Money::from_cents(7997));
//! assert_eq!(sink.len(), 2);
//! ```

pub mod cart;
pub mod error;
pub mod ids;
pub mod money;
pub mod snapshot;
pub mod store;

pub use error::CartError;
pub use ids::{CartKey, ItemId};
pub use money::Money;
pub use snapshot::{CartSnapshot, RecordingSink, SinkError, SnapshotSink};
pub use store::CartStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::cart::{
        default_items, sample_item, CartPricing, CartState, CouponState, CouponTable, LineItem,
        LinePricing,
    };
    pub use crate::error::CartError;
    pub use crate::ids::{CartKey, ItemId};
    pub use crate::money::Money;
    pub use crate::snapshot::{CartSnapshot, RecordingSink, SinkError, SnapshotSink};
    pub use crate::store::CartStore;
}
