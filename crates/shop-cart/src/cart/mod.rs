//! Shopping cart module.
//!
//! Contains the line item, coupon and pricing types and the cart state
//! aggregate they make up.

mod coupon;
mod item;
mod pricing;
mod state;

pub use coupon::{confirmation_message, normalize_code, CouponState, CouponTable};
pub use item::{default_items, sample_item, LineItem};
pub use pricing::{CartPricing, LinePricing};
pub use state::CartState;
