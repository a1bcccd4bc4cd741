//! CLI command implementations.
//!
//! Every mutating command follows the same shape: seed a [`CartStore`] from
//! the saved snapshot, attach the queued writer, run one transition, wait for
//! the writer to drain, then print the cart.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Args;
use shop_cache::spawn_writer;
use shop_cart::cart::{sample_item, LineItem};
use shop_cart::{CartError, CartStore, ItemId, Money};
use tracing::debug;

use crate::context::Context;

/// Arguments for the add command.
#[derive(Args)]
pub struct AddArgs {
    /// Item id (generated when omitted).
    #[arg(long)]
    pub id: Option<String>,

    /// Display name.
    #[arg(long)]
    pub name: String,

    /// Unit price, e.g. `19.99` or `$19.99`.
    #[arg(long, allow_hyphen_values = true)]
    pub price: Money,

    /// Quantity to add.
    #[arg(long, default_value = "1", allow_hyphen_values = true)]
    pub qty: i64,
}

/// Arguments for commands that target one line item.
#[derive(Args)]
pub struct IdArgs {
    /// Item id.
    pub id: String,
}

/// Arguments for the set-qty command.
#[derive(Args)]
pub struct SetQtyArgs {
    /// Item id.
    pub id: String,

    /// New quantity; 0 removes the item.
    #[arg(allow_hyphen_values = true)]
    pub qty: i64,
}

/// Arguments for the coupon command.
#[derive(Args)]
pub struct CouponArgs {
    /// Coupon code (case-insensitive).
    pub code: String,
}

/// Print the cart without changing it.
pub async fn show(ctx: &Context) -> Result<()> {
    let store = ctx.snapshot_store()?;
    let cart = ctx.open_cart(&store)?;
    ctx.output.cart(ctx.cart_key(), cart.state())
}

/// Add a line item.
pub async fn add(args: AddArgs, ctx: &Context) -> Result<()> {
    let id = args.id.map(ItemId::new).unwrap_or_else(ItemId::generate);
    let item = LineItem::new(id, args.name, args.price, args.qty);
    let label = format!("{} x{}", item.name, item.quantity);

    transition(ctx, move |cart| {
        cart.add_item(item)?;
        Ok(format!("Added {}", label))
    })
    .await
}

/// Add the sample hat.
pub async fn add_sample(ctx: &Context) -> Result<()> {
    transition(ctx, |cart| {
        cart.add_item(sample_item())?;
        Ok("Added sample item".to_string())
    })
    .await
}

/// Remove a line item.
pub async fn remove(args: IdArgs, ctx: &Context) -> Result<()> {
    let id = ItemId::new(args.id);
    transition(ctx, move |cart| {
        let had = cart.state().contains(&id);
        cart.remove_item(&id);
        Ok(if had {
            format!("Removed item {}", id)
        } else {
            format!("Item {} was not in the cart", id)
        })
    })
    .await
}

/// Set a line item's quantity.
pub async fn set_qty(args: SetQtyArgs, ctx: &Context) -> Result<()> {
    let id = ItemId::new(args.id);
    let qty = args.qty;
    transition(ctx, move |cart| {
        cart.update_quantity(&id, qty)?;
        Ok(if qty == 0 {
            format!("Removed item {}", id)
        } else {
            format!("Set item {} to {}", id, qty)
        })
    })
    .await
}

/// Increase a quantity by one.
pub async fn inc(args: IdArgs, ctx: &Context) -> Result<()> {
    let id = ItemId::new(args.id);
    transition(ctx, move |cart| {
        cart.increment(&id)?;
        Ok(quantity_message(cart, &id))
    })
    .await
}

/// Decrease a quantity by one.
pub async fn dec(args: IdArgs, ctx: &Context) -> Result<()> {
    let id = ItemId::new(args.id);
    transition(ctx, move |cart| {
        cart.decrement(&id)?;
        Ok(quantity_message(cart, &id))
    })
    .await
}

/// Apply a coupon code.
pub async fn coupon(args: CouponArgs, ctx: &Context) -> Result<()> {
    transition(ctx, move |cart| {
        let state = cart.apply_coupon(&args.code)?;
        Ok(state.coupon().message.clone())
    })
    .await
}

/// Drop the applied coupon.
pub async fn clear_coupon(ctx: &Context) -> Result<()> {
    transition(ctx, |cart| {
        cart.clear_coupon();
        Ok("Coupon removed".to_string())
    })
    .await
}

/// Forget the saved cart and print what a fresh one starts with.
pub async fn reset(ctx: &Context) -> Result<()> {
    let store = ctx.snapshot_store()?;
    store
        .delete(ctx.cart_key())
        .with_context(|| format!("Failed to delete cart '{}'", ctx.cart_key()))?;
    ctx.output
        .success(&format!("Cart '{}' reset", ctx.cart_key()));

    let cart = ctx.open_cart(&store)?;
    ctx.output.cart(ctx.cart_key(), cart.state())
}

fn quantity_message(cart: &CartStore, id: &ItemId) -> String {
    match cart.state().get(id) {
        Some(item) => format!("Item {} now at {}", id, item.quantity),
        None => format!("Item {} is not in the cart", id),
    }
}

/// Run one transition against the saved cart and persist the result.
///
/// A rejected transition saves nothing and is returned as the command error.
async fn transition<F>(ctx: &Context, op: F) -> Result<()>
where
    F: FnOnce(&mut CartStore) -> Result<String, CartError>,
{
    let store = ctx.snapshot_store()?;
    let key = ctx.cart_key().clone();

    let mut cart = ctx.open_cart(&store)?;
    let (sink, writer) = spawn_writer(Arc::clone(&store), key.clone());
    cart.add_sink(sink);

    let outcome = op(&mut cart);
    let state = cart.state().clone();
    drop(cart);

    let stats = writer.finish().await;
    debug!(
        received = stats.received,
        written = stats.written,
        failed = stats.failed,
        "snapshot writer finished"
    );
    if stats.failed > 0 {
        ctx.output
            .warn("Cart updated, but saving it failed; see the log for details");
    }

    let message = outcome?;
    ctx.output.success(&message);
    ctx.output.cart(&key, &state)
}
