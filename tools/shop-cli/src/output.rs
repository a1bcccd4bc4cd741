//! Output formatting for the CLI.

use anyhow::Result;
use console::style;
use serde::Serialize;
use shop_cart::cart::{CartPricing, CartState, CouponState};
use shop_cart::CartKey;

/// Column widths of the cart table: id, name, unit price, qty, subtotal.
const WIDTHS: [usize; 5] = [8, 20, 10, 5, 10];

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a table row.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        let formatted: Vec<String> = cols
            .iter()
            .zip(widths.iter())
            .map(|(col, width)| format!("{:width$}", col, width = width))
            .collect();
        println!("  {}", formatted.join("  "));
    }

    /// Print a cart: a [`CartView`] in JSON mode, otherwise a table and totals.
    pub fn cart(&self, key: &CartKey, state: &CartState) -> Result<()> {
        let view = CartView::new(key, state)?;

        if self.json {
            self.json(&view);
            return Ok(());
        }

        self.header(&format!("Cart '{}'", key));

        if state.is_empty() {
            self.info("Cart is empty.");
        } else {
            self.table_row(&["ID", "NAME", "PRICE", "QTY", "SUBTOTAL"], &WIDTHS);
            for line in &view.pricing.lines {
                self.table_row(
                    &[
                        line.id.as_str(),
                        &line.name,
                        &line.unit_price.display(),
                        &line.quantity.to_string(),
                        &line.subtotal.display(),
                    ],
                    &WIDTHS,
                );
            }
            println!();
        }

        self.kv("Items", &view.item_count.to_string());
        self.kv("Subtotal", &view.pricing.subtotal.display());
        if view.coupon.is_active() {
            self.kv(
                "Coupon",
                &format!("{} ({})", view.coupon.code, style(&view.coupon.message).green()),
            );
        }
        if view.pricing.has_discount() {
            self.kv("Discount", &format!("-{}", view.pricing.discount.display()));
        }
        self.kv(
            "Total",
            &style(view.pricing.total.display()).bold().to_string(),
        );
        if !view.can_checkout {
            self.debug("checkout disabled: cart is empty");
        }

        Ok(())
    }
}

/// Machine-readable cart as printed with `--json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    /// Which cart.
    pub key: CartKey,
    /// Lines and totals.
    pub pricing: CartPricing,
    /// Applied coupon.
    pub coupon: CouponState,
    /// Total number of units.
    pub item_count: i64,
    /// Whether checkout would be allowed.
    pub can_checkout: bool,
}

impl CartView {
    /// Build the view of a cart.
    pub fn new(key: &CartKey, state: &CartState) -> Result<Self> {
        Ok(Self {
            key: key.clone(),
            pricing: state.pricing()?,
            coupon: state.coupon().clone(),
            item_count: state.item_count(),
            can_checkout: state.can_checkout(),
        })
    }
}
