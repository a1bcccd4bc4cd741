//! Shop CLI - Command line front end for the shop cart.
//!
//! Commands:
//! - `shop show` - Print the cart
//! - `shop add` - Add a line item (merges by id)
//! - `shop add-sample` - Add the sample hat
//! - `shop remove` - Remove a line item
//! - `shop set-qty` - Set a quantity (0 removes)
//! - `shop inc` / `shop dec` - Step a quantity by one
//! - `shop coupon` - Apply a coupon code
//! - `shop clear-coupon` - Drop the applied coupon
//! - `shop reset` - Forget the saved cart

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{AddArgs, CouponArgs, IdArgs, SetQtyArgs};

/// Shop CLI - Manage the shopping cart
#[derive(Parser)]
#[command(name = "shop")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart and its totals
    Show,

    /// Add a line item, merging quantities with an existing id
    Add(AddArgs),

    /// Add the sample hat
    AddSample,

    /// Remove a line item
    Remove(IdArgs),

    /// Set the quantity of a line item (0 removes it)
    SetQty(SetQtyArgs),

    /// Increase a quantity by one
    Inc(IdArgs),

    /// Decrease a quantity by one, never below one
    Dec(IdArgs),

    /// Apply a coupon code
    Coupon(CouponArgs),

    /// Remove the applied coupon
    ClearCoupon,

    /// Forget the saved cart
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = match context::Context::load(config_path, output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    // Execute command
    let result = match cli.command {
        Commands::Show => commands::show(&ctx).await,
        Commands::Add(args) => commands::add(args, &ctx).await,
        Commands::AddSample => commands::add_sample(&ctx).await,
        Commands::Remove(args) => commands::remove(args, &ctx).await,
        Commands::SetQty(args) => commands::set_qty(args, &ctx).await,
        Commands::Inc(args) => commands::inc(args, &ctx).await,
        Commands::Dec(args) => commands::dec(args, &ctx).await,
        Commands::Coupon(args) => commands::coupon(args, &ctx).await,
        Commands::ClearCoupon => commands::clear_coupon(&ctx).await,
        Commands::Reset => commands::reset(&ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

/// Log to stderr so `--json` output on stdout stays parseable.
///
/// `RUST_LOG` wins when set; otherwise the shop crates log at `info`, or
/// `debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "shop_cart={level},shop_cache={level},shop_cli={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
