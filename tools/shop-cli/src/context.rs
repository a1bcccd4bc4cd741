//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use shop_cache::{Cache, SnapshotStore};
use shop_cart::cart::CartState;
use shop_cart::{CartKey, CartStore};
use tracing::debug;

use crate::config::ShopConfig;
use crate::output::Output;

/// Config file names searched from the working directory upward.
const CONFIG_NAMES: [&str; 3] = ["shop.toml", ".shop.toml", "shop.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: ShopConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config = match config_path {
            Some(path) => ShopConfig::load(path)?,
            None => Self::find_config(&cwd)?.unwrap_or_default(),
        };

        Ok(Self {
            config: config.with_env(),
            output,
            cwd,
        })
    }

    /// Find config file in directory tree.
    ///
    /// A file that exists but does not parse is an error rather than being
    /// skipped.
    fn find_config(start: &Path) -> Result<Option<ShopConfig>> {
        for dir in start.ancestors() {
            for name in CONFIG_NAMES {
                let config_path = dir.join(name);
                if config_path.is_file() {
                    debug!(path = %config_path.display(), "using config file");
                    return ShopConfig::load(&config_path.to_string_lossy()).map(Some);
                }
            }
        }
        Ok(None)
    }

    /// Key of the cart being operated on.
    pub fn cart_key(&self) -> &CartKey {
        &self.config.storage.cart_key
    }

    /// Open the snapshot store under the configured storage directory.
    pub fn snapshot_store(&self) -> Result<Arc<SnapshotStore>> {
        let dir = self.config.storage_dir(&self.cwd);
        let cache = Cache::open(&dir)
            .with_context(|| format!("Failed to open cart storage: {}", dir.display()))?;
        Ok(Arc::new(SnapshotStore::new(cache)))
    }

    /// Seed a cart store from `store`: the saved snapshot when there is one,
    /// otherwise the sample items or an empty cart per `seed.use_defaults`.
    pub fn open_cart(&self, store: &SnapshotStore) -> Result<CartStore> {
        let key = self.cart_key();
        let coupons = self.config.coupons.clone();

        if !self.config.seed.use_defaults && !store.exists(key)? {
            return Ok(CartStore::new(CartState::empty(), coupons));
        }

        store
            .open_cart(key, coupons)
            .with_context(|| format!("Failed to load saved cart '{}'", key))
    }
}
