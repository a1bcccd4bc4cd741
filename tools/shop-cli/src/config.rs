//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shop_cart::cart::CouponTable;
use shop_cart::CartKey;

/// Environment variable overriding `storage.dir`.
pub const STORAGE_DIR_ENV: &str = "SHOP_STORAGE_DIR";

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Where carts are saved.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Accepted coupon codes and their fixed discounts.
    #[serde(default)]
    pub coupons: CouponTable,

    /// What a cart starts with before its first save.
    #[serde(default)]
    pub seed: SeedConfig,
}

impl ShopConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::parse(&content, path.ends_with(".json"))
            .with_context(|| format!("Failed to parse config file: {}", path))
    }

    /// Parse config text, TOML unless `json` is set.
    pub fn parse(content: &str, json: bool) -> Result<Self> {
        let config = if json {
            serde_json::from_str(content)?
        } else {
            toml::from_str(content)?
        };
        Ok(config)
    }

    /// Apply environment overrides.
    pub fn with_env(mut self) -> Self {
        if let Some(dir) = std::env::var_os(STORAGE_DIR_ENV) {
            self.storage.dir = PathBuf::from(dir);
        }
        self
    }

    /// Resolve the storage directory against `cwd` when relative.
    pub fn storage_dir(&self, cwd: &Path) -> PathBuf {
        if self.storage.dir.is_absolute() {
            self.storage.dir.clone()
        } else {
            cwd.join(&self.storage.dir)
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding saved carts (default: `.shop`).
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// Key of the cart to operate on (default: `cart`).
    #[serde(default)]
    pub cart_key: CartKey,
}

fn default_dir() -> PathBuf {
    PathBuf::from(".shop")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            cart_key: CartKey::default(),
        }
    }
}

/// Seeding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Start a never-saved cart with the sample items instead of empty.
    #[serde(default = "default_true")]
    pub use_defaults: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { use_defaults: true }
    }
}
