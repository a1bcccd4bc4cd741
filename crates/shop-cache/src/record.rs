//! Versioned cart snapshots stored in the key-value cache.

use crate::{cache_key, Cache, CacheError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shop_cart::cart::CouponTable;
use shop_cart::{CartKey, CartSnapshot, CartStore};
use tracing::debug;

/// Snapshot envelope as written to the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    /// Which cart this is.
    pub key: CartKey,
    /// The cart contents.
    pub snapshot: CartSnapshot,
    /// Incremented on every write, starting at 1.
    pub version: u64,
    /// When this version was written.
    pub saved_at: DateTime<Utc>,
}

/// Reads and writes cart snapshots by [`CartKey`].
///
/// # Example
///
/// ```rust,ignore
/// use shop_cache::{Cache, SnapshotStore};
///
/// let store = SnapshotStore::new(Cache::open(".shop")?);
/// let key = CartKey::default();
///
/// let snapshot = store.load(&key)?; // None on first run
/// store.save(&key, &cart.snapshot())?;
/// ```
pub struct SnapshotStore {
    cache: Cache,
}

impl SnapshotStore {
    /// Wrap a cache.
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    /// The underlying cache.
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Load the latest snapshot for a cart, if one was ever saved.
    pub fn load(&self, key: &CartKey) -> Result<Option<CartSnapshot>, CacheError> {
        Ok(self.load_record(key)?.map(|r| r.snapshot))
    }

    /// Build a cart store seeded from the saved snapshot, or from the sample
    /// items when this cart was never saved. No sink is attached.
    pub fn open_cart(&self, key: &CartKey, coupons: CouponTable) -> Result<CartStore, CacheError> {
        let snapshot = self.load(key)?;
        if snapshot.is_none() {
            debug!(cart = %key, "no saved snapshot");
        }
        Ok(CartStore::seeded(snapshot, coupons)?)
    }

    /// Load the full record including version (for advanced use).
    pub fn load_record(&self, key: &CartKey) -> Result<Option<SnapshotRecord>, CacheError> {
        self.cache.get::<SnapshotRecord>(&record_key(key))
    }

    /// Write a snapshot, bumping the version. Returns the new version.
    pub fn save(&self, key: &CartKey, snapshot: &CartSnapshot) -> Result<u64, CacheError> {
        let version = self
            .load_record(key)?
            .map(|r| r.version + 1)
            .unwrap_or(1);

        let record = SnapshotRecord {
            key: key.clone(),
            snapshot: snapshot.clone(),
            version,
            saved_at: Utc::now(),
        };
        self.cache.set(&record_key(key), &record)?;
        debug!(cart = %key, version, items = snapshot.items.len(), "snapshot saved");
        Ok(version)
    }

    /// Forget a cart.
    pub fn delete(&self, key: &CartKey) -> Result<(), CacheError> {
        self.cache.delete(&record_key(key))
    }

    /// Check if a cart was ever saved.
    pub fn exists(&self, key: &CartKey) -> Result<bool, CacheError> {
        self.cache.exists(&record_key(key))
    }
}

fn record_key(key: &CartKey) -> String {
    cache_key!("cart", key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_cart::prelude::*;

    fn snapshot_with(qty: i64) -> CartSnapshot {
        CartSnapshot {
            items: vec![LineItem::new(1u64, "T-Shirt", Money::from_cents(1999), qty)],
            coupon: CouponState::none(),
        }
    }

    #[test]
    fn test_load_missing() {
        let store = SnapshotStore::new(Cache::in_memory());
        assert_eq!(store.load(&CartKey::default()).unwrap(), None);
        assert!(!store.exists(&CartKey::default()).unwrap());
    }

    #[test]
    fn test_save_bumps_version() {
        let store = SnapshotStore::new(Cache::in_memory());
        let key = CartKey::new("main");

        assert_eq!(store.save(&key, &snapshot_with(1)).unwrap(), 1);
        assert_eq!(store.save(&key, &snapshot_with(2)).unwrap(), 2);

        let record = store.load_record(&key).unwrap().unwrap();
        assert_eq!(record.version, 2);
        assert_eq!(record.key, key);
        assert_eq!(record.snapshot, snapshot_with(2));
        assert!(store.cache().exists("cart:main").unwrap());
    }

    #[test]
    fn test_keys_are_independent() {
        let store = SnapshotStore::new(Cache::in_memory());
        store.save(&CartKey::new("a"), &snapshot_with(1)).unwrap();
        store.save(&CartKey::new("b"), &snapshot_with(5)).unwrap();
        store.delete(&CartKey::new("a")).unwrap();

        assert_eq!(store.load(&CartKey::new("a")).unwrap(), None);
        assert_eq!(
            store.load(&CartKey::new("b")).unwrap(),
            Some(snapshot_with(5))
        );
    }

    #[test]
    fn test_open_cart_seeds() {
        let store = SnapshotStore::new(Cache::in_memory());
        let key = CartKey::default();

        let fresh = store.open_cart(&key, CouponTable::default()).unwrap();
        assert_eq!(fresh.state().items(), default_items().as_slice());

        store.save(&key, &snapshot_with(4)).unwrap();
        let restored = store.open_cart(&key, CouponTable::default()).unwrap();
        assert_eq!(restored.snapshot(), snapshot_with(4));
    }

    #[test]
    fn test_open_cart_rejects_corrupt_snapshot() {
        let store = SnapshotStore::new(Cache::in_memory());
        let key = CartKey::default();
        store.save(&key, &snapshot_with(-2)).unwrap();
        assert!(matches!(
            store.open_cart(&key, CouponTable::default()),
            Err(CacheError::InvalidSnapshot(CartError::InvalidItem { .. }))
        ));
    }

    #[test]
    fn test_record_wire_shape() {
        let store = SnapshotStore::new(Cache::in_memory());
        store.save(&CartKey::default(), &snapshot_with(2)).unwrap();
        let raw: serde_json::Value = store.cache().get("cart:cart").unwrap().unwrap();
        assert_eq!(raw["version"], 1);
        assert_eq!(raw["snapshot"]["items"][0]["unitPrice"], 19.99);
        assert!(raw["savedAt"].is_string());
    }
}
