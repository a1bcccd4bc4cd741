//! Key-value snapshot persistence for shop carts.
//!
//! Provides the persistence surface a [`shop_cart::CartStore`] mirrors its
//! state to: a JSON key-value [`Cache`] (in memory or one file per key), a
//! versioned [`SnapshotStore`] on top of it, and sinks that plug the store
//! into the cart.
//!
//! # Example
//!
//! ```rust,ignore
//! use shop_cache::{spawn_writer, Cache, SnapshotStore};
//! use shop_cart::prelude::*;
//! use std::sync::Arc;
//!
//! let store = Arc::new(SnapshotStore::new(Cache::open(".shop")?));
//! let key = CartKey::default();
//!
//! // Seed from the last saved snapshot, or the sample items
//! let seed = store.load(&key)?;
//! let (sink, writer) = spawn_writer(Arc::clone(&store), key);
//! let mut cart = CartStore::seeded(seed, CouponTable::default())?.with_sink(sink);
//!
//! cart.apply_coupon("SAVE10")?;
//!
//! drop(cart);
//! writer.finish().await;
//! ```

mod error;
mod kv;
mod record;
mod sink;

pub use error::CacheError;
pub use kv::Cache;
pub use record::{SnapshotRecord, SnapshotStore};
pub use sink::{spawn_writer, CacheSink, QueuedSink, WriterHandle, WriterStats};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        spawn_writer, Cache, CacheError, CacheSink, QueuedSink, SnapshotStore, WriterHandle,
    };
}
