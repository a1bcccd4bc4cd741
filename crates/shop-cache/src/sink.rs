//! Snapshot sinks that write through a [`SnapshotStore`].
//!
//! [`CacheSink`] writes inline. [`QueuedSink`] only enqueues; a background
//! task started by [`spawn_writer`] does the writing, so a transition never
//! waits on storage.

use crate::SnapshotStore;
use shop_cart::{CartKey, CartSnapshot, SinkError, SnapshotSink};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Writes each snapshot synchronously.
#[derive(Clone)]
pub struct CacheSink {
    store: Arc<SnapshotStore>,
    key: CartKey,
}

impl CacheSink {
    /// Sink writing under `key`.
    pub fn new(store: Arc<SnapshotStore>, key: CartKey) -> Self {
        Self { store, key }
    }
}

impl SnapshotSink for CacheSink {
    fn persist(&self, snapshot: &CartSnapshot) -> Result<(), SinkError> {
        self.store
            .save(&self.key, snapshot)
            .map(|_| ())
            .map_err(|e| SinkError::new(e.to_string()))
    }
}

/// Enqueues snapshots for the background writer. Never blocks.
#[derive(Clone)]
pub struct QueuedSink {
    tx: mpsc::UnboundedSender<CartSnapshot>,
}

impl SnapshotSink for QueuedSink {
    fn persist(&self, snapshot: &CartSnapshot) -> Result<(), SinkError> {
        self.tx
            .send(snapshot.clone())
            .map_err(|_| SinkError::new("snapshot writer has stopped"))
    }
}

/// What the background writer did before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Snapshots received from the queue.
    pub received: u64,
    /// Snapshots actually written (older queued ones are skipped).
    pub written: u64,
    /// Writes that failed.
    pub failed: u64,
}

/// Handle on the background writer task.
pub struct WriterHandle {
    join: JoinHandle<WriterStats>,
}

impl WriterHandle {
    /// Wait until every queued snapshot is written.
    ///
    /// The writer stops once all [`QueuedSink`] clones are dropped, so drop
    /// the store holding the sink before awaiting this.
    pub async fn finish(self) -> WriterStats {
        match self.join.await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, "snapshot writer task failed");
                WriterStats::default()
            }
        }
    }
}

/// Start a writer task on the current tokio runtime.
///
/// When several snapshots are queued, only the newest is written: each
/// snapshot is a full copy of the cart, so the older ones are already
/// superseded.
pub fn spawn_writer(store: Arc<SnapshotStore>, key: CartKey) -> (QueuedSink, WriterHandle) {
    let (tx, mut rx) = mpsc::unbounded_channel::<CartSnapshot>();

    let join = tokio::spawn(async move {
        let mut stats = WriterStats::default();

        while let Some(mut latest) = rx.recv().await {
            stats.received += 1;
            while let Ok(newer) = rx.try_recv() {
                stats.received += 1;
                latest = newer;
            }

            let store = Arc::clone(&store);
            let key = key.clone();
            let result =
                tokio::task::spawn_blocking(move || store.save(&key, &latest)).await;

            match result {
                Ok(Ok(version)) => {
                    stats.written += 1;
                    debug!(version, "queued snapshot written");
                }
                Ok(Err(e)) => {
                    stats.failed += 1;
                    warn!(error = %e, "queued snapshot write failed");
                }
                Err(e) => {
                    stats.failed += 1;
                    warn!(error = %e, "queued snapshot write panicked");
                }
            }
        }

        stats
    });

    (QueuedSink { tx }, WriterHandle { join })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cache;
    use shop_cart::prelude::*;

    #[test]
    fn test_cache_sink_writes_inline() {
        let store = Arc::new(SnapshotStore::new(Cache::in_memory()));
        let key = CartKey::default();
        let mut cart =
            CartStore::with_defaults().with_sink(CacheSink::new(Arc::clone(&store), key.clone()));

        cart.apply_coupon("SAVE10").unwrap();
        cart.remove_item(&ItemId::new("3"));

        let record = store.load_record(&key).unwrap().unwrap();
        assert_eq!(record.version, 2);
        assert_eq!(record.snapshot, cart.snapshot());
    }

    #[tokio::test]
    async fn test_queued_sink_drains_on_finish() {
        let store = Arc::new(SnapshotStore::new(Cache::in_memory()));
        let key = CartKey::new("queued");
        let (sink, writer) = spawn_writer(Arc::clone(&store), key.clone());

        let mut cart = CartStore::with_defaults().with_sink(sink);
        cart.update_quantity(&ItemId::new("1"), 7).unwrap();
        cart.apply_coupon("save20").unwrap();
        let expected = cart.snapshot();
        drop(cart);

        let stats = writer.finish().await;
        assert_eq!(stats.received, 2);
        assert!(stats.written >= 1);
        assert_eq!(stats.failed, 0);
        assert_eq!(store.load(&key).unwrap(), Some(expected));
    }

    #[tokio::test]
    async fn test_queued_sink_after_writer_stopped() {
        let store = Arc::new(SnapshotStore::new(Cache::in_memory()));
        let (sink, writer) = spawn_writer(store, CartKey::default());
        writer.join.abort();
        let _ = writer.join.await;

        assert!(sink.persist(&CartSnapshot::default()).is_err());
    }
}
