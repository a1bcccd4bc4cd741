//! Snapshots handed to the persistence surface, and the sink seam.
//!
//! A [`CartSnapshot`] is the wire shape
//! `{items: [{id, name, unitPrice, quantity}], coupon: {code, discountAmount, message}}`.
//! Sinks only ever see snapshots; they never get a handle on live state.

use crate::cart::{CartState, CouponState, LineItem};
use crate::error::CartError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};

/// Immutable point-in-time copy of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    /// Line items in cart order.
    pub items: Vec<LineItem>,
    /// Coupon state.
    #[serde(default)]
    pub coupon: CouponState,
}

impl CartSnapshot {
    /// Validate a read-back snapshot and turn it into cart state.
    pub fn into_state(self) -> Result<CartState, CartError> {
        CartState::from_parts(self.items, self.coupon)
    }
}

impl From<&CartState> for CartSnapshot {
    fn from(state: &CartState) -> Self {
        Self {
            items: state.items().to_vec(),
            coupon: state.coupon().clone(),
        }
    }
}

/// Failure reported by a sink. Logged by the store, never propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkError(String);

impl SinkError {
    /// Create a sink error from any message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for SinkError {}

/// Receives a snapshot after every committed transition.
pub trait SnapshotSink: Send + Sync {
    /// Persist (or forward) one snapshot. Must not block for long; the
    /// caller's transition has already been committed.
    fn persist(&self, snapshot: &CartSnapshot) -> Result<(), SinkError>;
}

impl<F> SnapshotSink for F
where
    F: Fn(&CartSnapshot) -> Result<(), SinkError> + Send + Sync,
{
    fn persist(&self, snapshot: &CartSnapshot) -> Result<(), SinkError> {
        self(snapshot)
    }
}

/// Sink that keeps every snapshot in memory. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    snapshots: Arc<Mutex<Vec<CartSnapshot>>>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All snapshots received so far, oldest first.
    pub fn snapshots(&self) -> Vec<CartSnapshot> {
        self.snapshots
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// The most recent snapshot.
    pub fn last(&self) -> Option<CartSnapshot> {
        self.snapshots.lock().ok().and_then(|s| s.last().cloned())
    }

    /// Number of snapshots received.
    pub fn len(&self) -> usize {
        self.snapshots.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Check if nothing was received.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SnapshotSink for RecordingSink {
    fn persist(&self, snapshot: &CartSnapshot) -> Result<(), SinkError> {
        self.snapshots
            .lock()
            .map_err(|_| SinkError::new("recording sink poisoned"))?
            .push(snapshot.clone());
        Ok(())
    }
}
