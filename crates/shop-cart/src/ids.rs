//! Newtype IDs for type-safe identifiers.
//!
//! Using newtypes prevents accidentally mixing up an item id with a cart
//! key. Ids compare by exact string equality: `"1"` and `"01"` are
//! different items.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<u64> for $name {
            fn from(n: u64) -> Self {
                Self(n.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        // Snapshots written by older front ends carry numeric ids; they are
        // normalized to their decimal string form on read.
        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                #[derive(Deserialize)]
                #[serde(untagged)]
                enum Repr {
                    Text(String),
                    Unsigned(u64),
                    Signed(i64),
                }

                Ok(match Repr::deserialize(deserializer)? {
                    Repr::Text(s) => Self(s),
                    Repr::Unsigned(n) => Self(n.to_string()),
                    Repr::Signed(n) => Self(n.to_string()),
                })
            }
        }
    };
}

define_id!(
    /// Stable identifier of a line item, assigned at creation.
    ItemId
);
define_id!(
    /// Name under which one cart's snapshot is persisted.
    CartKey
);

impl ItemId {
    /// Generate a new unique item ID.
    pub fn generate() -> Self {
        Self(generate_id())
    }

    /// Check whether the id is blank.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Default for CartKey {
    fn default() -> Self {
        Self::new("cart")
    }
}

/// Generate a unique ID from the wall clock and a process-wide counter.
fn generate_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let counter = COUNTER.fetch_add(1, Ordering::SeqCst);

    format!("{}-{}", millis, counter)
}
