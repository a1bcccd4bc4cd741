//! Key-Value store wrapper with automatic serialization.

use crate::CacheError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const FILE_EXTENSION: &str = "json";

/// Type-safe key-value store with JSON values.
///
/// Backed either by process memory or by a directory holding one file per
/// key. File names are the URL-safe base64 of the key, so any key maps to
/// exactly one file and back.
pub struct Cache {
    backend: Backend,
}

enum Backend {
    Memory(Mutex<HashMap<String, Vec<u8>>>),
    Dir(PathBuf),
}

impl Cache {
    /// Open a store that lives only as long as this value.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Mutex::new(HashMap::new())),
        }
    }

    /// Open a directory-backed store, creating the directory if needed.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let cache = Cache::open(".shop")?;
    /// ```
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .map_err(|e| CacheError::OpenError(format!("{}: {}", dir.display(), e)))?;
        Ok(Self {
            backend: Backend::Dir(dir.to_path_buf()),
        })
    }

    /// Directory backing this store, if any.
    pub fn dir(&self) -> Option<&Path> {
        match &self.backend {
            Backend::Memory(_) => None,
            Backend::Dir(dir) => Some(dir),
        }
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.get_bytes(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Set a value in the cache.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec_pretty(value)?;
        match &self.backend {
            Backend::Memory(map) => {
                lock(map)?.insert(key.to_string(), bytes);
                Ok(())
            }
            Backend::Dir(dir) => write_atomic(&file_for(dir, key), &bytes),
        }
    }

    /// Delete a value from the cache. Deleting a missing key is not an error.
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        match &self.backend {
            Backend::Memory(map) => {
                lock(map)?.remove(key);
                Ok(())
            }
            Backend::Dir(dir) => match fs::remove_file(file_for(dir, key)) {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            },
        }
    }

    /// Check if a key exists in the cache.
    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        match &self.backend {
            Backend::Memory(map) => Ok(lock(map)?.contains_key(key)),
            Backend::Dir(dir) => Ok(file_for(dir, key).is_file()),
        }
    }

    /// Get all keys in the cache, sorted.
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut keys = match &self.backend {
            Backend::Memory(map) => lock(map)?.keys().cloned().collect(),
            Backend::Dir(dir) => {
                let mut keys = Vec::new();
                for entry in fs::read_dir(dir)? {
                    let path = entry?.path();
                    if path.extension().map_or(true, |e| e != FILE_EXTENSION) {
                        continue;
                    }
                    if let Some(key) = path.file_stem().and_then(|s| s.to_str()).and_then(decode_key)
                    {
                        keys.push(key);
                    }
                }
                keys
            }
        };
        keys.sort();
        Ok(keys)
    }

    fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        match &self.backend {
            Backend::Memory(map) => Ok(lock(map)?.get(key).cloned()),
            Backend::Dir(dir) => match fs::read(file_for(dir, key)) {
                Ok(bytes) => Ok(Some(bytes)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            },
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>, CacheError> {
    m.lock()
        .map_err(|_| CacheError::StoreError("cache lock poisoned".to_string()))
}

fn file_for(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{}.{}", URL_SAFE_NO_PAD.encode(key), FILE_EXTENSION))
}

fn decode_key(stem: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(stem).ok()?;
    String::from_utf8(bytes).ok()
}

/// Write to a uniquely named temp file, then rename over the target so a
/// reader never sees a half-written value.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CacheError> {
    use rand::Rng;

    let suffix: [u8; 6] = rand::thread_rng().gen();
    let tmp = path.with_extension(format!("{}.tmp", URL_SAFE_NO_PAD.encode(suffix)));
    fs::write(&tmp, bytes)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

/// Helper to build cache keys with namespacing.
///
/// # Example
///
/// ```
/// use shop_cache::cache_key;
/// let key = cache_key!("cart", "main");
/// assert_eq!(key, "cart:main");
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}
