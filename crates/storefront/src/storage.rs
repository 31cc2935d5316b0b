//! Local persistent key-value store.
//!
//! Durability for the cart and the order history is a single JSON string
//! per key. Every write replaces the whole value - there is no partial
//! update protocol, so concurrent writers to the same key overwrite one
//! another and the last write wins.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

/// Store key for the cart's raw line-item list.
pub const CART_KEY: &str = "cart";
/// Store key for the locally cached order summaries (newest first).
pub const USER_ORDERS_KEY: &str = "userOrders";

/// Errors from the key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Asynchronous string-keyed store of JSON-encoded values.
///
/// Implementations must treat a missing key as `Ok(None)`, not an error.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value for `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error only for I/O failures; absence is `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value could not be written.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

// =============================================================================
// FileStore
// =============================================================================

/// File-backed store: one `<key>.json` file per key under a data directory.
///
/// The directory is created lazily on first write, so a fresh install reads
/// as "everything absent" without touching the filesystem.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`.
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.path_for(key), value).await?;
        Ok(())
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: std::sync::Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with entries.
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: std::sync::Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn poisoned() -> StoreError {
    StoreError::Io(std::io::Error::other("store mutex poisoned"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn scratch_dir(label: &str) -> PathBuf {
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        std::env::temp_dir().join(format!(
            "extramile-storage-{label}-{}-{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed),
        ))
    }

    #[tokio::test]
    async fn test_file_store_missing_key_is_none() {
        let store = FileStore::new(scratch_dir("missing"));
        assert!(store.get("cart").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = scratch_dir("roundtrip");
        let store = FileStore::new(dir.clone());

        store.set(CART_KEY, r#"[{"quantity":2}]"#).await.unwrap();
        assert_eq!(
            store.get(CART_KEY).await.unwrap().as_deref(),
            Some(r#"[{"quantity":2}]"#)
        );

        // Whole-value replace, not append
        store.set(CART_KEY, "[]").await.unwrap();
        assert_eq!(store.get(CART_KEY).await.unwrap().as_deref(), Some("[]"));

        tokio::fs::remove_dir_all(dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.get(USER_ORDERS_KEY).await.unwrap().is_none());

        store.set(USER_ORDERS_KEY, "[]").await.unwrap();
        assert_eq!(
            store.get(USER_ORDERS_KEY).await.unwrap().as_deref(),
            Some("[]")
        );
    }

    #[tokio::test]
    async fn test_memory_store_seeded() {
        let store = MemoryStore::with_entries([(CART_KEY, "[]")]);
        assert_eq!(store.get(CART_KEY).await.unwrap().as_deref(), Some("[]"));
    }
}
