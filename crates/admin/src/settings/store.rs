//! Key-value persistence behind the settings repository.
//!
//! The repository is the only caller of these stores. A store knows nothing
//! about the settings shape: it moves opaque JSON payloads by key.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::db::settings as db_settings;

/// Errors reported by a settings store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The store could not complete the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A key-value store for settings payloads.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Fetch the payload stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError>;

    /// Store `payload` under `key`, replacing any previous value.
    async fn set(&self, key: &str, payload: &JsonValue) -> Result<(), StoreError>;
}

// =============================================================================
// PostgreSQL
// =============================================================================

/// Settings store backed by the `admin.settings` table.
#[derive(Debug, Clone)]
pub struct PgSettingsStore {
    pool: PgPool,
}

impl PgSettingsStore {
    /// Create a store over an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsStore for PgSettingsStore {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError> {
        Ok(db_settings::get_setting(&self.pool, key).await?)
    }

    async fn set(&self, key: &str, payload: &JsonValue) -> Result<(), StoreError> {
        Ok(db_settings::set_setting(&self.pool, key, payload).await?)
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// Process-local settings store.
///
/// Clones share the same entries. Used by tests and when running the admin
/// without a database.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, JsonValue>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding a single entry.
    #[must_use]
    pub fn with_entry(key: impl Into<String>, payload: JsonValue) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), payload);
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Current raw payload under `key`.
    pub async fn snapshot(&self, key: &str) -> Option<JsonValue> {
        self.entries.read().await.get(key).cloned()
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError> {
        Ok(self.snapshot(key).await)
    }

    async fn set(&self, key: &str, payload: &JsonValue) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_owned(), payload.clone());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Stores with injectable failures and delays.

    use std::sync::atomic::{AtomicBool, Ordering};

    use tokio::sync::Notify;

    use super::*;

    /// A memory store whose reads and writes can be made to fail.
    #[derive(Debug, Default)]
    pub struct FlakyStore {
        pub inner: MemoryStore,
        pub fail_reads: AtomicBool,
        pub fail_writes: AtomicBool,
    }

    impl FlakyStore {
        pub fn new(inner: MemoryStore) -> Self {
            Self {
                inner,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl SettingsStore for FlakyStore {
        async fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("read refused".to_string()));
            }
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, payload: &JsonValue) -> Result<(), StoreError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("write refused".to_string()));
            }
            self.inner.set(key, payload).await
        }
    }

    /// A memory store whose next read snapshots the value, then parks until
    /// released, so a write can land while the read is in flight.
    #[derive(Debug, Default)]
    pub struct GatedStore {
        pub inner: MemoryStore,
        pub armed: AtomicBool,
        pub entered: Notify,
        pub release: Notify,
    }

    #[async_trait]
    impl SettingsStore for GatedStore {
        async fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError> {
            let value = self.inner.get(key).await;
            if self.armed.swap(false, Ordering::SeqCst) {
                self.entered.notify_one();
                self.release.notified().await;
            }
            value
        }

        async fn set(&self, key: &str, payload: &JsonValue) -> Result<(), StoreError> {
            self.inner.set(key, payload).await
        }
    }

    /// A memory store whose writes never complete.
    #[derive(Debug, Default)]
    pub struct StalledStore {
        pub inner: MemoryStore,
    }

    #[async_trait]
    impl SettingsStore for StalledStore {
        async fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError> {
            self.inner.get(key).await
        }

        async fn set(&self, _key: &str, _payload: &JsonValue) -> Result<(), StoreError> {
            std::future::pending().await
        }
    }
}
