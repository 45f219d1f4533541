//! Integration tests for DreamTrade.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory scenarios (no services needed)
//! cargo test -p dreamtrade-integration-tests
//!
//! # Include the PostgreSQL-backed tests
//! ADMIN_DATABASE_URL=postgres://... cargo test -p dreamtrade-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `admin_settings_repository` - Repository + editor session scenarios
//! - `admin_settings_api` - JSON routes driven through the router
//! - `admin_settings_postgres` - `PgSettingsStore` against a real database
//!
//! Shared fixtures live here so each test file stays focused on behavior.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use dreamtrade_admin::config::AdminConfig;
use dreamtrade_admin::settings::{
    MemoryStore, SettingsCache, SettingsRepository, SettingsStore, StoreError,
};
use dreamtrade_admin::state::AppState;

/// Memory store whose reads and writes can be switched to fail.
#[derive(Debug, Default)]
pub struct SwitchableStore {
    pub inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl SwitchableStore {
    #[must_use]
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SettingsStore for SwitchableStore {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, payload: &JsonValue) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        self.inner.set(key, payload).await
    }
}

/// Repository over `store` with a fresh cache.
#[must_use]
pub fn repository(store: Arc<dyn SettingsStore>) -> SettingsRepository {
    SettingsRepository::new(store, SettingsCache::default())
}

/// App state over `store`, configured for the in-memory backend.
///
/// # Panics
///
/// Panics if the fixed test configuration is rejected.
#[must_use]
pub fn app_state(store: Arc<dyn SettingsStore>) -> AppState {
    #[allow(clippy::expect_used)]
    let config = AdminConfig::from_lookup(|key| match key {
        "SETTINGS_STORE" => Some("memory".to_string()),
        _ => None,
    })
    .expect("in-memory configuration is valid");
    AppState::new(config, None, repository(store))
}
