//! Settings repository: the single source of truth for [`SiteSettings`].

use std::sync::Arc;

use serde_json::Value as JsonValue;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use dreamtrade_core::SiteSettings;

use super::cache::SettingsCache;
use super::store::{SettingsStore, StoreError};

/// Store key of the site settings record.
pub const DEFAULT_SETTINGS_KEY: &str = "site_settings";

/// Errors surfaced by the settings repository.
///
/// Only writes fail: reads degrade to defaults.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The store rejected or could not complete the write.
    #[error("failed to write settings: {0}")]
    Store(#[from] StoreError),
}

/// Reads and writes the site settings record.
///
/// Loads are served from the [`SettingsCache`] when possible. Once
/// [`save`](Self::save) resolves, every later [`load`](Self::load) reflects
/// the saved record. Saves through one repository are written in the order
/// they were issued.
#[derive(Clone)]
pub struct SettingsRepository {
    inner: Arc<SettingsRepositoryInner>,
}

struct SettingsRepositoryInner {
    store: Arc<dyn SettingsStore>,
    cache: SettingsCache,
    key: String,
    write_lock: Mutex<()>,
}

impl SettingsRepository {
    /// Create a repository over `store` using the default settings key.
    #[must_use]
    pub fn new(store: Arc<dyn SettingsStore>, cache: SettingsCache) -> Self {
        Self::with_key(store, cache, DEFAULT_SETTINGS_KEY)
    }

    /// Create a repository that keeps the record under `key`.
    #[must_use]
    pub fn with_key(
        store: Arc<dyn SettingsStore>,
        cache: SettingsCache,
        key: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(SettingsRepositoryInner {
                store,
                cache,
                key: key.into(),
                write_lock: Mutex::new(()),
            }),
        }
    }

    /// Store key of the record.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Get a reference to the cache.
    #[must_use]
    pub fn cache(&self) -> &SettingsCache {
        &self.inner.cache
    }

    /// Load the current settings, merged onto the defaults.
    ///
    /// Never fails: a missing, unreadable or corrupt payload yields the
    /// default record.
    #[instrument(skip(self), fields(key = %self.inner.key))]
    pub async fn load(&self) -> SiteSettings {
        let key = self.key();
        if let Some(settings) = self.inner.cache.get(key).await {
            debug!("settings served from cache");
            return settings;
        }

        let generation = self.inner.cache.generation();
        let Some(settings) = self.fetch().await else {
            return SiteSettings::default();
        };

        if !self
            .inner
            .cache
            .insert_if_current(key, settings.clone(), generation)
            .await
        {
            debug!("settings changed during read, not caching");
        }
        settings
    }

    /// Drop the cached record and load it again from the store.
    #[instrument(skip(self), fields(key = %self.inner.key))]
    pub async fn refresh(&self) -> SiteSettings {
        self.inner.cache.invalidate(self.key()).await;
        self.load().await
    }

    /// Persist the full record, overwriting the previous one.
    ///
    /// Returns the record unchanged so callers can treat it as the new
    /// canonical value.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Store` if the store write fails.
    #[instrument(skip(self, settings), fields(key = %self.inner.key))]
    pub async fn save(&self, settings: SiteSettings) -> Result<SiteSettings, SettingsError> {
        let payload = JsonValue::Object(settings.to_payload());
        let key = self.key();

        let _guard = self.inner.write_lock.lock().await;
        let result = self.inner.store.set(key, &payload).await;
        // A failed write may still have landed.
        self.inner.cache.invalidate(key).await;

        if let Err(e) = result {
            error!(error = %e, "failed to write settings");
            return Err(e.into());
        }

        info!("settings saved");
        Ok(settings)
    }

    /// Replace every field with its default, keeping the record identifier.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Store` if the store write fails.
    pub async fn reset(&self) -> Result<SiteSettings, SettingsError> {
        let id = self.load().await.id;
        self.save(SiteSettings {
            id,
            ..SiteSettings::default()
        })
        .await
    }

    /// Read and merge the stored record.
    ///
    /// Returns `None` when the store itself failed, so the defaults served in
    /// its place are not cached.
    async fn fetch(&self) -> Option<SiteSettings> {
        let payload = match self.inner.store.get(self.key()).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!("no stored settings, using defaults");
                return Some(SiteSettings::default());
            }
            Err(e) => {
                warn!(error = %e, "failed to read settings, using defaults");
                return None;
            }
        };

        let settings = match SiteSettings::from_payload(&payload) {
            Ok(report) => {
                for e in &report.rejected {
                    warn!(error = %e, "ignoring stored settings value");
                }
                report.settings
            }
            Err(e) => {
                warn!(error = %e, "stored settings are unreadable, using defaults");
                SiteSettings::default()
            }
        };
        Some(settings)
    }
}

impl std::fmt::Debug for SettingsRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsRepository")
            .field("key", &self.inner.key)
            .field("cache", &self.inner.cache)
            .finish_non_exhaustive()
    }
}
