//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::{AdminConfig, StoreConfig};
use crate::db;
use crate::settings::{
    MemoryStore, PgSettingsStore, SettingsCache, SettingsRepository, SettingsStore,
};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the settings repository and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: Option<PgPool>,
    settings: SettingsRepository,
}

impl AppState {
    /// Create application state from parts.
    #[must_use]
    pub fn new(config: AdminConfig, pool: Option<PgPool>, settings: SettingsRepository) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                settings,
            }),
        }
    }

    /// Build the settings store, cache and repository described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the database pool cannot be created.
    pub async fn from_config(config: AdminConfig) -> Result<Self, sqlx::Error> {
        let (pool, store): (Option<PgPool>, Arc<dyn SettingsStore>) = match &config.store {
            StoreConfig::Postgres { database_url } => {
                let pool = db::create_pool(database_url).await?;
                tracing::info!("Database pool created");
                (Some(pool.clone()), Arc::new(PgSettingsStore::new(pool)))
            }
            StoreConfig::Memory => {
                tracing::warn!("Using in-memory settings store; settings will not survive a restart");
                (None, Arc::new(MemoryStore::new()))
            }
        };

        let cache = SettingsCache::new(config.cache_ttl);
        let settings = SettingsRepository::with_key(store, cache, config.settings_key.clone());
        Ok(Self::new(config, pool, settings))
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool, if one is configured.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    /// Get a reference to the settings repository.
    #[must_use]
    pub fn settings(&self) -> &SettingsRepository {
        &self.inner.settings
    }
}
