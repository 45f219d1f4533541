//! Process-wide cache of merged settings records.
//!
//! Built once per process and handed (by clone) to whoever constructs a
//! [`SettingsRepository`](super::SettingsRepository). Entries expire after a
//! TTL and are invalidated explicitly on every write.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;

use dreamtrade_core::SiteSettings;

/// Default time-to-live for cached settings.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Cache of merged settings keyed by store key.
///
/// Cheaply cloneable; clones share the same entries.
///
/// Every invalidation bumps a generation counter. A reader captures the
/// generation before going to the store and may only populate the cache if no
/// invalidation happened in between, so a read that raced a write can never
/// reinstate the pre-write value.
#[derive(Clone)]
pub struct SettingsCache {
    inner: Arc<SettingsCacheInner>,
}

struct SettingsCacheInner {
    entries: Cache<String, SiteSettings>,
    generation: AtomicU64,
}

impl SettingsCache {
    /// Create a cache whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let entries = Cache::builder().max_capacity(16).time_to_live(ttl).build();

        Self {
            inner: Arc::new(SettingsCacheInner {
                entries,
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Get a cached record.
    pub async fn get(&self, key: &str) -> Option<SiteSettings> {
        self.inner.entries.get(key).await
    }

    /// Current invalidation generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    /// Insert a record read at `generation`.
    ///
    /// Returns `false` (and leaves the cache without the entry) if the cache
    /// was invalidated since `generation` was captured.
    pub async fn insert_if_current(&self, key: &str, settings: SiteSettings, generation: u64) -> bool {
        if self.generation() != generation {
            return false;
        }
        self.inner.entries.insert(key.to_owned(), settings).await;

        // An invalidation may have landed while inserting.
        if self.generation() != generation {
            self.inner.entries.invalidate(key).await;
            return false;
        }
        true
    }

    /// Invalidate a cached record.
    pub async fn invalidate(&self, key: &str) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.entries.invalidate(key).await;
    }
}

impl Default for SettingsCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl std::fmt::Debug for SettingsCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsCache")
            .field("entries", &self.inner.entries.entry_count())
            .field("generation", &self.generation())
            .finish()
    }
}
