//! Not-agreed cache backends.
//!
//! The resolver only ever talks to [`NotAgreedCache`]; entries are advisory and
//! always reconstructable from the database, so backends may drop or expire
//! them freely. A backend that cannot serve a request returns
//! [`Error::CacheUnavailable`] and the caller falls back to the database.

use crate::config::terms::TermsSettings;
use crate::entities::terms;
use crate::errors::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::trace;

const NOT_AGREED_KEY_PREFIX: &str = "tandc.not_agreed_terms_";

/// Cache key for a user's not-agreed set.
#[must_use]
pub fn not_agreed_cache_key(user_id: &str) -> String {
    format!("{NOT_AGREED_KEY_PREFIX}{user_id}")
}

/// Storage for per-user not-agreed sets.
#[async_trait]
pub trait NotAgreedCache: Send + Sync {
    /// Returns the cached value, or `None` on a miss or an expired entry.
    async fn get(&self, key: &str) -> Result<Option<Vec<terms::Model>>>;

    /// Stores `value` under `key` for `ttl`, replacing any previous entry.
    async fn set(&self, key: &str, value: Vec<terms::Model>, ttl: Duration) -> Result<()>;

    /// Removes the entry for `key` if present.
    async fn delete(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<terms::Model>,
    expires_at: Instant,
}

/// In-process cache with per-entry expiry.
///
/// Expired entries are skipped on read and swept on the next write.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    /// Whether no live entries remain.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl NotAgreedCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<terms::Model>>> {
        let entries = self.entries.read().await;
        let hit = entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone());
        trace!("Cache lookup for '{}': hit = {}", key, hit.is_some());
        Ok(hit)
    }

    async fn set(&self, key: &str, value: Vec<terms::Model>, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        let expires_at = now.checked_add(ttl).ok_or_else(|| Error::CacheUnavailable {
            message: format!("TTL of {ttl:?} overflows the clock"),
        })?;
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(key.to_string(), CacheEntry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// Backend that never stores anything; every lookup is a miss.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCache;

#[async_trait]
impl NotAgreedCache for DisabledCache {
    async fn get(&self, _key: &str) -> Result<Option<Vec<terms::Model>>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Vec<terms::Model>, _ttl: Duration) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}

/// Picks a backend for the given settings: a zero lifetime disables caching.
#[must_use]
pub fn cache_from_settings(settings: &TermsSettings) -> Arc<dyn NotAgreedCache> {
    if settings.cache_seconds == 0 {
        Arc::new(DisabledCache)
    } else {
        Arc::new(MemoryCache::new())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{date, terms_model};

    #[test]
    fn test_cache_key_is_derived_from_user() {
        assert_eq!(not_agreed_cache_key("alice"), "tandc.not_agreed_terms_alice");
        assert_ne!(not_agreed_cache_key("alice"), not_agreed_cache_key("bob"));
    }

    #[tokio::test]
    async fn test_memory_cache_set_get_delete() -> Result<()> {
        let cache = MemoryCache::new();
        let value = vec![terms_model(1, "site-terms", 1.0, Some(date(2020, 1, 1)))];

        assert!(cache.get("k").await?.is_none());

        cache.set("k", value.clone(), Duration::from_secs(30)).await?;
        assert_eq!(cache.get("k").await?, Some(value));
        assert_eq!(cache.len().await, 1);

        cache.delete("k").await?;
        assert!(cache.get("k").await?.is_none());
        assert!(cache.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_memory_cache_expired_entry_is_a_miss() -> Result<()> {
        let cache = MemoryCache::new();
        cache
            .set("k", vec![terms_model(1, "a", 1.0, None)], Duration::ZERO)
            .await?;
        assert!(cache.get("k").await?.is_none());
        assert!(cache.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_memory_cache_set_replaces_previous_value() -> Result<()> {
        let cache = MemoryCache::new();
        let ttl = Duration::from_secs(30);
        cache.set("k", vec![terms_model(1, "a", 1.0, None)], ttl).await?;
        cache.set("k", Vec::new(), ttl).await?;
        assert_eq!(cache.get("k").await?, Some(Vec::new()));
        Ok(())
    }

    #[tokio::test]
    async fn test_disabled_cache_never_hits() -> Result<()> {
        let cache = DisabledCache;
        cache
            .set("k", vec![terms_model(1, "a", 1.0, None)], Duration::from_secs(30))
            .await?;
        assert!(cache.get("k").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_cache_from_settings_zero_disables() -> Result<()> {
        let settings = TermsSettings {
            cache_seconds: 0,
            ..TermsSettings::default()
        };
        let cache = cache_from_settings(&settings);
        cache
            .set("k", Vec::new(), settings.cache_ttl())
            .await?;
        assert!(cache.get("k").await?.is_none());

        let cache = cache_from_settings(&TermsSettings::default());
        cache.set("k", Vec::new(), Duration::from_secs(30)).await?;
        assert_eq!(cache.get("k").await?, Some(Vec::new()));
        Ok(())
    }
}
