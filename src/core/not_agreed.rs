//! Not-agreed resolution - Which active terms a user still has to accept.
//!
//! The database is the source of truth; the cache only saves a couple of queries
//! when deciding whether to prompt a user again. Cache failures are logged and
//! the set is recomputed, so a broken backend never fails a request.
//!
//! Each user has a write generation that [`NotAgreedResolver::invalidate`] bumps.
//! A cache-miss computation only writes back if the generation it started under
//! is still current, so a set computed before an acceptance cannot overwrite the
//! entry refreshed after it.

use crate::{
    cache::{NotAgreedCache, cache_from_settings, not_agreed_cache_key},
    config::terms::TermsSettings,
    core::{acceptance, catalog},
    entities::terms,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

/// Computes the active terms `user_id` has not accepted, ordered by slug.
///
/// An anonymous caller (`None`) has accepted nothing and gets the full active list.
pub async fn compute_not_agreed(
    db: &DatabaseConnection,
    user_id: Option<&str>,
) -> Result<Vec<terms::Model>> {
    let active = catalog::get_active_all(db).await?;
    let Some(user_id) = user_id else {
        return Ok(active);
    };

    let accepted = acceptance::get_accepted_terms_ids(db, user_id).await?;
    Ok(active
        .into_iter()
        .filter(|terms| !accepted.contains(&terms.id))
        .collect())
}

/// Resolves not-agreed sets through an injected cache.
#[derive(Clone)]
pub struct NotAgreedResolver {
    cache: Arc<dyn NotAgreedCache>,
    ttl: Duration,
    // Held across check-and-set so an invalidation cannot slip in between
    generations: Arc<Mutex<HashMap<String, u64>>>,
}

impl NotAgreedResolver {
    /// Creates a resolver over `cache` whose entries live for `ttl`.
    #[must_use]
    pub fn new(cache: Arc<dyn NotAgreedCache>, ttl: Duration) -> Self {
        Self {
            cache,
            ttl,
            generations: Arc::default(),
        }
    }

    /// Creates a resolver with the backend and lifetime described by `settings`.
    #[must_use]
    pub fn from_settings(settings: &TermsSettings) -> Self {
        Self::new(cache_from_settings(settings), settings.cache_ttl())
    }

    /// Lifetime of cached entries.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Computes the not-agreed set straight from the database.
    pub async fn resolve(
        &self,
        db: &DatabaseConnection,
        user_id: Option<&str>,
    ) -> Result<Vec<terms::Model>> {
        compute_not_agreed(db, user_id).await
    }

    /// Returns the cached not-agreed set, computing and caching it on a miss.
    ///
    /// Anonymous callers have no cache key and always get a fresh computation.
    #[instrument(skip(self, db))]
    pub async fn resolve_cached(
        &self,
        db: &DatabaseConnection,
        user_id: Option<&str>,
    ) -> Result<Vec<terms::Model>> {
        let Some(user_id) = user_id else {
            return compute_not_agreed(db, None).await;
        };

        let key = not_agreed_cache_key(user_id);
        let generation = self.generation(user_id).await;
        match self.cache.get(&key).await {
            Ok(Some(cached)) => {
                debug!("Not-agreed cache hit for '{}'", user_id);
                return Ok(cached);
            }
            Ok(None) => debug!("Not-agreed cache miss for '{}'", user_id),
            Err(e) => warn!("Not-agreed cache read failed, recomputing: {}", e),
        }

        let fresh = compute_not_agreed(db, Some(user_id)).await?;
        self.store_if_current(user_id, generation, fresh.clone()).await;
        Ok(fresh)
    }

    /// Drops the cached entry for `user_id` and discards any in-flight
    /// computation that started before this call.
    pub async fn invalidate(&self, user_id: &str) {
        let key = not_agreed_cache_key(user_id);
        let mut generations = self.generations.lock().await;
        *generations.entry(user_id.to_string()).or_default() += 1;
        if let Err(e) = self.cache.delete(&key).await {
            warn!("Failed to invalidate not-agreed cache for '{}': {}", user_id, e);
        }
    }

    /// Recomputes the not-agreed set for `user_id` and writes it through to the cache.
    pub async fn refresh(
        &self,
        db: &DatabaseConnection,
        user_id: &str,
    ) -> Result<Vec<terms::Model>> {
        let fresh = compute_not_agreed(db, Some(user_id)).await?;
        self.store(&not_agreed_cache_key(user_id), fresh.clone()).await;
        Ok(fresh)
    }

    async fn generation(&self, user_id: &str) -> u64 {
        self.generations
            .lock()
            .await
            .get(user_id)
            .copied()
            .unwrap_or_default()
    }

    /// Writes `value` only if no invalidation happened since `generation` was read.
    async fn store_if_current(
        &self,
        user_id: &str,
        generation: u64,
        value: Vec<terms::Model>,
    ) -> bool {
        let generations = self.generations.lock().await;
        if generations.get(user_id).copied().unwrap_or_default() != generation {
            debug!("Discarding outdated not-agreed set for '{}'", user_id);
            return false;
        }
        self.store(&not_agreed_cache_key(user_id), value).await;
        true
    }

    async fn store(&self, key: &str, value: Vec<terms::Model>) {
        if let Err(e) = self.cache.set(key, value, self.ttl).await {
            warn!("Failed to cache not-agreed terms under '{}': {}", key, e);
        }
    }
}
