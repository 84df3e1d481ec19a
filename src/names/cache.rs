//! Caller-owned name cache with expiry.
//!
//! The cache is an ordinary value: whoever creates it decides how long it lives and
//! when expired entries are purged. Resolvers only borrow it through a shared handle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::names::resolver::{NameMap, NameResolver, ResolveError};

/// 21 days.
pub const DEFAULT_NAME_CACHE_TTL_SECS: i64 = 21 * 24 * 60 * 60;

#[derive(Debug, Clone)]
struct CacheEntry {
    names: NameMap,
    stored_at: DateTime<Utc>,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.stored_at > self.ttl
    }
}

#[derive(Debug, Clone)]
pub struct NameCache {
    entries: HashMap<String, CacheEntry>,
    default_ttl: Duration,
}

impl Default for NameCache {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_NAME_CACHE_TTL_SECS))
    }
}

impl NameCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            default_ttl,
        }
    }

    pub fn insert(&mut self, key: &str, names: NameMap) {
        self.insert_at(key, names, Utc::now());
    }

    pub fn insert_at(&mut self, key: &str, names: NameMap, now: DateTime<Utc>) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                names,
                stored_at: now,
                ttl: self.default_ttl,
            },
        );
    }

    /// Returns the cached names, evicting the entry if it has expired.
    pub fn get(&mut self, key: &str) -> Option<NameMap> {
        self.get_at(key, Utc::now())
    }

    pub fn get_at(&mut self, key: &str, now: DateTime<Utc>) -> Option<NameMap> {
        let expired = self.entries.get(key)?.is_expired(now);
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|entry| entry.names.clone())
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drops every expired entry; returns how many were removed.
    pub fn cleanup(&mut self) -> usize {
        self.cleanup_at(Utc::now())
    }

    pub fn cleanup_at(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Wraps a resolver with a cache the caller owns.
pub struct CachedNameResolver<R> {
    inner: R,
    cache: Arc<Mutex<NameCache>>,
    key: String,
}

impl<R: NameResolver> CachedNameResolver<R> {
    pub fn new(inner: R, cache: Arc<Mutex<NameCache>>, key: impl Into<String>) -> Self {
        Self {
            inner,
            cache,
            key: key.into(),
        }
    }

    fn cached_covering(&self, ids: &[u32]) -> Option<NameMap> {
        let mut cache = self.cache.lock().ok()?;
        let names = cache.get(&self.key)?;
        ids.iter()
            .all(|id| names.contains_key(id))
            .then_some(names)
    }

    fn store(&self, fresh: &NameMap) {
        let Ok(mut cache) = self.cache.lock() else {
            tracing::warn!("name cache lock poisoned; result not cached");
            return;
        };
        let mut merged = cache.get(&self.key).unwrap_or_default();
        merged.extend(fresh.iter().map(|(id, name)| (*id, name.clone())));
        cache.insert(&self.key, merged);
    }
}

impl<R: NameResolver> NameResolver for CachedNameResolver<R> {
    fn resolve<'a>(&'a self, ids: &'a [u32]) -> BoxFuture<'a, Result<NameMap, ResolveError>> {
        async move {
            if let Some(names) = self.cached_covering(ids) {
                tracing::debug!(key = %self.key, "name cache hit");
                return Ok(names);
            }
            let fresh = self.inner.resolve(ids).await?;
            self.store(&fresh);
            Ok::<NameMap, ResolveError>(fresh)
        }
        .boxed()
    }
}
