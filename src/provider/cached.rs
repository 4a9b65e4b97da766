//! LRU caching wrapper for score providers.

use std::num::NonZeroUsize;

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::RwLock;

use super::ScoreProvider;
use crate::types::ScoreTriple;

/// Default number of cached identifiers.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Caching wrapper over any score provider.
///
/// Caches both hits and misses so a topology that repeats identifiers
/// queries the backing provider once per identifier.
#[derive(Debug)]
pub struct CachedScoreProvider<P> {
    inner: P,
    cache: RwLock<LruCache<String, Option<ScoreTriple>>>,
}

impl<P> CachedScoreProvider<P> {
    /// Wrap a provider with a cache of the given capacity.
    ///
    /// A zero capacity falls back to [`DEFAULT_CACHE_CAPACITY`].
    pub fn new(inner: P, capacity: usize) -> Self {
        let size =
            NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap());
        Self {
            inner,
            cache: RwLock::new(LruCache::new(size)),
        }
    }

    /// Number of identifiers currently cached.
    pub fn cached_len(&self) -> usize {
        self.cache.read().len()
    }
}

#[async_trait]
impl<P: ScoreProvider> ScoreProvider for CachedScoreProvider<P> {
    type Error = P::Error;

    async fn score(&self, vuln_id: &str) -> Result<Option<ScoreTriple>, Self::Error> {
        if let Some(cached) = self.cache.write().get(vuln_id) {
            return Ok(*cached);
        }
        let fetched = self.inner.score(vuln_id).await?;
        self.cache.write().put(vuln_id.to_string(), fetched);
        Ok(fetched)
    }
}
