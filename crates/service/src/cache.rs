//! Response cache for rendered feed pages.
//!
//! Maps a canonical request key to the JSON payload that was sent for it.
//! Entries expire after a fixed TTL and every write operation calls
//! [`FeedCache::invalidate_all`], so readers never wait longer than one write
//! to see fresh content. A TTL of zero disables caching.

use std::future::Future;
use std::time::Duration;

use configs::CacheConfig;
use moka::future::Cache;
use tracing::debug;

use crate::observability::{FEED_CACHE_HITS_TOTAL, FEED_CACHE_MISSES_TOTAL};

#[derive(Clone)]
pub struct FeedCache {
    inner: Cache<String, String>,
    enabled: bool,
}

impl FeedCache {
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let enabled = !ttl.is_zero();
        let ttl = if enabled { ttl } else { Duration::from_secs(1) };
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();
        Self { inner, enabled }
    }

    pub fn from_config(cfg: &CacheConfig) -> Self {
        Self::new(Duration::from_secs(cfg.ttl_secs), cfg.max_capacity)
    }

    /// Canonical key of a feed request: the feed name plus the trimmed page text.
    pub fn key(feed: &str, page: Option<&str>) -> String {
        match page.map(str::trim) {
            Some(p) if !p.is_empty() => format!("{feed}?page={p}"),
            _ => feed.to_string(),
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let hit = self.inner.get(key).await;
        if hit.is_some() {
            FEED_CACHE_HITS_TOTAL.inc();
        } else {
            FEED_CACHE_MISSES_TOTAL.inc();
        }
        debug!(%key, hit = hit.is_some(), "feed_cache_lookup");
        hit
    }

    pub async fn insert(&self, key: String, payload: String) {
        if self.enabled {
            self.inner.insert(key, payload).await;
        }
    }

    /// Cached payload for `key`, or render, store and return a fresh one.
    pub async fn get_or_render<F, Fut, E>(&self, key: String, render: F) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        if let Some(hit) = self.get(&key).await {
            return Ok(hit);
        }
        let payload = render().await?;
        self.insert(key, payload.clone()).await;
        Ok(payload)
    }

    pub async fn invalidate(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
        debug!("feed_cache_invalidated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_ignores_blank_page() {
        assert_eq!(FeedCache::key("index", None), "index");
        assert_eq!(FeedCache::key("index", Some("  ")), "index");
        assert_eq!(FeedCache::key("index", Some(" 2")), "index?page=2");
    }

    #[tokio::test]
    async fn serves_stored_payload_until_invalidated() {
        let cache = FeedCache::new(Duration::from_secs(60), 10);
        let key = FeedCache::key("index", None);
        let first: Result<String, ()> = cache.get_or_render(key.clone(), || async { Ok("v1".to_string()) }).await;
        assert_eq!(first, Ok("v1".to_string()));

        let stale: Result<String, ()> = cache.get_or_render(key.clone(), || async { Ok("v2".to_string()) }).await;
        assert_eq!(stale, Ok("v1".to_string()));

        cache.invalidate_all();
        let fresh: Result<String, ()> = cache.get_or_render(key, || async { Ok("v3".to_string()) }).await;
        assert_eq!(fresh, Ok("v3".to_string()));
    }

    #[tokio::test]
    async fn single_key_invalidation() {
        let cache = FeedCache::new(Duration::from_secs(60), 10);
        cache.insert("a".into(), "1".into()).await;
        cache.insert("b".into(), "2".into()).await;
        cache.invalidate("a").await;
        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.get("b").await.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = FeedCache::new(Duration::from_millis(50), 10);
        cache.insert("k".into(), "v".into()).await;
        assert!(cache.get("k").await.is_some());
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn render_errors_are_not_cached() {
        let cache = FeedCache::new(Duration::from_secs(60), 10);
        let failed: Result<String, &str> = cache.get_or_render("k".into(), || async { Err("boom") }).await;
        assert_eq!(failed, Err("boom"));
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn zero_ttl_disables_cache() {
        let cache = FeedCache::new(Duration::ZERO, 10);
        cache.insert("k".into(), "v".into()).await;
        assert!(cache.get("k").await.is_none());
    }
}
