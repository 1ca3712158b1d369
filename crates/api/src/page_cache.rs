//! Time-bounded cache for rendered index pages.
//!
//! Entries are keyed by page number and served unchanged until they are
//! older than the configured window. New posts therefore show up on the
//! index only once the cached page expires.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::RwLock;

/// Upper bound on stored pages.
const MAX_ENTRIES: usize = 1024;

/// A cached rendered page.
#[derive(Debug, Clone)]
struct CachedPage {
    document: Value,
    stored_at: Instant,
}

/// Cache of rendered index pages.
#[derive(Clone)]
pub struct PageCache {
    entries: Arc<RwLock<HashMap<u64, CachedPage>>>,
    ttl: Duration,
}

impl PageCache {
    /// Create a cache whose entries live for `ttl_secs`. Zero disables it.
    #[must_use]
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    /// Get a fresh cached page.
    pub async fn get(&self, number: u64) -> Option<Value> {
        let entries = self.entries.read().await;
        entries
            .get(&number)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.document.clone())
    }

    /// Store a rendered page.
    ///
    /// A full cache first drops its expired entries. If it is still full the
    /// page is not stored.
    pub async fn insert(&self, number: u64, document: Value) {
        if self.ttl.is_zero() {
            return;
        }

        let ttl = self.ttl;
        let mut entries = self.entries.write().await;
        if entries.len() >= MAX_ENTRIES {
            entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
            if entries.len() >= MAX_ENTRIES && !entries.contains_key(&number) {
                tracing::debug!(entries = entries.len(), "Index cache full");
                return;
            }
        }
        entries.insert(
            number,
            CachedPage {
                document,
                stored_at: Instant::now(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_hit_within_window() {
        let cache = PageCache::new(60);
        cache.insert(1, json!({"n": 1})).await;

        assert_eq!(cache.get(1).await, Some(json!({"n": 1})));
        assert_eq!(cache.get(2).await, None);
    }

    #[tokio::test]
    async fn test_zero_ttl_never_stores() {
        let cache = PageCache::new(0);
        cache.insert(1, json!({})).await;

        assert!(cache.get(1).await.is_none());
        assert!(cache.entries.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_expired_entries_are_misses() {
        let cache = PageCache {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::from_millis(10),
        };
        cache.insert(1, json!({})).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(cache.get(1).await.is_none());
    }

    #[tokio::test]
    async fn test_full_cache_skips_new_pages() {
        let cache = PageCache::new(60);
        for n in 1..=MAX_ENTRIES as u64 {
            cache.insert(n, json!({})).await;
        }

        let extra = MAX_ENTRIES as u64 + 1;
        cache.insert(extra, json!({})).await;
        assert!(cache.get(extra).await.is_none());
        assert_eq!(cache.entries.read().await.len(), MAX_ENTRIES);

        cache.insert(1, json!({"n": 2})).await;
        assert_eq!(cache.get(1).await, Some(json!({"n": 2})));
    }

    #[tokio::test]
    async fn test_full_cache_evicts_expired_pages() {
        let cache = PageCache {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::from_millis(10),
        };
        for n in 1..=MAX_ENTRIES as u64 {
            cache.insert(n, json!({})).await;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;

        let extra = MAX_ENTRIES as u64 + 1;
        cache.insert(extra, json!({"n": 3})).await;
        assert_eq!(cache.get(extra).await, Some(json!({"n": 3})));
        assert_eq!(cache.entries.read().await.len(), 1);
    }
}
