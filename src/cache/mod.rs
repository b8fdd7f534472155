//! Caching of discovered content items
//!
//! Every item returned by a search is kept for a limited time, keyed by its
//! content fingerprint, so follow-up requests can refer to it by id.

use crate::providers::ContentItem;
use moka::future::Cache;
use std::time::Duration;

/// Time-bounded cache of content items keyed by item id
#[derive(Clone)]
pub struct ItemCache {
    cache: Cache<String, ContentItem>,
}

impl ItemCache {
    /// Create a new item cache with specified TTL
    pub fn new(ttl_seconds: u64, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        Self { cache }
    }

    /// Get a cached item
    pub async fn get(&self, id: &str) -> Option<ContentItem> {
        self.cache.get(id).await
    }

    /// Store an item under its id
    pub async fn insert(&self, item: ContentItem) {
        self.cache.insert(item.id.clone(), item).await;
    }

    /// Store every item of a search result
    pub async fn insert_all(&self, items: &[ContentItem]) {
        for item in items {
            self.insert(item.clone()).await;
        }
    }

    /// Approximate number of cached items
    pub fn size(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for ItemCache {
    fn default() -> Self {
        Self::new(600, 10000)
    }
}
