//! In-process TTL caches
//!
//! `PublicCache` holds rendered JSON for the read-mostly public viewer routes.
//! `ScanDeduper` remembers which visitor scanned which slug recently so that
//! reloads inside the window do not inflate `scan_count`.

use moka::future::Cache;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Public routes whose responses are cached per slug
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicRoute {
    Experience,
    Products,
    Tutorials,
}

impl PublicRoute {
    pub const ALL: [PublicRoute; 3] = [
        PublicRoute::Experience,
        PublicRoute::Products,
        PublicRoute::Tutorials,
    ];

    fn prefix(self) -> &'static str {
        match self {
            PublicRoute::Experience => "experience",
            PublicRoute::Products => "products",
            PublicRoute::Tutorials => "tutorials",
        }
    }

    /// Cache key of this route for `slug`
    pub fn key(self, slug: &str) -> String {
        format!("{}:{}", self.prefix(), slug)
    }
}

/// Cache of public route payloads keyed by `route:slug`
#[derive(Debug, Clone)]
pub struct PublicCache {
    inner: Cache<String, Arc<Value>>,
}

impl PublicCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, route: PublicRoute, slug: &str) -> Option<Arc<Value>> {
        self.inner.get(&route.key(slug)).await
    }

    pub async fn insert(&self, route: PublicRoute, slug: &str, value: Value) -> Arc<Value> {
        let value = Arc::new(value);
        self.inner.insert(route.key(slug), value.clone()).await;
        value
    }

    /// Drop every cached route of `slug`, returning the keys invalidated
    pub async fn purge_slug(&self, slug: &str) -> Vec<String> {
        let mut keys = Vec::with_capacity(PublicRoute::ALL.len());
        for route in PublicRoute::ALL {
            let key = route.key(slug);
            self.inner.invalidate(&key).await;
            keys.push(key);
        }
        keys
    }
}

/// Recent (slug, visitor) pairs; an entry lives for the dedup window
#[derive(Debug, Clone)]
pub struct ScanDeduper {
    seen: Cache<String, ()>,
}

impl ScanDeduper {
    pub fn new(max_capacity: u64, window: Duration) -> Self {
        Self {
            seen: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(window)
                .build(),
        }
    }

    /// Record a scan, returning true when it should be counted
    ///
    /// The first scan of a visitor opens the window; later scans inside it do
    /// not extend it.
    pub async fn should_count(&self, slug: &str, visitor: &str) -> bool {
        self.seen.entry(dedup_key(slug, visitor)).or_insert(()).await.is_fresh()
    }

    /// Drop a visitor's window so their next scan counts again
    pub async fn forget(&self, slug: &str, visitor: &str) {
        self.seen.invalidate(&dedup_key(slug, visitor)).await;
    }
}

fn dedup_key(slug: &str, visitor: &str) -> String {
    format!("{}|{}", slug, visitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_purge_removes_all_routes_of_slug() {
        let cache = PublicCache::new(100, Duration::from_secs(60));
        for route in PublicRoute::ALL {
            cache.insert(route, "glow", json!({"route": route.key("glow")})).await;
        }
        cache.insert(PublicRoute::Experience, "other", json!(1)).await;

        let keys = cache.purge_slug("glow").await;
        assert_eq!(
            keys,
            vec!["experience:glow", "products:glow", "tutorials:glow"]
        );
        for route in PublicRoute::ALL {
            assert!(cache.get(route, "glow").await.is_none());
        }
        assert!(cache.get(PublicRoute::Experience, "other").await.is_some());
    }

    #[tokio::test]
    async fn test_cache_expires_after_ttl() {
        let cache = PublicCache::new(100, Duration::from_millis(50));
        cache.insert(PublicRoute::Products, "glow", json!([])).await;
        assert!(cache.get(PublicRoute::Products, "glow").await.is_some());
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(cache.get(PublicRoute::Products, "glow").await.is_none());
    }

    #[tokio::test]
    async fn test_repeat_scan_within_window_not_counted() {
        let dedup = ScanDeduper::new(100, Duration::from_secs(60));
        assert!(dedup.should_count("glow", "visitor-1").await);
        assert!(!dedup.should_count("glow", "visitor-1").await);
        assert!(dedup.should_count("glow", "visitor-2").await);
        assert!(dedup.should_count("other", "visitor-1").await);
    }

    #[tokio::test]
    async fn test_forgotten_visitor_counts_again() {
        let dedup = ScanDeduper::new(100, Duration::from_secs(60));
        assert!(dedup.should_count("glow", "v").await);
        dedup.forget("glow", "v").await;
        assert!(dedup.should_count("glow", "v").await);
        assert!(!dedup.should_count("glow", "v").await);
    }

    #[tokio::test]
    async fn test_scan_counted_again_after_window() {
        let dedup = ScanDeduper::new(100, Duration::from_millis(50));
        assert!(dedup.should_count("glow", "v").await);
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(dedup.should_count("glow", "v").await);
    }
}
