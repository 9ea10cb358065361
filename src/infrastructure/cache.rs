use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Cache entry with TTL
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub inserted_at: Instant,
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V, ttl: Duration, now: Instant) -> Self {
        Self {
            value,
            inserted_at: now,
            ttl,
        }
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) >= self.ttl
    }
}

/// Flat key/value cache with a fixed TTL. Capacity is bounded by LRU eviction.
pub struct TtlCache<K, V> {
    inner: LruCache<K, CacheEntry<V>>,
    ttl: Duration,
}

impl<K: Hash + Eq, V: Clone> TtlCache<K, V> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        TtlCache {
            inner: LruCache::new(capacity),
            ttl,
        }
    }

    pub fn get(&mut self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at(&mut self, key: &K, now: Instant) -> Option<V> {
        let expired = self.inner.peek(key)?.is_expired_at(now);
        if expired {
            self.inner.pop(key);
            return None;
        }
        self.inner.get(key).map(|entry| entry.value.clone())
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    pub fn insert_at(&mut self, key: K, value: V, now: Instant) {
        self.inner.put(key, CacheEntry::new(value, self.ttl, now));
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.inner.pop(key).map(|entry| entry.value)
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Counts entries still held, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn purge_expired(&mut self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub fn purge_expired_at(&mut self, now: Instant) -> usize {
        let before = self.inner.len();
        let mut kept = LruCache::new(self.inner.cap());
        // Oldest first, so recency order survives the rebuild.
        while let Some((key, entry)) = self.inner.pop_lru() {
            if !entry.is_expired_at(now) {
                kept.put(key, entry);
            }
        }
        self.inner = kept;
        before - self.inner.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageCacheKey {
    pub page_id: String,
    pub include_posts: bool,
    pub include_employees: bool,
}

impl PageCacheKey {
    pub fn new(page_id: &str, include_posts: bool, include_employees: bool) -> Self {
        Self {
            page_id: page_id.to_string(),
            include_posts,
            include_employees,
        }
    }

    fn variants(page_id: &str) -> [PageCacheKey; 4] {
        [
            Self::new(page_id, false, false),
            Self::new(page_id, true, false),
            Self::new(page_id, false, true),
            Self::new(page_id, true, true),
        ]
    }
}

/// Shared cache of rendered single-page responses.
#[derive(Clone)]
pub struct PageCache {
    inner: Arc<Mutex<TtlCache<PageCacheKey, serde_json::Value>>>,
}

impl PageCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TtlCache::new(capacity, ttl))),
        }
    }

    pub async fn get(&self, key: &PageCacheKey) -> Option<serde_json::Value> {
        let hit = self.inner.lock().await.get(key);
        debug!(page_id = %key.page_id, hit = hit.is_some(), "page cache lookup");
        hit
    }

    pub async fn set(&self, key: PageCacheKey, value: serde_json::Value) {
        self.inner.lock().await.insert(key, value);
    }

    /// Drops every cached variant of one page.
    pub async fn invalidate_page(&self, page_id: &str) {
        let mut cache = self.inner.lock().await;
        for key in PageCacheKey::variants(page_id) {
            cache.remove(&key);
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Start the background worker that drops expired entries
    pub fn start_cleanup_worker(&self, every: Duration) {
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let purged = inner.lock().await.purge_expired();
                if purged > 0 {
                    debug!(purged, "purged expired page cache entries");
                }
            }
        });
    }
}
