//! Run-scoped memoizing cache

use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// Maps a string key to a resolved value
///
/// A stored value may itself encode a miss (e.g. `Option::None`), which is
/// distinct from a key that was never resolved. Concurrent resolutions of
/// the same key run the computation once; later callers await its result.
/// A computation must not resolve its own key.
pub struct ResolutionCache<V> {
    entries: Mutex<HashMap<String, Arc<OnceCell<V>>>>,
}

impl<V> Default for ResolutionCache<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V: Clone + Send + Sync> ResolutionCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, key: &str) -> Arc<OnceCell<V>> {
        self.entries
            .lock()
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    /// Cached value for `key`, computing and storing it on first use
    pub async fn resolve<F, Fut>(&self, key: &str, compute: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let cell = self.cell(key);
        if let Some(value) = cell.get() {
            debug!("Cache hit for {}", key);
            return value.clone();
        }
        cell.get_or_init(compute).await.clone()
    }

    /// Like `resolve`, but only successful results are stored
    pub async fn try_resolve<F, Fut, E>(&self, key: &str, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let cell = self.cell(key);
        if let Some(value) = cell.get() {
            debug!("Cache hit for {}", key);
            return Ok(value.clone());
        }
        cell.get_or_try_init(compute).await.cloned()
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries
            .lock()
            .get(key)
            .is_some_and(|cell| cell.initialized())
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.entries
            .lock()
            .get(key)
            .and_then(|cell| cell.get().cloned())
    }

    /// Store `value`, replacing whatever was cached
    pub fn put(&self, key: &str, value: V) {
        self.entries
            .lock()
            .insert(key.to_string(), Arc::new(OnceCell::new_with(Some(value))));
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of resolved keys
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_resolve_computes_once() {
        let cache = ResolutionCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .resolve("a", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    7
                })
                .await;
            assert_eq!(value, 7);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_miss_is_memoized() {
        let cache: ResolutionCache<Option<i64>> = ResolutionCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value = cache
                .resolve("missing", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    None
                })
                .await;
            assert!(value.is_none());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.has("missing"));
        assert_eq!(cache.get("missing"), Some(None));
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache: ResolutionCache<i64> = ResolutionCache::new();

        let failed: Result<i64, &str> = cache.try_resolve("k", || async { Err("down") }).await;
        assert!(failed.is_err());
        assert!(!cache.has("k"));
        assert_eq!(cache.len(), 0);

        let ok: Result<i64, &str> = cache.try_resolve("k", || async { Ok(3) }).await;
        assert_eq!(ok, Ok(3));
        assert!(cache.has("k"));
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let cache: ResolutionCache<Option<&str>> = ResolutionCache::new();
        cache.resolve("k", || async { None }).await;

        cache.put("k", Some("found"));

        let value = cache.resolve("k", || async { Some("recomputed") }).await;
        assert_eq!(value, Some("found"));
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = ResolutionCache::new();
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.len(), 2);

        cache.clear();

        assert!(cache.is_empty());
        assert!(cache.get("a").is_none());
    }

    #[tokio::test]
    async fn test_concurrent_resolution_is_single_flight() {
        let cache = Arc::new(ResolutionCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .resolve("shared", || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                        42
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
