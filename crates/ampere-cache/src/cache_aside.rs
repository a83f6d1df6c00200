//! Typed cache-aside helpers layered over [`CacheStore`].

use crate::cache_store::CacheStore;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// TTL for rapidly changing data (5 minutes).
pub const SHORT_TTL: Duration = Duration::from_secs(300);

/// Default TTL for cached items (30 minutes).
pub const MEDIUM_TTL: Duration = Duration::from_secs(1800);

/// TTL for slow-moving data (1 hour).
pub const LONG_TTL: Duration = Duration::from_secs(3600);

/// TTL for near-static data (24 hours).
pub const VERY_LONG_TTL: Duration = Duration::from_secs(86_400);

/// Extension trait with typed methods over the raw JSON store.
///
/// Blanket-implemented for every [`CacheStore`], including trait objects.
#[async_trait]
pub trait CacheExt: CacheStore {
    /// Get a typed value from the cache.
    ///
    /// A cached payload that no longer deserializes into `T` is treated as a
    /// miss, so schema changes age out of the cache instead of breaking
    /// callers.
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Option<T> {
        let json = self.get_raw(key).await?;
        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding undeserializable cache entry '{}': {}", key, e);
                None
            }
        }
    }

    /// Set a typed value in the cache.
    ///
    /// Serialization failure skips the write and returns `false`.
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> bool {
        match serde_json::to_string(value) {
            Ok(json) => self.set_raw(key, &json, ttl).await,
            Err(e) => {
                warn!("Skipping cache write for key '{}': {}", key, e);
                false
            }
        }
    }

    /// Get a value, or compute and cache it on a miss.
    ///
    /// The fetch function's error type flows through untouched; this layer
    /// adds no failure modes of its own. Cache write failures are ignored
    /// (the freshly fetched value is still returned).
    ///
    /// A fetch result that serializes to JSON `null` (e.g. an `Option::None`
    /// lookup miss) is returned but never written, so absent data is
    /// re-fetched on every call instead of being negatively cached until the
    /// TTL runs out.
    ///
    /// Concurrent misses on the same key are not coalesced: each caller runs
    /// its own fetch and the last write wins. Callers needing at most one
    /// recompute per key must provide their own single-flight discipline.
    async fn get_or_fetch<T, E, F, Fut>(&self, key: &str, ttl: Duration, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        E: Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
    {
        if let Some(cached) = self.get::<T>(key).await {
            return Ok(cached);
        }

        let value = fetch().await?;

        match serde_json::to_string(&value) {
            Ok(json) if json == "null" => {
                debug!("Skipping cache write of null result for key '{}'", key);
            }
            Ok(json) => {
                let _ = self.set_raw(key, &json, Some(ttl)).await;
            }
            Err(e) => {
                warn!("Skipping cache write for key '{}': {}", key, e);
            }
        }

        Ok(value)
    }

    /// [`get_or_fetch`](CacheExt::get_or_fetch) with the default TTL
    /// ([`MEDIUM_TTL`]).
    async fn get_or_fetch_default<T, E, F, Fut>(&self, key: &str, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        E: Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
    {
        self.get_or_fetch(key, MEDIUM_TTL, fetch).await
    }
}

// Blanket implementation for all CacheStore implementations
impl<T: CacheStore + ?Sized> CacheExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryCacheStore, RedisCacheStore};
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Product {
        name: String,
    }

    fn widget() -> Product {
        Product {
            name: "Widget".to_string(),
        }
    }

    #[tokio::test]
    async fn test_typed_round_trip() {
        let store = MemoryCacheStore::new();
        assert!(store.set("product:123", &widget(), Some(MEDIUM_TTL)).await);
        assert_eq!(store.get::<Product>("product:123").await, Some(widget()));
    }

    #[tokio::test]
    async fn test_undeserializable_entry_is_a_miss() {
        let store = MemoryCacheStore::new();
        store.set_raw("product:123", "not json", Some(MEDIUM_TTL)).await;
        assert_eq!(store.get::<Product>("product:123").await, None);
    }

    #[tokio::test]
    async fn test_get_or_fetch_fetches_once() {
        let store = MemoryCacheStore::new();
        let calls = AtomicUsize::new(0);

        let first: Result<Product, ()> = store
            .get_or_fetch("product:123", MEDIUM_TTL, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(widget())
            })
            .await;
        assert_eq!(first, Ok(widget()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.len(), 1);

        let second: Result<Product, ()> = store
            .get_or_fetch("product:123", MEDIUM_TTL, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(widget())
            })
            .await;
        assert_eq!(second, Ok(widget()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_or_fetch_with_disconnected_store_always_fetches() {
        let store = RedisCacheStore::disconnected();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let result: Result<Product, ()> = store
                .get_or_fetch("product:123", MEDIUM_TTL, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(widget())
                })
                .await;
            assert_eq!(result, Ok(widget()));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_null_fetch_result_is_not_cached() {
        let store = MemoryCacheStore::new();
        let calls = AtomicUsize::new(0);

        // A lookup miss (None) must be re-fetched every time, not served
        // from the cache until the TTL runs out.
        for _ in 0..2 {
            let result: Result<Option<Product>, ()> = store
                .get_or_fetch("product:missing", MEDIUM_TTL, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(None)
                })
                .await;
            assert_eq!(result, Ok(None));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_error_propagates_and_writes_nothing() {
        let store = MemoryCacheStore::new();

        let result: Result<Product, &str> = store
            .get_or_fetch("product:123", MEDIUM_TTL, || async { Err("db down") })
            .await;
        assert_eq!(result, Err("db down"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_works_through_trait_object() {
        let store: Box<dyn CacheStore> = Box::new(MemoryCacheStore::new());

        let result: Result<Product, ()> = store
            .get_or_fetch_default("homepage:data", || async { Ok(widget()) })
            .await;
        assert_eq!(result, Ok(widget()));
        assert_eq!(store.get::<Product>("homepage:data").await, Some(widget()));
    }

    #[tokio::test]
    async fn test_hit_causes_no_store_write() {
        let mut store = crate::cache_store::MockCacheStore::new();
        store
            .expect_get_raw()
            .returning(|_| Some(r#"{"name":"Widget"}"#.to_string()));
        store.expect_set_raw().times(0);

        let result: Result<Product, ()> = store
            .get_or_fetch("product:123", MEDIUM_TTL, || async { Ok(widget()) })
            .await;
        assert_eq!(result, Ok(widget()));
    }

    #[tokio::test]
    async fn test_miss_causes_exactly_one_store_write() {
        let mut store = crate::cache_store::MockCacheStore::new();
        store.expect_get_raw().returning(|_| None);
        store
            .expect_set_raw()
            .times(1)
            .returning(|_, _, _| true);

        let result: Result<Product, ()> = store
            .get_or_fetch("product:123", MEDIUM_TTL, || async { Ok(widget()) })
            .await;
        assert_eq!(result, Ok(widget()));
    }

    #[tokio::test]
    async fn test_cache_write_failure_is_invisible_to_caller() {
        let mut store = crate::cache_store::MockCacheStore::new();
        store.expect_get_raw().returning(|_| None);
        store.expect_set_raw().returning(|_, _, _| false);

        let result: Result<Product, ()> = store
            .get_or_fetch("product:123", MEDIUM_TTL, || async { Ok(widget()) })
            .await;
        assert_eq!(result, Ok(widget()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_triggers_refetch() {
        let store = MemoryCacheStore::new();
        let calls = AtomicUsize::new(0);

        let fetch = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ()>(widget())
        };

        let _ = store.get_or_fetch("product:123", SHORT_TTL, fetch).await;
        tokio::time::advance(SHORT_TTL + Duration::from_secs(1)).await;
        let _ = store.get_or_fetch("product:123", SHORT_TTL, fetch).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
