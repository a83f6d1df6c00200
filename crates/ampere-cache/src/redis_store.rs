//! Redis-backed cache store.

use crate::cache_store::{is_valid_key, is_valid_pattern, CacheHealth, CacheStore};
use ampere_config::RedisConfig;
use async_trait::async_trait;
use deadpool_redis::redis::AsyncCommands;
use deadpool_redis::{Pool, Runtime};
use shaku::Component;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Redis-backed [`CacheStore`].
///
/// Connection failures are absorbed at construction time: a store built from
/// an unreachable or misconfigured Redis behaves exactly like one built with
/// [`disconnected`](RedisCacheStore::disconnected), and every operation
/// reports cache-absent results. The application keeps running without
/// caching.
#[derive(Component)]
#[shaku(interface = CacheStore)]
pub struct RedisCacheStore {
    /// Redis connection pool; `None` means caching is disabled.
    pool: Option<Arc<Pool>>,
}

impl RedisCacheStore {
    /// Connects to Redis using the supplied configuration.
    ///
    /// This never fails: a disabled config, a malformed URL, a pool build
    /// error, or an unanswered PING all log the cause and yield a
    /// disconnected store.
    pub async fn connect(config: &RedisConfig) -> Self {
        if !config.enabled {
            info!("Redis disabled by configuration, caching is off");
            return Self::disconnected();
        }

        if !config.url.starts_with("redis://") && !config.url.starts_with("rediss://") {
            error!(
                "Invalid Redis URL scheme (expected redis:// or rediss://), caching is off"
            );
            return Self::disconnected();
        }

        let timeout = Duration::from_secs(config.connect_timeout_secs);
        let redis_cfg = deadpool_redis::Config::from_url(&config.url);

        let pool = match redis_cfg.builder() {
            Ok(builder) => {
                match builder
                    .max_size(config.pool_size as usize)
                    .create_timeout(Some(timeout))
                    .wait_timeout(Some(timeout))
                    .runtime(Runtime::Tokio1)
                    .build()
                {
                    Ok(pool) => pool,
                    Err(e) => {
                        error!("Failed to build Redis pool: {}, caching is off", e);
                        return Self::disconnected();
                    }
                }
            }
            Err(e) => {
                error!("Invalid Redis configuration: {}, caching is off", e);
                return Self::disconnected();
            }
        };

        // Probe the connection before handing the pool out
        match Self::ping(&pool).await {
            Ok(latency) => {
                info!("Redis connected ({} ms ping)", latency.as_millis());
                Self {
                    pool: Some(Arc::new(pool)),
                }
            }
            Err(e) => {
                error!("Failed to connect to Redis: {}, caching is off", e);
                Self::disconnected()
            }
        }
    }

    /// Creates a store around an existing pool (for dependency injection).
    #[must_use]
    pub fn new(pool: Arc<Pool>) -> Self {
        Self { pool: Some(pool) }
    }

    /// Creates a permanently disconnected store.
    #[must_use]
    pub fn disconnected() -> Self {
        Self { pool: None }
    }

    async fn ping(pool: &Pool) -> Result<Duration, String> {
        let mut conn = pool.get().await.map_err(|e| e.to_string())?;
        let started = Instant::now();
        let pong: String = deadpool_redis::redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| e.to_string())?;
        if pong == "PONG" {
            Ok(started.elapsed())
        } else {
            Err(format!("unexpected PING reply: {}", pong))
        }
    }

    async fn get_conn(&self) -> Option<deadpool_redis::Connection> {
        let pool = self.pool.as_ref()?;
        match pool.get().await {
            Ok(conn) => Some(conn),
            Err(e) => {
                warn!("Failed to get Redis connection: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    fn is_connected(&self) -> bool {
        self.pool.is_some()
    }

    async fn get_raw(&self, key: &str) -> Option<String> {
        if !self.is_connected() {
            return None;
        }
        if !is_valid_key(key) {
            warn!("Invalid cache key rejected: '{}'", key);
            return None;
        }

        let mut conn = self.get_conn().await?;
        match conn.get::<_, Option<String>>(key).await {
            Ok(Some(value)) => {
                debug!("Cache hit for key '{}'", key);
                Some(value)
            }
            Ok(None) => {
                debug!("Cache miss for key '{}'", key);
                None
            }
            Err(e) => {
                warn!("Redis GET error for key '{}': {}", key, e);
                None
            }
        }
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>) -> bool {
        if !self.is_connected() {
            return false;
        }
        if !is_valid_key(key) {
            warn!("Invalid cache key rejected: '{}'", key);
            return false;
        }

        let Some(mut conn) = self.get_conn().await else {
            return false;
        };

        let result = match ttl {
            Some(ttl) => {
                let ttl_secs = ttl.as_secs().max(1);
                conn.set_ex::<_, _, ()>(key, value, ttl_secs).await
            }
            None => conn.set::<_, _, ()>(key, value).await,
        };

        match result {
            Ok(()) => {
                debug!("Cached key '{}' (ttl: {:?})", key, ttl);
                true
            }
            Err(e) => {
                warn!("Redis SET error for key '{}': {}", key, e);
                false
            }
        }
    }

    async fn delete(&self, key: &str) -> bool {
        if !self.is_connected() {
            return false;
        }
        if !is_valid_key(key) {
            warn!("Invalid cache key rejected: '{}'", key);
            return false;
        }

        let Some(mut conn) = self.get_conn().await else {
            return false;
        };
        match conn.del::<_, i64>(key).await {
            Ok(deleted) => {
                debug!("Deleted key '{}': {}", key, deleted > 0);
                deleted > 0
            }
            Err(e) => {
                warn!("Redis DEL error for key '{}': {}", key, e);
                false
            }
        }
    }

    async fn exists(&self, key: &str) -> bool {
        if !self.is_connected() {
            return false;
        }
        if !is_valid_key(key) {
            warn!("Invalid cache key rejected: '{}'", key);
            return false;
        }

        let Some(mut conn) = self.get_conn().await else {
            return false;
        };
        match conn.exists::<_, bool>(key).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!("Redis EXISTS error for key '{}': {}", key, e);
                false
            }
        }
    }

    async fn clear_pattern(&self, pattern: &str) -> u64 {
        if !self.is_connected() {
            return 0;
        }
        if !is_valid_pattern(pattern) {
            warn!("Invalid cache pattern rejected: '{}'", pattern);
            return 0;
        }

        let Some(mut conn) = self.get_conn().await else {
            return 0;
        };

        // KEYS is acceptable here: patterns are narrow and clears are rare
        // admin/invalidation paths, not request paths.
        let keys: Vec<String> = match deadpool_redis::redis::cmd("KEYS")
            .arg(pattern)
            .query_async(&mut conn)
            .await
        {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Redis KEYS error for pattern '{}': {}", pattern, e);
                return 0;
            }
        };

        if keys.is_empty() {
            return 0;
        }

        match conn.del::<_, i64>(&keys).await {
            Ok(deleted) => {
                debug!("Deleted {} keys matching pattern '{}'", deleted, pattern);
                u64::try_from(deleted).unwrap_or(0)
            }
            Err(e) => {
                warn!("Redis DEL error for pattern '{}': {}", pattern, e);
                0
            }
        }
    }

    async fn health_check(&self) -> CacheHealth {
        let Some(pool) = self.pool.as_ref() else {
            return CacheHealth::Disconnected;
        };

        let latency = match Self::ping(pool).await {
            Ok(latency) => latency,
            Err(message) => return CacheHealth::Error { message },
        };

        let Some(mut conn) = self.get_conn().await else {
            return CacheHealth::Error {
                message: "connection pool exhausted".to_string(),
            };
        };

        let keys: u64 = deadpool_redis::redis::cmd("DBSIZE")
            .query_async(&mut conn)
            .await
            .unwrap_or(0);

        let info: Option<String> = deadpool_redis::redis::cmd("INFO")
            .arg("memory")
            .query_async(&mut conn)
            .await
            .ok();
        let used_memory = info.as_deref().and_then(parse_used_memory);

        CacheHealth::Connected {
            latency_ms: u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
            keys,
            used_memory,
        }
    }
}

/// Extracts `used_memory_human` from a Redis `INFO memory` reply.
fn parse_used_memory(info: &str) -> Option<String> {
    info.lines()
        .find_map(|line| line.strip_prefix("used_memory_human:"))
        .map(|v| v.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disabled_config() -> RedisConfig {
        RedisConfig {
            enabled: false,
            ..RedisConfig::default()
        }
    }

    #[tokio::test]
    async fn test_disabled_config_yields_disconnected_store() {
        let store = RedisCacheStore::connect(&disabled_config()).await;
        assert!(!store.is_connected());
    }

    #[tokio::test]
    async fn test_bad_scheme_yields_disconnected_store() {
        let config = RedisConfig {
            url: "http://localhost:6379".to_string(),
            ..RedisConfig::default()
        };
        let store = RedisCacheStore::connect(&config).await;
        assert!(!store.is_connected());
    }

    #[tokio::test]
    async fn test_disconnected_operations_degrade_silently() {
        let store = RedisCacheStore::disconnected();

        assert_eq!(store.get_raw("product:123").await, None);
        assert!(!store.set_raw("product:123", "{}", Some(MEDIUM)).await);
        assert!(!store.delete("product:123").await);
        assert!(!store.exists("product:123").await);
        assert_eq!(store.clear_pattern("products:*").await, 0);
        assert_eq!(store.health_check().await, CacheHealth::Disconnected);
    }

    const MEDIUM: Duration = Duration::from_secs(1800);

    #[test]
    fn test_parse_used_memory() {
        let info = "# Memory\r\nused_memory:1048576\r\nused_memory_human:1.00M\r\n";
        assert_eq!(parse_used_memory(info), Some("1.00M".to_string()));
        assert_eq!(parse_used_memory("# Memory\r\n"), None);
    }
}
