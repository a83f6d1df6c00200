//! Cache store trait for abstracted caching operations.

use async_trait::async_trait;
use serde::Serialize;
use shaku::Interface;
use std::time::Duration;

/// Maximum accepted cache key length in bytes.
pub const MAX_KEY_LENGTH: usize = 256;

/// Checks a cache key against the allow-listed character set.
///
/// Keys may contain ASCII letters, digits, `_`, `-`, `:`, `.` and `@`, and
/// must be shorter than [`MAX_KEY_LENGTH`]. Anything else is rejected before
/// it reaches the store.
#[must_use]
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() < MAX_KEY_LENGTH
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b':' | b'.' | b'@'))
}

/// Checks a wildcard pattern: the key character set plus `*`.
#[must_use]
pub fn is_valid_pattern(pattern: &str) -> bool {
    !pattern.is_empty()
        && pattern.len() < MAX_KEY_LENGTH
        && pattern.bytes().all(|b| {
            b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b':' | b'.' | b'@' | b'*')
        })
}

/// Health status reported by a cache store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CacheHealth {
    /// The store has no live connection; caching is disabled.
    Disconnected,
    /// The store answered a ping.
    Connected {
        /// Round-trip latency of the ping in milliseconds.
        latency_ms: u64,
        /// Number of keys currently held.
        keys: u64,
        /// Human-readable memory usage, when the backend reports it.
        #[serde(skip_serializing_if = "Option::is_none")]
        used_memory: Option<String>,
    },
    /// The store is configured but the probe failed.
    Error {
        /// Backend error message.
        message: String,
    },
}

/// Cache store contract for storing and retrieving serialized values.
///
/// This trait provides an abstraction over caching backends, allowing for
/// easy swapping between Redis, in-memory, or other implementations. Values
/// are JSON strings to keep the trait dyn-compatible; typed access lives in
/// [`crate::CacheExt`].
///
/// Failure semantics: data operations never return errors. A disconnected
/// backend, an invalid key, or a backend failure all degrade to the
/// cache-absent result (`None`, `false`, `0`); the cause is logged. Callers
/// that care whether caching is active at all can consult
/// [`is_connected`](CacheStore::is_connected).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheStore: Interface + Send + Sync {
    /// Get a raw JSON value from the cache.
    ///
    /// Returns `None` on a miss, an expired or invalid key, a disconnected
    /// store, or a backend error.
    async fn get_raw(&self, key: &str) -> Option<String>;

    /// Set a raw JSON value in the cache.
    ///
    /// A `None` TTL stores the value without expiry; expiry is enforced by
    /// the backend, not by this layer. Returns `true` when the write was
    /// accepted.
    async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>) -> bool;

    /// Delete a value from the cache.
    ///
    /// Returns `true` if the key existed and was deleted.
    async fn delete(&self, key: &str) -> bool;

    /// Check if a key exists in the cache.
    async fn exists(&self, key: &str) -> bool;

    /// Delete all keys matching a wildcard pattern.
    ///
    /// Returns the number of keys deleted.
    async fn clear_pattern(&self, pattern: &str) -> u64;

    /// Whether the store currently holds a live connection.
    ///
    /// `false` means every data operation degrades to a cache-absent result.
    fn is_connected(&self) -> bool;

    /// Probe the backend and report its health.
    async fn health_check(&self) -> CacheHealth;
}
