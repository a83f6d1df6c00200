//! In-memory cache store for local development and tests.

use crate::cache_store::{is_valid_key, is_valid_pattern, CacheHealth, CacheStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use shaku::Component;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

struct Entry {
    value: String,
    /// `None` means the entry never expires.
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}

/// [`CacheStore`] backed by a process-local map.
///
/// Used when Redis is unavailable in local development and as the store
/// under test elsewhere in this crate. TTLs are tracked with
/// [`tokio::time::Instant`] so tests can drive expiry with paused time.
/// Expired entries are dropped lazily on access.
#[derive(Component, Default)]
#[shaku(interface = CacheStore)]
pub struct MemoryCacheStore {
    #[shaku(default)]
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCacheStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .values()
            .filter(|e| !e.is_expired(now))
            .count()
    }

    /// Whether the store holds no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    fn is_connected(&self) -> bool {
        true
    }

    async fn get_raw(&self, key: &str) -> Option<String> {
        if !is_valid_key(key) {
            return None;
        }

        let now = Instant::now();
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>) -> bool {
        if !is_valid_key(key) {
            return false;
        }

        let entry = Entry {
            value: value.to_string(),
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.entries.write().insert(key.to_string(), entry);
        true
    }

    async fn delete(&self, key: &str) -> bool {
        if !is_valid_key(key) {
            return false;
        }

        let now = Instant::now();
        match self.entries.write().remove(key) {
            Some(entry) => !entry.is_expired(now),
            None => false,
        }
    }

    async fn exists(&self, key: &str) -> bool {
        self.get_raw(key).await.is_some()
    }

    async fn clear_pattern(&self, pattern: &str) -> u64 {
        if !is_valid_pattern(pattern) {
            return 0;
        }

        let now = Instant::now();
        let mut entries = self.entries.write();
        entries.retain(|_, entry| !entry.is_expired(now));

        let matching: Vec<String> = entries
            .keys()
            .filter(|key| wildcard_match(pattern, key))
            .cloned()
            .collect();
        for key in &matching {
            entries.remove(key);
        }
        matching.len() as u64
    }

    async fn health_check(&self) -> CacheHealth {
        CacheHealth::Connected {
            latency_ms: 0,
            keys: self.len() as u64,
            used_memory: None,
        }
    }
}

/// Matches `text` against a glob pattern where `*` spans any run of
/// characters. The only metacharacter is `*`, mirroring the subset of Redis
/// glob syntax this crate emits.
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some((p, t));
            p += 1;
        } else if let Some((star_p, star_t)) = star {
            // Backtrack: let the last '*' absorb one more character
            p = star_p + 1;
            t = star_t + 1;
            star = Some((star_p, star_t + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}
