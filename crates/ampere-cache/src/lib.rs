//! # Ampere Cache
//!
//! Redis-backed cache-aside layer for the Ampere storefront backend.
//!
//! The design goal is that caching is never load-bearing: a missing,
//! misconfigured, or failing Redis degrades every operation to a live fetch,
//! it never surfaces an error to callers. See [`CacheStore`] for the store
//! contract and [`CacheExt`] for the typed cache-aside helper.

pub mod cache_aside;
pub mod cache_keys;
mod cache_store;
mod memory_store;
mod redis_store;

pub use cache_aside::{CacheExt, LONG_TTL, MEDIUM_TTL, SHORT_TTL, VERY_LONG_TTL};
pub use cache_store::{is_valid_key, is_valid_pattern, CacheHealth, CacheStore, MAX_KEY_LENGTH};
pub use memory_store::MemoryCacheStore;
pub use redis_store::{RedisCacheStore, RedisCacheStoreParameters};
