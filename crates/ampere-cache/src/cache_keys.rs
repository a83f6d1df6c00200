//! Cache key generators for consistent key naming.
//!
//! Pure functions mapping storefront concepts to canonical key strings.
//! Arbitrary input (search queries, raw query strings) is sanitized into the
//! allow-listed key character set; when sanitizing altered the input, a short
//! hash of the original is appended so distinct inputs stay distinct.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Longest sanitized fragment kept before hashing takes over.
const MAX_FRAGMENT_LENGTH: usize = 64;

/// Key for the full product listing, or a filtered listing when query
/// parameters are present.
#[must_use]
pub fn products(params: Option<&str>) -> String {
    match params {
        Some(p) if !p.is_empty() => format!("products:{}", sanitize(p)),
        _ => "products:all".to_string(),
    }
}

/// Key for a single product by id.
#[must_use]
pub fn product(id: &str) -> String {
    format!("product:{}", sanitize(id))
}

/// Key for the aggregated homepage payload.
#[must_use]
pub fn homepage() -> String {
    "homepage:data".to_string()
}

/// Key for the service-offering listing.
#[must_use]
pub fn services() -> String {
    "services:all".to_string()
}

/// Key for the category listing.
#[must_use]
pub fn categories() -> String {
    "categories:all".to_string()
}

/// Key for a search result set.
#[must_use]
pub fn search(query: &str) -> String {
    format!("search:{}", sanitize(query))
}

/// Pattern matching every product listing key.
#[must_use]
pub fn products_pattern() -> String {
    "products:*".to_string()
}

/// Pattern matching every cached search result.
#[must_use]
pub fn search_pattern() -> String {
    "search:*".to_string()
}

/// Pattern matching every key in the cache.
#[must_use]
pub fn all_pattern() -> String {
    "*".to_string()
}

/// Maps arbitrary input into the key character set.
///
/// Lowercases, replaces disallowed characters with `-`, and truncates long
/// fragments. If anything was altered, an 8-hex-digit hash of the original
/// is appended; collisions between distinct raw inputs are therefore
/// unlikely rather than impossible.
fn sanitize(raw: &str) -> String {
    let mut cleaned: String = raw
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':' | '.' | '@') {
                c
            } else {
                '-'
            }
        })
        .collect();

    let truncated = cleaned.len() > MAX_FRAGMENT_LENGTH;
    if truncated {
        cleaned.truncate(MAX_FRAGMENT_LENGTH);
    }

    if cleaned == raw && !truncated {
        return cleaned;
    }

    let mut hasher = DefaultHasher::new();
    raw.hash(&mut hasher);
    let digest = hasher.finish() as u32;

    if cleaned.is_empty() {
        format!("{:08x}", digest)
    } else {
        format!("{}.{:08x}", cleaned, digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::is_valid_key;

    #[test]
    fn test_product_key() {
        assert_eq!(product("123"), "product:123");
        assert_eq!(product("66f1a2b3c4d5e6f7a8b9c0d1"), "product:66f1a2b3c4d5e6f7a8b9c0d1");
    }

    #[test]
    fn test_products_listing_keys() {
        assert_eq!(products(None), "products:all");
        assert_eq!(products(Some("")), "products:all");
        assert_eq!(products(Some("page2")), "products:page2");
    }

    #[test]
    fn test_static_keys() {
        assert_eq!(homepage(), "homepage:data");
        assert_eq!(services(), "services:all");
        assert_eq!(categories(), "categories:all");
    }

    #[test]
    fn test_search_key_is_always_valid() {
        let key = search("wireless earbuds \"noise cancelling\"");
        assert!(is_valid_key(&key));
        assert!(key.starts_with("search:wireless-earbuds"));
    }

    #[test]
    fn test_distinct_raw_inputs_stay_distinct() {
        // Both sanitize to the same fragment; the hash suffix separates them.
        assert_ne!(search("usb c"), search("usb.c"));
    }

    #[test]
    fn test_uppercase_is_normalized() {
        let key = product("ABC");
        assert!(key.starts_with("product:abc"));
        assert!(is_valid_key(&key));
    }

    #[test]
    fn test_long_input_is_bounded() {
        let key = search(&"q".repeat(500));
        assert!(is_valid_key(&key));
    }

    #[test]
    fn test_patterns() {
        assert_eq!(products_pattern(), "products:*");
        assert_eq!(search_pattern(), "search:*");
        assert_eq!(all_pattern(), "*");
    }
}
