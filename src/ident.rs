//! Deterministic catalog identifiers.
//!
//! Category and product IDs are name-based UUIDs (v5) over a namespaced
//! key string, so the same canonical path or source URL maps to the same
//! ID across runs and machines with no lookup table.

use uuid::Uuid;

/// Default namespace prefix for ID key strings.
pub const DEFAULT_NAMESPACE: &str = "cellphones";

/// ID for a category path, or `None` for an empty path.
pub fn category_id(namespace: &str, path: &str) -> Option<Uuid> {
    if path.is_empty() {
        return None;
    }
    let key = format!("{namespace}:/cat/{path}");
    Some(Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_bytes()))
}

/// ID for a product source URL, or `None` for an empty URL.
pub fn product_id(namespace: &str, url: &str) -> Option<Uuid> {
    if url.is_empty() {
        return None;
    }
    let key = format!("{namespace}:/prod/{url}");
    Some(Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_bytes()))
}
