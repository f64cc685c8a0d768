//! Catalog data model: category tree and product records.
//!
//! Categories form a forest keyed by canonical path. Nodes are created
//! the first time any breadcrumb chain reaches their path and never
//! mutated afterwards — re-deriving the same chain hits the existing
//! entry, so the map holds exactly one node per distinct path.

use crate::canon;
use std::collections::HashMap;

/// Curated top-level categories flagged as popular, in canonical form.
pub const POPULAR_TOP: &[&str] = &[
    "dien-thoai",
    "tablet",
    "laptop",
    "am-thanh",
    "dong-ho",
    "phu-kien",
    "tivi",
    "pc",
    "man-hinh",
    "gia-dung",
    "camera",
    "dien-may",
];

/// One category node.
#[derive(Debug, Clone)]
pub struct CategoryNode {
    /// Original display string, trimmed, accents preserved.
    pub name: String,
    /// Canonical slash-joined path; the node's natural key.
    pub path: String,
    /// Path of the parent node; `None` for top-level nodes.
    pub parent_path: Option<String>,
    /// Top-level and in the curated popular set.
    pub is_popular: bool,
}

/// One extracted product page.
#[derive(Debug, Clone)]
pub struct ProductRecord {
    /// Absolute canonical URL; the natural key.
    pub source_url: String,
    pub name: Option<String>,
    /// Price in the site's currency, when one was found on the page.
    pub price: Option<f64>,
    /// Bounded-length highlights summary.
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_available: bool,
    /// Breadcrumb display names, most general first.
    pub category_chain: Vec<String>,
}

/// The category forest for one crawl run.
#[derive(Debug, Default)]
pub struct CategoryTree {
    nodes: HashMap<String, CategoryNode>,
}

impl CategoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Materialize every node along a breadcrumb chain, creating only the
    /// paths not present yet (first writer wins). Returns the deepest
    /// node's path, or `None` for a chain with no usable entries.
    pub fn ensure_category(&mut self, chain: &[String]) -> Option<String> {
        let mut parent_path: Option<String> = None;

        for name in chain {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let path = match &parent_path {
                None => canon::canonicalize(&[name]),
                Some(prev) => canon::canonicalize(&[prev, name]),
            };
            if path.is_empty() {
                continue;
            }

            if !self.nodes.contains_key(&path) {
                let is_top = parent_path.is_none();
                self.nodes.insert(
                    path.clone(),
                    CategoryNode {
                        name: name.to_string(),
                        path: path.clone(),
                        parent_path: parent_path.clone(),
                        is_popular: is_top && POPULAR_TOP.contains(&path.as_str()),
                    },
                );
            }
            parent_path = Some(path);
        }

        parent_path
    }

    /// All nodes sorted by (depth, path): every parent line precedes every
    /// descendant line in the emitted listing.
    pub fn topological(&self) -> Vec<&CategoryNode> {
        let mut items: Vec<&CategoryNode> = self.nodes.values().collect();
        items.sort_by(|a, b| {
            let da = a.path.matches('/').count();
            let db = b.path.matches('/').count();
            da.cmp(&db).then_with(|| a.path.cmp(&b.path))
        });
        items
    }

    pub fn get(&self, path: &str) -> Option<&CategoryNode> {
        self.nodes.get(path)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
