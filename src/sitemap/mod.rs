//! Sitemap discovery: document parsing and the budget-bounded walk.

pub mod parse;
pub mod walk;

pub use parse::{parse_sitemap, SitemapDoc, SitemapKind};
pub use walk::{decode_payload, discover_entrypoints, SitemapWalker};
