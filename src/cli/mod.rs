//! CLI subcommand implementations for the shopcrawl binary.

pub mod crawl_cmd;
pub mod sitemaps_cmd;
