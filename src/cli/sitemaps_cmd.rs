//! `shopcrawl sitemaps` — probe a site's sitemap documents without crawling.

use crate::net::HttpClient;
use crate::sitemap::{self, SitemapKind};
use anyhow::Result;
use std::time::Duration;

pub async fn run(base_url: &str, user_agent: Option<String>) -> Result<()> {
    let client = HttpClient::new(user_agent.as_deref(), Duration::from_secs(25));
    let entrypoints = sitemap::discover_entrypoints(&client, base_url).await;

    if entrypoints.is_empty() {
        println!("  No sitemap documents found at {base_url}");
        return Ok(());
    }

    for address in &entrypoints {
        match client.get(address).await {
            Ok(resp) if resp.is_success() => {
                let text =
                    sitemap::decode_payload(address, resp.content_type.as_deref(), &resp.body);
                let doc = sitemap::parse_sitemap(&text);
                let kind = match doc.kind {
                    SitemapKind::Index => "index",
                    SitemapKind::UrlSet => "urlset",
                    SitemapKind::Unknown => "unknown",
                };
                println!("  {kind:<8} {:>6} locs  {address}", doc.locs.len());
            }
            Ok(resp) => println!("  HTTP {:<4} {:>6}       {address}", resp.status, "-"),
            Err(e) => println!("  error: {e}"),
        }
    }
    Ok(())
}
