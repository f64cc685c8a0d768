//! Walk an arbitrary nested sitemap graph down to leaf product URLs.
//!
//! The graph is expected to be a DAG but is not trusted to be one: a
//! shared `seen` set makes revisits (and therefore cycles) no-ops, and an
//! explicit worklist keeps adversarial nesting depth off the call stack.
//! A decrementing budget stops the walk mid-branch as soon as enough
//! URLs have been collected. No failure in here aborts the walk; a bad
//! fetch or unparseable document just contributes zero URLs.

use crate::net::HttpClient;
use crate::sitemap::parse::{parse_sitemap, SitemapKind};
use flate2::read::{GzDecoder, MultiGzDecoder};
use std::collections::HashSet;
use std::io::Read;
use tracing::{debug, info, warn};

/// Upper bound on numeric product-sitemap filename guesses.
const GUESS_CEILING: usize = 25;

/// Conventional sitemap locations probed at the site root.
const ROOT_CANDIDATES: &[&str] = &["/sitemap.xml", "/sitemap_index.xml", "/sitemaps.xml"];

/// Filename hint that marks a child sitemap as product-bearing.
const PRODUCT_HINT: &str = "product";

/// Depth-first walker over a sitemap graph.
pub struct SitemapWalker<'a> {
    client: &'a HttpClient,
    /// Sitemap addresses already visited; guarantees termination on cycles.
    seen: HashSet<String>,
    /// Leaf URLs already yielded; a page listed in two url sets counts once.
    yielded: HashSet<String>,
    /// Product URLs still wanted. `None` means unbounded.
    budget_left: Option<usize>,
    page_suffix: String,
}

impl<'a> SitemapWalker<'a> {
    pub fn new(client: &'a HttpClient, limit: Option<usize>, page_suffix: &str) -> Self {
        Self {
            client,
            seen: HashSet::new(),
            yielded: HashSet::new(),
            budget_left: limit,
            page_suffix: page_suffix.to_string(),
        }
    }

    /// Walk from the given entrypoints and collect leaf page URLs in
    /// discovery order, up to the budget.
    pub async fn walk(&mut self, entrypoints: &[String]) -> Vec<String> {
        let mut found = Vec::new();
        // Stack, reversed so entrypoints pop in the given order and index
        // children pop in document order.
        let mut worklist: Vec<String> = entrypoints.iter().rev().cloned().collect();

        while let Some(address) = worklist.pop() {
            if self.budget_left == Some(0) {
                break;
            }
            if !self.seen.insert(address.clone()) {
                debug!("already visited {address}, skipping");
                continue;
            }

            let Some(text) = self.fetch_document(&address).await else {
                continue;
            };
            let doc = parse_sitemap(&text);
            match doc.kind {
                SitemapKind::Index => {
                    debug!("{address}: index with {} children", doc.locs.len());
                    for loc in doc.locs.iter().rev() {
                        if let Some(resolved) = resolve(&address, loc) {
                            if !self.seen.contains(&resolved) {
                                worklist.push(resolved);
                            }
                        }
                    }
                }
                SitemapKind::UrlSet => {
                    let mut taken = 0usize;
                    for loc in &doc.locs {
                        if self.budget_left == Some(0) {
                            break;
                        }
                        if !loc.ends_with(&self.page_suffix) {
                            continue;
                        }
                        if !self.yielded.insert(loc.clone()) {
                            continue;
                        }
                        found.push(loc.clone());
                        taken += 1;
                        if let Some(b) = self.budget_left.as_mut() {
                            *b -= 1;
                        }
                    }
                    debug!("{address}: urlset contributed {taken} page URLs");
                }
                SitemapKind::Unknown => {
                    warn!("{address}: neither sitemap index nor urlset, skipping");
                }
            }
        }

        found
    }

    /// Fetch one sitemap document as text, or `None` on any failure.
    async fn fetch_document(&self, address: &str) -> Option<String> {
        let resp = match self.client.get(address).await {
            Ok(r) => r,
            Err(e) => {
                warn!("sitemap fetch failed: {e}");
                return None;
            }
        };
        if !resp.is_success() {
            debug!("sitemap fetch {address} -> {}", resp.status);
            return None;
        }

        let text = decode_payload(address, resp.content_type.as_deref(), &resp.body);
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Decode a sitemap payload, decompressing gzip when the address or the
/// response indicates it, then lossy-decoding UTF-8.
pub fn decode_payload(address: &str, content_type: Option<&str>, body: &[u8]) -> String {
    let looks_gzipped = address.ends_with(".gz")
        || content_type.is_some_and(|t| t.contains("gzip"))
        || body.starts_with(&[0x1f, 0x8b]);

    if looks_gzipped {
        if let Some(decompressed) = gunzip(body) {
            return String::from_utf8_lossy(&decompressed).into_owned();
        }
        debug!("{address}: gzip indicated but decompression failed, using raw bytes");
    }
    String::from_utf8_lossy(body).into_owned()
}

/// Decompress with the plain header-based decoder first, then the
/// streaming multi-member decoder — servers misreport, and some gzip
/// payloads are concatenated members.
fn gunzip(body: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    if GzDecoder::new(body).read_to_end(&mut out).is_ok() {
        return Some(out);
    }

    let mut out = Vec::new();
    if MultiGzDecoder::new(body).read_to_end(&mut out).is_ok() {
        return Some(out);
    }
    None
}

/// Resolve a child location against the sitemap address that listed it.
fn resolve(base: &str, loc: &str) -> Option<String> {
    match url::Url::parse(base) {
        Ok(base_url) => base_url.join(loc).ok().map(|u| u.to_string()),
        Err(_) => url::Url::parse(loc).ok().map(|u| u.to_string()),
    }
}

/// Assemble the walk's starting set for a site root.
///
/// Probes the conventional root sitemap paths, then a bounded numeric
/// enumeration of product-sitemap filenames (plain and gzip variants).
/// When the root index is readable, its product-hinted children go first
/// so a tight budget fills from product sitemaps.
pub async fn discover_entrypoints(client: &HttpClient, base_url: &str) -> Vec<String> {
    let base = base_url.trim_end_matches('/');
    let mut entrypoints: Vec<String> = Vec::new();

    fn push_unique(list: &mut Vec<String>, url: String) {
        if !list.contains(&url) {
            list.push(url);
        }
    }

    // Conventional root documents; product-hinted children of a readable
    // index are promoted ahead of the index itself.
    for path in ROOT_CANDIDATES {
        let address = format!("{base}{path}");
        let Ok(resp) = client.get(&address).await else {
            continue;
        };
        if !resp.is_success() {
            continue;
        }

        let doc = parse_sitemap(&decode_payload(&address, resp.content_type.as_deref(), &resp.body));
        if doc.kind == SitemapKind::Index {
            for loc in &doc.locs {
                if loc.contains(PRODUCT_HINT) {
                    if let Some(resolved) = resolve(&address, loc) {
                        push_unique(&mut entrypoints, resolved);
                    }
                }
            }
        }
        push_unique(&mut entrypoints, address);
    }

    // Bounded brute-force enumeration of likely product sitemap names.
    // A discovery heuristic, not a completeness guarantee.
    for n in 1..=GUESS_CEILING {
        let mut hit = false;
        for candidate in [
            format!("{base}/sitemap/product-sitemap{n}.xml"),
            format!("{base}/sitemap/product-sitemap{n}.xml.gz"),
        ] {
            if let Ok(resp) = client.get(&candidate).await {
                if resp.is_success() {
                    push_unique(&mut entrypoints, candidate);
                    hit = true;
                }
            }
        }
        if !hit {
            break;
        }
    }

    info!("discovered {} sitemap entrypoints for {base}", entrypoints.len());
    entrypoints
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip_bytes(data: &[u8]) -> Vec<u8> {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn test_decode_plain_payload() {
        let xml = b"<urlset><url><loc>https://x/a.html</loc></url></urlset>";
        assert_eq!(decode_payload("https://x/s.xml", None, xml), String::from_utf8_lossy(xml));
    }

    #[test]
    fn test_decode_gzip_by_address_suffix() {
        let xml = b"<urlset><url><loc>https://x/a.html</loc></url></urlset>";
        let gz = gzip_bytes(xml);
        let decoded = decode_payload("https://x/s.xml.gz", None, &gz);
        assert!(decoded.contains("a.html"));
    }

    #[test]
    fn test_decode_gzip_by_magic_bytes() {
        // Plain .xml address, no content type, but a gzip body.
        let gz = gzip_bytes(b"<urlset><url><loc>https://x/b.html</loc></url></urlset>");
        let decoded = decode_payload("https://x/s.xml", None, &gz);
        assert!(decoded.contains("b.html"));
    }

    #[test]
    fn test_decode_gzip_misreport_degrades_to_raw() {
        // Content type claims gzip but the body is plain XML.
        let xml = b"<urlset><url><loc>https://x/c.html</loc></url></urlset>";
        let decoded = decode_payload("https://x/s.xml", Some("application/gzip"), xml);
        assert!(decoded.contains("c.html"));
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        assert_eq!(
            resolve("https://x.com/sitemap.xml", "sitemap/p1.xml").as_deref(),
            Some("https://x.com/sitemap/p1.xml")
        );
        assert_eq!(
            resolve("https://x.com/sitemap.xml", "https://y.com/p1.xml").as_deref(),
            Some("https://y.com/p1.xml")
        );
        assert_eq!(resolve("not a url", "also not a url"), None);
    }
}
