//! Parse sitemap XML into a classified document.
//!
//! A sitemap is either an index (entries point at other sitemaps) or a
//! URL set (entries are leaf content pages). Classification goes by the
//! root element first, then by child element names for documents with a
//! mangled or missing root. Parse failures never panic; they degrade to
//! whatever was readable before the error.

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::warn;

/// What kind of sitemap document a payload turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitemapKind {
    /// `<sitemapindex>` — entries are other sitemap addresses.
    Index,
    /// `<urlset>` — entries are leaf page addresses.
    UrlSet,
    /// Neither shape recognized; contributes nothing to the walk.
    Unknown,
}

/// A parsed sitemap document: its classification and all `<loc>` values
/// in document order.
#[derive(Debug, Clone)]
pub struct SitemapDoc {
    pub kind: SitemapKind,
    pub locs: Vec<String>,
}

/// Parse a sitemap XML string.
pub fn parse_sitemap(xml: &str) -> SitemapDoc {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut root: Option<String> = None;
    let mut saw_sitemap_child = false;
    let mut saw_url_child = false;
    let mut in_loc = false;
    let mut locs = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match name.as_str() {
                    "sitemap" => saw_sitemap_child = true,
                    "url" => saw_url_child = true,
                    "loc" => in_loc = true,
                    _ => {}
                }
                if root.is_none() {
                    root = Some(name);
                }
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"loc" {
                    in_loc = false;
                }
            }
            Ok(Event::Text(e)) => {
                if in_loc {
                    let text = e.unescape().unwrap_or_default();
                    let loc = text.trim();
                    if !loc.is_empty() {
                        locs.push(loc.to_string());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!("sitemap XML parse error: {e}");
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    let kind = match root.as_deref() {
        Some("sitemapindex") => SitemapKind::Index,
        Some("urlset") => SitemapKind::UrlSet,
        _ if saw_sitemap_child => SitemapKind::Index,
        _ if saw_url_child => SitemapKind::UrlSet,
        _ => SitemapKind::Unknown,
    };

    SitemapDoc { kind, locs }
}
