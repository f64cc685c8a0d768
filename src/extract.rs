//! Extract product fields from raw HTML without DOM rendering.
//!
//! CSS-selector parsing via the `scraper` crate, tuned to the storefront's
//! markup: `<h1>` product name, a labeled price region, a highlights
//! section for the description, OpenGraph image, and a breadcrumb trail
//! for the category chain. Every field degrades independently — a page
//! missing any of them still yields a usable record.

use crate::catalog::ProductRecord;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

const DESCRIPTION_CAP: usize = 1000;
const MAX_BULLETS: usize = 8;
const HOME_CRUMB: &str = "Trang chủ";
const PRICE_MARKER: &str = r"(?i)giá\s*sản\s*phẩm";
const HIGHLIGHTS_MARKER: &str = "tính năng nổi bật";
const IN_STOCK_SIGNALS: &[&str] = &["mua ngay", "thêm vào giỏ", "còn hàng"];
const OUT_OF_STOCK_SIGNALS: &[&str] = &["hết hàng", "đặt trước"];

/// How a breadcrumb trail is trimmed down to a category chain.
///
/// Tuned to one site's markup; kept as data so a deployment can adjust it
/// without touching the extractor.
#[derive(Debug, Clone)]
pub struct ChainPolicy {
    /// Entries longer than this are assumed to be the product name; the
    /// chain is cut at the first one.
    pub cut_len: usize,
    /// Maximum number of chain entries kept.
    pub max_depth: usize,
}

impl Default for ChainPolicy {
    fn default() -> Self {
        Self {
            cut_len: 60,
            max_depth: 3,
        }
    }
}

/// Extract a product record from one fetched page.
pub fn extract_product(html: &str, source_url: &str, policy: &ChainPolicy) -> ProductRecord {
    let doc = Html::parse_document(html);
    let text = page_text(&doc);
    let crumbs = extract_breadcrumbs(&doc);

    ProductRecord {
        source_url: source_url.to_string(),
        name: extract_name(&doc),
        price: extract_price(&text),
        description: extract_description(&doc),
        image_url: extract_image(&doc),
        is_available: extract_availability(&text),
        category_chain: apply_chain_policy(&crumbs, policy),
    }
}

/// Trim a raw breadcrumb trail to a category chain under the policy:
/// drop one-character noise, cut at the first product-name-length entry,
/// cap the depth, and de-duplicate case-insensitively preserving order.
pub fn apply_chain_policy(crumbs: &[String], policy: &ChainPolicy) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for crumb in crumbs {
        let len = crumb.chars().count();
        if len <= 1 {
            continue;
        }
        if len > policy.cut_len {
            break;
        }
        if seen.insert(crumb.to_lowercase()) {
            out.push(crumb.clone());
        }
        if out.len() >= policy.max_depth {
            break;
        }
    }
    out
}

fn page_text(doc: &Html) -> String {
    doc.root_element().text().collect::<Vec<_>>().join(" ")
}

fn collapse_text(el: ElementRef) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn extract_name(doc: &Html) -> Option<String> {
    let sel = Selector::parse("h1").unwrap();
    let name = collapse_text(doc.select(&sel).next()?);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Pull a VND price out of the page text, preferring the region after the
/// price marker, falling back to the whole page.
fn extract_price(text: &str) -> Option<f64> {
    let marker = Regex::new(PRICE_MARKER).unwrap();
    let region = match marker.find(text) {
        Some(m) => &text[m.start()..],
        None => text,
    };
    parse_price_vnd(region)
}

/// Parse the first price written like "27.280.000đ" or "27.280.000 đ".
fn parse_price_vnd(text: &str) -> Option<f64> {
    let lowered = text.replace(',', ".").to_lowercase();
    let re = Regex::new(r"(\d[\d.]+)\s*đ").unwrap();
    let caps = re.captures(&lowered)?;
    let digits = caps[1].replace('.', "");
    digits.parse::<f64>().ok()
}

/// Collect highlight bullets near the highlights marker.
fn extract_description(doc: &Html) -> Option<String> {
    let all = Selector::parse("*").unwrap();
    let mut marker: Option<ElementRef> = None;
    for el in doc.select(&all) {
        if el
            .text()
            .collect::<String>()
            .to_lowercase()
            .contains(HIGHLIGHTS_MARKER)
        {
            // Ancestors precede descendants in document order, so the last
            // match is the tightest element around the marker.
            marker = Some(el);
        }
    }
    let marker = marker?;

    let item_sel = Selector::parse("li, p").unwrap();
    let mut bullets = collect_bullets(marker, &item_sel);
    if bullets.is_empty() {
        // Marker sits in a heading; its bullets are siblings, so look one
        // level up.
        if let Some(parent) = marker.ancestors().filter_map(ElementRef::wrap).next() {
            bullets = collect_bullets(parent, &item_sel);
        }
    }
    if bullets.is_empty() {
        return None;
    }

    let joined = bullets.join(" • ");
    Some(truncate_chars(&joined, DESCRIPTION_CAP))
}

fn collect_bullets(scope: ElementRef, item_sel: &Selector) -> Vec<String> {
    scope
        .select(item_sel)
        .map(collapse_text)
        .filter(|t| !t.is_empty())
        .take(MAX_BULLETS)
        .collect()
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

/// og:image first, then the first absolute `<img>` source.
fn extract_image(doc: &Html) -> Option<String> {
    let og = Selector::parse(r#"meta[property="og:image"]"#).unwrap();
    if let Some(el) = doc.select(&og).next() {
        if let Some(content) = el.value().attr("content") {
            if !content.is_empty() {
                return Some(content.to_string());
            }
        }
    }

    let img = Selector::parse("img").unwrap();
    for el in doc.select(&img) {
        let src = el.value().attr("src").or_else(|| el.value().attr("data-src"));
        if let Some(src) = src {
            if src.starts_with("http") {
                return Some(src.to_string());
            }
        }
    }
    None
}

/// Buy-button wording implies in stock; out-of-stock wording overrides.
fn extract_availability(text: &str) -> bool {
    let lowered = text.to_lowercase();
    if OUT_OF_STOCK_SIGNALS.iter().any(|k| lowered.contains(k)) {
        return false;
    }
    IN_STOCK_SIGNALS.iter().any(|k| lowered.contains(k))
}

/// Breadcrumb display names in trail order, "Trang chủ" removed,
/// case-insensitively de-duplicated.
fn extract_breadcrumbs(doc: &Html) -> Vec<String> {
    let candidates = [
        r#"[aria-label*="breadcrumb"]"#,
        r#"[aria-label*="Breadcrumb"]"#,
        "nav.breadcrumb",
        ".breadcrumb",
        ".breadcrumbs",
    ];

    let mut container: Option<ElementRef> = None;
    for css in candidates {
        if let Ok(sel) = Selector::parse(css) {
            if let Some(el) = doc.select(&sel).next() {
                container = Some(el);
                break;
            }
        }
    }
    let Some(nav) = container else {
        return Vec::new();
    };

    let item_sel = Selector::parse("li, a, span").unwrap();
    let mut crumbs = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for el in nav.select(&item_sel) {
        let t = collapse_text(el).replace(HOME_CRUMB, "");
        let t = t.trim().to_string();
        if t.is_empty() {
            continue;
        }
        if seen.insert(t.to_lowercase()) {
            crumbs.push(t);
        }
    }
    crumbs
}
