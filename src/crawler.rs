//! Orchestrates the crawl: discovery, per-page extraction, tree growth,
//! export.
//!
//! Strictly sequential — one fetch at a time with a jittered polite delay
//! between product pages. Ctrl-C is caught here and only here: the page
//! loop stops and the run proceeds straight to export with whatever was
//! accumulated, so an interrupted crawl still produces a catalog.

use crate::catalog::{CategoryTree, ProductRecord};
use crate::export::{self, ExportedFiles};
use crate::extract::{self, ChainPolicy};
use crate::net::HttpClient;
use crate::sitemap::{discover_entrypoints, SitemapWalker};
use anyhow::Result;
use rand::Rng;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(25);
const DELAY_JITTER_MS: (u64, u64) = (50, 250);

/// Everything one crawl run needs. Flags only change volume and pacing,
/// never the data model.
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    /// Site root, e.g. "https://cellphones.com.vn".
    pub base_url: String,
    /// Maximum number of product pages; `None` is unbounded.
    pub limit: Option<usize>,
    /// Base polite delay between product fetches.
    pub delay: Duration,
    /// User-Agent override.
    pub user_agent: Option<String>,
    /// Directory receiving categories.csv and products.csv.
    pub out_dir: PathBuf,
    /// Leaf page suffix separating product pages from other sitemap entries.
    pub page_suffix: String,
    /// Namespace prefix for deterministic IDs.
    pub namespace: String,
    pub chain_policy: ChainPolicy,
}

/// What a finished (or interrupted) run produced.
#[derive(Debug)]
pub struct CrawlSummary {
    pub products: usize,
    pub categories: usize,
    pub files: ExportedFiles,
    pub interrupted: bool,
}

/// Run a full crawl.
pub async fn run(request: CrawlRequest) -> Result<CrawlSummary> {
    let client = HttpClient::new(request.user_agent.as_deref(), REQUEST_TIMEOUT);

    let entrypoints = discover_entrypoints(&client, &request.base_url).await;
    if entrypoints.is_empty() {
        warn!("no sitemap entrypoints found at {}", request.base_url);
    }

    let mut walker = SitemapWalker::new(&client, request.limit, &request.page_suffix);
    let urls = walker.walk(&entrypoints).await;
    info!("discovered {} candidate product pages", urls.len());

    let mut tree = CategoryTree::new();
    let mut products: Vec<ProductRecord> = Vec::new();
    let mut interrupted = false;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    for (i, url) in urls.iter().enumerate() {
        info!("[{}/{}] {url}", i + 1, urls.len());

        tokio::select! {
            biased;
            _ = &mut ctrl_c => {
                interrupted = true;
            }
            record = process_page(&client, url, &request.chain_policy) => {
                if let Some(record) = record {
                    tree.ensure_category(&record.category_chain);
                    products.push(record);
                }
            }
        }
        if interrupted {
            warn!("interrupted, flushing partial catalog");
            break;
        }

        if i + 1 < urls.len() {
            tokio::select! {
                biased;
                _ = &mut ctrl_c => {
                    interrupted = true;
                }
                _ = polite_delay(request.delay) => {}
            }
            if interrupted {
                warn!("interrupted, flushing partial catalog");
                break;
            }
        }
    }

    let files = export::write_catalog(&request.out_dir, &mut tree, &products, &request.namespace)?;

    Ok(CrawlSummary {
        products: products.len(),
        categories: tree.len(),
        files,
        interrupted,
    })
}

/// Fetch and extract one product page. Any failure skips the page.
async fn process_page(client: &HttpClient, url: &str, policy: &ChainPolicy) -> Option<ProductRecord> {
    let resp = match client.get(url).await {
        Ok(r) => r,
        Err(e) => {
            warn!("skipping page: {e}");
            return None;
        }
    };
    if !resp.is_success() {
        warn!("skipping {url}: HTTP {}", resp.status);
        return None;
    }

    Some(extract::extract_product(&resp.text(), url, policy))
}

/// Base delay plus a small random jitter.
async fn polite_delay(base: Duration) {
    let jitter = { rand::thread_rng().gen_range(DELAY_JITTER_MS.0..=DELAY_JITTER_MS.1) };
    tokio::time::sleep(base + Duration::from_millis(jitter)).await;
}
