//! `shopcrawl crawl` — run the full catalog crawl and write the CSVs.

use crate::crawler::{self, CrawlRequest};
use crate::extract::ChainPolicy;
use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    base_url: &str,
    limit: usize,
    delay_secs: f64,
    user_agent: Option<String>,
    outdir: PathBuf,
    suffix: String,
    namespace: String,
) -> Result<()> {
    let request = CrawlRequest {
        base_url: base_url.to_string(),
        limit: if limit == 0 { None } else { Some(limit) },
        delay: Duration::from_secs_f64(delay_secs.max(0.0)),
        user_agent,
        out_dir: outdir,
        page_suffix: suffix,
        namespace,
        chain_policy: ChainPolicy::default(),
    };

    let summary = crawler::run(request).await?;

    if summary.interrupted {
        println!("  Interrupted — partial catalog flushed.");
    }
    println!(
        "  Done. Wrote {} & {}",
        summary.files.categories_csv.display(),
        summary.files.products_csv.display()
    );
    println!(
        "  Categories: {} | Products parsed: {}",
        summary.categories, summary.products
    );
    Ok(())
}
