// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{Parser, Subcommand};
use shopcrawl::cli;
use shopcrawl::ident::DEFAULT_NAMESPACE;
use std::path::PathBuf;

const DEFAULT_BASE_URL: &str = "https://cellphones.com.vn";

#[derive(Parser)]
#[command(
    name = "shopcrawl",
    about = "Shopcrawl — walk a storefront's sitemaps into a CSV product catalog",
    version,
    after_help = "Run 'shopcrawl <command> --help' for details on each command."
)]
struct Cli {
    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the product catalog and write categories.csv + products.csv
    Crawl {
        /// Site root to crawl
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        base_url: String,
        /// Maximum number of products (0 = unbounded)
        #[arg(long, default_value = "200")]
        limit: usize,
        /// Base delay between product fetches, in seconds
        #[arg(long, default_value = "0.35")]
        delay: f64,
        /// Custom User-Agent header
        #[arg(long)]
        user_agent: Option<String>,
        /// Output directory for the CSV files
        #[arg(long, default_value = ".")]
        outdir: PathBuf,
        /// Leaf page suffix used to tell product pages from other entries
        #[arg(long, default_value = ".html")]
        suffix: String,
        /// Namespace prefix for deterministic IDs
        #[arg(long, default_value = DEFAULT_NAMESPACE)]
        namespace: String,
    },
    /// Probe and classify the site's sitemap documents without crawling
    Sitemaps {
        /// Site root to probe
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        base_url: String,
        /// Custom User-Agent header
        #[arg(long)]
        user_agent: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_directive = if cli.verbose {
        "shopcrawl=debug"
    } else if cli.quiet {
        "shopcrawl=warn"
    } else {
        "shopcrawl=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_directive.parse().unwrap()),
        )
        .init();

    let result = match cli.command {
        Commands::Crawl {
            base_url,
            limit,
            delay,
            user_agent,
            outdir,
            suffix,
            namespace,
        } => {
            cli::crawl_cmd::run(&base_url, limit, delay, user_agent, outdir, suffix, namespace)
                .await
        }
        Commands::Sitemaps {
            base_url,
            user_agent,
        } => cli::sitemaps_cmd::run(&base_url, user_agent).await,
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        eprintln!("  Error: {e:#}");
        std::process::exit(1);
    }

    result
}
