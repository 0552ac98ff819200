//! Glean main entry point
//!
//! This is the command-line interface for the Glean crawler.

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use glean::config::{load_config_with_hash, validate, Config};
use glean::enrich::enrich;
use glean::output::{print_statistics, DocumentSink, JsonlWriter};
use glean::{CrawlEvent, Crawler};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Glean: a polite single-site crawler
///
/// Glean crawls one website breadth-first from a start URL while respecting
/// robots.txt and politeness delays, extracts the main text of every page,
/// and writes enriched documents as JSON Lines.
#[derive(Parser, Debug)]
#[command(name = "glean")]
#[command(version)]
#[command(about = "A polite single-site crawler and content extractor", long_about = None)]
struct Cli {
    /// URL the crawl starts from
    #[arg(long, value_name = "URL")]
    start_url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of documents to extract
    #[arg(long)]
    max_pages: Option<usize>,

    /// Maximum link depth from the start URL
    #[arg(long)]
    max_depth: Option<u32>,

    /// Seconds to wait between requests to the same host
    #[arg(long, value_name = "SECONDS")]
    delay: Option<f64>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// JSONL output file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Only follow links whose path contains this substring
    #[arg(long, value_name = "PATTERN")]
    url_pattern: Option<String>,

    /// Ignore robots.txt
    #[arg(long)]
    no_robots: bool,

    /// Append to the output file instead of overwriting it
    #[arg(long)]
    append: bool,

    /// Validate config and show crawl settings without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies command-line flags on top of the loaded configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(max_pages) = self.max_pages {
            config.crawler.max_pages = max_pages;
        }
        if let Some(max_depth) = self.max_depth {
            config.crawler.max_depth = max_depth;
        }
        if let Some(delay) = self.delay {
            config.crawler.delay_seconds = delay;
        }
        if let Some(timeout) = self.timeout {
            config.crawler.timeout_seconds = timeout;
        }
        if let Some(pattern) = &self.url_pattern {
            config.crawler.url_pattern = Some(pattern.clone());
        }
        if self.no_robots {
            config.crawler.respect_robots = false;
        }
        if let Some(output) = &self.output {
            config.output.path = output.display().to_string();
        }
        if self.append {
            config.output.append = true;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };
    cli.apply_overrides(&mut config);
    validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&cli.start_url, &config);
        return Ok(());
    }

    handle_crawl(&cli.start_url, &config, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("glean=info,warn"),
            1 => EnvFilter::new("glean=debug,info"),
            2 => EnvFilter::new("glean=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective settings
fn handle_dry_run(start_url: &str, config: &Config) {
    println!("=== Glean Dry Run ===\n");

    println!("Start URL: {}\n", start_url);

    println!("Crawler Configuration:");
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Delay: {}s", config.crawler.delay_seconds);
    println!("  Timeout: {}s", config.crawler.timeout_seconds);
    println!(
        "  URL pattern: {}",
        config.crawler.url_pattern.as_deref().unwrap_or("(none)")
    );
    println!("  Respect robots.txt: {}", config.crawler.respect_robots);

    println!("\nRetry:");
    println!("  Max attempts: {}", config.retry.max_attempts);
    println!(
        "  Backoff: {}ms doubling, capped at {}ms",
        config.retry.base_delay_ms, config.retry.max_delay_ms
    );

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Path: {}", config.output.path);
    println!(
        "  Mode: {}",
        if config.output.append { "append" } else { "overwrite" }
    );

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(start_url: &str, config: &Config, quiet: bool) -> anyhow::Result<()> {
    let mut crawler = Crawler::new(start_url, config).context("Failed to start crawl")?;

    let output_path = Path::new(&config.output.path);
    let mut writer = JsonlWriter::create(output_path, config.output.append)
        .with_context(|| format!("Failed to open output file {}", output_path.display()))?;

    while let Some(event) = crawler.next_event().await {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                tracing::error!("Crawl failed: {}", e);
                writer.flush()?;
                return Err(e.into());
            }
        };

        if let CrawlEvent::Document(document) = event {
            writer
                .write_document(&enrich(&document, Utc::now()))
                .with_context(|| format!("Failed to write {}", document.source_url))?;
        }
    }

    writer.flush()?;
    tracing::info!(
        "Wrote {} documents to {}",
        writer.documents_written(),
        writer.path().display()
    );

    if !quiet {
        print_statistics(crawler.statistics());
    }

    Ok(())
}
