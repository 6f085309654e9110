//! Sumi-Scroll main entry point
//!
//! This is the command-line interface for the Sumi-Scroll documentation
//! scribe.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sumi_scroll::config::{load_config_with_hash, CrawlRequest};
use sumi_scroll::output::{
    create_archive, generate_markdown_summary, prune_expired_archives, CrawlOutcome,
};
use sumi_scroll::progress::{BroadcastReporter, ProgressReporter};
use sumi_scroll::Coordinator;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

/// Sumi-Scroll: a documentation site scribe
///
/// Sumi-Scroll crawls a documentation site breadth-first from a seed URL,
/// stays inside the configured URL scope, and converts every page it
/// visits to Markdown.
#[derive(Parser, Debug)]
#[command(name = "sumi-scroll")]
#[command(version = "1.0.0")]
#[command(about = "A documentation site scribe", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Skip packaging saved pages into a zip archive
    #[arg(long)]
    no_archive: bool,

    /// Print every progress event to stdout as a JSON line
    #[arg(long)]
    events: bool,

    /// Print the crawl outcome to stdout as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let request = CrawlRequest::from_config(config).context("Invalid crawl request")?;

    if cli.dry_run {
        handle_dry_run(&request);
        return Ok(());
    }

    let outcome = handle_crawl(request.clone(), cli.events).await?;

    if let Err(e) = handle_export(&request, &outcome, &config_hash, cli.no_archive) {
        // The crawl itself succeeded; report export trouble separately
        tracing::error!("Export failed: {:#}", e);
        eprintln!("Crawl finished but export failed: {:#}", e);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    if !outcome.is_success() {
        anyhow::bail!(
            "Crawl stopped early: {}",
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_scroll=info,warn"),
            1 => EnvFilter::new("sumi_scroll=debug,info"),
            2 => EnvFilter::new("sumi_scroll=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(request: &CrawlRequest) {
    println!("=== Sumi-Scroll Dry Run ===\n");

    println!("Crawl:");
    println!("  Seed URL: {}", request.url);
    match &request.selector {
        Some(selector) => println!("  Selector: {}", selector.source),
        None => println!("  Selector: (whole body)"),
    }
    println!("  Wait time: {:?}", request.wait_time);
    println!("  Save to file: {}", request.save_to_file);

    println!("\nCrawler Configuration:");
    println!("  Max depth: {}", request.crawler.max_depth);
    println!("  Max pages: {}", request.crawler.max_pages);
    println!("  Path prefix: {}", request.crawler.path_prefix);
    println!("  Concurrency: {}", request.crawler.concurrency);
    println!("  Include patterns ({}):", request.crawler.include_patterns.len());
    for pattern in &request.crawler.include_patterns {
        println!("    - {}", pattern);
    }
    println!("  Exclude patterns ({}):", request.crawler.exclude_patterns.len());
    for pattern in &request.crawler.exclude_patterns {
        println!("    - {}", pattern);
    }

    println!("\nHTTP:");
    println!("  User agent: {}", request.http.user_agent);
    println!("  Timeout: {:?}", request.http.timeout());
    for (name, value) in &request.http.headers {
        println!("  {}: {}", name, value);
    }

    println!("\nOutput:");
    println!("  Content directory: {}", request.output.content_dir);
    println!("  Archive directory: {}", request.output.archive_dir);
    println!("  Archive retention: {:?}", request.output.retention());

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(request: CrawlRequest, print_events: bool) -> anyhow::Result<CrawlOutcome> {
    let reporter = Arc::new(BroadcastReporter::new());

    let printer = print_events.then(|| {
        let mut rx = reporter.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => match serde_json::to_string(&event) {
                        Ok(line) => println!("{}", line),
                        Err(e) => tracing::warn!("Failed to encode progress event: {}", e),
                    },
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!("Event printer fell behind, {} events dropped", n)
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    });

    let coordinator = Coordinator::new(request, reporter.clone() as Arc<dyn ProgressReporter>)?;

    // Ctrl-C stops the crawl but still returns the pages gathered so far
    let cancel = coordinator.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            cancel.cancel();
        }
    });

    let result = coordinator.run().await;

    // Closing the channel ends the printer once it has drained
    drop(reporter);
    if let Some(printer) = printer {
        let _ = printer.await;
    }

    match result {
        Ok(outcome) => {
            tracing::info!(
                "Crawl finished with status {}: {} pages",
                outcome.status.as_str(),
                outcome.total_pages
            );
            Ok(outcome)
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Writes the summary and the archive for a finished crawl
fn handle_export(
    request: &CrawlRequest,
    outcome: &CrawlOutcome,
    config_hash: &str,
    no_archive: bool,
) -> anyhow::Result<()> {
    let content_dir = Path::new(&request.output.content_dir);
    let archive_dir = Path::new(&request.output.archive_dir);

    let mut files = outcome.saved_files();

    if request.output.summary && request.save_to_file {
        let summary_path = content_dir.join("SUMMARY.md");
        generate_markdown_summary(outcome, config_hash, &summary_path)
            .context("Failed to write summary")?;
        println!("✓ Summary written to: {}", summary_path.display());
        files.push(summary_path);
    }

    if no_archive || !request.save_to_file {
        return Ok(());
    }

    let removed = prune_expired_archives(archive_dir, request.output.retention())
        .context("Failed to prune old archives")?;
    if removed > 0 {
        tracing::info!("Removed {} expired archives", removed);
    }

    if outcome.saved_files().is_empty() {
        tracing::warn!("No pages were saved, skipping archive");
        return Ok(());
    }

    let archive = create_archive(
        content_dir,
        &files,
        archive_dir,
        &request.output.archive_prefix,
    )
    .context("Failed to create archive")?;
    println!("✓ Archive written to: {}", archive.display());

    Ok(())
}
