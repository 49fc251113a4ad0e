//! Gallery Crawler main entry point
//!
//! This is the command-line interface for the resumable gallery index crawler.

use anyhow::Context;
use clap::Parser;
use gallery_crawler::config::{default_config, load_config_with_hash, Config};
use gallery_crawler::crawler::crawl;
use gallery_crawler::state::locate_resume_point;
use gallery_crawler::storage::JsonSnapshotStore;
use gallery_crawler::{Credential, IndexQuery, Session};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Gallery Crawler: a resumable gallery index crawler
///
/// Walks the backward pagination chain of an authenticated gallery index and
/// writes one JSON snapshot per page. Re-running picks up at the highest
/// snapshot already on disk.
#[derive(Parser, Debug)]
#[command(name = "gallery-crawler")]
#[command(version)]
#[command(about = "A resumable gallery index crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(long, value_name = "PATH", env = "GALLERY_CRAWLER_CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show where the crawl would start without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics for the snapshot directory and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The credential may live in a .env file; real environment variables win
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load(cli.config.as_deref())?;

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("gallery_crawler=info,warn"),
            1 => EnvFilter::new("gallery_crawler=debug,info"),
            2 => EnvFilter::new("gallery_crawler=trace,debug"),
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

/// Loads the configuration file, or the built-in defaults without one
fn load(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Ok(default_config()?)
        }
    }
}

/// Handles the --dry-run mode: validates config and shows where the crawl would start
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Gallery Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  Output directory: {}", config.crawler.output_dir.display());
    println!(
        "  Timeouts: {}s request, {}s connect",
        config.crawler.request_timeout_secs, config.crawler.connect_timeout_secs
    );
    println!("  Empty output policy: {:?}", config.crawler.empty_output);

    println!("\nRetry:");
    if config.retry.max_attempts == 0 {
        println!("  Max consecutive failures: unlimited");
    } else {
        println!("  Max consecutive failures: {}", config.retry.max_attempts);
    }
    println!(
        "  Backoff: {}ms doubling up to {}ms",
        config.retry.initial_delay_ms, config.retry.max_delay_ms
    );

    println!("\nSession:");
    let var = &config.session.credential_var;
    match Credential::from_env(var)
        .and_then(|c| Session::from_credential(&c, config.session.cookie_domain.clone()))
    {
        Ok(session) => println!("  {}: set ({} cookies)", var, session.cookies().len()),
        Err(e) => println!("  {}: {}", var, e),
    }

    let query = IndexQuery::from_config(config)?;
    let store = JsonSnapshotStore::new(&config.crawler.output_dir);
    let resume = locate_resume_point(&store, config.crawler.empty_output)?;

    println!("\nResume:");
    match resume.cursor() {
        Some(cursor) => println!("  Highest snapshot: {}", cursor),
        None => println!("  No snapshots yet, starting from the index root"),
    }
    println!("  Start URL: {}", query.start_url(resume));

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: summarizes the snapshot directory
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use gallery_crawler::output::{load_statistics, print_statistics};

    println!("Snapshots: {}\n", config.crawler.output_dir.display());

    let store = JsonSnapshotStore::new(&config.crawler.output_dir);
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Starting crawl (will resume from {} if snapshots exist)",
        config.crawler.output_dir.display()
    );

    match crawl(config).await {
        Ok(report) => {
            tracing::info!(
                "Crawl completed successfully: {} pages, {} items, last cursor {}",
                report.pages_persisted,
                report.items_persisted,
                report
                    .last_cursor
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "-".to_string())
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
