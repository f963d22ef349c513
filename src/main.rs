//! Gifgrab main entry point
//!
//! This is the command-line interface for the Gifgrab favorite GIF downloader.

use anyhow::Context;
use clap::Parser;
use gifgrab::config::{load_config_with_hash, validate, Config};
use gifgrab::downloader::{plan, run};
use gifgrab::output::{print_summary, LogProgress};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Gifgrab: saves your favorited GIFs from a data package
///
/// Reads the favorite GIF list from your zipped data package, downloads the
/// GIFs hosted on the media host through a polite rate limit, and writes the
/// downloads that failed to a JSON file for later.
#[derive(Parser, Debug)]
#[command(name = "gifgrab")]
#[command(version)]
#[command(about = "Saves your favorited GIFs from a data package", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to the zipped data package
    #[arg(long, value_name = "ZIP")]
    package: Option<PathBuf>,

    /// Directory to save downloads into (must not exist)
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Where to write the failed download list
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Requests started per release window
    #[arg(long, value_name = "N")]
    concurrency: Option<u32>,

    /// Milliseconds before a request slot can be reused
    #[arg(long, value_name = "MS")]
    release_delay_ms: Option<u64>,

    /// Check the package and list what would be downloaded, without downloading
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the file configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(package) = &self.package {
            config.paths.package_path = package.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.paths.output_dir = output_dir.clone();
        }
        if let Some(report) = &self.report {
            config.paths.report_path = report.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.downloader.max_concurrent_requests = concurrency;
        }
        if let Some(delay) = self.release_delay_ms {
            config.downloader.release_delay_ms = delay;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!(
        "Gifgrab v{}: saves your favorited GIFs from your data package",
        env!("CARGO_PKG_VERSION")
    );

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    cli.apply_overrides(&mut config);
    validate(&config).context("Invalid command-line override")?;

    if cli.dry_run {
        handle_dry_run(&config)
    } else {
        handle_download(&config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("gifgrab=info,warn"),
            1 => EnvFilter::new("gifgrab=debug,info"),
            2 => EnvFilter::new("gifgrab=trace,debug"),
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

/// Handles the --dry-run mode: runs the prechecks and lists the URLs
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let media = plan(config)?;

    println!("=== Gifgrab Dry Run ===\n");

    println!("Downloader Configuration:");
    println!(
        "  Requests per window: {}",
        config.downloader.max_concurrent_requests
    );
    println!("  Release delay: {}ms", config.downloader.release_delay_ms);
    println!(
        "  Request timeout: {}s",
        config.downloader.request_timeout_secs
    );
    println!(
        "  Expected content type: {}",
        config.filter.expected_content_type
    );

    println!("\nPaths:");
    println!("  Package: {}", config.paths.package_path.display());
    println!("  Output: {}", config.paths.output_dir.display());
    println!("  Report: {}", config.paths.report_path.display());

    println!(
        "\nURLs on {} ({} of {} favorites):",
        config.filter.target_host,
        media.urls.len(),
        media.favorites_found
    );
    for url in &media.urls {
        println!("  - {}", url);
    }

    println!("\n✓ Would download {} files", media.urls.len());

    Ok(())
}

/// Handles the main download operation
///
/// Errors are returned unlogged; `main` prints them once on exit.
async fn handle_download(config: &Config) -> anyhow::Result<()> {
    let progress = LogProgress::default();

    let summary = run(config, &progress).await?;

    print_summary(&summary);
    println!(
        "\nFailed list saved to {}. Move your GIFs elsewhere before running again.",
        config.paths.report_path.display()
    );

    Ok(())
}
