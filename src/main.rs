//! Leadsweep main entry point
//!
//! This is the command-line interface for the Leadsweep listing harvester.

use anyhow::{bail, Context};
use clap::Parser;
use leadsweep::config::{load_config_with_hash, validate, Config};
use leadsweep::crawler::{CrawlJob, CrawlRequest, Partition};
use leadsweep::output::{compute_statistics, print_statistics, print_summary, write_summary_json};
use leadsweep::store::dataset_path;
use leadsweep::{CsvRecordStore, RecordMap, RecordStore};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Leadsweep: a paced map-listing harvester
///
/// Leadsweep searches a business category across a list of postal codes,
/// scrolls every result list, visits each unique listing once and merges the
/// details into a CSV dataset that is updated in place on every run.
#[derive(Parser, Debug)]
#[command(name = "leadsweep")]
#[command(version = "1.0.0")]
#[command(about = "A paced map-listing harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Dataset file name under the output directory (".csv" is appended if missing)
    #[arg(short, long, value_name = "NAME")]
    file: String,

    /// Comma-separated partition keys, e.g. "10001, 10002"
    #[arg(short, long, required_unless_present = "stats")]
    zips: Option<String>,

    /// Business category to search for, e.g. "Lawyer"
    #[arg(long, required_unless_present = "stats")]
    category: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the searches that would run without opening a browser
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics for the dataset and exit
    #[arg(long, conflicts_with_all = ["dry_run", "summary_json"])]
    stats: bool,

    /// Write the run summary as JSON to this path
    #[arg(long, value_name = "PATH")]
    summary_json: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(cli.config.as_deref())?;
    let path = dataset_path(Path::new(&config.output.data_dir), &cli.file);

    if cli.stats {
        return handle_stats(&path);
    }

    let request = CrawlRequest::new(
        cli.file.clone(),
        cli.zips.as_deref().unwrap_or_default(),
        cli.category.clone().unwrap_or_default(),
    );
    if request.partition_keys.is_empty() {
        bail!("No partition keys given; pass at least one with --zips");
    }
    if request.category.trim().is_empty() {
        bail!("Category must not be empty");
    }

    if cli.dry_run {
        handle_dry_run(&config, &request, &path);
        return Ok(());
    }

    handle_crawl(config, request, cli.summary_json.as_deref()).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("leadsweep=info,warn"),
            1 => EnvFilter::new("leadsweep=debug,info"),
            2 => EnvFilter::new("leadsweep=trace,debug"),
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

fn load_configuration(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        None => {
            let config = Config::default();
            validate(&config).context("Built-in configuration is invalid")?;
            tracing::debug!("No configuration file given, using defaults");
            Ok(config)
        }
    }
}

/// Handles the --dry-run mode: shows the configuration and the searches that would run
fn handle_dry_run(config: &Config, request: &CrawlRequest, path: &Path) {
    println!("=== Leadsweep Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max scroll cycles: {}", config.crawler.max_scroll_cycles);
    println!("  Stuck threshold: {}", config.crawler.stuck_threshold);
    println!("  Run timeout: {} minutes", config.crawler.run_timeout_minutes);

    println!("\nPacing:");
    println!(
        "  Detail delay: {}-{}ms, break of {}ms every {} visits",
        config.pacing.detail_delay_min_ms,
        config.pacing.detail_delay_max_ms,
        config.pacing.break_duration_ms,
        config.pacing.break_every
    );
    println!(
        "  Scroll delay: {}-{}ms",
        config.pacing.scroll_delay_min_ms, config.pacing.scroll_delay_max_ms
    );

    println!("\nBrowser:");
    println!("  Headless: {}", config.browser.headless);
    println!("  Profile directory: {}", config.browser.user_data_dir);
    println!("  User agents: {}", config.browser.user_agents.len());

    println!("\nOutput:");
    println!("  Dataset: {}", path.display());

    let partitions: Vec<Partition> = request.partitions();
    println!("\nSearches ({}):", partitions.len());
    for partition in &partitions {
        println!("  - {}", partition.query());
        println!("    * {}", partition.search_url(&config.crawler.search_url));
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics for the dataset
fn handle_stats(path: &Path) -> anyhow::Result<()> {
    println!("Dataset: {}\n", path.display());

    let store = CsvRecordStore::new(path);
    let records = store
        .load()
        .with_context(|| format!("Failed to read {}", path.display()))?;

    print_statistics(&compute_statistics(&records));

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    request: CrawlRequest,
    summary_json: Option<&Path>,
) -> anyhow::Result<()> {
    tracing::info!(
        "Searching '{}' across {} partition(s)",
        request.category,
        request.partition_keys.len()
    );

    let mut job = CrawlJob::launch(config, request)
        .await
        .context("Failed to start crawl")?;

    let printer = job.take_events().map(|mut events| {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                println!("{}", event);
            }
        })
    });

    let cancel = job.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping and saving collected results...");
            cancel.cancel();
        }
    });

    let result = job.wait().await;

    // The event stream ends with the run, so the printer finishes on its own
    if let Some(printer) = printer {
        if let Err(e) = printer.await {
            tracing::debug!("Event printer ended abnormally: {}", e);
        }
    }

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    println!();
    print_summary(&summary);

    let records: RecordMap = summary
        .records
        .iter()
        .map(|record| (record.source_link.clone(), record.clone()))
        .collect();
    println!();
    print_statistics(&compute_statistics(&records));

    if let Some(path) = summary_json {
        write_summary_json(&summary, path)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
        tracing::info!("Summary written to {}", path.display());
    }

    Ok(())
}
