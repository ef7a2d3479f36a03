//! News-Catalog main entry point
//!
//! This is the command-line interface for the "in the news" story catalog.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use news_catalog::cache::{import_snapshots, HeadCache};
use news_catalog::config::{load_config_with_hash, validate, Config};
use news_catalog::output::{
    print_catalog_statistics, print_run_summary, render_snapshot_index_csv, CatalogStatistics,
};
use news_catalog::storage::{write_if_changed, CatalogStore, YamlCatalogStore};
use news_catalog::url::PublisherTable;
use news_catalog::run_enrichment;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// News-Catalog: an "in the news" story ledger
///
/// Fetches article URLs, extracts bylined-article metadata, and keeps a deduplicated
/// catalog of stories plus queues of URLs that need review or a manual snapshot.
#[derive(Parser, Debug)]
#[command(name = "news-catalog")]
#[command(version = "1.0.0")]
#[command(about = "Maintains a deduplicated catalog of news stories", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply without one)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch input URLs and update the catalog
    Enrich(EnrichArgs),

    /// Import manually saved page snapshots into the head cache
    SnapshotExtract(SnapshotArgs),

    /// Validate configuration and show catalog statistics without network access
    Check,
}

#[derive(Args, Debug)]
struct EnrichArgs {
    /// Input CSV with a `url` column
    #[arg(short, long)]
    input: Option<String>,

    /// Catalog YAML file
    #[arg(short, long)]
    output: Option<String>,

    /// Review CSV file
    #[arg(short, long)]
    review: Option<String>,

    /// Snapshot queue CSV file
    #[arg(long)]
    snapshot: Option<String>,

    /// Head cache directory
    #[arg(long)]
    head_cache_dir: Option<String>,

    /// Maximum random sleep before each request, in seconds
    #[arg(short, long)]
    sleep_max: Option<f64>,

    /// Request timeout, in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Only process the first N input URLs
    #[arg(short = 'n', long)]
    max: Option<usize>,
}

#[derive(Args, Debug)]
struct SnapshotArgs {
    /// Directory of saved `*.html` snapshots
    #[arg(short, long)]
    input_dir: Option<String>,

    /// Index CSV to write
    #[arg(long)]
    index: Option<String>,

    /// Head cache directory
    #[arg(long)]
    head_cache_dir: Option<String>,

    /// Only import the first N snapshots
    #[arg(short = 'n', long)]
    max: Option<usize>,

    /// Report what would be imported without writing cache files
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(cli.config.as_deref())?;

    match cli.command {
        Command::Enrich(args) => handle_enrich(config, args).await,
        Command::SnapshotExtract(args) => handle_snapshot_extract(config, args),
        Command::Check => handle_check(&config),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("news_catalog=info,warn"),
            1 => EnvFilter::new("news_catalog=debug,info"),
            2 => EnvFilter::new("news_catalog=trace,debug"),
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

/// Loads the configuration file if one was given, else the defaults
fn load_configuration(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        tracing::info!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Handles `enrich`: applies CLI overrides and runs the pipeline
async fn handle_enrich(mut config: Config, args: EnrichArgs) -> Result<()> {
    let paths = &mut config.paths;
    for (target, value) in [
        (&mut paths.input_csv, args.input),
        (&mut paths.catalog, args.output),
        (&mut paths.review_csv, args.review),
        (&mut paths.snapshot_csv, args.snapshot),
        (&mut paths.head_cache_dir, args.head_cache_dir),
    ] {
        if let Some(value) = value {
            *target = value;
        }
    }
    if let Some(secs) = args.sleep_max {
        config.fetch.sleep_max_ms = (secs.max(0.0) * 1000.0).round() as u64;
    }
    if let Some(secs) = args.timeout {
        config.fetch.timeout_secs = secs;
    }
    validate(&config).context("Invalid command-line overrides")?;

    tracing::info!(
        "Input: {}, catalog: {}, head cache: {}",
        config.paths.input_csv,
        config.paths.catalog,
        config.paths.head_cache_dir
    );

    let outcome = run_enrichment(&config, args.max)
        .await
        .context("Enrichment failed")?;

    print_run_summary(&outcome.summary);
    Ok(())
}

/// Handles `snapshot-extract`: imports snapshots and writes the index CSV
fn handle_snapshot_extract(mut config: Config, args: SnapshotArgs) -> Result<()> {
    if let Some(dir) = args.input_dir {
        config.snapshots.input_dir = dir;
    }
    if let Some(index) = args.index {
        config.snapshots.index_csv = index;
    }
    if let Some(dir) = args.head_cache_dir {
        config.paths.head_cache_dir = dir;
    }

    let cache = HeadCache::new(&config.paths.head_cache_dir);
    let input_dir = Path::new(&config.snapshots.input_dir);
    let rows = import_snapshots(input_dir, &cache, args.max, args.dry_run)
        .with_context(|| format!("Failed to import snapshots from {}", input_dir.display()))?;

    let index_path = Path::new(&config.snapshots.index_csv);
    let wrote = write_if_changed(index_path, &render_snapshot_index_csv(&rows)?)
        .with_context(|| format!("Failed to write {}", index_path.display()))?;

    let ok = rows.iter().filter(|r| r.ok()).count();
    println!("Snapshots: {}", rows.len());
    println!("Imported: {}{}", ok, if args.dry_run { " (dry run)" } else { "" });
    println!("Failed: {}", rows.len() - ok);
    println!("Wrote index CSV: {}", wrote);
    Ok(())
}

/// Handles `check`: validates config and prints catalog statistics
fn handle_check(config: &Config) -> Result<()> {
    let publishers = PublisherTable::from_entries(&config.publishers);
    println!("Publishers: {}", publishers.len());
    println!("Catalog: {}\n", config.paths.catalog);

    let store = YamlCatalogStore::new(&config.paths.catalog, publishers);
    let catalog = store
        .load()
        .with_context(|| format!("Failed to load catalog {}", config.paths.catalog))?;

    print_catalog_statistics(&CatalogStatistics::from_catalog(&catalog));
    println!("\n✓ Configuration is valid");
    Ok(())
}
