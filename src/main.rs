//! Endpoint-Ripple main entry point
//!
//! This is the command-line interface for the Endpoint-Ripple endpoint harvester.

use clap::Parser;
use endpoint_ripple::config::{load_config, merge_headers, parse_headers, validate, Config};
use endpoint_ripple::crawler::Coordinator;
use endpoint_ripple::output::{print_report, write_endpoints};
use endpoint_ripple::url::parse_seed_url;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use tracing_subscriber::EnvFilter;

/// Endpoint-Ripple: a same-origin endpoint harvester
///
/// Crawls a site from a seed page, follows internal links up to the given
/// depth, and lists every URL in the pages and their JavaScript that looks
/// like an API or resource endpoint.
#[derive(Parser, Debug)]
#[command(name = "endpoint-ripple")]
#[command(version)]
#[command(about = "Harvest API endpoints from a website and its JavaScript", long_about = None)]
struct Cli {
    /// Target URL to scrape
    #[arg(short, long)]
    url: String,

    /// File to save the endpoints to, one per line
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Depth of link navigation; 1 scans only the seed page [default: 1]
    #[arg(short, long, allow_negative_numbers = true)]
    depth: Option<i64>,

    /// Custom headers as a JSON object, e.g. '{"User-Agent": "CustomBot"}'
    #[arg(long, value_name = "JSON")]
    headers: Option<String>,

    /// Optional TOML settings file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of distinct pages to fetch
    #[arg(long)]
    max_pages: Option<usize>,

    /// Maximum number of simultaneous requests
    #[arg(long)]
    concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Extra attempts for server errors and timeouts
    #[arg(long)]
    retries: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Everything is validated before the first request goes out
    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return Err(e);
        }
    };
    let seed = parse_seed_url(&cli.url).map_err(|e| {
        tracing::error!("Invalid seed URL '{}': {}", cli.url, e);
        e
    })?;

    let depth = config.crawler.max_depth;
    let output_path = config.output.path.clone().map(PathBuf::from);

    tracing::info!("Starting endpoint extraction for: {}", seed);
    tracing::info!("Navigation depth: {}", depth);

    let coordinator = Coordinator::new(config)?;
    spawn_interrupt_handler(&coordinator);

    let report = coordinator.crawl(&seed, depth).await;

    let statistics = (!cli.quiet).then_some(&report.statistics);
    print_report(&report.endpoints, statistics);

    if let Some(path) = output_path {
        if let Err(e) = write_endpoints(&report.endpoints, &path) {
            tracing::error!("Error saving to file: {}", e);
            return Err(e.into());
        }
    }

    if report.cancelled {
        tracing::warn!("Results are partial: the crawl was interrupted");
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
            0 => EnvFilter::new("endpoint_ripple=info,warn"),
            1 => EnvFilter::new("endpoint_ripple=debug,info"),
            2 => EnvFilter::new("endpoint_ripple=trace,debug"),
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

/// Builds the run configuration: settings file, then command-line overrides
fn build_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)?
        }
        None => Config::default(),
    };

    if let Some(depth) = cli.depth {
        config.crawler.max_depth = depth;
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.max_concurrent_fetches = concurrency;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.request_timeout_secs = timeout;
    }
    if let Some(retries) = cli.retries {
        config.crawler.retries = retries;
    }
    if let Some(output) = &cli.output {
        config.output.path = Some(output.display().to_string());
    }
    if let Some(raw) = &cli.headers {
        merge_headers(&mut config, parse_headers(raw)?);
    }

    validate(&config)?;
    Ok(config)
}

/// First Ctrl-C stops the crawl after the current level; a second one exits
fn spawn_interrupt_handler(coordinator: &Coordinator) {
    let cancel = coordinator.cancel_handle();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        tracing::warn!("Interrupt received, finishing the current level (Ctrl-C again to abort)");
        cancel.store(true, Ordering::SeqCst);

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });
}
