//! Paperclip main entry point
//!
//! Command-line front end for the policy-governed fetch pipeline.

use anyhow::{bail, Context};
use clap::Parser;
use paperclip::config::{default_sources, load_config_with_hash, Config};
use paperclip::fetch::{FetchOutcome, Fetcher};
use paperclip::metrics::print_metrics;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Paperclip: a polite, policy-governed fetcher
///
/// Fetches URLs under a named source policy while respecting its terms
/// restrictions, robots.txt and rate limit, retrying server errors with
/// exponential backoff.
#[derive(Parser, Debug)]
#[command(name = "paperclip")]
#[command(version)]
#[command(about = "A polite, policy-governed fetcher", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in scholarly sources if omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Source whose policy governs the fetches
    #[arg(short, long, required_unless_present = "dry_run")]
    source: Option<String>,

    /// URLs to fetch
    #[arg(value_name = "URL")]
    urls: Vec<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the resolved sources without fetching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration given, using built-in sources");
            Config::from_sources(default_sources())
        }
    };

    if cli.dry_run {
        print_dry_run(&config);
        return Ok(());
    }

    let Some(source) = cli.source else {
        bail!("--source is required");
    };

    let fetcher = Arc::new(Fetcher::from_config(&config)?);
    let Some(policy) = fetcher.policy(&source) else {
        let mut configured: Vec<&str> = fetcher.sources().collect();
        configured.sort_unstable();
        bail!(
            "unknown source '{}' (configured: {})",
            source,
            configured.join(", ")
        );
    };

    tracing::info!(
        "Fetching {} URL(s) as {} ({}, {}/window)",
        cli.urls.len(),
        source,
        policy.user_agent,
        policy.rate_limit_per_minute
    );

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let mut tasks = JoinSet::new();
    for (index, url) in cli.urls.into_iter().enumerate() {
        let fetcher = Arc::clone(&fetcher);
        let source = source.clone();
        let cancel = cancel.clone();
        tasks.spawn(async move {
            let outcome = fetcher.fetch_with_cancel(&url, &source, &cancel).await;
            (index, url, outcome)
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (index, url, outcome) = joined.context("fetch task panicked")?;
        results.push((index, url, outcome?));
    }
    results.sort_by_key(|(index, _, _)| *index);

    if !cli.quiet {
        for (_, url, outcome) in &results {
            match outcome {
                FetchOutcome::Fetched(result) => {
                    println!("{} {} ({} bytes)", result.status_code, url, result.content.len())
                }
                FetchOutcome::Rejected(rejection) => println!("REJECTED {}: {}", url, rejection),
            }
        }
        println!();
        print_metrics(&fetcher.metrics().snapshot());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("paperclip=info,warn"),
            1 => EnvFilter::new("paperclip=debug,info"),
            2 => EnvFilter::new("paperclip=trace,debug"),
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

/// Cancels in-flight fetches on Ctrl-C
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling in-flight fetches");
            cancel.cancel();
        }
    });
}

/// Handles the --dry-run mode: shows the resolved fetcher settings and sources
fn print_dry_run(config: &Config) {
    println!("=== Paperclip Dry Run ===\n");

    println!("Fetcher:");
    println!("  Rate window: {}s", config.fetcher.rate_window_seconds);
    println!("  Request timeout: {}s", config.fetcher.request_timeout_seconds);
    println!("  Robots timeout: {}s", config.fetcher.robots_timeout_seconds);
    match &config.fetcher.failure_log_path {
        Some(path) => println!("  Failure log: {}", path),
        None => println!("  Failure log: (none)"),
    }

    println!("\nSources ({}):", config.sources.len());
    for source in &config.sources {
        println!("  - {}", source.name);
        println!("    User agent: {}", source.user_agent);
        println!("    Rate limit: {}/window", source.rate_limit_per_minute);
        println!(
            "    Retry: {} attempts, backoff {}s..{}s",
            source.retry_policy.max_attempts,
            source.retry_policy.base_backoff_seconds,
            source.retry_policy.max_backoff_seconds
        );
        if !source.terms_policy.allowed_domains.is_empty() {
            println!(
                "    Allowed domains: {}",
                source.terms_policy.allowed_domains.join(", ")
            );
        }
        if !source.terms_policy.prohibited_domains.is_empty() {
            println!(
                "    Prohibited domains: {}",
                source.terms_policy.prohibited_domains.join(", ")
            );
        }
    }

    println!("\n✓ Configuration is valid");
}
