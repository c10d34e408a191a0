//! linkprobe main entry point
//!
//! This is the command-line interface for the linkprobe link-health checker.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use linkprobe::config::{load_or_default, validate, Config};
use linkprobe::crawler::{check_urls, run_crawl, Fetcher};
use linkprobe::output::{
    print_statistics, write_report, CrawlStatistics, CHECK_REPORT_PREFIX, CRAWL_REPORT_PREFIX,
};
use linkprobe::state::PageResult;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// linkprobe: a polite link-health checker
///
/// linkprobe crawls a site breadth-first from a seed URL, or checks a list of
/// URLs from a CSV file, and writes a CSV report of every page's status,
/// redirect chain and timing. Failing pages never change the exit code.
#[derive(Parser, Debug)]
#[command(name = "linkprobe")]
#[command(version = "1.0.0")]
#[command(about = "A polite link-health checker", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a site breadth-first from a seed URL
    Crawl(CrawlArgs),

    /// Check every URL listed in a CSV file
    Check(CheckArgs),
}

/// Flags shared by both subcommands
#[derive(Args, Debug)]
struct HttpArgs {
    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<f64>,

    /// Pause after every fetch, in seconds
    #[arg(long, value_name = "SECS")]
    delay: Option<f64>,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,

    /// Directory the report is written to
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Seed URL; https is assumed when no scheme is given
    #[arg(value_name = "URL")]
    url: String,

    /// Maximum link distance from the seed
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Maximum number of pages fetched
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Check the seed page only
    #[arg(long)]
    single: bool,

    /// Follow links to other hosts
    #[arg(long)]
    allow_cross_domain: bool,

    /// Ignore robots.txt
    #[arg(long)]
    no_robots: bool,

    #[command(flatten)]
    http: HttpArgs,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// CSV file with a URL column
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Only check hosts within this domain
    #[arg(long, value_name = "DOMAIN")]
    allowed_domain: Option<String>,

    #[command(flatten)]
    http: HttpArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load_or_default(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to build default configuration".to_string(),
    })?;

    match cli.command {
        Command::Crawl(args) => {
            apply_crawl_args(&mut config, &args);
            validate(&config).context("Invalid configuration")?;
            handle_crawl(&args.url, config).await
        }
        Command::Check(args) => {
            apply_http_args(&mut config, &args.http);
            if let Some(domain) = &args.allowed_domain {
                config.check.allowed_domain = Some(domain.clone());
            }
            validate(&config).context("Invalid configuration")?;
            handle_check(&args.input, config).await
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkprobe=info,warn"),
            1 => EnvFilter::new("linkprobe=debug,info"),
            2 => EnvFilter::new("linkprobe=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn apply_http_args(config: &mut Config, args: &HttpArgs) {
    if let Some(timeout) = args.timeout {
        config.http.timeout = timeout;
    }
    if let Some(delay) = args.delay {
        config.crawler.delay = delay;
    }
    if args.insecure {
        config.http.verify_tls = false;
    }
    if let Some(dir) = &args.output_dir {
        config.output.directory = dir.clone();
    }
}

fn apply_crawl_args(config: &mut Config, args: &CrawlArgs) {
    apply_http_args(config, &args.http);

    if let Some(depth) = args.max_depth {
        config.crawler.max_depth = depth;
    }
    if args.single {
        config.crawler.max_depth = 0;
    }
    if let Some(pages) = args.max_pages {
        config.crawler.max_pages = pages;
    }
    if args.allow_cross_domain {
        config.crawler.same_domain_only = false;
    }
    if args.no_robots {
        config.robots.respect = false;
    }
}

/// Handles the crawl subcommand
async fn handle_crawl(seed: &str, config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} (max depth {}, max pages {})",
        seed,
        config.crawler.max_depth,
        config.crawler.max_pages
    );

    let directory = config.output.directory.clone();
    let results = run_crawl(seed, config)
        .await
        .with_context(|| format!("Failed to start crawl of {}", seed))?;

    finish(&results, &directory, CRAWL_REPORT_PREFIX)
}

/// Handles the check subcommand
async fn handle_check(input: &Path, config: Config) -> anyhow::Result<()> {
    let urls = linkprobe::crawler::read_url_list(input)
        .with_context(|| format!("Failed to read URL list from {}", input.display()))?;
    tracing::info!("Checking {} URLs from {}", urls.len(), input.display());

    let fetcher = Fetcher::new(&config.http).context("Failed to build HTTP client")?;
    let results = check_urls(
        &fetcher,
        &urls,
        config.check.allowed_domain.as_deref(),
        config.crawler.delay(),
    )
    .await;

    finish(&results, &config.output.directory, CHECK_REPORT_PREFIX)
}

/// Writes the report and prints the summary
fn finish(results: &[PageResult], directory: &Path, prefix: &str) -> anyhow::Result<()> {
    std::fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create output directory {}", directory.display()))?;

    let report = write_report(results, directory, prefix)
        .with_context(|| format!("Failed to write report to {}", directory.display()))?;

    print_statistics(&CrawlStatistics::from_results(results), &report);
    Ok(())
}
