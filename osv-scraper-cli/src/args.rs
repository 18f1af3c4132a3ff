//! CLI argument parsing

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "osv-scraper")]
#[command(
    author,
    version,
    about = "Incremental OSV vulnerability fetcher and differential reporter"
)]
#[command(after_help = "\
EXAMPLES:
  # Fetch vulnerability data
  OSV_ECOSYSTEMS=npm,PyPI osv-scraper --fetch

  # Generate a markdown report (creates report_<timestamp>.md)
  osv-scraper --report --format markdown --output report.md

  # Generate a differential CSV report for npm only
  osv-scraper --report --diff --format csv --ecosystem npm --output npm-diff.csv

FETCH ENVIRONMENT:
  OSV_ECOSYSTEMS          Comma-separated list of ecosystems (npm,PyPI,Go,...)
  OSV_API_BASE_URL        OSV API base URL (default: https://api.osv.dev)
  OSV_DB_PATH             Database path (default: ./osv.db)
  OSV_DATA_RETENTION_DAYS Data retention period in days (default: 7)
  OSV_RATE_LIMIT          API requests per second (default: 10)
  OSV_MAX_CONCURRENCY     Parallel in-flight API calls (default: 5)
  OSV_BATCH_SIZE          Entries per sequential batch (default: 100)
  OSV_HTTP_TIMEOUT        Per-request timeout in seconds (default: 30)")]
pub struct Args {
    /// Fetch latest vulnerability data from the OSV API
    #[arg(long)]
    pub fetch: bool,

    /// Generate a report from the local database
    #[arg(long)]
    pub report: bool,

    /// Report format: markdown, csv, jsonl
    #[arg(long, default_value = "markdown")]
    pub format: String,

    /// Report output base path (timestamp suffix appended before the extension)
    #[arg(long, default_value = "./report.md")]
    pub output: PathBuf,

    /// Filter report by ecosystem (empty = all)
    #[arg(long, default_value = "")]
    pub ecosystem: String,

    /// Generate a differential report (only new/changed vulnerabilities)
    #[arg(long)]
    pub diff: bool,
}
