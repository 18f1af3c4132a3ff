use std::sync::Arc;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use osv_scraper_core::app::{self, ReportOptions};
use osv_scraper_core::config::Config;
use osv_scraper_core::report::ReportFormat;
use osv_scraper_core::store::Store;

mod args;

use args::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // No mode selected: show usage and succeed.
    if !args.fetch && !args.report {
        Args::command().print_long_help()?;
        return Ok(());
    }

    let config = Config::load()?;
    let store = Arc::new(Store::open(&config.db_path)?);

    if args.report {
        let opts = ReportOptions {
            format: ReportFormat::parse(&args.format)?,
            output: args.output,
            ecosystem: (!args.ecosystem.is_empty()).then_some(args.ecosystem),
            diff: args.diff,
        };
        app::generate_report(&store, &opts)?;
        return Ok(());
    }

    app::fetch(&config, store).await?;
    Ok(())
}
