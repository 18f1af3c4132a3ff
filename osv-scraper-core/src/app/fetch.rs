//! Per-ecosystem fetch driver

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::ecosystem::Ecosystem;
use crate::fetcher::SitemapFetcher;
use crate::osv::{filter_by_cursor, Client, Scraper, Vulnerability, VulnerabilityStore};
use crate::severity;
use crate::store::{AffectedRecord, Store, VulnerabilityRecord};
use crate::Result;

/// Fetch vulnerability data from the OSV API for every configured
/// ecosystem.
///
/// A failing ecosystem is logged and skipped; the last failure is
/// returned once the rest have been processed. Data already persisted
/// stays committed.
pub async fn fetch(cfg: &Config, store: Arc<Store>) -> Result<()> {
    if cfg.ecosystems.is_empty() {
        warn!("no ecosystems configured, set OSV_ECOSYSTEMS environment variable");
        return Ok(());
    }

    info!(
        ecosystems = ?cfg.ecosystems.iter().map(Ecosystem::as_str).collect::<Vec<_>>(),
        rateLimit = cfg.rate_limit,
        maxConcurrency = cfg.max_concurrency,
        batchSize = cfg.batch_size,
        "starting vulnerability fetch"
    );

    let client = Client::new(&cfg.api_base_url, cfg.rate_limit, cfg.http_timeout)?;
    let writer = StoreWriter::new(store.clone());
    let scraper = Scraper::new(Arc::new(client), Arc::new(writer));

    let mut last_err = None;
    for eco in &cfg.ecosystems {
        if let Err(err) = process_source(eco, &store, &scraper, cfg).await {
            error!(ecosystem = %eco, error = %err, "failed to process ecosystem");
            last_err = Some(err);
        }
    }

    if let Some(err) = last_err {
        return Err(err);
    }

    info!("completed vulnerability fetch");
    Ok(())
}

/// A discovery source: a name for cursor bookkeeping plus the sitemap
/// it is discovered through. Implemented by [`Ecosystem`]; tests point
/// it elsewhere.
pub trait Source {
    fn name(&self) -> &str;
    fn sitemap_url(&self) -> String;
}

impl Source for Ecosystem {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn sitemap_url(&self) -> String {
        Ecosystem::sitemap_url(self)
    }
}

/// Run the fetch pipeline for a single source: load cursor, discover,
/// retention-filter, process batches, advance cursor, prune.
pub async fn process_source(
    src: &dyn Source,
    store: &Store,
    scraper: &Scraper,
    cfg: &Config,
) -> Result<()> {
    let source = src.name();
    info!(ecosystem = source, "processing ecosystem");

    let retention_cutoff = Utc::now() - Duration::days(cfg.retention_days);

    let cursor = store.get_cursor(source)?;
    match cursor {
        Some(cursor) => info!(ecosystem = source, cursor = %cursor, "resuming from cursor"),
        None => info!(ecosystem = source, "no cursor found, starting from beginning"),
    }

    let fetcher = SitemapFetcher::new(src.sitemap_url())?.with_cursor(cursor);
    let entries = fetcher.fetch().await?;
    info!(ecosystem = source, count = entries.len(), "fetched entries from sitemap");

    // Entries older than the retention window would be pruned right
    // after fetching; drop them before spending API budget.
    let entries = filter_by_cursor(entries, retention_cutoff);
    info!(
        ecosystem = source,
        count = entries.len(),
        cutoff = %retention_cutoff,
        "filtered by retention"
    );

    if entries.is_empty() {
        info!(ecosystem = source, "no new entries to process");
    } else {
        let total = entries.len();
        for (i, batch) in entries.chunks(cfg.batch_size).enumerate() {
            let batch_start = i * cfg.batch_size;
            info!(
                ecosystem = source,
                batchStart = batch_start,
                batchEnd = batch_start + batch.len(),
                total,
                "processing batch"
            );
            scraper.process_entries(batch, cfg.max_concurrency).await?;
        }

        // The sitemap is not guaranteed to be sorted; the max over the
        // processed set never moves the cursor backward.
        if let Some(latest) = entries.iter().map(|e| e.modified).max() {
            store.save_cursor(source, latest)?;
            info!(ecosystem = source, processed = total, cursor = %latest, "completed ecosystem");
        }
    }

    store.delete_vulnerabilities_older_than(retention_cutoff)?;
    info!(ecosystem = source, cutoff = %retention_cutoff, "deleted old data");

    Ok(())
}

/// Adapts the relational store to the scraper's persistence interface,
/// deriving the severity columns on the way in.
pub struct StoreWriter {
    store: Arc<Store>,
}

impl StoreWriter {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}

impl VulnerabilityStore for StoreWriter {
    fn save_vulnerability(&self, vuln: &Vulnerability) -> Result<()> {
        let (base_score, vector) = severity::extract_from_osv(&vuln.severity);

        self.store.save_vulnerability(&VulnerabilityRecord {
            id: vuln.id.clone(),
            modified: vuln.modified,
            published: vuln.published,
            summary: vuln.summary.clone(),
            details: vuln.details.clone(),
            severity_base_score: base_score,
            severity_vector: vector,
        })
    }

    fn save_affected(&self, vuln_id: &str, ecosystem: &str, package: &str) -> Result<()> {
        self.store.save_affected(&AffectedRecord {
            vuln_id: vuln_id.to_string(),
            ecosystem: ecosystem.to_string(),
            package: package.to_string(),
        })
    }

    fn save_tombstone(&self, id: &str) -> Result<()> {
        self.store.save_tombstone(id)
    }
}
