//! Fetch-and-persist coordination for discovered entries

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::osv::client::VulnerabilityApi;
use crate::osv::types::{Entry, Vulnerability};
use crate::{Error, Result};

/// Persistence interface the scraper writes through.
///
/// Implementations must be safe to call from concurrent tasks.
pub trait VulnerabilityStore: Send + Sync {
    fn save_vulnerability(&self, vuln: &Vulnerability) -> Result<()>;
    fn save_affected(&self, vuln_id: &str, ecosystem: &str, package: &str) -> Result<()>;
    fn save_tombstone(&self, id: &str) -> Result<()>;
}

/// Coordinates fetching and storing vulnerability data
pub struct Scraper {
    api: Arc<dyn VulnerabilityApi>,
    store: Arc<dyn VulnerabilityStore>,
}

impl Scraper {
    pub fn new(api: Arc<dyn VulnerabilityApi>, store: Arc<dyn VulnerabilityStore>) -> Self {
        Self { api, store }
    }

    /// Process entries with at most `max_concurrency` in-flight fetches.
    ///
    /// The first failure cancels the remaining tasks and is returned
    /// once every task has settled. Entries already persisted by
    /// sibling tasks stay committed.
    pub async fn process_entries(&self, entries: &[Entry], max_concurrency: usize) -> Result<()> {
        let semaphore = Arc::new(Semaphore::new(max_concurrency));
        let cancel = CancellationToken::new();
        let mut handles = Vec::with_capacity(entries.len());

        for entry in entries.iter().cloned() {
            let api = self.api.clone();
            let store = self.store.clone();
            let semaphore = semaphore.clone();
            let cancel = cancel.clone();

            handles.push(tokio::spawn(async move {
                let _permit = tokio::select! {
                    permit = semaphore.acquire_owned() => {
                        permit.map_err(|_| Error::Cancelled)?
                    }
                    _ = cancel.cancelled() => return Err(Error::Cancelled),
                };

                tokio::select! {
                    result = process_entry(api.as_ref(), store.as_ref(), &entry) => result,
                    _ = cancel.cancelled() => Err(Error::Cancelled),
                }
            }));
        }

        let mut first_err = None;
        for handle in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(join_err) => Err(Error::Task(join_err.to_string())),
            };
            if let Err(err) = result {
                if first_err.is_none() && !matches!(err, Error::Cancelled) {
                    cancel.cancel();
                    first_err = Some(err);
                }
            }
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

async fn process_entry(
    api: &dyn VulnerabilityApi,
    store: &dyn VulnerabilityStore,
    entry: &Entry,
) -> Result<()> {
    let vuln = match api.get_vulnerability(&entry.id).await {
        Ok(vuln) => vuln,
        Err(Error::NotFound(_)) => {
            debug!(id = %entry.id, "vulnerability gone upstream, writing tombstone");
            return store.save_tombstone(&entry.id);
        }
        Err(err) => return Err(err),
    };

    store.save_vulnerability(&vuln)?;

    for affected in &vuln.affected {
        store.save_affected(&vuln.id, &affected.package.ecosystem, &affected.package.name)?;
    }

    Ok(())
}
