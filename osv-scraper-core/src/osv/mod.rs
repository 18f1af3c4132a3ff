//! OSV API client and scraper

pub mod client;
pub mod scraper;
pub mod types;

pub use client::{Client, RateLimit, TokenBucket, VulnerabilityApi};
pub use scraper::{Scraper, VulnerabilityStore};
pub use types::{filter_by_cursor, Affected, Entry, Package, Severity, Vulnerability};
