//! Error types for osv-scraper-core

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using osv-scraper Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for osv-scraper
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Configuration error: {0}")]
    #[diagnostic(code(osv_scraper::config))]
    Config(String),

    #[error("Database error: {0}")]
    #[diagnostic(code(osv_scraper::database))]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    #[diagnostic(code(osv_scraper::http))]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    #[diagnostic(code(osv_scraper::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(osv_scraper::serde))]
    Serde(#[from] serde_json::Error),

    #[error("Sitemap error: {0}")]
    #[diagnostic(code(osv_scraper::sitemap))]
    Sitemap(String),

    #[error("Vulnerability not found: {0}")]
    #[diagnostic(code(osv_scraper::api::not_found))]
    NotFound(String),

    #[error("Bad request for vulnerability: {0}")]
    #[diagnostic(code(osv_scraper::api::bad_request))]
    BadRequest(String),

    #[error("Too many requests")]
    #[diagnostic(code(osv_scraper::api::rate_limited))]
    TooManyRequests,

    #[error("Unexpected status code: {0}")]
    #[diagnostic(code(osv_scraper::api::status))]
    UnexpectedStatus(u16),

    #[error("Unsupported severity vector {vector}: {reason}")]
    #[diagnostic(code(osv_scraper::severity))]
    Severity { vector: String, reason: String },

    #[error("Invalid ecosystem: {0}")]
    #[diagnostic(code(osv_scraper::ecosystem))]
    InvalidEcosystem(String),

    #[error("Report generation error: {0}")]
    #[diagnostic(code(osv_scraper::report))]
    Report(String),

    #[error("Task failure: {0}")]
    #[diagnostic(code(osv_scraper::task))]
    Task(String),

    #[error("Operation cancelled")]
    #[diagnostic(code(osv_scraper::cancelled))]
    Cancelled,
}
