//! Data models for the vulnerability store

use chrono::{DateTime, Utc};

/// A vulnerability row.
///
/// `published` is stored as an empty string when absent;
/// `severity_vector` is stored as NULL when empty. The differential
/// report query relies on both conventions.
#[derive(Debug, Clone, PartialEq)]
pub struct VulnerabilityRecord {
    pub id: String,
    pub modified: DateTime<Utc>,
    pub published: Option<DateTime<Utc>>,
    pub summary: String,
    pub details: String,
    pub severity_base_score: Option<f64>,
    pub severity_vector: String,
}

/// An affected-package row, owned by its vulnerability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffectedRecord {
    pub vuln_id: String,
    pub ecosystem: String,
    pub package: String,
}

/// One report row per (vulnerability, ecosystem, package) triple.
/// Timestamps are carried as the stored RFC3339 strings.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub id: String,
    pub ecosystem: String,
    pub package: String,
    pub published: String,
    pub modified: String,
    pub severity_base_score: Option<f64>,
    pub severity_vector: String,
}
