//! OSV API wire types and discovery entries

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A package within an affected entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Package {
    #[serde(default)]
    pub ecosystem: String,
    #[serde(default)]
    pub name: String,
}

/// Affected packages and versions
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Affected {
    #[serde(default)]
    pub package: Package,
}

/// Severity information attached to a vulnerability
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Severity {
    #[serde(rename = "type", default)]
    pub severity_type: String,
    #[serde(default)]
    pub score: String,
}

/// A reference link
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Reference {
    #[serde(rename = "type", default)]
    pub reference_type: String,
    #[serde(default)]
    pub url: String,
}

/// A vulnerability record from the OSV API.
///
/// Unknown fields in the response are ignored; `modified` is the only
/// required timestamp.
#[derive(Debug, Clone, Deserialize)]
pub struct Vulnerability {
    pub id: String,
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub published: Option<DateTime<Utc>>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub affected: Vec<Affected>,
    #[serde(default)]
    pub severity: Vec<Severity>,
    #[serde(default)]
    pub references: Vec<Reference>,
}

/// A discovered vulnerability id with its last-modified instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: String,
    pub modified: DateTime<Utc>,
}

/// Keep only entries modified strictly after the cursor.
pub fn filter_by_cursor(entries: Vec<Entry>, cursor: DateTime<Utc>) -> Vec<Entry> {
    entries
        .into_iter()
        .filter(|e| e.modified > cursor)
        .collect()
}
