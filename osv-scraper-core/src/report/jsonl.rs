//! JSON Lines report

use serde::Serialize;

use crate::store::ReportEntry;
use crate::Result;

use super::{format_base_score, format_string};

#[derive(Serialize)]
struct JsonlRow<'a> {
    ecosystem: &'a str,
    package: &'a str,
    source: &'a str,
    published: &'a str,
    modified: &'a str,
    severity_base_score: String,
    severity_vector: &'a str,
}

/// Generate JSONL output: one object per line, absent fields as the
/// string "NA".
pub fn format_jsonl(entries: &[ReportEntry]) -> Result<String> {
    let mut out = String::new();

    for e in entries {
        let row = JsonlRow {
            ecosystem: &e.ecosystem,
            package: &e.package,
            source: &e.id,
            published: format_string(&e.published),
            modified: format_string(&e.modified),
            severity_base_score: format_base_score(e.severity_base_score),
            severity_vector: format_string(&e.severity_vector),
        };
        out.push_str(&serde_json::to_string(&row)?);
        out.push('\n');
    }

    Ok(out)
}
