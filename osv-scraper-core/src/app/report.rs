//! Report driver

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::report::{write_report, ReportFormat};
use crate::store::Store;
use crate::Result;

/// Options for report generation
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub format: ReportFormat,
    pub output: PathBuf,
    /// Restrict to one ecosystem; `None` reports all of them.
    pub ecosystem: Option<String>,
    /// Differential mode: report only rows that changed since the last
    /// snapshot, then replace the snapshot with the full current set.
    pub diff: bool,
}

/// Generate a vulnerability report from the store.
pub fn generate_report(store: &Store, opts: &ReportOptions) -> Result<()> {
    generate_report_at(store, opts, Utc::now())
}

/// Like [`generate_report`] but with an explicit timestamp for the
/// output path, so callers can pin it.
pub fn generate_report_at(store: &Store, opts: &ReportOptions, now: DateTime<Utc>) -> Result<()> {
    let output_path = resolve_output_path(&opts.output, now);
    info!(
        format = ?opts.format,
        output = %output_path.display(),
        ecosystem = opts.ecosystem.as_deref().unwrap_or(""),
        diff = opts.diff,
        "generating report"
    );

    let ecosystem = opts.ecosystem.as_deref();
    let entries = if opts.diff {
        store.unreported_vulnerabilities(ecosystem)?
    } else {
        store.vulnerabilities_for_report(ecosystem)?
    };

    info!(count = entries.len(), "fetched vulnerabilities");

    if entries.is_empty() {
        warn!("no vulnerabilities found in database");
        return Ok(());
    }

    write_report(&output_path, opts.format, &entries)?;
    info!(output = %output_path.display(), "report generated successfully");

    if opts.diff {
        // The snapshot mirrors the full current set, not just the diff,
        // so the next differential run compares against current state.
        let all_entries = store.vulnerabilities_for_report(ecosystem)?;
        store.save_report_snapshot(&all_entries)?;
        info!(count = all_entries.len(), "saved report snapshot");
    }

    Ok(())
}

/// Insert a `_YYYYMMDDTHHMMSSZ` timestamp before the file extension.
fn resolve_output_path(base: &Path, now: DateTime<Utc>) -> PathBuf {
    let stem = base
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("report");
    let timestamp = now.format("%Y%m%dT%H%M%SZ");

    let file_name = match base.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_{timestamp}.{ext}"),
        None => format!("{stem}_{timestamp}"),
    };

    base.with_file_name(file_name)
}
