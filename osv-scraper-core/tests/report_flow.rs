//! Differential report scenarios

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tempfile::TempDir;

use osv_scraper_core::app::{generate_report_at, ReportOptions};
use osv_scraper_core::report::ReportFormat;
use osv_scraper_core::store::{AffectedRecord, ReportEntry, Store, VulnerabilityRecord};

fn instant(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn seed_vuln(store: &Store, id: &str, modified: &str, package: &str) {
    store
        .save_vulnerability(&VulnerabilityRecord {
            id: id.to_string(),
            modified: instant(modified),
            published: None,
            summary: format!("{id} summary"),
            details: String::new(),
            severity_base_score: None,
            severity_vector: String::new(),
        })
        .unwrap();
    store
        .save_affected(&AffectedRecord {
            vuln_id: id.to_string(),
            ecosystem: "npm".to_string(),
            package: package.to_string(),
        })
        .unwrap();
}

fn snapshot_entry(id: &str, modified: &str, package: &str) -> ReportEntry {
    ReportEntry {
        id: id.to_string(),
        ecosystem: "npm".to_string(),
        package: package.to_string(),
        published: String::new(),
        modified: modified.to_string(),
        severity_base_score: None,
        severity_vector: String::new(),
    }
}

#[test]
fn s6_differential_report_emits_only_changes_then_converges() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(Store::open(temp.path().join("osv.db")).unwrap());

    // U is unchanged since the snapshot, M moved, N is new.
    seed_vuln(&store, "GHSA-U", "2025-10-04T12:00:00Z", "unchanged-pkg");
    seed_vuln(&store, "GHSA-M", "2025-10-05T12:00:00Z", "moved-pkg");
    seed_vuln(&store, "GHSA-N", "2025-10-04T12:00:00Z", "new-pkg");

    store
        .save_report_snapshot(&[
            snapshot_entry("GHSA-U", "2025-10-04T12:00:00Z", "unchanged-pkg"),
            snapshot_entry("GHSA-M", "2025-10-01T12:00:00Z", "moved-pkg"),
        ])
        .unwrap();

    let opts = ReportOptions {
        format: ReportFormat::Markdown,
        output: temp.path().join("report.md"),
        ecosystem: None,
        diff: true,
    };

    let first_run = instant("2025-10-06T00:00:00Z");
    generate_report_at(&store, &opts, first_run).unwrap();

    let report_path = temp.path().join("report_20251006T000000Z.md");
    let content = std::fs::read_to_string(&report_path).unwrap();
    assert!(content.contains("GHSA-M"));
    assert!(content.contains("GHSA-N"));
    assert!(!content.contains("GHSA-U"));

    // The snapshot now mirrors the full current set.
    let conn = rusqlite::Connection::open(temp.path().join("osv.db")).unwrap();
    let snapshot_count: i64 = conn
        .query_row("SELECT COUNT(*) FROM reported_snapshot", [], |row| row.get(0))
        .unwrap();
    assert_eq!(snapshot_count, 3);

    // A second differential run with no data change emits nothing.
    let second_run = instant("2025-10-06T01:00:00Z");
    generate_report_at(&store, &opts, second_run).unwrap();
    assert!(!temp.path().join("report_20251006T010000Z.md").exists());
}

#[test]
fn full_report_does_not_touch_snapshot() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(Store::open(temp.path().join("osv.db")).unwrap());

    seed_vuln(&store, "GHSA-A", "2025-10-04T12:00:00Z", "pkg");

    let opts = ReportOptions {
        format: ReportFormat::Csv,
        output: temp.path().join("report.csv"),
        ecosystem: None,
        diff: false,
    };
    generate_report_at(&store, &opts, instant("2025-10-06T00:00:00Z")).unwrap();

    let content = std::fs::read_to_string(temp.path().join("report_20251006T000000Z.csv")).unwrap();
    assert!(content.starts_with("ecosystem,package,source"));
    assert!(content.contains("GHSA-A"));

    let conn = rusqlite::Connection::open(temp.path().join("osv.db")).unwrap();
    let snapshot_count: i64 = conn
        .query_row("SELECT COUNT(*) FROM reported_snapshot", [], |row| row.get(0))
        .unwrap();
    assert_eq!(snapshot_count, 0);
}

#[test]
fn ecosystem_filter_restricts_report_and_snapshot() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(Store::open(temp.path().join("osv.db")).unwrap());

    seed_vuln(&store, "GHSA-NPM", "2025-10-04T12:00:00Z", "npm-pkg");
    store
        .save_vulnerability(&VulnerabilityRecord {
            id: "PYSEC-1".to_string(),
            modified: instant("2025-10-04T12:00:00Z"),
            published: None,
            summary: String::new(),
            details: String::new(),
            severity_base_score: None,
            severity_vector: String::new(),
        })
        .unwrap();
    store
        .save_affected(&AffectedRecord {
            vuln_id: "PYSEC-1".to_string(),
            ecosystem: "PyPI".to_string(),
            package: "py-pkg".to_string(),
        })
        .unwrap();

    let opts = ReportOptions {
        format: ReportFormat::Jsonl,
        output: temp.path().join("npm.jsonl"),
        ecosystem: Some("npm".to_string()),
        diff: true,
    };
    generate_report_at(&store, &opts, instant("2025-10-06T00:00:00Z")).unwrap();

    let content = std::fs::read_to_string(temp.path().join("npm_20251006T000000Z.jsonl")).unwrap();
    assert!(content.contains("GHSA-NPM"));
    assert!(!content.contains("PYSEC-1"));
}

#[test]
fn empty_database_produces_no_file() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(Store::open(temp.path().join("osv.db")).unwrap());

    let opts = ReportOptions {
        format: ReportFormat::Markdown,
        output: temp.path().join("report.md"),
        ecosystem: None,
        diff: false,
    };
    generate_report_at(&store, &opts, instant("2025-10-06T00:00:00Z")).unwrap();

    assert!(!temp.path().join("report_20251006T000000Z.md").exists());
}
