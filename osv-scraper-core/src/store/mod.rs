//! Durable relational state for the scraper
//!
//! A single writer connection behind a mutex; WAL journaling and a
//! 5-second busy timeout absorb brief contention from concurrent
//! fetch tasks.

pub mod migrations;
pub mod models;
pub mod schema;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::Result;

pub use migrations::run_migrations;
pub use models::{AffectedRecord, ReportEntry, VulnerabilityRecord};

fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn null_if_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Store manages database operations for the OSV scraper
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the database at `path` and bring the schema up
    /// to date.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Save the cursor for a source, replacing any previous value.
    pub fn save_cursor(&self, source: &str, cursor: DateTime<Utc>) -> Result<()> {
        self.conn().execute(
            "INSERT INTO source_cursor (source, cursor)
             VALUES (?1, ?2)
             ON CONFLICT(source) DO UPDATE SET cursor = excluded.cursor",
            params![source, format_instant(cursor)],
        )?;
        Ok(())
    }

    /// Retrieve the cursor for a source.
    ///
    /// `None` means no cursor has been stored yet; callers use it to
    /// distinguish a first run from a storage failure.
    pub fn get_cursor(&self, source: &str) -> Result<Option<DateTime<Utc>>> {
        let cursor_str: Option<String> = self
            .conn()
            .query_row(
                "SELECT cursor FROM source_cursor WHERE source = ?1",
                [source],
                |row| row.get(0),
            )
            .optional()?;

        match cursor_str {
            Some(s) => {
                let cursor = DateTime::parse_from_rfc3339(&s)
                    .map_err(|e| crate::Error::Config(format!("parse cursor {s:?}: {e}")))?
                    .with_timezone(&Utc);
                Ok(Some(cursor))
            }
            None => Ok(None),
        }
    }

    /// Save a vulnerability, replacing all fields on conflict.
    pub fn save_vulnerability(&self, v: &VulnerabilityRecord) -> Result<()> {
        let published = v.published.map(format_instant).unwrap_or_default();
        self.conn().execute(
            "INSERT INTO vulnerability (id, modified, published, summary, details, severity_base_score, severity_vector)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                 modified = excluded.modified,
                 published = excluded.published,
                 summary = excluded.summary,
                 details = excluded.details,
                 severity_base_score = excluded.severity_base_score,
                 severity_vector = excluded.severity_vector",
            params![
                v.id,
                format_instant(v.modified),
                published,
                v.summary,
                v.details,
                v.severity_base_score,
                null_if_empty(&v.severity_vector),
            ],
        )?;
        Ok(())
    }

    /// Save an affected-package record; duplicates are ignored.
    pub fn save_affected(&self, a: &AffectedRecord) -> Result<()> {
        self.conn().execute(
            "INSERT INTO affected (vuln_id, ecosystem, package)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(vuln_id, ecosystem, package) DO NOTHING",
            params![a.vuln_id, a.ecosystem, a.package],
        )?;
        Ok(())
    }

    /// Record that an id has disappeared upstream; duplicates are ignored.
    pub fn save_tombstone(&self, id: &str) -> Result<()> {
        self.conn().execute(
            "INSERT INTO tombstone (id) VALUES (?1) ON CONFLICT(id) DO NOTHING",
            [id],
        )?;
        Ok(())
    }

    /// Delete vulnerabilities modified before `cutoff` along with their
    /// affected rows, in one transaction.
    pub fn delete_vulnerabilities_older_than(&self, cutoff: DateTime<Utc>) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let cutoff_str = format_instant(cutoff);

        tx.execute(
            "DELETE FROM affected WHERE vuln_id IN (
                 SELECT id FROM vulnerability WHERE modified < ?1
             )",
            [&cutoff_str],
        )?;
        tx.execute("DELETE FROM vulnerability WHERE modified < ?1", [&cutoff_str])?;

        tx.commit()?;
        Ok(())
    }

    /// All (vulnerability, ecosystem, package) rows for reporting,
    /// newest first. An ecosystem filter restricts the affected side.
    pub fn vulnerabilities_for_report(&self, ecosystem: Option<&str>) -> Result<Vec<ReportEntry>> {
        const BASE: &str = "SELECT v.id, a.ecosystem, a.package,
                COALESCE(v.published, '') AS published,
                v.modified, v.severity_base_score,
                COALESCE(v.severity_vector, '') AS severity_vector
             FROM vulnerability v
             INNER JOIN affected a ON v.id = a.vuln_id";
        const ORDER: &str = " ORDER BY COALESCE(v.published, v.modified) DESC";

        let conn = self.conn();
        match ecosystem {
            None => {
                let query = format!("{BASE}{ORDER}");
                let mut stmt = conn.prepare(&query)?;
                let rows = stmt.query_map([], report_entry_from_row)?;
                Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
            }
            Some(eco) => {
                let query = format!("{BASE} WHERE a.ecosystem = ?1{ORDER}");
                let mut stmt = conn.prepare(&query)?;
                let rows = stmt.query_map([eco], report_entry_from_row)?;
                Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
            }
        }
    }

    /// Rows that differ from the last report snapshot: missing from it,
    /// or changed in modified, base score, or vector. Null and empty
    /// vectors compare equal; null scores collapse to a sentinel.
    pub fn unreported_vulnerabilities(&self, ecosystem: Option<&str>) -> Result<Vec<ReportEntry>> {
        const BASE: &str = "SELECT v.id, a.ecosystem, a.package,
                COALESCE(v.published, '') AS published,
                v.modified, v.severity_base_score,
                COALESCE(v.severity_vector, '') AS severity_vector
             FROM vulnerability v
             INNER JOIN affected a ON v.id = a.vuln_id
             LEFT JOIN reported_snapshot r
                 ON v.id = r.id AND a.ecosystem = r.ecosystem AND a.package = r.package
             WHERE (r.id IS NULL
                 OR r.modified != v.modified
                 OR COALESCE(r.severity_base_score, -1) != COALESCE(v.severity_base_score, -1)
                 OR COALESCE(r.severity_vector, '') != COALESCE(v.severity_vector, ''))";
        const ORDER: &str = " ORDER BY COALESCE(v.published, v.modified) DESC";

        let conn = self.conn();
        match ecosystem {
            None => {
                let query = format!("{BASE}{ORDER}");
                let mut stmt = conn.prepare(&query)?;
                let rows = stmt.query_map([], report_entry_from_row)?;
                Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
            }
            Some(eco) => {
                let query = format!("{BASE} AND a.ecosystem = ?1{ORDER}");
                let mut stmt = conn.prepare(&query)?;
                let rows = stmt.query_map([eco], report_entry_from_row)?;
                Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
            }
        }
    }

    /// Replace the report snapshot with `entries` in one transaction.
    pub fn save_report_snapshot(&self, entries: &[ReportEntry]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM reported_snapshot", [])?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO reported_snapshot
                     (id, ecosystem, package, published, modified, severity_base_score, severity_vector)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for e in entries {
                stmt.execute(params![
                    e.id,
                    e.ecosystem,
                    e.package,
                    e.published,
                    e.modified,
                    e.severity_base_score,
                    null_if_empty(&e.severity_vector),
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }
}

fn report_entry_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReportEntry> {
    Ok(ReportEntry {
        id: row.get(0)?,
        ecosystem: row.get(1)?,
        package: row.get(2)?,
        published: row.get(3)?,
        modified: row.get(4)?,
        severity_base_score: row.get(5)?,
        severity_vector: row.get(6)?,
    })
}
