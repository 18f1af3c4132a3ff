//! Database migrations

use rusqlite::Connection;

use crate::Result;

/// Additive column migrations for databases created by older builds.
/// Each must stay safe to re-run.
const MIGRATIONS: &[&str] = &[
    "ALTER TABLE vulnerability ADD COLUMN published TEXT",
    "ALTER TABLE vulnerability ADD COLUMN severity_base_score REAL",
    "ALTER TABLE vulnerability ADD COLUMN severity_vector TEXT",
    "ALTER TABLE reported_snapshot ADD COLUMN severity_base_score REAL",
    "ALTER TABLE reported_snapshot ADD COLUMN severity_vector TEXT",
];

/// Run all migrations on the database
pub fn run_migrations(conn: &Connection) -> Result<()> {
    // Enable WAL mode for better concurrent access
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    // Set busy timeout to handle concurrent writes gracefully
    conn.busy_timeout(std::time::Duration::from_secs(5))?;
    // Enable foreign key constraint enforcement
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    conn.execute_batch(super::schema::SCHEMA)?;

    for migration in MIGRATIONS {
        if let Err(err) = conn.execute(migration, []) {
            let message = err.to_string();
            // Column adds against an up-to-date schema fail with one of
            // these; anything else is a real failure.
            if !message.contains("duplicate column") && !message.contains("no such column") {
                return Err(err.into());
            }
        }
    }

    Ok(())
}
