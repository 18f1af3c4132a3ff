//! Database schema definitions

/// SQL to create all tables
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS source_cursor (
    source TEXT PRIMARY KEY,
    cursor TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS vulnerability (
    id TEXT PRIMARY KEY,
    modified TEXT NOT NULL,
    published TEXT,
    summary TEXT,
    details TEXT,
    severity_base_score REAL,
    severity_vector TEXT
);

CREATE TABLE IF NOT EXISTS tombstone (
    id TEXT PRIMARY KEY,
    deleted_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS affected (
    vuln_id TEXT NOT NULL,
    ecosystem TEXT NOT NULL,
    package TEXT NOT NULL,
    FOREIGN KEY (vuln_id) REFERENCES vulnerability(id),
    PRIMARY KEY (vuln_id, ecosystem, package)
);

CREATE TABLE IF NOT EXISTS reported_snapshot (
    id TEXT NOT NULL,
    ecosystem TEXT NOT NULL,
    package TEXT NOT NULL,
    published TEXT,
    modified TEXT,
    severity_base_score REAL,
    severity_vector TEXT,
    PRIMARY KEY (id, ecosystem, package)
);

CREATE INDEX IF NOT EXISTS idx_affected_ecosystem ON affected(ecosystem);
CREATE INDEX IF NOT EXISTS idx_vulnerability_modified ON vulnerability(modified);
"#;
