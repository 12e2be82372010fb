// File: src/storage/sqlite/schema.rs

use crate::error::StorageError;
use rusqlite::{Connection, OptionalExtension};

/// Current schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Create all tables (idempotent)
pub fn create_tables(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(SCHEMA_SQL)
        .map_err(|e| StorageError::MigrationFailed(e.to_string()))
}

/// Bring the schema to the latest version and record it
pub fn migrate(conn: &Connection) -> Result<(), StorageError> {
    let current: Option<u32> = conn
        .query_row(
            "SELECT value FROM certify_config WHERE key = 'schema_version'",
            [],
            |row| row.get::<_, String>(0),
        )
        .optional()?
        .and_then(|s| s.parse().ok());

    if let Some(version) = current {
        if version > SCHEMA_VERSION {
            return Err(StorageError::MigrationFailed(format!(
                "database schema v{} is newer than supported v{}",
                version, SCHEMA_VERSION
            )));
        }
    }

    let now = chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0);
    conn.execute(
        "INSERT OR REPLACE INTO certify_config (key, value, updated_at) VALUES ('schema_version', ?1, ?2)",
        rusqlite::params![SCHEMA_VERSION.to_string(), now],
    )?;

    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Core configuration
CREATE TABLE IF NOT EXISTS certify_config (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);

-- Serial sequence counter (single row)
CREATE TABLE IF NOT EXISTS certificate_sequence (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    last_sequence INTEGER NOT NULL,
    updated_at INTEGER NOT NULL             -- Unix nanoseconds
);

CREATE TABLE IF NOT EXISTS institutions (
    id TEXT PRIMARY KEY,                    -- UUID as text
    name TEXT NOT NULL,
    institution_type TEXT NOT NULL,
    board TEXT,
    can_issue_certificates INTEGER NOT NULL DEFAULT 1,
    authority_name TEXT,
    authority_title TEXT,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS students (
    id TEXT PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    email TEXT NOT NULL,
    date_of_birth TEXT,                     -- YYYY-MM-DD
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS enrollments (
    student_id TEXT NOT NULL,
    institution_id TEXT NOT NULL,
    student_institution_id TEXT,
    created_at INTEGER NOT NULL,
    PRIMARY KEY (student_id, institution_id),
    FOREIGN KEY (student_id) REFERENCES students(id),
    FOREIGN KEY (institution_id) REFERENCES institutions(id)
);

CREATE TABLE IF NOT EXISTS certificates (
    id TEXT PRIMARY KEY,
    serial TEXT NOT NULL UNIQUE,            -- 7 chars, uppercase
    sequence_number INTEGER NOT NULL UNIQUE,
    certificate_type TEXT NOT NULL,
    student_id TEXT NOT NULL,
    institution_id TEXT NOT NULL,
    roll_number TEXT NOT NULL,              -- Normalized (trimmed, uppercase)
    issue_date INTEGER NOT NULL,            -- Unix nanoseconds
    is_publicly_shareable INTEGER NOT NULL DEFAULT 1,
    academic TEXT NOT NULL,                 -- JSON, tagged by kind
    authority_name TEXT,
    authority_title TEXT,
    verification_url TEXT NOT NULL,
    artifact_status TEXT NOT NULL DEFAULT 'pending', -- 'pending', 'ready'
    artifact_attempts INTEGER NOT NULL DEFAULT 0,
    artifact_last_error TEXT,
    artifact_location TEXT,
    artifact_digest TEXT,
    artifact_rendered_at INTEGER,
    FOREIGN KEY (student_id) REFERENCES students(id),
    FOREIGN KEY (institution_id) REFERENCES institutions(id)
);

CREATE TABLE IF NOT EXISTS activity_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    actor_id TEXT,
    actor_type TEXT NOT NULL,
    actor_name TEXT NOT NULL,
    action TEXT NOT NULL,
    target_type TEXT NOT NULL,
    target_id TEXT NOT NULL,
    institution_id TEXT,
    details TEXT,                           -- JSON
    occurred_at INTEGER NOT NULL
);

-- Indices for common queries
CREATE INDEX IF NOT EXISTS idx_certificates_serial_roll ON certificates(serial, roll_number);
CREATE INDEX IF NOT EXISTS idx_certificates_institution ON certificates(institution_id);
CREATE INDEX IF NOT EXISTS idx_certificates_student ON certificates(student_id);
CREATE INDEX IF NOT EXISTS idx_certificates_artifact ON certificates(artifact_status);
CREATE INDEX IF NOT EXISTS idx_activity_target ON activity_logs(target_id);
"#;
