// File: src/storage/sqlite/certificates.rs

use super::convert::{self, CERTIFICATE_COLUMNS};
use super::store::SqliteStore;
use crate::error::StorageError;
use crate::model::{ArtifactState, Certificate, NewCertificate};
use crate::serial::Serial;
use crate::traits::CertificateStore;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

impl CertificateStore for SqliteStore {
    fn insert_certificate(&self, new: NewCertificate) -> Result<Certificate, StorageError> {
        let certificate = new.into_certificate(Uuid::new_v4(), chrono::Utc::now());
        let academic = serde_json::to_string(&certificate.academic)
            .map_err(|e| StorageError::QueryFailed(format!("academic record: {}", e)))?;

        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO certificates (id, serial, sequence_number, certificate_type, student_id,
                institution_id, roll_number, issue_date, is_publicly_shareable, academic,
                authority_name, authority_title, verification_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                certificate.id.to_string(),
                certificate.serial.as_str(),
                certificate.sequence_number as i64,
                certificate.certificate_type.as_str(),
                certificate.student_id.to_string(),
                certificate.institution_id.to_string(),
                certificate.roll_number.as_str(),
                convert::to_nanos(certificate.issue_date),
                certificate.is_publicly_shareable,
                academic,
                certificate.authority_name,
                certificate.authority_title,
                certificate.verification_url,
            ],
        )
        .map_err(convert::map_write_err)?;

        Ok(certificate)
    }

    fn get_certificate(&self, id: &Uuid) -> Result<Option<Certificate>, StorageError> {
        let conn = self.get_conn()?;
        get_by_id(&conn, id)
    }

    fn find_by_serial_and_roll(
        &self,
        serial: &Serial,
        roll_number: &str,
    ) -> Result<Option<Certificate>, StorageError> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM certificates WHERE serial = ?1 AND roll_number = ?2",
            CERTIFICATE_COLUMNS
        );
        let cert = conn
            .query_row(&sql, params![serial.as_str(), roll_number], convert::row_to_certificate)
            .optional()?;
        Ok(cert)
    }

    fn set_shareable(
        &self,
        id: &Uuid,
        shareable: bool,
    ) -> Result<Option<Certificate>, StorageError> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE certificates SET is_publicly_shareable = ?1 WHERE id = ?2",
            params![shareable, id.to_string()],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        get_by_id(&conn, id)
    }

    fn update_artifact(&self, id: &Uuid, state: &ArtifactState) -> Result<bool, StorageError> {
        let conn = self.get_conn()?;
        let changed = match state {
            ArtifactState::Pending {
                attempts,
                last_error,
            } => conn.execute(
                "UPDATE certificates SET artifact_attempts = ?1, artifact_last_error = ?2
                 WHERE id = ?3 AND artifact_status = 'pending'",
                params![*attempts as i64, last_error, id.to_string()],
            )?,
            ArtifactState::Ready {
                artifact,
                rendered_at,
            } => conn.execute(
                "UPDATE certificates SET artifact_status = 'ready', artifact_location = ?1,
                    artifact_digest = ?2, artifact_rendered_at = ?3, artifact_last_error = NULL
                 WHERE id = ?4 AND artifact_status = 'pending'",
                params![
                    artifact.location,
                    artifact.digest,
                    convert::to_nanos(*rendered_at),
                    id.to_string()
                ],
            )?,
        };
        Ok(changed == 1)
    }

    fn record_artifact_failure(
        &self,
        id: &Uuid,
        error: &str,
    ) -> Result<Option<u32>, StorageError> {
        let conn = self.get_conn()?;
        let attempts: Option<i64> = conn
            .query_row(
                "UPDATE certificates SET artifact_attempts = artifact_attempts + 1,
                    artifact_last_error = ?1
                 WHERE id = ?2 AND artifact_status = 'pending'
                 RETURNING artifact_attempts",
                params![error, id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(attempts.map(|n| n as u32))
    }

    fn pending_artifacts(
        &self,
        limit: usize,
        max_attempts: u32,
    ) -> Result<Vec<Certificate>, StorageError> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM certificates
             WHERE artifact_status = 'pending' AND artifact_attempts < ?1
             ORDER BY sequence_number ASC LIMIT ?2",
            CERTIFICATE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![max_attempts as i64, limit as i64],
            convert::row_to_certificate,
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn list_by_institution(&self, institution_id: &Uuid) -> Result<Vec<Certificate>, StorageError> {
        let conn = self.get_conn()?;
        list_where(&conn, "institution_id", institution_id)
    }

    fn list_by_student(&self, student_id: &Uuid) -> Result<Vec<Certificate>, StorageError> {
        let conn = self.get_conn()?;
        list_where(&conn, "student_id", student_id)
    }

    fn count_certificates(&self) -> Result<u64, StorageError> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM certificates", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn is_healthy(&self) -> bool {
        self.ping().is_ok()
    }
}

fn get_by_id(conn: &Connection, id: &Uuid) -> Result<Option<Certificate>, StorageError> {
    let sql = format!("SELECT {} FROM certificates WHERE id = ?1", CERTIFICATE_COLUMNS);
    let cert = conn
        .query_row(&sql, params![id.to_string()], convert::row_to_certificate)
        .optional()?;
    Ok(cert)
}

/// `column` is always a literal from this module
fn list_where(
    conn: &Connection,
    column: &str,
    id: &Uuid,
) -> Result<Vec<Certificate>, StorageError> {
    let sql = format!(
        "SELECT {} FROM certificates WHERE {} = ?1 ORDER BY sequence_number DESC",
        CERTIFICATE_COLUMNS, column
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![id.to_string()], convert::row_to_certificate)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
