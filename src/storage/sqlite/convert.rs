// File: src/storage/sqlite/convert.rs

use crate::error::StorageError;
use crate::model::{
    AcademicRecord, ArtifactRef, ArtifactState, Certificate, CertificateType, Enrollment,
    Institution, RollNumber, Student,
};
use crate::serial::Serial;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{ErrorCode, Row};
use uuid::Uuid;

/// Column list matching [`row_to_certificate`]
pub const CERTIFICATE_COLUMNS: &str = "id, serial, sequence_number, certificate_type, \
     student_id, institution_id, roll_number, issue_date, is_publicly_shareable, academic, \
     authority_name, authority_title, verification_url, artifact_status, artifact_attempts, \
     artifact_last_error, artifact_location, artifact_digest, artifact_rendered_at";

/// Column list matching [`row_to_institution`]
pub const INSTITUTION_COLUMNS: &str = "id, name, institution_type, board, \
     can_issue_certificates, authority_name, authority_title";

/// Column list matching [`row_to_student`]
pub const STUDENT_COLUMNS: &str = "id, first_name, last_name, email, date_of_birth";

/// Convert a database row to Certificate
pub fn row_to_certificate(row: &Row) -> rusqlite::Result<Certificate> {
    let id: String = row.get(0)?;
    let serial: String = row.get(1)?;
    let sequence_number: i64 = row.get(2)?;
    let certificate_type: String = row.get(3)?;
    let student_id: String = row.get(4)?;
    let institution_id: String = row.get(5)?;
    let roll_number: String = row.get(6)?;
    let issue_date: i64 = row.get(7)?;
    let is_publicly_shareable: bool = row.get(8)?;
    let academic: String = row.get(9)?;
    let authority_name: Option<String> = row.get(10)?;
    let authority_title: Option<String> = row.get(11)?;
    let verification_url: String = row.get(12)?;
    let artifact_status: String = row.get(13)?;
    let artifact_attempts: i64 = row.get(14)?;
    let artifact_last_error: Option<String> = row.get(15)?;
    let artifact_location: Option<String> = row.get(16)?;
    let artifact_digest: Option<String> = row.get(17)?;
    let artifact_rendered_at: Option<i64> = row.get(18)?;

    let artifact = match (
        artifact_status.as_str(),
        artifact_location,
        artifact_digest,
        artifact_rendered_at,
    ) {
        ("ready", Some(location), Some(digest), Some(rendered_at)) => ArtifactState::Ready {
            artifact: ArtifactRef { location, digest },
            rendered_at: DateTime::from_timestamp_nanos(rendered_at),
        },
        ("pending", ..) => ArtifactState::Pending {
            attempts: u32::try_from(artifact_attempts).unwrap_or(u32::MAX),
            last_error: artifact_last_error,
        },
        _ => {
            return Err(rusqlite::Error::InvalidColumnType(
                13,
                "artifact_status".into(),
                Type::Text,
            ))
        }
    };

    Ok(Certificate {
        id: parse_uuid(0, &id)?,
        serial: Serial::parse(&serial).map_err(|e| conversion_err(1, e))?,
        sequence_number: sequence_number as u64,
        certificate_type: certificate_type
            .parse::<CertificateType>()
            .map_err(|e| conversion_err(3, e))?,
        student_id: parse_uuid(4, &student_id)?,
        institution_id: parse_uuid(5, &institution_id)?,
        roll_number: RollNumber::parse(&roll_number).map_err(|e| conversion_err(6, e))?,
        issue_date: DateTime::from_timestamp_nanos(issue_date),
        is_publicly_shareable,
        academic: serde_json::from_str::<AcademicRecord>(&academic)
            .map_err(|e| conversion_err(9, e))?,
        authority_name,
        authority_title,
        verification_url,
        artifact,
    })
}

/// Convert a database row to Institution
pub fn row_to_institution(row: &Row) -> rusqlite::Result<Institution> {
    let id: String = row.get(0)?;
    Ok(Institution {
        id: parse_uuid(0, &id)?,
        name: row.get(1)?,
        institution_type: row.get(2)?,
        board: row.get(3)?,
        can_issue_certificates: row.get(4)?,
        authority_name: row.get(5)?,
        authority_title: row.get(6)?,
    })
}

/// Convert a database row to Student
pub fn row_to_student(row: &Row) -> rusqlite::Result<Student> {
    let id: String = row.get(0)?;
    let date_of_birth: Option<String> = row.get(4)?;
    Ok(Student {
        id: parse_uuid(0, &id)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        date_of_birth: date_of_birth
            .map(|d| d.parse::<NaiveDate>().map_err(|e| conversion_err(4, e)))
            .transpose()?,
    })
}

/// Convert a database row to Enrollment
pub fn row_to_enrollment(row: &Row) -> rusqlite::Result<Enrollment> {
    let student_id: String = row.get(0)?;
    let institution_id: String = row.get(1)?;
    Ok(Enrollment {
        student_id: parse_uuid(0, &student_id)?,
        institution_id: parse_uuid(1, &institution_id)?,
        student_institution_id: row.get(2)?,
    })
}

/// Map constraint violations on writes to `StorageError::Conflict`
pub fn map_write_err(e: rusqlite::Error) -> StorageError {
    if let rusqlite::Error::SqliteFailure(err, msg) = &e {
        if err.code == ErrorCode::ConstraintViolation {
            return StorageError::Conflict(msg.clone().unwrap_or_else(|| err.to_string()));
        }
    }
    StorageError::Sqlite(e)
}

pub fn to_nanos(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_nanos_opt().unwrap_or(0)
}

fn parse_uuid(idx: usize, value: &str) -> rusqlite::Result<Uuid> {
    value
        .parse()
        .map_err(|_| rusqlite::Error::InvalidColumnType(idx, "uuid".into(), Type::Text))
}

fn conversion_err<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}
