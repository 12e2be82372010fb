// File: src/storage/sqlite/registry.rs

use super::convert::{self, INSTITUTION_COLUMNS, STUDENT_COLUMNS};
use super::store::SqliteStore;
use crate::error::StorageError;
use crate::model::{Enrollment, Institution, Student};
use crate::traits::{Registry, RegistryWriter};
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

impl Registry for SqliteStore {
    fn get_institution(&self, id: &Uuid) -> Result<Option<Institution>, StorageError> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM institutions WHERE id = ?1", INSTITUTION_COLUMNS);
        let row = conn
            .query_row(&sql, params![id.to_string()], convert::row_to_institution)
            .optional()?;
        Ok(row)
    }

    fn get_student(&self, id: &Uuid) -> Result<Option<Student>, StorageError> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM students WHERE id = ?1", STUDENT_COLUMNS);
        let row = conn
            .query_row(&sql, params![id.to_string()], convert::row_to_student)
            .optional()?;
        Ok(row)
    }

    fn get_enrollment(
        &self,
        student_id: &Uuid,
        institution_id: &Uuid,
    ) -> Result<Option<Enrollment>, StorageError> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                "SELECT student_id, institution_id, student_institution_id FROM enrollments
                 WHERE student_id = ?1 AND institution_id = ?2",
                params![student_id.to_string(), institution_id.to_string()],
                convert::row_to_enrollment,
            )
            .optional()?;
        Ok(row)
    }

    fn count_institutions(&self) -> Result<u64, StorageError> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM institutions", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_students(&self) -> Result<u64, StorageError> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl RegistryWriter for SqliteStore {
    fn upsert_institution(&self, institution: &Institution) -> Result<(), StorageError> {
        let conn = self.get_conn()?;
        let now = chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0);
        conn.execute(
            "INSERT INTO institutions (id, name, institution_type, board, can_issue_certificates,
                authority_name, authority_title, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                institution_type = excluded.institution_type,
                board = excluded.board,
                can_issue_certificates = excluded.can_issue_certificates,
                authority_name = excluded.authority_name,
                authority_title = excluded.authority_title",
            params![
                institution.id.to_string(),
                institution.name,
                institution.institution_type,
                institution.board,
                institution.can_issue_certificates,
                institution.authority_name,
                institution.authority_title,
                now,
            ],
        )
        .map_err(convert::map_write_err)?;
        Ok(())
    }

    fn upsert_student(&self, student: &Student) -> Result<(), StorageError> {
        let conn = self.get_conn()?;
        let now = chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0);
        conn.execute(
            "INSERT INTO students (id, first_name, last_name, email, date_of_birth, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                email = excluded.email,
                date_of_birth = excluded.date_of_birth",
            params![
                student.id.to_string(),
                student.first_name,
                student.last_name,
                student.email,
                student.date_of_birth.map(|d| d.to_string()),
                now,
            ],
        )
        .map_err(convert::map_write_err)?;
        Ok(())
    }

    fn upsert_enrollment(&self, enrollment: &Enrollment) -> Result<(), StorageError> {
        let conn = self.get_conn()?;
        let now = chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0);
        conn.execute(
            "INSERT INTO enrollments (student_id, institution_id, student_institution_id, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(student_id, institution_id) DO UPDATE SET
                student_institution_id = excluded.student_institution_id",
            params![
                enrollment.student_id.to_string(),
                enrollment.institution_id.to_string(),
                enrollment.student_institution_id,
                now,
            ],
        )
        .map_err(convert::map_write_err)?;
        Ok(())
    }

    fn set_issuing_capability(
        &self,
        institution_id: &Uuid,
        enabled: bool,
    ) -> Result<bool, StorageError> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE institutions SET can_issue_certificates = ?1 WHERE id = ?2",
            params![enabled, institution_id.to_string()],
        )?;
        Ok(changed == 1)
    }
}
