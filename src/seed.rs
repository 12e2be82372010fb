//! Registry seeding from a JSON file
//!
//! ```json
//! { "institutions": [...], "students": [...], "enrollments": [...] }
//! ```
//!
//! Every record is upserted by id, so loading the same file twice is a no-op.

use std::path::Path;

use serde::Deserialize;

use crate::error::{ServerError, ServerResult};
use crate::model::{Enrollment, Institution, Student};
use crate::traits::RegistryWriter;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seed {
    #[serde(default)]
    pub institutions: Vec<Institution>,
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub enrollments: Vec<Enrollment>,
}

/// Counts of upserted records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub institutions: usize,
    pub students: usize,
    pub enrollments: usize,
}

impl Seed {
    pub fn from_json(raw: &str) -> ServerResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Parties first, then the enrollments that reference them
    pub fn apply(&self, writer: &dyn RegistryWriter) -> ServerResult<SeedSummary> {
        for institution in &self.institutions {
            writer.upsert_institution(institution)?;
        }
        for student in &self.students {
            writer.upsert_student(student)?;
        }
        for enrollment in &self.enrollments {
            writer.upsert_enrollment(enrollment)?;
        }

        Ok(SeedSummary {
            institutions: self.institutions.len(),
            students: self.students.len(),
            enrollments: self.enrollments.len(),
        })
    }
}

/// Read `path` and upsert its contents
///
/// # Errors
/// * `Config` - file unreadable
/// * `InvalidArgument` - malformed JSON
/// * `Storage` - an enrollment references an unknown party
pub fn load_seed_file<P: AsRef<Path>>(
    path: P,
    writer: &dyn RegistryWriter,
) -> ServerResult<SeedSummary> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ServerError::Config(format!("seed file {}: {}", path.display(), e)))?;

    let summary = Seed::from_json(&raw)?.apply(writer)?;

    tracing::info!(
        path = %path.display(),
        institutions = summary.institutions,
        students = summary.students,
        enrollments = summary.enrollments,
        "Registry seed loaded"
    );

    Ok(summary)
}
