//! Plain-text document renderer writing to the local filesystem

use std::fmt::Write as _;
use std::path::PathBuf;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::ArtifactError;
use crate::model::{AcademicRecord, ArtifactRef};
use crate::traits::{ArtifactRenderer, RenderContext};

/// Writes `<dir>/certificates/<serial>.txt` and returns its path and SHA-256
///
/// A re-render replaces the same file, so a lost race leaves nothing behind.
#[derive(Debug, Clone)]
pub struct FileRenderer {
    dir: PathBuf,
}

impl FileRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn output_dir(&self) -> PathBuf {
        self.dir.join("certificates")
    }
}

#[async_trait]
impl ArtifactRenderer for FileRenderer {
    async fn render(&self, ctx: RenderContext<'_>) -> Result<ArtifactRef, ArtifactError> {
        let document = render_document(&ctx)?;
        let dir = self.output_dir();
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(format!("{}.txt", ctx.certificate.serial));
        // Unique temp name, then rename over the final path
        let staging = dir.join(format!(".{}.{}.tmp", ctx.certificate.serial, Uuid::new_v4()));
        tokio::fs::write(&staging, document.as_bytes()).await?;
        if let Err(e) = tokio::fs::rename(&staging, &path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }

        let digest = hex::encode(Sha256::digest(document.as_bytes()));
        tracing::debug!(
            serial = %ctx.certificate.serial,
            path = %path.display(),
            "Artifact written"
        );

        Ok(ArtifactRef {
            location: path.to_string_lossy().into_owned(),
            digest,
        })
    }
}

/// Lay out the document body
pub fn render_document(ctx: &RenderContext<'_>) -> Result<String, ArtifactError> {
    let cert = ctx.certificate;
    let mut out = String::new();
    let fmt_err = |e: std::fmt::Error| ArtifactError::Render(e.to_string());

    writeln!(out, "{}", ctx.institution.name).map_err(fmt_err)?;
    writeln!(out, "{} CERTIFICATE", cert.certificate_type.title()).map_err(fmt_err)?;
    writeln!(out).map_err(fmt_err)?;
    writeln!(out, "This is to certify that {}", ctx.student.full_name()).map_err(fmt_err)?;
    if let Some(local_id) = ctx.student_institution_id {
        writeln!(out, "Student ID: {}", local_id).map_err(fmt_err)?;
    }
    writeln!(out, "Roll Number: {}", cert.roll_number).map_err(fmt_err)?;

    match &cert.academic {
        AcademicRecord::SecondaryExam {
            registration_number,
            examination_year,
            board,
            group,
            gpa,
            passing_year,
        } => {
            if let Some(reg) = registration_number {
                writeln!(out, "Registration Number: {}", reg).map_err(fmt_err)?;
            }
            writeln!(out, "Examination Year: {}", examination_year).map_err(fmt_err)?;
            writeln!(out, "Board: {}", board).map_err(fmt_err)?;
            if let Some(group) = group {
                writeln!(out, "Group: {}", group).map_err(fmt_err)?;
            }
            writeln!(out, "GPA: {:.2}", gpa).map_err(fmt_err)?;
            if let Some(year) = passing_year {
                writeln!(out, "Passing Year: {}", year).map_err(fmt_err)?;
            }
        }
        AcademicRecord::Diploma {
            subject,
            duration,
            session,
            cgpa,
            passing_year,
        } => {
            writeln!(out, "Subject: {}", subject).map_err(fmt_err)?;
            optional_line(&mut out, "Duration", duration.as_deref()).map_err(fmt_err)?;
            optional_line(&mut out, "Session", session.as_deref()).map_err(fmt_err)?;
            if let Some(cgpa) = cgpa {
                writeln!(out, "CGPA: {:.2}", cgpa).map_err(fmt_err)?;
            }
            if let Some(year) = passing_year {
                writeln!(out, "Passing Year: {}", year).map_err(fmt_err)?;
            }
        }
        AcademicRecord::Degree {
            program,
            department,
            major,
            session,
            cgpa,
            degree_class,
            convocation_date,
        } => {
            writeln!(out, "Program: {}", program).map_err(fmt_err)?;
            optional_line(&mut out, "Department", department.as_deref()).map_err(fmt_err)?;
            optional_line(&mut out, "Major", major.as_deref()).map_err(fmt_err)?;
            optional_line(&mut out, "Session", session.as_deref()).map_err(fmt_err)?;
            if let Some(cgpa) = cgpa {
                writeln!(out, "CGPA: {:.2}", cgpa).map_err(fmt_err)?;
            }
            optional_line(&mut out, "Class", degree_class.as_deref()).map_err(fmt_err)?;
            if let Some(date) = convocation_date {
                writeln!(out, "Convocation: {}", date).map_err(fmt_err)?;
            }
        }
        AcademicRecord::Training {
            program,
            duration,
            completion_date,
        } => {
            writeln!(out, "Program: {}", program).map_err(fmt_err)?;
            optional_line(&mut out, "Duration", duration.as_deref()).map_err(fmt_err)?;
            writeln!(out, "Completed: {}", completion_date).map_err(fmt_err)?;
        }
        AcademicRecord::Skill {
            skill_name,
            duration,
            completion_date,
        } => {
            writeln!(out, "Skill: {}", skill_name).map_err(fmt_err)?;
            optional_line(&mut out, "Duration", duration.as_deref()).map_err(fmt_err)?;
            if let Some(date) = completion_date {
                writeln!(out, "Completed: {}", date).map_err(fmt_err)?;
            }
        }
    }

    writeln!(out).map_err(fmt_err)?;
    writeln!(out, "Issued: {}", cert.issue_date.format("%Y-%m-%d")).map_err(fmt_err)?;
    optional_line(&mut out, "Authorized by", cert.authority_name.as_deref()).map_err(fmt_err)?;
    optional_line(&mut out, "Title", cert.authority_title.as_deref()).map_err(fmt_err)?;
    writeln!(out, "Serial: {}", cert.serial).map_err(fmt_err)?;
    writeln!(out, "Verify: {}", cert.verification_url).map_err(fmt_err)?;

    Ok(out)
}

fn optional_line(out: &mut String, label: &str, value: Option<&str>) -> std::fmt::Result {
    match value {
        Some(v) => writeln!(out, "{}: {}", label, v),
        None => Ok(()),
    }
}
