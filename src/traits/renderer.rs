//! Artifact rendering interface

use async_trait::async_trait;

use crate::error::ArtifactError;
use crate::model::{ArtifactRef, Certificate, Institution, Student};

/// Everything a renderer may print on the document
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub certificate: &'a Certificate,
    pub student: &'a Student,
    pub institution: &'a Institution,
    /// Institution-local student number from the enrollment
    pub student_institution_id: Option<&'a str>,
}

/// Produces the downloadable document for an issued certificate
///
/// Rendering never mutates certificate state; the caller records the result.
#[async_trait]
pub trait ArtifactRenderer: Send + Sync {
    async fn render(&self, ctx: RenderContext<'_>) -> Result<ArtifactRef, ArtifactError>;
}
