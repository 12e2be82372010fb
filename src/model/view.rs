//! Public verification projection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::academic::{CertificateType, ScoreSummary};
use super::certificate::Certificate;
use super::party::{Institution, Student};

/// What an anonymous verifier sees
///
/// Carries no internal identifiers, contact details or artifact locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificatePublicView {
    pub serial: String,
    pub certificate_type: CertificateType,
    pub certificate_title: String,
    pub issue_date: DateTime<Utc>,
    pub student_name: String,
    pub roll_number: String,
    pub institution_name: String,
    pub institution_type: String,
    pub authority_name: Option<String>,
    pub authority_title: Option<String>,
    #[serde(flatten)]
    pub scores: ScoreSummary,
}

impl CertificatePublicView {
    pub fn project(certificate: &Certificate, student: &Student, institution: &Institution) -> Self {
        Self {
            serial: certificate.serial.to_string(),
            certificate_type: certificate.certificate_type,
            certificate_title: certificate.certificate_type.title(),
            issue_date: certificate.issue_date,
            student_name: student.full_name(),
            roll_number: certificate.roll_number.to_string(),
            institution_name: institution.name.clone(),
            institution_type: institution.institution_type.clone(),
            authority_name: certificate.authority_name.clone(),
            authority_title: certificate.authority_title.clone(),
            scores: certificate.academic.scores(),
        }
    }
}
