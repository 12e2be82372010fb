//! Institutions, students and the enrollments linking them

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Institution {
    pub id: Uuid,
    pub name: String,
    /// e.g. `SCHOOL`, `COLLEGE`, `UNIVERSITY`, `TRAINING_CENTER`
    pub institution_type: String,
    /// Education board, used when a secondary exam request omits one
    #[serde(default)]
    pub board: Option<String>,
    #[serde(default = "default_can_issue")]
    pub can_issue_certificates: bool,
    #[serde(default)]
    pub authority_name: Option<String>,
    #[serde(default)]
    pub authority_title: Option<String>,
}

fn default_can_issue() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub student_id: Uuid,
    pub institution_id: Uuid,
    /// Institution-local student number
    #[serde(default)]
    pub student_institution_id: Option<String>,
}
