//! Certificate types and their type-specific academic records

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Kind of credential being issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateType {
    Jsc,
    Ssc,
    VocationalSsc,
    Hsc,
    VocationalHsc,
    Bm,
    Jdc,
    Dakhil,
    Alim,
    VocationalMadrasah,
    Diploma,
    Bsc,
    Msc,
    Ba,
    Ma,
    Bba,
    Mba,
    Llb,
    Llm,
    Mbbs,
    Bds,
    TrainingCompletion,
    SkillCertificate,
}

/// Groups of certificate types sharing the same academic fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CertificateFamily {
    SecondaryExam,
    Diploma,
    Degree,
    Training,
    Skill,
}

impl CertificateType {
    pub const ALL: [CertificateType; 23] = [
        CertificateType::Jsc,
        CertificateType::Ssc,
        CertificateType::VocationalSsc,
        CertificateType::Hsc,
        CertificateType::VocationalHsc,
        CertificateType::Bm,
        CertificateType::Jdc,
        CertificateType::Dakhil,
        CertificateType::Alim,
        CertificateType::VocationalMadrasah,
        CertificateType::Diploma,
        CertificateType::Bsc,
        CertificateType::Msc,
        CertificateType::Ba,
        CertificateType::Ma,
        CertificateType::Bba,
        CertificateType::Mba,
        CertificateType::Llb,
        CertificateType::Llm,
        CertificateType::Mbbs,
        CertificateType::Bds,
        CertificateType::TrainingCompletion,
        CertificateType::SkillCertificate,
    ];

    /// Wire/storage name, e.g. `VOCATIONAL_SSC`
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateType::Jsc => "JSC",
            CertificateType::Ssc => "SSC",
            CertificateType::VocationalSsc => "VOCATIONAL_SSC",
            CertificateType::Hsc => "HSC",
            CertificateType::VocationalHsc => "VOCATIONAL_HSC",
            CertificateType::Bm => "BM",
            CertificateType::Jdc => "JDC",
            CertificateType::Dakhil => "DAKHIL",
            CertificateType::Alim => "ALIM",
            CertificateType::VocationalMadrasah => "VOCATIONAL_MADRASAH",
            CertificateType::Diploma => "DIPLOMA",
            CertificateType::Bsc => "BSC",
            CertificateType::Msc => "MSC",
            CertificateType::Ba => "BA",
            CertificateType::Ma => "MA",
            CertificateType::Bba => "BBA",
            CertificateType::Mba => "MBA",
            CertificateType::Llb => "LLB",
            CertificateType::Llm => "LLM",
            CertificateType::Mbbs => "MBBS",
            CertificateType::Bds => "BDS",
            CertificateType::TrainingCompletion => "TRAINING_COMPLETION",
            CertificateType::SkillCertificate => "SKILL_CERTIFICATE",
        }
    }

    /// Human-readable title, underscores replaced by spaces
    pub fn title(&self) -> String {
        self.as_str().replace('_', " ")
    }

    pub fn family(&self) -> CertificateFamily {
        match self {
            CertificateType::Jsc
            | CertificateType::Ssc
            | CertificateType::VocationalSsc
            | CertificateType::Hsc
            | CertificateType::VocationalHsc
            | CertificateType::Bm
            | CertificateType::Jdc
            | CertificateType::Dakhil
            | CertificateType::Alim
            | CertificateType::VocationalMadrasah => CertificateFamily::SecondaryExam,
            CertificateType::Diploma => CertificateFamily::Diploma,
            CertificateType::Bsc
            | CertificateType::Msc
            | CertificateType::Ba
            | CertificateType::Ma
            | CertificateType::Bba
            | CertificateType::Mba
            | CertificateType::Llb
            | CertificateType::Llm
            | CertificateType::Mbbs
            | CertificateType::Bds => CertificateFamily::Degree,
            CertificateType::TrainingCompletion => CertificateFamily::Training,
            CertificateType::SkillCertificate => CertificateFamily::Skill,
        }
    }
}

impl fmt::Display for CertificateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CertificateType {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        CertificateType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| ServerError::InvalidArgument(format!("unknown certificate type: {}", s)))
    }
}

/// Free-form academic fields as submitted by the issuing institution
///
/// Which of these are required depends on the certificate type; see
/// [`AcademicRecord::build`]. Blank strings count as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicDetails {
    #[serde(default)]
    pub registration_number: Option<String>,
    #[serde(default)]
    pub examination_year: Option<i32>,
    #[serde(default)]
    pub board: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub gpa: Option<f64>,
    #[serde(default)]
    pub passing_year: Option<i32>,
    #[serde(default)]
    pub diploma_subject: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub cgpa: Option<f64>,
    #[serde(default)]
    pub degree_class: Option<String>,
    #[serde(default)]
    pub convocation_date: Option<NaiveDate>,
    #[serde(default)]
    pub completion_date: Option<NaiveDate>,
    #[serde(default)]
    pub skill_name: Option<String>,
}

/// Validated, type-specific academic content of a certificate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum AcademicRecord {
    SecondaryExam {
        registration_number: Option<String>,
        examination_year: i32,
        board: String,
        group: Option<String>,
        gpa: f64,
        passing_year: Option<i32>,
    },
    Diploma {
        subject: String,
        duration: Option<String>,
        session: Option<String>,
        cgpa: Option<f64>,
        passing_year: Option<i32>,
    },
    Degree {
        program: String,
        department: Option<String>,
        major: Option<String>,
        session: Option<String>,
        cgpa: Option<f64>,
        degree_class: Option<String>,
        convocation_date: Option<NaiveDate>,
    },
    Training {
        program: String,
        duration: Option<String>,
        completion_date: NaiveDate,
    },
    Skill {
        skill_name: String,
        duration: Option<String>,
        completion_date: Option<NaiveDate>,
    },
}

/// Score fields exposed on the public verification view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpa: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cgpa: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examination_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl AcademicRecord {
    /// Build the record for `certificate_type` from submitted details
    ///
    /// `fallback_board` is the issuing institution's board, used when a
    /// secondary exam request omits one.
    pub fn build(
        certificate_type: CertificateType,
        details: &AcademicDetails,
        fallback_board: Option<&str>,
    ) -> ServerResult<Self> {
        let record = match certificate_type.family() {
            CertificateFamily::SecondaryExam => AcademicRecord::SecondaryExam {
                registration_number: text(&details.registration_number),
                examination_year: required(details.examination_year, "examinationYear")?,
                board: text(&details.board)
                    .or_else(|| fallback_board.map(|b| b.trim().to_string()).filter(|b| !b.is_empty()))
                    .ok_or_else(|| missing("board"))?,
                group: text(&details.group),
                gpa: score(required(details.gpa, "gpa")?, "gpa")?,
                passing_year: details.passing_year,
            },
            CertificateFamily::Diploma => AcademicRecord::Diploma {
                subject: required(text(&details.diploma_subject), "diplomaSubject")?,
                duration: text(&details.duration),
                session: text(&details.session),
                cgpa: details.cgpa.map(|v| score(v, "cgpa")).transpose()?,
                passing_year: details.passing_year,
            },
            CertificateFamily::Degree => AcademicRecord::Degree {
                program: required(text(&details.program), "program")?,
                department: text(&details.department),
                major: text(&details.major),
                session: text(&details.session),
                cgpa: details.cgpa.map(|v| score(v, "cgpa")).transpose()?,
                degree_class: text(&details.degree_class),
                convocation_date: details.convocation_date,
            },
            CertificateFamily::Training => AcademicRecord::Training {
                program: required(text(&details.program), "program")?,
                duration: text(&details.duration),
                completion_date: required(details.completion_date, "completionDate")?,
            },
            CertificateFamily::Skill => AcademicRecord::Skill {
                skill_name: required(text(&details.skill_name), "skillName")?,
                duration: text(&details.duration),
                completion_date: details.completion_date,
            },
        };
        Ok(record)
    }

    pub fn family(&self) -> CertificateFamily {
        match self {
            AcademicRecord::SecondaryExam { .. } => CertificateFamily::SecondaryExam,
            AcademicRecord::Diploma { .. } => CertificateFamily::Diploma,
            AcademicRecord::Degree { .. } => CertificateFamily::Degree,
            AcademicRecord::Training { .. } => CertificateFamily::Training,
            AcademicRecord::Skill { .. } => CertificateFamily::Skill,
        }
    }

    /// Scores shown to the public
    pub fn scores(&self) -> ScoreSummary {
        match self {
            AcademicRecord::SecondaryExam {
                examination_year,
                board,
                group,
                gpa,
                ..
            } => ScoreSummary {
                gpa: Some(*gpa),
                board: Some(board.clone()),
                group: group.clone(),
                examination_year: Some(*examination_year),
                ..Default::default()
            },
            AcademicRecord::Diploma { subject, cgpa, .. } => ScoreSummary {
                cgpa: *cgpa,
                subject: Some(subject.clone()),
                ..Default::default()
            },
            AcademicRecord::Degree {
                program,
                cgpa,
                degree_class,
                ..
            } => ScoreSummary {
                cgpa: *cgpa,
                degree_class: degree_class.clone(),
                subject: Some(program.clone()),
                ..Default::default()
            },
            AcademicRecord::Training { program, .. } => ScoreSummary {
                subject: Some(program.clone()),
                ..Default::default()
            },
            AcademicRecord::Skill { skill_name, .. } => ScoreSummary {
                subject: Some(skill_name.clone()),
                ..Default::default()
            },
        }
    }
}

fn text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn required<T>(value: Option<T>, field: &str) -> ServerResult<T> {
    value.ok_or_else(|| missing(field))
}

fn missing(field: &str) -> ServerError {
    ServerError::MissingRequiredField(field.to_string())
}

fn score(value: f64, field: &str) -> ServerResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ServerError::InvalidArgument(format!(
            "{} must be a non-negative number",
            field
        )))
    }
}
