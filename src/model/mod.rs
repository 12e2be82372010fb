//! Domain types: certificates, academic records, registry parties

mod academic;
mod activity;
mod certificate;
mod party;
mod view;

pub use academic::{AcademicDetails, AcademicRecord, CertificateFamily, CertificateType, ScoreSummary};
pub use activity::{ActivityAction, ActivityEvent, ActorType};
pub use certificate::{
    verification_url, ArtifactRef, ArtifactState, Certificate, NewCertificate, RollNumber,
};
pub use party::{Enrollment, Institution, Student};
pub use view::CertificatePublicView;
