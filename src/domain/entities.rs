//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::types::CertificateStatus;

/// One student's enrollment in one course. The certificate URL is nullable
/// and only ever set after the certificate artifact has been durably stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentRecord {
    pub id: String,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub certificate_status: CertificateStatus,
    pub certificate_url: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileRecord {
    pub id: Uuid,
    pub full_name: String,
    pub registration_code: Option<String>,
    pub created_at: OffsetDateTime,
}

/// A pre-issued code a student redeems to link their account to a seat.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationCodeRecord {
    pub code: String,
    pub used: bool,
    pub profile_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
}
