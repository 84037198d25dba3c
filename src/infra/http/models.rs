use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CertificateIssueRequest {
    /// Date stamped onto the certificate; defaults to today (UTC).
    pub issued_on: Option<Date>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CertificateIssueResponse {
    pub enrollment_id: String,
    pub certificate_url: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PaymentVerifyRequest {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
    pub student_id: Uuid,
    pub course_id: Uuid,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PaymentVerifyResponse {
    pub enrollment_id: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RegistrationLinkRequest {
    pub code: String,
    pub profile_id: Uuid,
}
