//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::certificates::CertificateInput;
use crate::domain::entities::{EnrollmentRecord, ProfileRecord, RegistrationCodeRecord};
use crate::domain::types::CertificateStatus;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct NewEnrollmentParams {
    pub id: String,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub certificate_status: CertificateStatus,
}

#[async_trait]
pub trait EnrollmentsRepo: Send + Sync {
    /// Resolve the free-text fields the certificate template needs. Fails
    /// with [`RepoError::NotFound`] when the enrollment or one of its related
    /// student/course records is missing.
    async fn certificate_input(&self, enrollment_id: &str)
    -> Result<CertificateInput, RepoError>;

    async fn find_enrollment(
        &self,
        enrollment_id: &str,
    ) -> Result<Option<EnrollmentRecord>, RepoError>;

    /// Set the certificate URL on an enrollment. An update that matches zero
    /// rows reports [`RepoError::NotFound`] so callers can tell "artifact
    /// exists but isn't linked" apart from "nothing happened".
    async fn set_certificate_url(&self, enrollment_id: &str, url: &str) -> Result<(), RepoError>;

    /// Ids of enrollments whose certificate URL is still null, oldest first.
    async fn list_missing_certificates(&self, limit: u32) -> Result<Vec<String>, RepoError>;

    async fn insert_enrollment(&self, params: NewEnrollmentParams) -> Result<(), RepoError>;

    /// Cheap liveness probe against the record store.
    async fn health(&self) -> Result<(), RepoError>;
}

#[async_trait]
pub trait RegistrationRepo: Send + Sync {
    async fn find_code(&self, code: &str) -> Result<Option<RegistrationCodeRecord>, RepoError>;

    async fn find_profile(&self, profile_id: Uuid) -> Result<Option<ProfileRecord>, RepoError>;

    /// Mark a code used and record the owning profile. Zero rows updated
    /// reports [`RepoError::NotFound`].
    async fn claim_code(&self, code: &str, profile_id: Uuid) -> Result<(), RepoError>;

    /// Record the claimed code on the profile row.
    async fn attach_code_to_profile(&self, profile_id: Uuid, code: &str)
    -> Result<(), RepoError>;
}
