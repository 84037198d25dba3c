//! Certificate-specific helpers and invariants.

use thiserror::Error;
use time::Date;

/// MIME type the stored certificate artifact is served with.
pub const CERTIFICATE_CONTENT_TYPE: &str = "application/pdf";

/// Compute the storage key for an enrollment's certificate.
///
/// The key depends only on the enrollment id, so regenerating a certificate
/// overwrites the previous artifact instead of accumulating copies.
pub fn storage_key(enrollment_id: &str) -> String {
    format!("certificates/{enrollment_id}.pdf")
}

/// Everything the renderer needs to lay out one certificate.
///
/// All fields are free text already trimmed by the caller; empty strings are
/// rendered as empty text rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateInput {
    pub enrollment_id: String,
    pub student_name: String,
    pub course_title: String,
    pub instructor_name: String,
}

/// Failures the generate-and-publish workflow can surface, one variant per
/// step. Each carries the owning enrollment id so operators can reconcile
/// partial runs by hand.
#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("rendering certificate for enrollment `{enrollment_id}` failed: {cause}")]
    Render {
        enrollment_id: String,
        cause: String,
    },
    #[error("uploading certificate for enrollment `{enrollment_id}` failed: {cause}")]
    Upload {
        enrollment_id: String,
        cause: String,
    },
    #[error("resolving certificate URL for enrollment `{enrollment_id}` failed: {cause}")]
    ResolveUrl {
        enrollment_id: String,
        cause: String,
    },
    #[error("persisting certificate URL for enrollment `{enrollment_id}` failed: {cause}")]
    Persist {
        enrollment_id: String,
        cause: String,
        /// True when the enrollment row no longer exists (zero rows updated),
        /// as opposed to the update itself failing.
        enrollment_missing: bool,
    },
}

impl CertificateError {
    pub fn render(enrollment_id: &str, cause: impl std::fmt::Display) -> Self {
        Self::Render {
            enrollment_id: enrollment_id.to_string(),
            cause: cause.to_string(),
        }
    }

    pub fn upload(enrollment_id: &str, cause: impl std::fmt::Display) -> Self {
        Self::Upload {
            enrollment_id: enrollment_id.to_string(),
            cause: cause.to_string(),
        }
    }

    pub fn resolve_url(enrollment_id: &str, cause: impl std::fmt::Display) -> Self {
        Self::ResolveUrl {
            enrollment_id: enrollment_id.to_string(),
            cause: cause.to_string(),
        }
    }

    pub fn persist(
        enrollment_id: &str,
        cause: impl std::fmt::Display,
        enrollment_missing: bool,
    ) -> Self {
        Self::Persist {
            enrollment_id: enrollment_id.to_string(),
            cause: cause.to_string(),
            enrollment_missing,
        }
    }

    pub fn enrollment_id(&self) -> &str {
        match self {
            Self::Render { enrollment_id, .. }
            | Self::Upload { enrollment_id, .. }
            | Self::ResolveUrl { enrollment_id, .. }
            | Self::Persist { enrollment_id, .. } => enrollment_id,
        }
    }
}

/// Date stamped onto a certificate when the caller supplies none.
pub fn default_issue_date() -> Date {
    time::OffsetDateTime::now_utc().date()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_key_is_enrollment_keyed() {
        assert_eq!(storage_key("E1"), "certificates/E1.pdf");
        assert_eq!(storage_key("E1"), storage_key("E1"));
    }

    #[test]
    fn certificate_error_exposes_owner() {
        let err = CertificateError::upload("E7", "quota exceeded");
        assert_eq!(err.enrollment_id(), "E7");
        assert!(err.to_string().contains("quota exceeded"));
    }
}
