//! Certificate generation-and-publish workflow.
//!
//! Two collaborating steps invoked synchronously from a request or batch run:
//! the renderer produces the PDF bytes in memory, then the publisher uploads
//! them to object storage under the enrollment-keyed path, resolves the
//! public URL, and persists that URL onto the enrollment row. Each step is
//! fail-fast; a failure anywhere leaves the enrollment row untouched and is
//! reported to the caller. Orphan bytes left in storage by a mid-workflow
//! failure are overwritten on the next successful retry because the storage
//! key is deterministic.

pub mod backfill;
pub mod render;

use std::sync::Arc;

use bytes::Bytes;
use metrics::counter;
use time::Date;
use tracing::{error, info};

use crate::application::repos::{EnrollmentsRepo, RepoError};
use crate::domain::certificates::{
    CERTIFICATE_CONTENT_TYPE, CertificateError, CertificateInput, default_issue_date, storage_key,
};
use crate::infra::storage::ObjectStore;

pub use render::RenderError;

#[derive(Clone)]
pub struct CertificateService {
    store: Arc<dyn ObjectStore>,
    enrollments: Arc<dyn EnrollmentsRepo>,
}

impl CertificateService {
    pub fn new(store: Arc<dyn ObjectStore>, enrollments: Arc<dyn EnrollmentsRepo>) -> Self {
        Self { store, enrollments }
    }

    /// Run the full workflow for one enrollment: render, upload, resolve,
    /// persist. Returns the public URL just persisted.
    pub async fn issue(
        &self,
        input: &CertificateInput,
        issued_on: Option<Date>,
    ) -> Result<String, CertificateError> {
        let issued_on = issued_on.unwrap_or_else(default_issue_date);

        let document = render::render_certificate(input, issued_on).map_err(|err| {
            let failure = CertificateError::render(&input.enrollment_id, &err);
            self.report_failure(input, &failure);
            failure
        })?;

        let url = self.publish(input, Bytes::from(document)).await?;

        counter!("cursus_certificates_issued_total").increment(1);
        info!(
            target = "application::certificates",
            enrollment_id = %input.enrollment_id,
            student = %input.student_name,
            course = %input.course_title,
            url = %url,
            "certificate issued"
        );

        Ok(url)
    }

    /// Publish already-rendered bytes for an enrollment. Exposed separately
    /// so the upload/resolve/persist contract can be exercised on its own.
    pub async fn publish(
        &self,
        input: &CertificateInput,
        document: Bytes,
    ) -> Result<String, CertificateError> {
        let enrollment_id = input.enrollment_id.as_str();
        let key = storage_key(enrollment_id);

        self.store
            .put(&key, document, CERTIFICATE_CONTENT_TYPE)
            .await
            .map_err(|err| {
                let failure = CertificateError::upload(enrollment_id, &err);
                self.report_failure(input, &failure);
                failure
            })?;

        let url = self.store.public_url(&key).map_err(|err| {
            let failure = CertificateError::resolve_url(enrollment_id, &err);
            self.report_failure(input, &failure);
            failure
        })?;
        if url.is_empty() {
            let failure =
                CertificateError::resolve_url(enrollment_id, "storage returned an empty URL");
            self.report_failure(input, &failure);
            return Err(failure);
        }

        self.enrollments
            .set_certificate_url(enrollment_id, &url)
            .await
            .map_err(|err| {
                let missing = matches!(err, RepoError::NotFound);
                let failure = CertificateError::persist(enrollment_id, &err, missing);
                self.report_failure(input, &failure);
                failure
            })?;

        Ok(url)
    }

    fn report_failure(&self, input: &CertificateInput, failure: &CertificateError) {
        counter!("cursus_certificates_failed_total").increment(1);
        error!(
            target = "application::certificates",
            enrollment_id = %input.enrollment_id,
            student = %input.student_name,
            course = %input.course_title,
            error = %failure,
            "certificate workflow failed"
        );
    }
}
