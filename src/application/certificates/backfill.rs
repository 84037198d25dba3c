//! Batch driver that heals enrollments missing a certificate.
//!
//! Sequential, fail-soft iteration: one enrollment at a time, every failure
//! logged and counted, the run never aborts early. Operators re-run it to
//! retry whatever failed; the deterministic storage key makes that safe.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::certificates::CertificateService;
use crate::application::repos::{EnrollmentsRepo, RepoError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillOutcome {
    pub succeeded: usize,
    pub failed: usize,
}

/// Issue certificates for every enrollment whose certificate URL is still
/// null, up to `limit` enrollments.
pub async fn backfill_missing(
    service: &CertificateService,
    enrollments: &Arc<dyn EnrollmentsRepo>,
    limit: u32,
) -> Result<BackfillOutcome, RepoError> {
    let pending = enrollments.list_missing_certificates(limit).await?;

    info!(
        target = "application::certificates::backfill",
        pending = pending.len(),
        "starting certificate backfill"
    );

    let mut outcome = BackfillOutcome::default();

    for enrollment_id in pending {
        let input = match enrollments.certificate_input(&enrollment_id).await {
            Ok(input) => input,
            Err(err) => {
                outcome.failed += 1;
                warn!(
                    target = "application::certificates::backfill",
                    enrollment_id = %enrollment_id,
                    error = %err,
                    "skipping enrollment: related records unavailable"
                );
                continue;
            }
        };

        match service.issue(&input, None).await {
            Ok(_) => outcome.succeeded += 1,
            Err(err) => {
                // Already logged with full context by the service.
                outcome.failed += 1;
                warn!(
                    target = "application::certificates::backfill",
                    enrollment_id = %enrollment_id,
                    error = %err,
                    "certificate backfill entry failed"
                );
            }
        }
    }

    info!(
        target = "application::certificates::backfill",
        succeeded = outcome.succeeded,
        failed = outcome.failed,
        "certificate backfill finished"
    );

    Ok(outcome)
}
