//! Registration-code linking flow.
//!
//! A handful of sequential existence checks and updates across the code and
//! profile tables: the code must exist and be unused, the profile must exist,
//! then the code is claimed and recorded on the profile. There is no recovery
//! beyond logging; each failure is surfaced distinctly so the operator can
//! tell what to fix.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::application::repos::{RegistrationRepo, RepoError};

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("registration code `{code}` not found")]
    UnknownCode { code: String },
    #[error("registration code `{code}` is already used")]
    CodeAlreadyUsed { code: String },
    #[error("profile `{profile_id}` not found")]
    UnknownProfile { profile_id: Uuid },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct RegistrationService {
    repo: Arc<dyn RegistrationRepo>,
}

impl RegistrationService {
    pub fn new(repo: Arc<dyn RegistrationRepo>) -> Self {
        Self { repo }
    }

    pub async fn link_code(&self, code: &str, profile_id: Uuid) -> Result<(), RegistrationError> {
        let record = self
            .repo
            .find_code(code)
            .await?
            .ok_or_else(|| RegistrationError::UnknownCode {
                code: code.to_string(),
            })?;

        if record.used {
            return Err(RegistrationError::CodeAlreadyUsed {
                code: code.to_string(),
            });
        }

        self.repo
            .find_profile(profile_id)
            .await?
            .ok_or(RegistrationError::UnknownProfile { profile_id })?;

        self.repo.claim_code(code, profile_id).await?;
        self.repo.attach_code_to_profile(profile_id, code).await?;

        info!(
            target = "application::registration",
            code = %code,
            profile_id = %profile_id,
            "registration code linked"
        );

        Ok(())
    }
}
