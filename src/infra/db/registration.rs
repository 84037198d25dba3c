use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{RegistrationRepo, RepoError},
    domain::entities::{ProfileRecord, RegistrationCodeRecord},
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct RegistrationCodeRow {
    code: String,
    used: bool,
    profile_id: Option<Uuid>,
    created_at: OffsetDateTime,
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    full_name: String,
    registration_code: Option<String>,
    created_at: OffsetDateTime,
}

#[async_trait]
impl RegistrationRepo for PostgresRepositories {
    async fn find_code(&self, code: &str) -> Result<Option<RegistrationCodeRecord>, RepoError> {
        let row = sqlx::query_as::<_, RegistrationCodeRow>(
            r#"
            SELECT code, used, profile_id, created_at
              FROM registration_codes
             WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(|row| RegistrationCodeRecord {
            code: row.code,
            used: row.used,
            profile_id: row.profile_id,
            created_at: row.created_at,
        }))
    }

    async fn find_profile(&self, profile_id: Uuid) -> Result<Option<ProfileRecord>, RepoError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, full_name, registration_code, created_at
              FROM profiles
             WHERE id = $1
            "#,
        )
        .bind(profile_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(|row| ProfileRecord {
            id: row.id,
            full_name: row.full_name,
            registration_code: row.registration_code,
            created_at: row.created_at,
        }))
    }

    async fn claim_code(&self, code: &str, profile_id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE registration_codes
               SET used = TRUE,
                   profile_id = $2
             WHERE code = $1
               AND used = FALSE
            "#,
        )
        .bind(code)
        .bind(profile_id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn attach_code_to_profile(
        &self,
        profile_id: Uuid,
        code: &str,
    ) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
               SET registration_code = $2
             WHERE id = $1
            "#,
        )
        .bind(profile_id)
        .bind(code)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}
