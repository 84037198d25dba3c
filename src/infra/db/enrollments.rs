use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{EnrollmentsRepo, NewEnrollmentParams, RepoError},
    domain::{certificates::CertificateInput, entities::EnrollmentRecord, types::CertificateStatus},
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct EnrollmentRow {
    id: String,
    student_id: Uuid,
    course_id: Uuid,
    certificate_status: CertificateStatus,
    certificate_url: Option<String>,
    created_at: OffsetDateTime,
}

impl From<EnrollmentRow> for EnrollmentRecord {
    fn from(row: EnrollmentRow) -> Self {
        Self {
            id: row.id,
            student_id: row.student_id,
            course_id: row.course_id,
            certificate_status: row.certificate_status,
            certificate_url: row.certificate_url,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CertificateInputRow {
    enrollment_id: String,
    student_name: String,
    course_title: String,
    instructor_name: String,
}

#[async_trait]
impl EnrollmentsRepo for PostgresRepositories {
    async fn certificate_input(
        &self,
        enrollment_id: &str,
    ) -> Result<CertificateInput, RepoError> {
        // Inner joins so a dangling student or course reference surfaces as
        // NotFound rather than rendering a certificate with blank fields.
        let row = sqlx::query_as::<_, CertificateInputRow>(
            r#"
            SELECT e.id AS enrollment_id,
                   p.full_name AS student_name,
                   c.title AS course_title,
                   c.instructor_name
              FROM enrollments e
              INNER JOIN profiles p ON p.id = e.student_id
              INNER JOIN courses c ON c.id = e.course_id
             WHERE e.id = $1
            "#,
        )
        .bind(enrollment_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?
        .ok_or(RepoError::NotFound)?;

        Ok(CertificateInput {
            enrollment_id: row.enrollment_id,
            student_name: row.student_name,
            course_title: row.course_title,
            instructor_name: row.instructor_name,
        })
    }

    async fn find_enrollment(
        &self,
        enrollment_id: &str,
    ) -> Result<Option<EnrollmentRecord>, RepoError> {
        let row = sqlx::query_as::<_, EnrollmentRow>(
            r#"
            SELECT id, student_id, course_id, certificate_status, certificate_url, created_at
              FROM enrollments
             WHERE id = $1
            "#,
        )
        .bind(enrollment_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(EnrollmentRecord::from))
    }

    async fn set_certificate_url(&self, enrollment_id: &str, url: &str) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE enrollments
               SET certificate_url = $2
             WHERE id = $1
            "#,
        )
        .bind(enrollment_id)
        .bind(url)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn list_missing_certificates(&self, limit: u32) -> Result<Vec<String>, RepoError> {
        let limit = limit.clamp(1, 10_000) as i64;

        sqlx::query_scalar::<_, String>(
            r#"
            SELECT id
              FROM enrollments
             WHERE certificate_url IS NULL
               AND certificate_status = $2
             ORDER BY created_at ASC, id ASC
             LIMIT $1
            "#,
        )
        .bind(limit)
        .bind(CertificateStatus::Approved)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn insert_enrollment(&self, params: NewEnrollmentParams) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO enrollments (id, student_id, course_id, certificate_status, created_at)
            VALUES ($1, $2, $3, $4, now())
            "#,
        )
        .bind(&params.id)
        .bind(params.student_id)
        .bind(params.course_id)
        .bind(params.certificate_status)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn health(&self) -> Result<(), RepoError> {
        sqlx::query("SELECT 1")
            .execute(self.pool())
            .await
            .map(|_| ())
            .map_err(map_sqlx_error)
    }
}
