use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::error::ErrorReport;
use crate::application::payments::PaymentError;
use crate::application::registration::RegistrationError;
use crate::application::repos::RepoError;
use crate::domain::certificates::CertificateError;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const NOT_FOUND: &str = "not_found";
    pub const DUPLICATE: &str = "duplicate";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const INTEGRITY: &str = "integrity_error";
    pub const DB_TIMEOUT: &str = "db_timeout";
    pub const REPO: &str = "repo_error";
    pub const RENDER: &str = "render_error";
    pub const STORAGE: &str = "storage_error";
    pub const PERSIST: &str = "persist_error";
    pub const CODE_USED: &str = "registration_code_used";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
    hint: Option<String>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: &'static str,
        hint: Option<String>,
    ) -> Self {
        Self {
            status,
            code,
            message,
            hint,
        }
    }

    pub fn bad_request(message: &'static str, hint: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message, hint)
    }

    pub fn unauthorized(message: &'static str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, codes::UNAUTHORIZED, message, None)
    }

    pub fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, message, None)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Backend cause strings travel in the ErrorReport for the logging
        // middleware; only client errors echo the hint back to the caller.
        let wire_hint = self
            .status
            .is_client_error()
            .then(|| self.hint.clone())
            .flatten();
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message.to_string(),
                hint: wire_hint,
            },
        };

        let mut response = (self.status, Json(body)).into_response();
        let detail = self.hint.unwrap_or_else(|| self.message.to_string());
        ErrorReport::from_message("infra::http::api_error", self.status, detail)
            .attach(&mut response);
        response
    }
}

pub fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::NotFound => ApiError::not_found("resource not found"),
        RepoError::Duplicate { constraint } => ApiError::new(
            StatusCode::CONFLICT,
            codes::DUPLICATE,
            "duplicate record",
            Some(constraint),
        ),
        RepoError::InvalidInput { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "invalid input",
            Some(message),
        ),
        RepoError::Integrity { message } => ApiError::new(
            StatusCode::CONFLICT,
            codes::INTEGRITY,
            "integrity constraint violated",
            Some(message),
        ),
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_TIMEOUT,
            "database timeout",
            None,
        ),
        RepoError::Persistence(message) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "persistence error",
            Some(message),
        ),
    }
}

pub fn certificate_to_api(err: CertificateError) -> ApiError {
    match err {
        CertificateError::Render { cause, .. } => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::RENDER,
            "certificate rendering failed",
            Some(cause),
        ),
        CertificateError::Upload { cause, .. } | CertificateError::ResolveUrl { cause, .. } => {
            ApiError::new(
                StatusCode::BAD_GATEWAY,
                codes::STORAGE,
                "certificate storage failed",
                Some(cause),
            )
        }
        CertificateError::Persist {
            cause,
            enrollment_missing,
            ..
        } => {
            if enrollment_missing {
                ApiError::not_found("enrollment not found")
            } else {
                ApiError::new(
                    StatusCode::BAD_GATEWAY,
                    codes::PERSIST,
                    "certificate stored but not linked",
                    Some(cause),
                )
            }
        }
    }
}

pub fn payment_to_api(err: PaymentError) -> ApiError {
    match err {
        PaymentError::InvalidSignature => ApiError::unauthorized("payment signature rejected"),
        PaymentError::InvalidPayload(message) => {
            ApiError::bad_request("invalid payment payload", Some(message))
        }
        PaymentError::Repo(err) => repo_to_api(err),
    }
}

pub fn registration_to_api(err: RegistrationError) -> ApiError {
    match err {
        RegistrationError::UnknownCode { code } => ApiError::new(
            StatusCode::NOT_FOUND,
            codes::NOT_FOUND,
            "registration code not found",
            Some(code),
        ),
        RegistrationError::CodeAlreadyUsed { code } => ApiError::new(
            StatusCode::CONFLICT,
            codes::CODE_USED,
            "registration code already used",
            Some(code),
        ),
        RegistrationError::UnknownProfile { profile_id } => ApiError::new(
            StatusCode::NOT_FOUND,
            codes::NOT_FOUND,
            "profile not found",
            Some(profile_id.to_string()),
        ),
        RegistrationError::Repo(err) => repo_to_api(err),
    }
}
