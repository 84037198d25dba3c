//! JSON handlers for the service API.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::infra::http::error::{
    ApiError, certificate_to_api, payment_to_api, registration_to_api, repo_to_api,
};
use crate::infra::http::models::{
    CertificateIssueRequest, CertificateIssueResponse, PaymentVerifyRequest,
    PaymentVerifyResponse, RegistrationLinkRequest,
};
use crate::infra::http::state::ApiState;

use crate::application::payments::PaymentNotification;

/// Run the full certificate workflow for one enrollment and return the
/// public URL that was just persisted.
pub async fn issue_certificate(
    State(state): State<ApiState>,
    Path(enrollment_id): Path<String>,
    body: Option<Json<CertificateIssueRequest>>,
) -> Result<impl IntoResponse + std::fmt::Debug, ApiError> {
    let Json(request) = body.unwrap_or_default();

    let input = state
        .enrollments
        .certificate_input(&enrollment_id)
        .await
        .map_err(repo_to_api)?;

    let certificate_url = state
        .certificates
        .issue(&input, request.issued_on)
        .await
        .map_err(certificate_to_api)?;

    Ok(Json(CertificateIssueResponse {
        enrollment_id,
        certificate_url,
    }))
}

pub async fn get_enrollment(
    State(state): State<ApiState>,
    Path(enrollment_id): Path<String>,
) -> Result<impl IntoResponse + std::fmt::Debug, ApiError> {
    let record = state
        .enrollments
        .find_enrollment(&enrollment_id)
        .await
        .map_err(repo_to_api)?
        .ok_or_else(|| ApiError::not_found("enrollment not found"))?;

    Ok(Json(record))
}

pub async fn verify_payment(
    State(state): State<ApiState>,
    Json(request): Json<PaymentVerifyRequest>,
) -> Result<impl IntoResponse + std::fmt::Debug, ApiError> {
    let notification = PaymentNotification {
        order_id: request.order_id,
        payment_id: request.payment_id,
        signature: request.signature,
        student_id: request.student_id,
        course_id: request.course_id,
    };

    let verified = state
        .payments
        .verify_and_enroll(&notification)
        .await
        .map_err(payment_to_api)?;

    Ok((
        StatusCode::CREATED,
        Json(PaymentVerifyResponse {
            enrollment_id: verified.enrollment_id,
        }),
    ))
}

pub async fn link_registration(
    State(state): State<ApiState>,
    Json(request): Json<RegistrationLinkRequest>,
) -> Result<impl IntoResponse + std::fmt::Debug, ApiError> {
    state
        .registration
        .link_code(&request.code, request.profile_id)
        .await
        .map_err(registration_to_api)?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn healthz(State(state): State<ApiState>) -> impl IntoResponse {
    match state.enrollments.health().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            crate::application::error::ErrorReport::from_error(
                "infra::http::healthz",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}
