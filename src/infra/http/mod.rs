pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use middleware::{log_responses, set_request_context};

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route(
            "/api/v1/enrollments/{id}",
            get(handlers::get_enrollment),
        )
        .route(
            "/api/v1/enrollments/{id}/certificate",
            post(handlers::issue_certificate),
        )
        .route("/api/v1/payments/verify", post(handlers::verify_payment))
        .route(
            "/api/v1/registration/link",
            post(handlers::link_registration),
        )
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}
