use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use cargohold_core::DomainError;
use cargohold_infra::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(err) => domain_error_to_response(err),
        ServiceError::StoreFailure(e) => {
            tracing::error!(error = %e, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let (status, code) = match &err {
        DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
        DomainError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
        DomainError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "validation_error"),
        DomainError::CapacityExceeded(_) => (StatusCode::BAD_REQUEST, "capacity_exceeded"),
        DomainError::NoCapacity(_) => (StatusCode::BAD_REQUEST, "no_capacity"),
        DomainError::NoWasteContainer(_) => (StatusCode::BAD_REQUEST, "no_waste_container"),
        DomainError::InvalidMove(_) => (StatusCode::BAD_REQUEST, "invalid_move"),
        DomainError::InvariantViolation(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation")
        }
    };
    tracing::warn!(code, error = %err, "request rejected");
    json_error(status, code, err.to_string())
}

pub fn json_rejection(rejection: JsonRejection) -> axum::response::Response {
    tracing::warn!(error = %rejection, "malformed request body");
    json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}

pub fn query_rejection(rejection: QueryRejection) -> axum::response::Response {
    tracing::warn!(error = %rejection, "malformed query string");
    json_error(StatusCode::BAD_REQUEST, "invalid_query", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
