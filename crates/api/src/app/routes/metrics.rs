use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use cargohold_storage::metrics::DEFAULT_EXPIRY_WINDOW_DAYS;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn get_storage_status(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.storage_status() {
        Ok(status) => (StatusCode::OK, Json(dto::success(status))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn efficiency_metrics(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.efficiency_metrics() {
        Ok(metrics) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "efficiency_metrics": metrics,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn expiring_items(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::ExpiringItemsQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::query_rejection(e),
    };
    let days = query.days.unwrap_or(DEFAULT_EXPIRY_WINDOW_DAYS);

    match services.expiring_items(days) {
        Ok(items) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "count": items.len(),
                "expiring_items": items,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
