use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn logs(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::LogsQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::query_rejection(e),
    };
    let filter = match query.into_filter() {
        Ok(f) => f,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.logs(filter) {
        Ok(page) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "total_logs": page.total,
                "logs": page.entries,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
