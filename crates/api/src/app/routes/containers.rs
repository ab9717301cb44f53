use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use cargohold_storage::{NewContainer, NewWasteContainer};

use crate::app::errors;
use crate::app::services::AppServices;

pub async fn add_container(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewContainer>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };

    match services.add_container(body) {
        Ok(container) => (
            StatusCode::CREATED,
            Json(json!({
                "status": "success",
                "message": format!("Container {} added successfully", container.id),
                "container": container,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn add_waste_container(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewWasteContainer>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };

    match services.add_waste_container(body) {
        Ok(container) => (
            StatusCode::CREATED,
            Json(json!({
                "status": "success",
                "message": format!("Waste container {} added successfully", container.id),
                "container": container,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
