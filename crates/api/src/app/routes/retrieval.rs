use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use cargohold_storage::ItemUpdate;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn find_item(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::FindItemQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::query_rejection(e),
    };

    match services.search(&query.query, query.category.as_deref()) {
        Ok(items) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "count": items.len(),
                "items": items,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn retrieve_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.retrieve_item(&id) {
        Ok(item) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": format!("Item {id} retrieved"),
                "item": item,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.item_details(&id) {
        Ok(details) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "item": details,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<ItemUpdate>, JsonRejection>,
) -> axum::response::Response {
    let Json(update) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };

    match services.update_item(&id, update) {
        Ok(item) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": format!("Item {id} updated successfully"),
                "item": item,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
