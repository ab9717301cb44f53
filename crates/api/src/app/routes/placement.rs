use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use cargohold_storage::PlacementOutcome;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn place_item(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::PlaceItemRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };

    match services.place_item(body.item, body.container_id.as_deref()) {
        Ok(PlacementOutcome::Placed {
            item_id,
            container_id,
        }) => (
            StatusCode::CREATED,
            Json(json!({
                "status": "success",
                "message": format!("Item {item_id} placed in container {container_id}"),
                "item_id": item_id,
                "container_id": container_id,
            })),
        )
            .into_response(),
        Ok(PlacementOutcome::RearrangementNeeded(plan)) => (
            StatusCode::OK,
            Json(json!({
                "status": "rearrangement_needed",
                "message": "Rearrangement needed to accommodate this item",
                "rearrangement_plan": plan,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn rearrange_items(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::RearrangeRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };

    match services.rearrange(body.rearrangement_plan) {
        Ok(moves) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": "Rearrangement completed successfully",
                "moves_completed": moves.len(),
                "moves": moves,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
