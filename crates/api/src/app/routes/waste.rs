use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn mark_as_waste(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::MarkAsWasteRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };
    let item_id = match dto::required("item_id", body.item_id) {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.mark_as_waste(&item_id, body.reason) {
        Ok(assignment) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": format!(
                    "Item {} marked as waste and assigned to waste container {}",
                    assignment.item_id, assignment.waste_container
                ),
                "waste_container": assignment.waste_container,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn return_planning(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.plan_return(&id) {
        Ok(plan) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "return_plan": plan,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn confirm_return(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.confirm_return(&id) {
        Ok(receipt) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": format!("Waste container {} confirmed returned", receipt.waste_container_id),
                "items_removed": receipt.items_removed,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn undock_plan(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::UndockPlanRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };
    let module_id = match dto::required("module_id", body.module_id) {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.schedule_undock(&module_id, body.undock_date, body.plan_type) {
        Ok(plan) => (
            StatusCode::CREATED,
            Json(json!({
                "status": "success",
                "message": format!("Undock plan created for waste container {}", plan.module_id),
                "undock_date": plan.undock_date,
                "items_count": plan.items_count,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
