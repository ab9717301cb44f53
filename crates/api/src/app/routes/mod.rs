use axum::{
    routing::{get, post, put},
    Router,
};

pub mod containers;
pub mod logs;
pub mod metrics;
pub mod placement;
pub mod retrieval;
pub mod system;
pub mod waste;

/// Router for every cargo endpoint (mounted under `/api`).
pub fn router() -> Router {
    Router::new()
        .route("/place_item", post(placement::place_item))
        .route("/rearrange_items", post(placement::rearrange_items))
        .route("/find_item", get(retrieval::find_item))
        .route("/retrieve_item/:id", post(retrieval::retrieve_item))
        .route("/item/:id", get(retrieval::get_item))
        .route("/update_item/:id", put(retrieval::update_item))
        .route("/mark_as_waste", post(waste::mark_as_waste))
        .route("/return_planning/:id", get(waste::return_planning))
        .route("/confirm_return/:id", post(waste::confirm_return))
        .route("/undock_plan", post(waste::undock_plan))
        .route("/add_container", post(containers::add_container))
        .route("/add_waste_container", post(containers::add_waste_container))
        .route("/get_storage_status", get(metrics::get_storage_status))
        .route("/efficiency_metrics", get(metrics::efficiency_metrics))
        .route("/expiring_items", get(metrics::expiring_items))
        .route("/logs", get(logs::logs))
}
