pub mod handler;
pub mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use utoipa::OpenApi;

use self::{
    handler::{health, staff},
    state::StaffAppState,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::headpat,
        staff::find_all,
        staff::find_by_id,
        staff::create,
        staff::update,
        staff::delete,
        staff::export_pdf,
        staff::export_excel,
    ),
    tags(
        (name = "Staff", description = "Staff record management"),
        (name = "Health", description = "Liveness of the service and its database"),
    )
)]
pub struct ApiDoc;

/// Application routes without middleware, shared by `main` and the tests.
pub fn router(state: Arc<StaffAppState>) -> Router {
    Router::new()
        .route("/headpat", get(health::headpat))
        .route("/api/v1/staffs", get(staff::find_all))
        .route("/api/v1/staffs/pdf", get(staff::export_pdf))
        .route("/api/v1/staffs/excel", get(staff::export_excel))
        .route("/api/v1/staff", post(staff::create).put(staff::update))
        .route(
            "/api/v1/staff/{id}",
            get(staff::find_by_id).delete(staff::delete),
        )
        .with_state(state)
}
