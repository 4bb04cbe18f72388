use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use shared::responses::HeadpatResponse;

use crate::api::state::StaffAppState;

#[utoipa::path(
    get,
    path = "/headpat",
    tag = "Health",
    operation_id = "headpat",
    responses(
        (status = 200, description = "Service and database are up", body = HeadpatResponse),
        (status = 503, description = "Database unreachable", body = HeadpatResponse)
    )
)]
pub async fn headpat(State(state): State<Arc<StaffAppState>>) -> impl IntoResponse {
    match state.staff_service.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HeadpatResponse {
                message: "nyaa~! staff records purring along, senpai! (=^-w-^=)",
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Database connection failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HeadpatResponse {
                    message: "Database connection unavailable",
                }),
            )
        }
    }
}
