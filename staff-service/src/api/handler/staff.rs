use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use shared::{
    responses::{ApiResponse, PaginatedResponse, message},
    types::StaffResponse,
};
use uuid::Uuid;

use crate::{
    api::state::StaffAppState,
    domain::{
        export::ExportFile,
        staff::{CreateStaff, StaffSearchQuery, UpdateStaff},
    },
    error::StaffServiceError,
};

#[utoipa::path(
    get,
    path = "/api/v1/staffs",
    tag = "Staff",
    operation_id = "list_staff",
    params(StaffSearchQuery),
    responses(
        (status = 200, description = "One page of active staff", body = PaginatedResponse<StaffResponse>),
        (status = 400, description = "Invalid filter")
    )
)]
#[tracing::instrument(skip(state))]
pub async fn find_all(
    State(state): State<Arc<StaffAppState>>,
    Query(query): Query<StaffSearchQuery>,
) -> Result<Json<PaginatedResponse<StaffResponse>>, StaffServiceError> {
    let output = state.staff_service.get_all(&query).await?;

    Ok(Json(PaginatedResponse::ok(output, message::RETRIEVED)))
}

#[utoipa::path(
    get,
    path = "/api/v1/staff/{id}",
    tag = "Staff",
    operation_id = "get_staff",
    params(
        ("id" = Uuid, Path, description = "Staff record ID")
    ),
    responses(
        (status = 200, description = "Staff found, deleted records included", body = ApiResponse<StaffResponse>),
        (status = 404, description = "Staff not found")
    )
)]
#[tracing::instrument(skip(state))]
pub async fn find_by_id(
    State(state): State<Arc<StaffAppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<StaffResponse>>, StaffServiceError> {
    let output = state.staff_service.get_by_id(id).await?;

    Ok(Json(ApiResponse::ok(output, message::RETRIEVED)))
}

#[utoipa::path(
    post,
    path = "/api/v1/staff",
    tag = "Staff",
    operation_id = "create_staff",
    request_body = CreateStaff,
    responses(
        (status = 200, description = "Staff created, data is the new ID", body = ApiResponse<String>),
        (status = 400, description = "Invalid staff"),
        (status = 409, description = "Staff ID already in use")
    )
)]
#[tracing::instrument(skip(state))]
pub async fn create(
    State(state): State<Arc<StaffAppState>>,
    Json(staff): Json<CreateStaff>,
) -> Result<Json<ApiResponse<Uuid>>, StaffServiceError> {
    let output = state.staff_service.add(staff).await?;

    Ok(Json(ApiResponse::ok(output, message::SAVED)))
}

#[utoipa::path(
    put,
    path = "/api/v1/staff",
    tag = "Staff",
    operation_id = "update_staff",
    request_body = UpdateStaff,
    responses(
        (status = 200, description = "Staff updated, data is the ID", body = ApiResponse<String>),
        (status = 404, description = "Staff not found"),
        (status = 409, description = "Staff ID already in use")
    )
)]
#[tracing::instrument(skip(state))]
pub async fn update(
    State(state): State<Arc<StaffAppState>>,
    Json(staff): Json<UpdateStaff>,
) -> Result<Json<ApiResponse<Uuid>>, StaffServiceError> {
    let output = state.staff_service.update(staff).await?;

    Ok(Json(ApiResponse::ok(output, message::UPDATED)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/staff/{id}",
    tag = "Staff",
    operation_id = "delete_staff",
    params(
        ("id" = Uuid, Path, description = "Staff record ID")
    ),
    responses(
        (status = 200, description = "Staff soft-deleted, data is the ID", body = ApiResponse<String>),
        (status = 404, description = "Staff not found")
    )
)]
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<Arc<StaffAppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Uuid>>, StaffServiceError> {
    let output = state.staff_service.delete(id).await?;

    Ok(Json(ApiResponse::ok(output, message::DELETED)))
}

#[utoipa::path(
    get,
    path = "/api/v1/staffs/pdf",
    tag = "Staff",
    operation_id = "export_staff_pdf",
    params(StaffSearchQuery),
    responses(
        (status = 200, description = "PDF report of the requested page", content_type = "application/pdf"),
        (status = 404, description = "No data available to export")
    )
)]
#[tracing::instrument(skip(state))]
pub async fn export_pdf(
    State(state): State<Arc<StaffAppState>>,
    Query(query): Query<StaffSearchQuery>,
) -> Result<impl IntoResponse, StaffServiceError> {
    let file = state.staff_service.export_pdf(&query).await?;

    Ok(attachment(file))
}

#[utoipa::path(
    get,
    path = "/api/v1/staffs/excel",
    tag = "Staff",
    operation_id = "export_staff_excel",
    params(StaffSearchQuery),
    responses(
        (
            status = 200,
            description = "Excel report of the requested page",
            content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        ),
        (status = 404, description = "No data available to export")
    )
)]
#[tracing::instrument(skip(state))]
pub async fn export_excel(
    State(state): State<Arc<StaffAppState>>,
    Query(query): Query<StaffSearchQuery>,
) -> Result<impl IntoResponse, StaffServiceError> {
    let file = state.staff_service.export_excel(&query).await?;

    Ok(attachment(file))
}

fn attachment(file: ExportFile) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, file.format.content_type().to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.file_name),
            ),
        ],
        file.bytes,
    )
}
