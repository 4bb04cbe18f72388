use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use shared::responses::{ApiResponse, message};
use thiserror::Error;

// Staff Service Error
#[derive(Debug, Error)]
pub enum StaffServiceError {
    /// Another active record already uses the business key.
    #[error("{}", message::EXISTS)]
    Conflict,

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    /// The write went through but touched no rows.
    #[error("{}", message::FAILED)]
    Persistence,

    /// Export requested for a page with no rows.
    #[error("{}", message::NO_DATA)]
    NoContent,

    #[error("{0}")]
    Rendering(String),

    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StaffServiceError {
    /// Status classifier carried in the failure envelope.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Conflict => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NoContent => StatusCode::NO_CONTENT,
            Self::Persistence | Self::Rendering(_) | Self::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Status of the HTTP response. A 204 cannot carry the envelope, so an
    /// empty export is answered as 404.
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::NoContent => StatusCode::NOT_FOUND,
            other => other.status(),
        }
    }
}

impl IntoResponse for StaffServiceError {
    fn into_response(self) -> Response {
        let status = self.http_status();

        if status.is_server_error() {
            tracing::error!(error = %self, %status, "Server error");
        } else {
            tracing::warn!(error = %self, %status, "Client error");
        }

        let message = match &self {
            Self::Database(_) => {
                "Oof, Something went wrong while accessing the database.".to_owned()
            }
            other => other.to_string(),
        };

        let body = ApiResponse::<()>::err(message, self.status().as_u16());
        (status, axum::Json(body)).into_response()
    }
}
