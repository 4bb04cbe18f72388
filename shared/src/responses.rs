use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::pagination::Page;

/// Fixed catalog of envelope messages.
pub mod message {
    pub const RETRIEVED: &str = "The record has been retrieved successfully.";
    pub const SAVED: &str = "The resource was created successfully.";
    pub const UPDATED: &str = "The record has been updated successfully.";
    pub const DELETED: &str = "The record has been deleted successfully.";
    pub const FAILED: &str = "Failed to save record";
    pub const EXISTS: &str =
        "The record you are trying to create already exists. Please try again with a different value.";
    pub const NO_DATA: &str = "No data available to export";
    pub const BIRTHDAY_NOT_IN_PAST: &str =
        "The birthday can not be same current date or bigger current date.";
}

/// Standard JSON response envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub struct ApiResponse<T: Serialize> {
    pub is_success: bool,
    pub message: String,
    pub status: u16,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a success envelope wrapping the given data.
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            is_success: true,
            message: message.into(),
            status: 200,
            data: Some(data),
        }
    }

    /// Creates a failure envelope with the given message and status classifier.
    pub fn err(message: impl Into<String>, status: u16) -> Self {
        Self {
            is_success: false,
            message: message.into(),
            status,
            data: None,
        }
    }
}

/// Envelope for list endpoints, flattening the page metadata next to the data.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub struct PaginatedResponse<T: Serialize> {
    pub is_success: bool,
    pub message: String,
    pub status: u16,
    pub data: Vec<T>,
    pub current_page: i64,
    pub page_size: i64,
    pub total_count: i64,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl<T: Serialize> PaginatedResponse<T> {
    pub fn ok(page: Page<T>, message: impl Into<String>) -> Self {
        let total_pages = page.total_pages();
        let has_next_page = page.has_next_page();
        let has_previous_page = page.has_previous_page();

        Self {
            is_success: true,
            message: message.into(),
            status: 200,
            current_page: page.current_page,
            page_size: page.page_size,
            total_count: page.total_count,
            total_pages,
            has_next_page,
            has_previous_page,
            data: page.items,
        }
    }
}

/// Response for the `/headpat` health check endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct HeadpatResponse {
    pub message: &'static str,
}
