//! Shared error responses for handlers.

use axum::{http::StatusCode, response::Response};
use tracing::warn;

use super::api_types::ApiResponse;
use crate::models::Building;
use crate::repository::DbContext;

pub fn not_found(message: impl Into<String>) -> Response {
    ApiResponse::error(StatusCode::NOT_FOUND, message)
}

pub fn bad_request(message: impl Into<String>) -> Response {
    ApiResponse::error(StatusCode::BAD_REQUEST, message)
}

/// Log the error and hide its details from the client.
pub fn internal_error(err: impl std::fmt::Display) -> Response {
    warn!("Request failed: {}", err);
    ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

/// Load a building or produce the matching error response.
pub async fn load_building(db: &DbContext, id: &str) -> Result<Building, Response> {
    match db.buildings().get(id).await {
        Ok(Some(building)) => Ok(building),
        Ok(None) => Err(not_found(format!("Building not found: {}", id))),
        Err(e) => Err(internal_error(e)),
    }
}
