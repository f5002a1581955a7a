//! HTTP request handlers.

mod api_types;
mod buildings_api;
mod documents_api;
mod helpers;

pub use buildings_api::{
    add_assets, add_unit, asset_types, building_compliance, create_building, delete_asset,
    list_buildings, list_units,
};
pub use documents_api::{decide_document, get_document, list_documents, upload_document};

/// Health check endpoint.
pub async fn health() -> axum::http::StatusCode {
    axum::http::StatusCode::OK
}
