//! Router configuration for the web server.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    // Twice the upload limit; anything between the two is rejected by
    // upload validation with a JSON error.
    let body_limit = usize::try_from(state.workflow.pipeline.max_upload_bytes())
        .unwrap_or(usize::MAX)
        .saturating_mul(2);

    Router::new()
        .route("/health", get(handlers::health))
        // Document intake
        .route(
            "/api/documents",
            get(handlers::list_documents).post(handlers::upload_document),
        )
        .route("/api/documents/:doc_id", get(handlers::get_document))
        .route(
            "/api/documents/:doc_id/decision",
            post(handlers::decide_document),
        )
        // Buildings
        .route(
            "/api/buildings",
            get(handlers::list_buildings).post(handlers::create_building),
        )
        .route(
            "/api/buildings/:building_id/units",
            get(handlers::list_units).post(handlers::add_unit),
        )
        .route(
            "/api/buildings/:building_id/compliance",
            get(handlers::building_compliance),
        )
        .route(
            "/api/buildings/:building_id/assets",
            post(handlers::add_assets),
        )
        .route(
            "/api/building-assets/:asset_id",
            delete(handlers::delete_asset),
        )
        .route("/api/asset-types", get(handlers::asset_types))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
