//! Building, unit and compliance asset endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diesel::result::DatabaseErrorKind;

use super::super::AppState;
use super::api_types::{
    AddAssetsRequest, ApiResponse, AssetsAdded, CreateBuildingRequest, CreateUnitRequest,
};
use super::helpers::{bad_request, internal_error, load_building, not_found};
use crate::models::{Building, Unit, ASSET_TYPES};
use crate::repository::DieselError;
use crate::workflow::{
    compliance_snapshot, register_building, track_assets, untrack_asset, AssetError,
};

fn asset_error(err: AssetError) -> Response {
    match err {
        AssetError::BuildingNotFound(_) | AssetError::AssetNotFound(_) => not_found(err.to_string()),
        AssetError::UnknownAssetType(_) | AssetError::EmptyName => bad_request(err.to_string()),
        AssetError::Database(e) => internal_error(e),
    }
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiResponse::error(rejection.status(), rejection.body_text()))
}

pub async fn list_buildings(State(state): State<AppState>) -> Response {
    match state.workflow.db.buildings().get_all().await {
        Ok(buildings) => ApiResponse::ok(buildings).into_response(),
        Err(e) => internal_error(e),
    }
}

/// Create a building and return its compliance snapshot.
pub async fn create_building(
    State(state): State<AppState>,
    body: Result<Json<CreateBuildingRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let building = Building::new(
        request.name.trim(),
        request.address.filter(|a| !a.trim().is_empty()),
        request.is_hrb,
    );

    match register_building(&state.workflow.db, building, request.track_mandatory).await {
        Ok(snapshot) => ApiResponse::created(snapshot),
        Err(e) => asset_error(e),
    }
}

pub async fn list_units(
    State(state): State<AppState>,
    Path(building_id): Path<String>,
) -> Response {
    if let Err(response) = load_building(&state.workflow.db, &building_id).await {
        return response;
    }
    match state.workflow.db.buildings().units(&building_id).await {
        Ok(units) => ApiResponse::ok(units).into_response(),
        Err(e) => internal_error(e),
    }
}

pub async fn add_unit(
    State(state): State<AppState>,
    Path(building_id): Path<String>,
    body: Result<Json<CreateUnitRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    if request.unit_number.trim().is_empty() {
        return bad_request("Unit number must not be empty");
    }
    if let Err(response) = load_building(&state.workflow.db, &building_id).await {
        return response;
    }

    let unit = Unit {
        floor: request.floor,
        leaseholder_name: request.leaseholder_name,
        leaseholder_email: request.leaseholder_email,
        ..Unit::new(&building_id, request.unit_number.trim())
    };
    match state.workflow.db.buildings().add_unit(&unit).await {
        Ok(()) => ApiResponse::created(unit),
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            ApiResponse::error(
                StatusCode::CONFLICT,
                format!("Unit {} already exists", unit.unit_number),
            )
        }
        Err(e) => internal_error(e),
    }
}

/// Fresh compliance view of one building.
pub async fn building_compliance(
    State(state): State<AppState>,
    Path(building_id): Path<String>,
) -> Response {
    let building = match load_building(&state.workflow.db, &building_id).await {
        Ok(building) => building,
        Err(response) => return response,
    };
    match compliance_snapshot(&state.workflow.db, building).await {
        Ok(snapshot) => ApiResponse::ok(snapshot).into_response(),
        Err(e) => internal_error(e),
    }
}

/// Start tracking a set of asset types for a building.
pub async fn add_assets(
    State(state): State<AppState>,
    Path(building_id): Path<String>,
    body: Result<Json<AddAssetsRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    if request.asset_types.is_empty() {
        return bad_request("Select at least one asset type");
    }

    match track_assets(&state.workflow.db, &building_id, &request.asset_types).await {
        Ok((created, snapshot)) => {
            let status = if created.is_empty() {
                StatusCode::OK
            } else {
                StatusCode::CREATED
            };
            (status, ApiResponse::ok(AssetsAdded { created, snapshot })).into_response()
        }
        Err(e) => asset_error(e),
    }
}

pub async fn delete_asset(
    State(state): State<AppState>,
    Path(asset_id): Path<String>,
) -> Response {
    match untrack_asset(&state.workflow.db, &asset_id).await {
        Ok(snapshot) => ApiResponse::ok(snapshot).into_response(),
        Err(e) => asset_error(e),
    }
}

/// The asset type catalogue.
pub async fn asset_types() -> impl IntoResponse {
    ApiResponse::ok(ASSET_TYPES)
}
