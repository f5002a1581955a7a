//! Response envelope and request bodies for the JSON API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::extraction::{ExtractionFailure, FailureKind, StrategyAttempt};
use crate::models::{AssetSelection, BuildingAsset, BuildingComplianceSnapshot};

/// Standard API response envelope.
///
/// Every endpoint returns this wrapper:
/// ```json
/// { "error": false, "context": {}, "data": { ... } }
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<C: Serialize, T: Serialize> {
    pub error: bool,
    pub context: C,
    pub data: T,
}

#[derive(Debug, Default, Serialize)]
pub struct EmptyContext {}

/// Error payload inside the envelope.
#[derive(Debug, Serialize)]
pub struct ErrorData {
    pub message: String,
}

/// Error payload for uploads that produced no usable text.
#[derive(Debug, Serialize)]
pub struct ExtractionErrorData {
    pub message: String,
    pub kind: FailureKind,
    pub suggestions: Vec<String>,
    pub attempts: Vec<StrategyAttempt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

impl ApiResponse<EmptyContext, ErrorData> {
    pub fn error(status: StatusCode, message: impl Into<String>) -> Response {
        (
            status,
            Json(ApiResponse {
                error: true,
                context: EmptyContext {},
                data: ErrorData {
                    message: message.into(),
                },
            }),
        )
            .into_response()
    }
}

impl ApiResponse<EmptyContext, ExtractionErrorData> {
    pub fn extraction_failed(job_id: Option<String>, failure: ExtractionFailure) -> Response {
        let status = match failure.kind {
            FailureKind::Validation => StatusCode::BAD_REQUEST,
            FailureKind::NoText => StatusCode::UNPROCESSABLE_ENTITY,
            FailureKind::Exception => StatusCode::BAD_GATEWAY,
        };
        (
            status,
            Json(ApiResponse {
                error: true,
                context: EmptyContext {},
                data: ExtractionErrorData {
                    message: failure.message,
                    kind: failure.kind,
                    suggestions: failure.suggestions,
                    attempts: failure.attempts,
                    job_id,
                },
            }),
        )
            .into_response()
    }
}

impl<T: Serialize> ApiResponse<EmptyContext, T> {
    pub fn ok(data: T) -> Json<ApiResponse<EmptyContext, T>> {
        Json(ApiResponse {
            error: false,
            context: EmptyContext {},
            data,
        })
    }

    pub fn created(data: T) -> Response {
        (StatusCode::CREATED, Self::ok(data)).into_response()
    }
}

// --- Request bodies ---

/// Query string for `POST /api/documents`.
#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub filename: Option<String>,
    pub building_id: Option<String>,
}

/// Query string for `GET /api/documents`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionChoice {
    Confirm,
    Decline,
}

/// Body of `POST /api/documents/:id/decision`.
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub decision: DecisionChoice,
    pub building_id: Option<String>,
    pub reason: Option<String>,
}

/// Body of `POST /api/buildings`.
#[derive(Debug, Deserialize)]
pub struct CreateBuildingRequest {
    pub name: String,
    pub address: Option<String>,
    #[serde(default)]
    pub is_hrb: bool,
    /// Start tracking every asset type mandatory for this building.
    #[serde(default)]
    pub track_mandatory: bool,
}

/// Body of `POST /api/buildings/:id/units`.
#[derive(Debug, Deserialize)]
pub struct CreateUnitRequest {
    pub unit_number: String,
    pub floor: Option<String>,
    pub leaseholder_name: Option<String>,
    pub leaseholder_email: Option<String>,
}

/// Body of `POST /api/buildings/:id/assets`.
#[derive(Debug, Deserialize)]
pub struct AddAssetsRequest {
    pub asset_types: AssetSelection,
}

// --- Response bodies ---

/// Returned by `POST /api/buildings/:id/assets`.
#[derive(Debug, Serialize)]
pub struct AssetsAdded {
    pub created: Vec<BuildingAsset>,
    pub snapshot: BuildingComplianceSnapshot,
}

/// Returned when a decline has been accepted for logging.
#[derive(Debug, Serialize)]
pub struct DeclineAccepted {
    pub document_id: String,
    pub decision: &'static str,
}
