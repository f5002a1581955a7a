//! Document intake and confirmation endpoints.

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, JsonRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use super::super::AppState;
use super::api_types::{
    ApiResponse, DecisionChoice, DecisionRequest, DeclineAccepted, ListQuery, UploadQuery,
};
use super::helpers::{bad_request, internal_error, not_found};
use crate::workflow::{GateError, IngestError, SinkError};

const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 500;

/// Upload a document and run it through extraction and summarization.
///
/// The body is the raw file; the name comes from the query string.
pub async fn upload_document(
    State(state): State<AppState>,
    Query(params): Query<UploadQuery>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => return ApiResponse::error(rejection.status(), rejection.body_text()),
    };
    let Some(filename) = params
        .filename
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
    else {
        return bad_request("Query parameter 'filename' is required");
    };

    match state
        .workflow
        .pipeline
        .ingest(filename, body.to_vec(), params.building_id.as_deref())
        .await
    {
        Ok(analyzed) => ApiResponse::created(analyzed),
        Err(IngestError::Extraction { job_id, failure }) => {
            info!("Extraction failed for {}: {}", filename, failure.message);
            ApiResponse::extraction_failed(job_id, failure)
        }
        Err(IngestError::BuildingNotFound(id)) => not_found(format!("Building not found: {}", id)),
        Err(IngestError::Database(e)) => internal_error(e),
    }
}

pub async fn list_documents(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Response {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);

    match state.workflow.db.documents().list_recent(limit).await {
        Ok(jobs) => ApiResponse::ok(jobs).into_response(),
        Err(e) => internal_error(e),
    }
}

pub async fn get_document(State(state): State<AppState>, Path(doc_id): Path<String>) -> Response {
    match state.workflow.db.documents().get(&doc_id).await {
        Ok(Some(job)) => ApiResponse::ok(job).into_response(),
        Ok(None) => not_found(format!("Document not found: {}", doc_id)),
        Err(e) => internal_error(e),
    }
}

/// Confirm or decline a presented summary.
pub async fn decide_document(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
    body: Result<Json<DecisionRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return ApiResponse::error(rejection.status(), rejection.body_text()),
    };

    let job = match state.workflow.db.documents().get(&doc_id).await {
        Ok(Some(job)) => job,
        Ok(None) => return not_found(format!("Document not found: {}", doc_id)),
        Err(e) => return internal_error(e),
    };

    match request.decision {
        DecisionChoice::Confirm => {
            match state
                .workflow
                .gate
                .confirm(&job, request.building_id.as_deref())
                .await
            {
                Ok(outcome) => ApiResponse::ok(outcome).into_response(),
                Err(e) => gate_error(e),
            }
        }
        DecisionChoice::Decline => {
            match state
                .workflow
                .gate
                .decline(&job, request.reason.as_deref())
                .await
            {
                Ok(_) => (
                    StatusCode::ACCEPTED,
                    ApiResponse::ok(DeclineAccepted {
                        document_id: job.id,
                        decision: "declined",
                    }),
                )
                    .into_response(),
                Err(e) => gate_error(e),
            }
        }
    }
}

fn gate_error(err: GateError) -> Response {
    match err {
        GateError::BuildingRequired => bad_request(err.to_string()),
        GateError::NotPresented { .. } | GateError::Sink(SinkError::AlreadyDecided(_)) => {
            ApiResponse::error(StatusCode::CONFLICT, err.to_string())
        }
        GateError::Sink(SinkError::BuildingNotFound(_)) => not_found(err.to_string()),
        GateError::Sink(SinkError::UnmappedDocumentType(_)) => {
            ApiResponse::error(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
        GateError::Sink(SinkError::Database(e)) | GateError::Database(e) => internal_error(e),
    }
}
