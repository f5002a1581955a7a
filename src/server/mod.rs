//! JSON API for document intake and building compliance.
//!
//! Uploads run through the same workflow as the CLI; every mutating
//! building endpoint answers with a fresh compliance snapshot so clients
//! can merge it into their view.

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;

use crate::config::{Config, Settings};
use crate::workflow::Workflow;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub workflow: Workflow,
}

impl AppState {
    pub fn new(workflow: Workflow) -> Self {
        Self { workflow }
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, config: &Config, host: &str, port: u16) -> anyhow::Result<()> {
    settings.ensure_directories()?;
    let workflow = Workflow::from_config(settings, config);
    workflow.db.init_schema().await?;

    let app = create_router(AppState::new(workflow));

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tempfile::tempdir;
    use tower::ServiceExt;

    use crate::calendar::NoCalendar;
    use crate::extraction::{ExtractionChain, ExtractionStrategy, NativeStrategy};
    use crate::llm::{LlmError, TextGenerator};
    use crate::models::Building;
    use crate::repository::DbContext;
    use crate::summarizer::Summarizer;

    const EICR_SUMMARY: &str = r#"{
        "document_type": "EICR",
        "compliance_status": "satisfactory",
        "summary": "Installation in satisfactory condition.",
        "key_findings": [],
        "inspection_details": {
            "inspection_date": "2026-03-02",
            "next_inspection_due": "2031-03-02",
            "certificate_number": "EICR-4471"
        }
    }"#;

    struct FixedGenerator;

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            Ok(EICR_SUMMARY.to_string())
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    async fn setup_test_app() -> (axum::Router, DbContext, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = DbContext::from_path(&dir.path().join("test.db"));
        db.init_schema().await.unwrap();

        let native: Arc<dyn ExtractionStrategy> = Arc::new(NativeStrategy::new());
        let chain = ExtractionChain::with_strategies(vec![native], 50);
        let summarizer = Summarizer::new(Arc::new(FixedGenerator), 4000);
        let workflow = Workflow::assemble(
            db.clone(),
            chain,
            summarizer,
            Arc::new(NoCalendar),
            &Config::default(),
            None,
        );

        (create_router(AppState::new(workflow)), db, dir)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn report_text() -> String {
        "Electrical Installation Condition Report for Flat 3. ".repeat(20)
    }

    async fn upload(app: &axum::Router, filename: &str, body: impl Into<Body>) -> axum::response::Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/documents?filename={}", filename))
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_api_buildings_empty() {
        let (app, _db, _dir) = setup_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/buildings")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["error"], false);
        assert_eq!(json["data"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_create_building_with_mandatory_assets() {
        let (app, _db, _dir) = setup_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/buildings")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"name": "Ashwood House", "address": "1 Ashwood Lane", "track_mandatory": true}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["data"]["building"]["name"], "Ashwood House");
        assert!(!json["data"]["assets"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_requires_filename() {
        let (app, _db, _dir) = setup_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/documents")
                    .body(Body::from("hello"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], true);
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_type_with_suggestions() {
        let (app, _db, _dir) = setup_test_app().await;

        let response = upload(&app, "tenants.xlsx", "a,b,c").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["data"]["kind"], "validation");
        assert!(!json["data"]["suggestions"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_with_too_little_text() {
        let (app, _db, _dir) = setup_test_app().await;

        let response = upload(&app, "note.txt", "too short").await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(json["data"]["kind"], "no_text");
        assert!(json["data"]["job_id"].is_string());
    }

    #[tokio::test]
    async fn test_upload_then_confirm() {
        let (app, db, _dir) = setup_test_app().await;
        let building = Building::new("Ashwood House", None, false);
        db.buildings().save(&building).await.unwrap();

        let response = upload(&app, "EICR_Flat3.txt", report_text()).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["data"]["job"]["status"], "summarized");
        assert_eq!(json["data"]["extraction"]["method"], "native");
        let job_id = json["data"]["job"]["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/documents/{}/decision", job_id))
                    .header("content-type", "application/json")
                    .body(Body::from(format!(
                        r#"{{"decision": "confirm", "building_id": "{}"}}"#,
                        building.id
                    )))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["created"], true);
        assert_eq!(json["data"]["urgentFindingsCount"], 0);
        assert_eq!(json["data"]["reminderCreated"], false);
        assert_eq!(json["data"]["assetType"], "eicr");
        assert_eq!(json["data"]["snapshot"]["assets"].as_array().unwrap().len(), 1);
    }

    async fn decide(app: &axum::Router, job_id: &str, body: String) -> axum::response::Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/documents/{}/decision", job_id))
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_decided_document_conflicts() {
        let (app, db, _dir) = setup_test_app().await;
        let building = Building::new("Ashwood House", None, false);
        db.buildings().save(&building).await.unwrap();

        let response = upload(&app, "EICR_Flat3.txt", report_text()).await;
        let json = body_json(response).await;
        let job_id = json["data"]["job"]["id"].as_str().unwrap().to_string();

        let confirm = format!(
            r#"{{"decision": "confirm", "building_id": "{}"}}"#,
            building.id
        );
        let response = decide(&app, &job_id, confirm.clone()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = decide(&app, &job_id, r#"{"decision": "decline"}"#.to_string()).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let response = decide(&app, &job_id, confirm).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = body_json(response).await;
        assert!(json["data"]["message"].as_str().unwrap().contains("confirmed"));
    }

    #[tokio::test]
    async fn test_confirm_without_building_is_rejected() {
        let (app, _db, _dir) = setup_test_app().await;

        let response = upload(&app, "EICR_Flat3.txt", report_text()).await;
        let json = body_json(response).await;
        let job_id = json["data"]["job"]["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/documents/{}/decision", job_id))
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"decision": "confirm"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_missing_document() {
        let (app, _db, _dir) = setup_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/documents/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], true);
        assert!(json["data"]["message"].as_str().unwrap().contains("nope"));
    }

    #[tokio::test]
    async fn test_add_and_delete_assets() {
        let (app, db, _dir) = setup_test_app().await;
        let building = Building::new("Birch Court", None, true);
        db.buildings().save(&building).await.unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/buildings/{}/assets", building.id))
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"asset_types": ["eicr", "lift_loler"]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["data"]["created"].as_array().unwrap().len(), 2);
        let asset_id = json["data"]["created"][0]["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/building-assets/{}", asset_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["assets"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_asset_type_catalogue() {
        let (app, _db, _dir) = setup_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/asset-types")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let keys: Vec<_> = json["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["key"].as_str().unwrap().to_string())
            .collect();
        assert!(keys.contains(&"eicr".to_string()));
        assert!(keys.contains(&"building_safety_case".to_string()));
    }
}
