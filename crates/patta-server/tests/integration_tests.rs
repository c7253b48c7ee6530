//! Integration tests for the HTTP surface

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use patta_assembler::Assembler;
use patta_auditor::{Auditor, AuditorConfig};
use patta_domain::traits::ClaimStore;
use patta_domain::{ClaimId, FieldValue, ProcessingMethod, ReviewStatus};
use patta_extractor::{Extractor, ExtractorConfig};
use patta_llm::{LlmProvider, MockProvider};
use patta_server::handlers::{
    create_router, AnalysisResponse, AppState, ClaimCreatedResponse, ClaimListResponse,
    ErrorResponse, HealthCheckResponse, ProcessTextResponse, StatisticsResponse,
};
use patta_store::SqliteStore;
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex};
use tower::ServiceExt; // for oneshot

/// Helper to create test application state
fn create_test_state(extraction: Option<MockProvider>) -> AppState {
    let store = Arc::new(Mutex::new(SqliteStore::new(":memory:").unwrap()));
    let provider = extraction.map(|p| Arc::new(p) as Arc<dyn LlmProvider>);
    let extractor = Extractor::new(provider, ExtractorConfig::default());

    AppState {
        assembler: Arc::new(Assembler::new(Arc::clone(&store), extractor)),
        auditor: Arc::new(Auditor::rules_only(AuditorConfig::default())),
        store,
    }
}

async fn send(app: Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> T {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let app = create_router(create_test_state(None));
    let (status, body) = send(app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    let health: HealthCheckResponse = parse(&body);
    assert_eq!(health.status, "degraded");
    assert!(!health.extraction_configured);
    assert!(!health.classification_configured);
}

#[tokio::test]
async fn test_submit_structured_object() {
    let state = create_test_state(None);
    let app = create_router(state.clone());

    let (status, body) = send(
        app,
        "POST",
        "/claims",
        Some(r#"{"extracted_text": {"claimant_name": "Karan Singh", "village": "Devpur", "claim_type": "INDIVIDUAL", "area": "0.4 ha, 1.3 ha", "plot_no": "56"}}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let created: ClaimCreatedResponse = parse(&body);
    assert!(created.success);
    assert_eq!(created.processing_method, ProcessingMethod::DirectInput);
    assert_eq!(created.stored_claim.claimant_name, "Karan Singh");
    assert_eq!(created.stored_claim.district, "Unknown");
    assert_eq!(created.stored_claim.status, ReviewStatus::Pending);
    assert!((created.stored_claim.area - 1.7).abs() < 1e-9);

    let id = ClaimId::from_string(&created.claim_id).unwrap();
    let stored = state.store.lock().unwrap().get(id).unwrap().unwrap();
    assert_eq!(stored.extracted_metadata.get("plot_no"), &FieldValue::from("56"));
}

#[tokio::test]
async fn test_submit_text_without_credential() {
    let app = create_router(create_test_state(None));
    let (status, body) = send(
        app,
        "POST",
        "/claims/from-text",
        Some(r#"{"extracted_text": "FORM A - claim for forest land by Sita Devi"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let created: ClaimCreatedResponse = parse(&body);
    assert_eq!(created.processing_method, ProcessingMethod::FallbackNoCredential);
    assert_eq!(created.stored_claim.claimant_name, "Unknown");
}

#[tokio::test]
async fn test_submit_text_with_extraction() {
    let llm = MockProvider::new(
        "```json\n{\"claimant_name\": \"Sita Devi\", \"claim_type\": \"community\", \"area\": \"12 ha\"}\n```",
    );
    let app = create_router(create_test_state(Some(llm)));
    let (status, body) = send(
        app,
        "POST",
        "/claims",
        Some(r#"{"extracted_text": "FORM B - community claim"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let created: ClaimCreatedResponse = parse(&body);
    assert_eq!(created.processing_method, ProcessingMethod::AiExtraction);
    assert_eq!(created.stored_claim.area, 12.0);
}

#[tokio::test]
async fn test_unsupported_payload_is_bad_request() {
    let app = create_router(create_test_state(None));
    let (status, body) = send(app, "POST", "/claims", Some(r#"{"extracted_text": 42}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = parse(&body);
    assert!(!error.success);
    assert!(error.error.contains("string or an object"));

    let app = create_router(create_test_state(None));
    let (status, _) = send(app, "POST", "/claims/from-structured-data", Some(r#""just text""#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_extraction_failure_is_bad_gateway() {
    let app = create_router(create_test_state(Some(MockProvider::new("cannot comply"))));
    let (status, body) = send(
        app,
        "POST",
        "/claims/from-text",
        Some(r#"{"extracted_text": "some form"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let error: ErrorResponse = parse(&body);
    assert!(error.error.contains("cannot comply"));
}

#[tokio::test]
async fn test_process_text_preview() {
    let state = create_test_state(Some(MockProvider::new(r#"{"village": "Kanha"}"#)));
    let app = create_router(state.clone());
    let (status, body) = send(
        app,
        "POST",
        "/claims/process-text",
        Some(r#"{"extracted_text": "village Kanha"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let preview: ProcessTextResponse = parse(&body);
    assert_eq!(preview.extracted_data.get("village"), &FieldValue::from("Kanha"));
    assert_eq!(state.store.lock().unwrap().count().unwrap(), 0);

    let app = create_router(create_test_state(None));
    let (status, _) = send(
        app,
        "POST",
        "/claims/process-text",
        Some(r#"{"extracted_text": "village Kanha"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_analyze_then_list_anomalies_and_statistics() {
    let state = create_test_state(None);

    for body in [
        r#"{"claimant_name": "A", "area": 25, "claim_type": "community"}"#,
        r#"{"claimant_name": "B", "area": 0.05}"#,
        r#"{"claimant_name": "C", "area": "3 acres"}"#,
    ] {
        let (status, _) = send(
            create_router(state.clone()),
            "POST",
            "/claims/from-structured-data",
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(create_router(state.clone()), "POST", "/claims/analyze", None).await;
    assert_eq!(status, StatusCode::OK);
    let analysis: AnalysisResponse = parse(&body);
    assert_eq!(analysis.report.summary.anomalies_found, 2);
    assert_eq!(analysis.report.summary.high_risk, 1);
    assert_eq!(analysis.report.summary.medium_risk, 1);
    assert_eq!(analysis.report.summary.flagged, 1);

    let (_, body) = send(create_router(state.clone()), "GET", "/claims/anomalies", None).await;
    let anomalies: ClaimListResponse = parse(&body);
    assert_eq!(anomalies.count, 1);
    assert_eq!(anomalies.claims[0].claimant_name, "A");

    let (_, body) = send(create_router(state.clone()), "GET", "/claims/statistics", None).await;
    let stats: StatisticsResponse = parse(&body);
    assert_eq!(stats.total_claims, 3);
    assert_eq!(stats.anomaly_claims, 1);
    assert_eq!(stats.normal_claims, 2);
    assert_eq!(stats.community_claims, 1);
    assert_eq!(stats.individual_claims, 2);
    assert_eq!(stats.today_submissions, 3);
    assert!((stats.total_area - 28.05).abs() < 1e-9);
}

#[tokio::test]
async fn test_list_claims_with_filters() {
    let state = create_test_state(None);
    for body in [
        r#"{"village": "Kanha", "claim_type": "community"}"#,
        r#"{"village": "Kanha"}"#,
        r#"{"village": "Devpur"}"#,
    ] {
        send(create_router(state.clone()), "POST", "/claims/from-structured-data", Some(body)).await;
    }

    let (_, body) = send(create_router(state.clone()), "GET", "/claims", None).await;
    let all: ClaimListResponse = parse(&body);
    assert_eq!(all.count, 3);

    let (_, body) = send(create_router(state.clone()), "GET", "/claims?village=Kanha&limit=1", None).await;
    let limited: ClaimListResponse = parse(&body);
    assert_eq!(limited.count, 1);

    let (_, body) = send(create_router(state.clone()), "GET", "/claims?claim_type=Community", None).await;
    let community: ClaimListResponse = parse(&body);
    assert_eq!(community.count, 1);

    let (status, _) = send(create_router(state), "GET", "/claims?claim_type=family", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_requests_use_error_envelope() {
    let state = create_test_state(None);

    let (status, body) = send(create_router(state.clone()), "POST", "/claims", Some("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = parse(&body);
    assert!(!error.success);
    assert!(error.error.starts_with("Invalid request body"));

    let (status, body) = send(
        create_router(state.clone()),
        "POST",
        "/claims/process-text",
        Some(r#"{"extracted_text": 42}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = parse(&body);
    assert!(!error.success);

    let request = Request::builder()
        .method("POST")
        .uri("/claims/from-structured-data")
        .body(Body::from(r#"{"village": "Kanha"}"#))
        .unwrap();
    let response = create_router(state.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let error: ErrorResponse = parse(&bytes);
    assert!(error.error.contains("Content-Type"));

    let (status, body) = send(create_router(state.clone()), "GET", "/claims?limit=many", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = parse(&body);
    assert!(error.error.starts_with("Invalid query"));

    assert_eq!(state.store.lock().unwrap().count().unwrap(), 0);
}
