//! HTTP request handlers for the claims service.
//!
//! Claim intake, listings, statistics and the analysis trigger, using axum.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use patta_assembler::{Assembler, AssemblerError, ClaimPayload};
use patta_auditor::{AnalysisReport, Auditor, AuditorError};
use patta_domain::traits::{ClaimFilter, ClaimStore};
use patta_domain::{ClaimCategory, ClaimRecord, FieldMap, ProcessingMethod};
use patta_extractor::ExtractorError;
use patta_store::SqliteStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info};

const SECONDS_PER_DAY: u64 = 86_400;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Claim storage, shared with the assembler
    pub store: Arc<Mutex<SqliteStore>>,
    /// Intake pipeline
    pub assembler: Arc<Assembler<SqliteStore>>,
    /// Anomaly analysis
    pub auditor: Arc<Auditor>,
}

/// Claim submission body for `/claims` and `/claims/from-text`
#[derive(Debug, Deserialize)]
pub struct SubmitClaimRequest {
    /// Raw text or an already-structured field map
    #[serde(default)]
    pub extracted_text: Value,
}

/// Extract-only body for `/claims/process-text`
#[derive(Debug, Deserialize)]
pub struct ProcessTextRequest {
    /// Raw document text
    pub extracted_text: String,
}

/// Query parameters for `GET /claims`
#[derive(Debug, Default, Deserialize)]
pub struct ListClaimsQuery {
    /// Exact village match
    pub village: Option<String>,
    /// "individual" or "community"
    pub claim_type: Option<String>,
    /// Maximum records returned
    pub limit: Option<usize>,
}

/// Response for a stored claim
#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimCreatedResponse {
    /// Always true
    pub success: bool,
    /// Store-assigned identity
    pub claim_id: String,
    /// How the record was produced
    pub processing_method: ProcessingMethod,
    /// The stored record
    pub stored_claim: ClaimRecord,
    /// Human-readable outcome
    pub message: String,
}

/// Response for an extract-only request
#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessTextResponse {
    /// Always true
    pub success: bool,
    /// Fields returned by the extraction service
    pub extracted_data: FieldMap,
    /// Human-readable outcome
    pub message: String,
}

/// Response for claim listings
#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimListResponse {
    /// Always true
    pub success: bool,
    /// Matching records, oldest first
    pub claims: Vec<ClaimRecord>,
    /// Number of records returned
    pub count: usize,
}

/// Aggregate counts over all stored claims
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsResponse {
    /// Every stored claim
    pub total_claims: usize,
    /// Claims with the anomaly flag set
    pub anomaly_claims: usize,
    /// Claims without the anomaly flag
    pub normal_claims: usize,
    /// Claims submitted on the current UTC day
    pub today_submissions: usize,
    /// Individual claims
    pub individual_claims: usize,
    /// Community claims
    pub community_claims: usize,
    /// Sum of normalised areas
    pub total_area: f64,
}

/// Response for an analysis run
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// Always true
    pub success: bool,
    /// Findings and summary
    #[serde(flatten)]
    pub report: AnalysisReport,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Whether text extraction is configured
    pub extraction_configured: bool,
    /// Whether remote classification is configured
    pub classification_configured: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Unsupported or malformed caller input
    Validation(String),
    /// Extraction service failed or replied with something unreadable
    Upstream(String),
    /// Required capability is not configured
    Unavailable(String),
    /// Storage or other internal failure
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Internal(msg) => {
                error!("Request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            error: message,
        });
        (status, body).into_response()
    }
}

impl From<AssemblerError> for AppError {
    fn from(e: AssemblerError) -> Self {
        match e {
            AssemblerError::Validation(_) => AppError::Validation(e.to_string()),
            AssemblerError::Extraction(_) => AppError::Upstream(e.to_string()),
            AssemblerError::Persistence(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<ExtractorError> for AppError {
    fn from(e: ExtractorError) -> Self {
        match e {
            ExtractorError::Unavailable => AppError::Unavailable(e.to_string()),
            ExtractorError::EmptyText | ExtractorError::TextTooLong(..) => {
                AppError::Validation(e.to_string())
            }
            ExtractorError::Service(_) | ExtractorError::Parse { .. } => {
                AppError::Upstream(e.to_string())
            }
            ExtractorError::Config(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(format!("Invalid query: {}", rejection.body_text()))
    }
}

impl From<AuditorError> for AppError {
    fn from(e: AuditorError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl AppState {
    /// Run a read-only query against the store
    fn read<T>(
        &self,
        query: impl FnOnce(&SqliteStore) -> Result<T, patta_store::StoreError>,
    ) -> Result<T, AppError> {
        let store = self
            .store
            .lock()
            .map_err(|e| AppError::Internal(format!("Store lock error: {}", e)))?;
        query(&store).map_err(|e| AppError::Internal(e.to_string()))
    }
}

async fn store_claim(state: &AppState, payload: ClaimPayload) -> Result<Json<ClaimCreatedResponse>, AppError> {
    let record = state.assembler.assemble_and_store(payload).await?;

    let message = match record.processing_method {
        ProcessingMethod::DirectInput => "Claim created from structured data",
        ProcessingMethod::AiExtraction => "Claim created from AI-processed text",
        ProcessingMethod::FallbackNoCredential => {
            "Claim created with placeholder data; extraction service not configured"
        }
    };

    Ok(Json(ClaimCreatedResponse {
        success: true,
        claim_id: record.id.to_string(),
        processing_method: record.processing_method,
        stored_claim: record,
        message: message.to_string(),
    }))
}

/// POST /claims and POST /claims/from-text - Submit text or a field map
async fn submit_claim(
    State(state): State<AppState>,
    request: Result<Json<SubmitClaimRequest>, JsonRejection>,
) -> Result<Json<ClaimCreatedResponse>, AppError> {
    let Json(request) = request?;
    let payload = ClaimPayload::from_value(request.extracted_text)?;
    store_claim(&state, payload).await
}

/// POST /claims/from-structured-data - Submit a bare field map
async fn submit_structured(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ClaimCreatedResponse>, AppError> {
    let Json(body) = body?;
    if !body.is_object() {
        return Err(AppError::Validation(
            "Structured data must be a JSON object".to_string(),
        ));
    }
    let payload = ClaimPayload::from_value(body)?;
    store_claim(&state, payload).await
}

/// POST /claims/process-text - Extract fields without storing
async fn process_text(
    State(state): State<AppState>,
    request: Result<Json<ProcessTextRequest>, JsonRejection>,
) -> Result<Json<ProcessTextResponse>, AppError> {
    let Json(request) = request?;
    let fields = state
        .assembler
        .extractor()
        .extract(&request.extracted_text)
        .await?;

    Ok(Json(ProcessTextResponse {
        success: true,
        extracted_data: fields,
        message: "Text processed successfully".to_string(),
    }))
}

/// GET /claims - List claims, optionally filtered
async fn list_claims(
    State(state): State<AppState>,
    query: Result<Query<ListClaimsQuery>, QueryRejection>,
) -> Result<Json<ClaimListResponse>, AppError> {
    let Query(query) = query?;
    let claim_type = query
        .claim_type
        .as_deref()
        .map(|s| {
            ClaimCategory::parse(s).ok_or_else(|| {
                AppError::Validation(format!(
                    "claim_type must be \"individual\" or \"community\", got \"{}\"",
                    s
                ))
            })
        })
        .transpose()?;

    let filter = ClaimFilter {
        anomalous: None,
        village: query.village,
        claim_type,
        limit: query.limit,
    };

    let claims = state.read(|store| store.scan(&filter))?;
    Ok(Json(ClaimListResponse {
        success: true,
        count: claims.len(),
        claims,
    }))
}

/// GET /claims/anomalies - List flagged claims
async fn list_anomalies(State(state): State<AppState>) -> Result<Json<ClaimListResponse>, AppError> {
    let claims = state.read(|store| store.scan(&ClaimFilter::anomalous()))?;
    Ok(Json(ClaimListResponse {
        success: true,
        count: claims.len(),
        claims,
    }))
}

/// GET /claims/statistics - Aggregate counts
async fn statistics(State(state): State<AppState>) -> Result<Json<StatisticsResponse>, AppError> {
    let claims = state.read(|store| store.scan(&ClaimFilter::all()))?;
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    Ok(Json(compute_statistics(&claims, now)))
}

/// Count claims by flag, category and submission day
pub fn compute_statistics(claims: &[ClaimRecord], now: u64) -> StatisticsResponse {
    let today = now / SECONDS_PER_DAY;
    let anomaly_claims = claims.iter().filter(|c| c.is_anomaly).count();
    let community_claims = claims
        .iter()
        .filter(|c| c.claim_type == ClaimCategory::Community)
        .count();

    StatisticsResponse {
        total_claims: claims.len(),
        anomaly_claims,
        normal_claims: claims.len() - anomaly_claims,
        today_submissions: claims
            .iter()
            .filter(|c| c.submitted_at / SECONDS_PER_DAY == today)
            .count(),
        individual_claims: claims.len() - community_claims,
        community_claims,
        total_area: claims.iter().map(|c| c.area).sum(),
    }
}

/// POST /claims/analyze - Run anomaly analysis and flag findings
async fn analyze_claims(State(state): State<AppState>) -> Result<Json<AnalysisResponse>, AppError> {
    let report = state.auditor.run(state.store.as_ref()).await?;
    info!("{}", report.summary.summary());

    Ok(Json(AnalysisResponse {
        success: true,
        report,
    }))
}

/// GET /health - Service health and configured capabilities
async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    let extraction_configured = state.assembler.extractor().is_available();
    let classification_configured = state.auditor.has_remote();

    let status = if extraction_configured && classification_configured {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthCheckResponse {
        status: status.to_string(),
        extraction_configured,
        classification_configured,
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/claims", get(list_claims).post(submit_claim))
        .route("/claims/from-text", post(submit_claim))
        .route("/claims/from-structured-data", post(submit_structured))
        .route("/claims/process-text", post(process_text))
        .route("/claims/anomalies", get(list_anomalies))
        .route("/claims/statistics", get(statistics))
        .route("/claims/analyze", post(analyze_claims))
        .route("/health", get(health_check))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use patta_domain::{ClaimId, NewClaim, ReviewStatus};

    fn record(area: f64, claim_type: ClaimCategory, is_anomaly: bool, submitted_at: u64) -> ClaimRecord {
        NewClaim {
            claimant_name: "Karan Singh".to_string(),
            state: "Madhya Pradesh".to_string(),
            district: "Shahdol".to_string(),
            village: "Devpur".to_string(),
            claim_type,
            area,
            is_anomaly,
            anomaly_details: None,
            submitted_at,
            extracted_metadata: FieldMap::new(),
            processing_method: ProcessingMethod::DirectInput,
            status: ReviewStatus::Pending,
        }
        .into_record(ClaimId::new())
    }

    #[test]
    fn test_compute_statistics() {
        let now = 1_700_000_000;
        let claims = vec![
            record(2.5, ClaimCategory::Individual, false, now - 60),
            record(12.0, ClaimCategory::Community, true, now - 3 * SECONDS_PER_DAY),
            record(0.5, ClaimCategory::Individual, false, now),
        ];

        let stats = compute_statistics(&claims, now);
        assert_eq!(stats.total_claims, 3);
        assert_eq!(stats.anomaly_claims, 1);
        assert_eq!(stats.normal_claims, 2);
        assert_eq!(stats.individual_claims, 2);
        assert_eq!(stats.community_claims, 1);
        assert_eq!(stats.today_submissions, 2);
        assert_eq!(stats.total_area, 15.0);
    }

    #[test]
    fn test_compute_statistics_empty() {
        assert_eq!(compute_statistics(&[], 0), StatisticsResponse::default());
    }

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (AppError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::Upstream("502".into()), StatusCode::BAD_GATEWAY),
            (AppError::Unavailable("off".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::Internal("db".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_assembler_error_mapping() {
        assert!(matches!(
            AppError::from(AssemblerError::Validation("x".into())),
            AppError::Validation(_)
        ));
        assert!(matches!(
            AppError::from(AssemblerError::Extraction(ExtractorError::Parse { raw: "?".into() })),
            AppError::Upstream(_)
        ));
        assert!(matches!(
            AppError::from(AssemblerError::Persistence("disk".into())),
            AppError::Internal(_)
        ));
    }
}
