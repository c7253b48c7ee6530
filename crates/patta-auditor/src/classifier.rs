//! Anomaly classifiers
//!
//! Two implementations sit behind [`Classifier`]: a remote one backed by a
//! chat-completion model and a deterministic rule engine. The
//! [`Auditor`](crate::Auditor) picks one at construction time and falls back
//! to the rules whenever the remote one fails.

use crate::error::AuditorError;
use async_trait::async_trait;
use patta_domain::{AnomalyFinding, ClaimRecord, Severity};
use patta_llm::json::parse_embedded;
use patta_llm::{ChatRequest, LlmProvider};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Areas above this are reported as large claims
pub const LARGE_AREA: f64 = 10.0;

/// Large claims above this are high severity
pub const VERY_LARGE_AREA: f64 = 20.0;

/// Positive areas below this are reported as suspiciously small
pub const SMALL_AREA: f64 = 0.1;

/// Scores a batch of records
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Produce findings for the given records
    async fn classify(&self, records: &[ClaimRecord]) -> Result<Vec<AnomalyFinding>, AuditorError>;

    /// Short name reported in summaries
    fn name(&self) -> &'static str;
}

/// Deterministic rule engine over a bounded prefix of the records
///
/// Confidence grows with the record's scan index, so identical input order
/// always gives identical findings.
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    scan_limit: usize,
}

impl RuleClassifier {
    /// Create a rule engine examining at most `scan_limit` records
    pub fn new(scan_limit: usize) -> Self {
        Self { scan_limit }
    }

    /// Apply the rules synchronously
    pub fn findings(&self, records: &[ClaimRecord]) -> Vec<AnomalyFinding> {
        let mut findings = Vec::new();

        for (i, record) in records.iter().take(self.scan_limit).enumerate() {
            let index = i as f64;
            let claim_id = record.id.to_string();

            if record.area > LARGE_AREA {
                let severity = if record.area > VERY_LARGE_AREA {
                    Severity::High
                } else {
                    Severity::Medium
                };
                findings.push(AnomalyFinding::new(
                    claim_id.clone(),
                    "Large Area Claim",
                    severity,
                    85.5 + 2.0 * index,
                    format!(
                        "Area of {:.2} hectares significantly exceeds typical allocation",
                        record.area
                    ),
                ));
            }

            if record.area > 0.0 && record.area < SMALL_AREA {
                findings.push(AnomalyFinding::new(
                    claim_id,
                    "Suspicious Small Area",
                    Severity::Medium,
                    76.8 + 1.5 * index,
                    format!(
                        "Area of {:.3} hectares is unusually small for a viable claim",
                        record.area
                    ),
                ));
            }
        }

        findings
    }
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new(100)
    }
}

#[async_trait]
impl Classifier for RuleClassifier {
    async fn classify(&self, records: &[ClaimRecord]) -> Result<Vec<AnomalyFinding>, AuditorError> {
        Ok(self.findings(records))
    }

    fn name(&self) -> &'static str {
        "rules"
    }
}

/// LLM-backed classifier working on a bounded sample
pub struct RemoteClassifier {
    provider: Arc<dyn LlmProvider>,
    sample_size: usize,
    max_tokens: u32,
}

/// Per-record fields sent to the model
#[derive(Serialize)]
struct SampleRecord<'a> {
    claim_id: String,
    claimant_name: &'a str,
    state: &'a str,
    district: &'a str,
    village: &'a str,
    claim_type: &'a str,
    area: f64,
    submitted_at: u64,
}

impl<'a> From<&'a ClaimRecord> for SampleRecord<'a> {
    fn from(record: &'a ClaimRecord) -> Self {
        Self {
            claim_id: record.id.to_string(),
            claimant_name: &record.claimant_name,
            state: &record.state,
            district: &record.district,
            village: &record.village,
            claim_type: record.claim_type.as_str(),
            area: record.area,
            submitted_at: record.submitted_at,
        }
    }
}

/// Either `{"anomalies": [...]}` or a bare list
#[derive(Deserialize)]
#[serde(untagged)]
enum RemoteReply {
    Wrapped { anomalies: Vec<Value> },
    Bare(Vec<Value>),
}

/// One finding as the model writes it
#[derive(Deserialize)]
struct RemoteFinding {
    claim_id: Value,
    #[serde(rename = "type", alias = "anomaly_type")]
    anomaly_type: String,
    #[serde(default)]
    severity: String,
    confidence: f64,
    #[serde(default)]
    description: String,
}

impl RemoteClassifier {
    /// Create a remote classifier
    pub fn new(provider: Arc<dyn LlmProvider>, sample_size: usize, max_tokens: u32) -> Self {
        Self {
            provider,
            sample_size,
            max_tokens,
        }
    }

    fn build_request(&self, records: &[ClaimRecord]) -> Result<ChatRequest, AuditorError> {
        let sample: Vec<SampleRecord<'_>> = records
            .iter()
            .take(self.sample_size)
            .map(SampleRecord::from)
            .collect();

        let sample_json = serde_json::to_string(&sample)
            .map_err(|e| AuditorError::Classification(format!("Failed to encode sample: {}", e)))?;

        Ok(
            ChatRequest::user(format!("Analyze these claims for anomalies:\n{}", sample_json))
                .with_system(CLASSIFICATION_INSTRUCTIONS)
                .with_max_tokens(self.max_tokens),
        )
    }
}

/// Turn a model reply into findings
///
/// Items that do not carry an identity, a type and a finite confidence are
/// skipped. Unknown severities become `Medium`.
fn parse_reply(content: &str) -> Result<Vec<AnomalyFinding>, AuditorError> {
    let reply: RemoteReply = parse_embedded(content)
        .map_err(|e| AuditorError::Classification(e.to_string()))?;

    let items = match reply {
        RemoteReply::Wrapped { anomalies } => anomalies,
        RemoteReply::Bare(items) => items,
    };

    let mut findings = Vec::new();
    for (idx, item) in items.into_iter().enumerate() {
        let remote: RemoteFinding = match serde_json::from_value(item) {
            Ok(remote) => remote,
            Err(e) => {
                warn!("Skipping classifier finding {}: {}", idx, e);
                continue;
            }
        };

        let claim_id = match remote.claim_id {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => {
                warn!("Skipping classifier finding {}: no claim_id", idx);
                continue;
            }
        };

        if !remote.confidence.is_finite() {
            warn!("Skipping classifier finding {}: confidence is not finite", idx);
            continue;
        }

        findings.push(AnomalyFinding::new(
            claim_id,
            remote.anomaly_type,
            Severity::parse(&remote.severity).unwrap_or(Severity::Medium),
            remote.confidence,
            remote.description,
        ));
    }

    Ok(findings)
}

#[async_trait]
impl Classifier for RemoteClassifier {
    async fn classify(&self, records: &[ClaimRecord]) -> Result<Vec<AnomalyFinding>, AuditorError> {
        let request = self.build_request(records)?;

        let content = self
            .provider
            .complete(&request)
            .await
            .map_err(|e| AuditorError::Classification(e.to_string()))?;

        debug!("Classifier response length: {} chars", content.len());
        parse_reply(&content)
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

const CLASSIFICATION_INSTRUCTIONS: &str = r#"You are an auditor reviewing Forest Rights Act land claims.
Look for these kinds of anomalies:
- Area outliers: claims far larger or smaller than their neighbours
- Duplicate or near-duplicate claimant identities
- Geographic inconsistency between village, district and state
- Clusters of submissions within a short time window
- Data-quality gaps: missing or placeholder values

Respond with a JSON object only:
{"anomalies": [{"claim_id": "<id>", "type": "<short category>", "severity": "High|Medium|Low", "confidence": <0-100>, "description": "<one sentence>"}]}
Use an empty list when nothing is anomalous."#;
