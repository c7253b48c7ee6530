//! Core Auditor implementation

use crate::classifier::{Classifier, RemoteClassifier, RuleClassifier};
use crate::config::{AuditorConfig, ClassifierConfig};
use crate::error::AuditorError;
use crate::summary::{AnalysisReport, AnalysisSummary};
use patta_domain::traits::{ClaimFilter, ClaimStore};
use patta_domain::{ClaimId, ClaimPatch, ClaimRecord};
use patta_llm::LlmProvider;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Batch anomaly analysis over stored claims
///
/// # Examples
///
/// ```no_run
/// use patta_auditor::{Auditor, AuditorConfig};
/// use patta_store::SqliteStore;
/// use std::sync::Mutex;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Mutex::new(SqliteStore::new("patta.db")?);
/// let auditor = Auditor::rules_only(AuditorConfig::default());
///
/// let report = auditor.run(&store).await?;
/// println!("{}", report.summary.summary());
/// # Ok(())
/// # }
/// ```
pub struct Auditor {
    remote: Option<Arc<dyn Classifier>>,
    rules: RuleClassifier,
    config: AuditorConfig,
}

impl Auditor {
    /// Create an Auditor with an optional remote classifier
    pub fn new(remote: Option<Arc<dyn Classifier>>, config: AuditorConfig) -> Self {
        Self {
            remote,
            rules: RuleClassifier::new(config.rule_scan_limit),
            config,
        }
    }

    /// Create an Auditor that only uses the rule engine
    pub fn rules_only(config: AuditorConfig) -> Self {
        Self::new(None, config)
    }

    /// Create an Auditor backed by an LLM provider
    pub fn with_provider(provider: Arc<dyn LlmProvider>, max_tokens: u32, config: AuditorConfig) -> Self {
        let remote = RemoteClassifier::new(provider, config.sample_size, max_tokens);
        Self::new(Some(Arc::new(remote)), config)
    }

    /// Create an Auditor from configuration
    ///
    /// The remote classifier is used only when a credential is configured.
    pub fn from_config(
        config: AuditorConfig,
        classifier: &ClassifierConfig,
    ) -> Result<Self, AuditorError> {
        config.validate().map_err(AuditorError::Config)?;

        let provider = classifier
            .provider()
            .build()
            .map_err(|e| AuditorError::Config(e.to_string()))?;

        Ok(match provider {
            Some(p) => Self::with_provider(Arc::new(p), classifier.max_tokens, config),
            None => Self::rules_only(config),
        })
    }

    /// Whether a remote classifier is configured
    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Get the configuration
    pub fn config(&self) -> &AuditorConfig {
        &self.config
    }

    /// Score a batch of records
    ///
    /// Never fails: a remote failure or unreadable reply is logged and the
    /// rule engine answers instead.
    pub async fn analyze(&self, records: &[ClaimRecord]) -> AnalysisReport {
        let (findings, classifier) = match &self.remote {
            Some(remote) => match remote.classify(records).await {
                Ok(findings) => (findings, remote.name()),
                Err(e) => {
                    warn!("Remote classification failed, using rules: {}", e);
                    (self.rules.findings(records), self.rules.name())
                }
            },
            None => (self.rules.findings(records), self.rules.name()),
        };

        let summary = AnalysisSummary::from_findings(records.len(), &findings, classifier);
        AnalysisReport { findings, summary }
    }

    /// Scan the store, analyze, and flag high-confidence findings
    ///
    /// Only adds flags; records without a qualifying finding are untouched.
    /// The lock is released while classification runs.
    pub async fn run<S>(&self, store: &Mutex<S>) -> Result<AnalysisReport, AuditorError>
    where
        S: ClaimStore,
        S::Error: std::fmt::Display,
    {
        let records = {
            let store = store
                .lock()
                .map_err(|e| AuditorError::Store(format!("Store lock error: {}", e)))?;
            store
                .scan(&ClaimFilter::all())
                .map_err(|e| AuditorError::Store(e.to_string()))?
        };

        let mut report = self.analyze(&records).await;

        let mut store = store
            .lock()
            .map_err(|e| AuditorError::Store(format!("Store lock error: {}", e)))?;

        let mut flagged = 0;
        for finding in &report.findings {
            if finding.confidence <= self.config.flag_threshold {
                continue;
            }

            let id = match ClaimId::from_string(&finding.claim_id) {
                Ok(id) => id,
                Err(e) => {
                    warn!("Skipping finding with unusable claim id: {}", e);
                    continue;
                }
            };

            let updated = store
                .update_one(id, &ClaimPatch::flag(finding.clone()))
                .map_err(|e| AuditorError::Store(e.to_string()))?;

            if updated {
                flagged += 1;
            } else {
                warn!(claim_id = %id, "Finding references an unknown claim");
            }
        }

        report.summary.flagged = flagged;
        info!(
            analyzed = report.summary.total_analyzed,
            found = report.summary.anomalies_found,
            flagged,
            classifier = %report.summary.classifier,
            "Anomaly analysis complete"
        );

        Ok(report)
    }
}
