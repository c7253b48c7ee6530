//! Aggregate counts for an analysis run

use patta_domain::{AnomalyFinding, Severity};
use serde::{Deserialize, Serialize};

/// Counts describing one analysis run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Records handed to the analysis
    pub total_analyzed: usize,

    /// Findings produced
    pub anomalies_found: usize,

    /// Findings with `High` severity
    pub high_risk: usize,

    /// Findings with `Medium` severity
    pub medium_risk: usize,

    /// Findings with `Low` severity
    pub low_risk: usize,

    /// Records whose flag was written back
    pub flagged: usize,

    /// Classifier that produced the findings ("remote" or "rules")
    pub classifier: String,
}

impl AnalysisSummary {
    /// Count findings by severity
    pub fn from_findings(
        total_analyzed: usize,
        findings: &[AnomalyFinding],
        classifier: impl Into<String>,
    ) -> Self {
        let count = |severity: Severity| findings.iter().filter(|f| f.severity == severity).count();

        Self {
            total_analyzed,
            anomalies_found: findings.len(),
            high_risk: count(Severity::High),
            medium_risk: count(Severity::Medium),
            low_risk: count(Severity::Low),
            flagged: 0,
            classifier: classifier.into(),
        }
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        let lines = [
            "Anomaly Analysis Summary".to_string(),
            "========================".to_string(),
            format!("Classifier: {}", self.classifier),
            format!("Records analyzed: {}", self.total_analyzed),
            format!("Anomalies found: {}", self.anomalies_found),
            format!("  High: {}", self.high_risk),
            format!("  Medium: {}", self.medium_risk),
            format!("  Low: {}", self.low_risk),
            format!("Records flagged: {}", self.flagged),
        ];
        lines.join("\n")
    }
}

/// Findings plus their summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Every finding, in classifier order
    pub findings: Vec<AnomalyFinding>,

    /// Aggregate counts
    pub summary: AnalysisSummary,
}
