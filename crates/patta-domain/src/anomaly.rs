//! Anomaly findings produced by an analysis run

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status given to findings that have not been reviewed yet
pub const DEFAULT_STATUS: &str = "Pending Review";

/// Severity of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Worth a look
    Low,

    /// Should be reviewed
    Medium,

    /// Review before approval
    High,
}

impl Severity {
    /// Get the severity name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }

    /// Parse a severity, ignoring case
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected irregularity
///
/// Findings are ephemeral; the high-confidence ones are copied onto the
/// referenced record as its anomaly detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyFinding {
    /// Identity of the referenced record (string form)
    pub claim_id: String,

    /// Free-form category, e.g. "Large Area Claim"
    #[serde(rename = "type")]
    pub anomaly_type: String,

    /// Severity bucket
    pub severity: Severity,

    /// Confidence, conventionally 0-100
    pub confidence: f64,

    /// Human-readable explanation
    pub description: String,

    /// Review status
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

impl AnomalyFinding {
    /// Create a finding with the default review status
    pub fn new(
        claim_id: impl Into<String>,
        anomaly_type: impl Into<String>,
        severity: Severity,
        confidence: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            claim_id: claim_id.into(),
            anomaly_type: anomaly_type.into(),
            severity,
            confidence,
            description: description.into(),
            status: default_status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse("HIGH"), Some(Severity::High));
        assert_eq!(Severity::parse(" medium"), Some(Severity::Medium));
        assert_eq!(Severity::parse("low"), Some(Severity::Low));
        assert_eq!(Severity::parse("critical"), None);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_finding_json_shape() {
        let finding = AnomalyFinding::new("abc", "Suspicious Small Area", Severity::Medium, 78.3, "tiny");
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["type"], "Suspicious Small Area");
        assert_eq!(json["severity"], "Medium");
        assert_eq!(json["status"], DEFAULT_STATUS);

        let back: AnomalyFinding = serde_json::from_value(json).unwrap();
        assert_eq!(back, finding);
    }
}
