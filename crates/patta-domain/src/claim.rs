//! Claim module - the canonical land-claim record

use crate::anomaly::AnomalyFinding;
use crate::field_map::FieldMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Unique identifier for a stored claim, based on UUIDv7
///
/// Assigned by the store at insert time and immutable afterwards. Crosses
/// process boundaries as its hyphenated string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClaimId(u128);

impl ClaimId {
    /// Generate a new UUIDv7-based ClaimId
    ///
    /// # Examples
    ///
    /// ```
    /// use patta_domain::ClaimId;
    ///
    /// let id = ClaimId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a ClaimId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a ClaimId from its string form
    ///
    /// # Examples
    ///
    /// ```
    /// use patta_domain::ClaimId;
    ///
    /// let id = ClaimId::new();
    /// let parsed = ClaimId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s.trim())
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid claim id '{}': {}", s, e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for ClaimId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

impl Serialize for ClaimId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClaimId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ClaimId::from_string(&s).map_err(serde::de::Error::custom)
    }
}

/// Claim category
///
/// Only two canonical values exist; anything else is coerced to `Individual`
/// during assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimCategory {
    /// Claim filed by a single household
    #[default]
    Individual,

    /// Claim filed on behalf of a community
    Community,
}

impl ClaimCategory {
    /// Get the category name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimCategory::Individual => "individual",
            ClaimCategory::Community => "community",
        }
    }

    /// Parse a category, ignoring case and surrounding whitespace
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "individual" => Some(ClaimCategory::Individual),
            "community" => Some(ClaimCategory::Community),
            _ => None,
        }
    }
}

impl std::str::FromStr for ClaimCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid claim category: {}", s))
    }
}

/// How a record was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMethod {
    /// Caller supplied an already-structured field map
    DirectInput,

    /// Field map came from the external extraction service
    AiExtraction,

    /// Extraction credential missing; placeholder data was substituted
    FallbackNoCredential,
}

impl ProcessingMethod {
    /// Get the tag as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingMethod::DirectInput => "direct_input",
            ProcessingMethod::AiExtraction => "ai_extraction",
            ProcessingMethod::FallbackNoCredential => "fallback_no_credential",
        }
    }

    /// Parse a stored tag
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "direct_input" => Some(ProcessingMethod::DirectInput),
            "ai_extraction" => Some(ProcessingMethod::AiExtraction),
            "fallback_no_credential" => Some(ProcessingMethod::FallbackNoCredential),
            _ => None,
        }
    }
}

impl fmt::Display for ProcessingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review state of a claim
///
/// Records enter as `Pending`; nothing in the intake or analysis path
/// approves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    /// Awaiting review
    #[default]
    Pending,

    /// Approved by a reviewer
    Approved,
}

impl ReviewStatus {
    /// Get the status as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
        }
    }

    /// Parse a status, ignoring case and surrounding whitespace
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(ReviewStatus::Pending),
            "approved" => Some(ReviewStatus::Approved),
            _ => None,
        }
    }
}

/// An assembled claim that has not been persisted yet
///
/// Everything except the identity, which the store assigns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClaim {
    /// Claimant name ("Unknown" when absent)
    pub claimant_name: String,

    /// State name
    pub state: String,

    /// District name
    pub district: String,

    /// Village name
    pub village: String,

    /// Individual or community claim
    pub claim_type: ClaimCategory,

    /// Normalised area, finite and non-negative
    pub area: f64,

    /// Anomaly flag
    pub is_anomaly: bool,

    /// Finding that set the flag, if any
    pub anomaly_details: Option<AnomalyFinding>,

    /// Submission time (seconds since Unix epoch)
    pub submitted_at: u64,

    /// Verbatim copy of the source field map
    pub extracted_metadata: FieldMap,

    /// How this record was produced
    pub processing_method: ProcessingMethod,

    /// Review state
    #[serde(default)]
    pub status: ReviewStatus,
}

impl NewClaim {
    /// Attach the store-assigned identity
    pub fn into_record(self, id: ClaimId) -> ClaimRecord {
        ClaimRecord {
            id,
            claimant_name: self.claimant_name,
            state: self.state,
            district: self.district,
            village: self.village,
            claim_type: self.claim_type,
            area: self.area,
            is_anomaly: self.is_anomaly,
            anomaly_details: self.anomaly_details,
            submitted_at: self.submitted_at,
            extracted_metadata: self.extracted_metadata,
            processing_method: self.processing_method,
            status: self.status,
        }
    }
}

/// A persisted land claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// Store-assigned identity
    pub id: ClaimId,

    /// Claimant name ("Unknown" when absent)
    pub claimant_name: String,

    /// State name
    pub state: String,

    /// District name
    pub district: String,

    /// Village name
    pub village: String,

    /// Individual or community claim
    pub claim_type: ClaimCategory,

    /// Normalised area, finite and non-negative
    pub area: f64,

    /// Anomaly flag
    pub is_anomaly: bool,

    /// Finding that set the flag, if any
    pub anomaly_details: Option<AnomalyFinding>,

    /// Submission time (seconds since Unix epoch)
    pub submitted_at: u64,

    /// Verbatim copy of the source field map
    pub extracted_metadata: FieldMap,

    /// How this record was produced
    pub processing_method: ProcessingMethod,

    /// Review state
    #[serde(default)]
    pub status: ReviewStatus,
}

impl ClaimRecord {
    /// Apply a patch in place, returning whether anything changed
    pub fn apply(&mut self, patch: &ClaimPatch) -> bool {
        let mut changed = false;
        if let Some(flag) = patch.is_anomaly {
            changed |= self.is_anomaly != flag;
            self.is_anomaly = flag;
        }
        if let Some(finding) = &patch.anomaly_details {
            changed |= self.anomaly_details.as_ref() != Some(finding);
            self.anomaly_details = Some(finding.clone());
        }
        changed
    }
}

/// Partial update applied by `ClaimStore::update_one`
///
/// Only the anomaly fields are mutable after creation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClaimPatch {
    /// New flag value
    pub is_anomaly: Option<bool>,

    /// New anomaly detail
    pub anomaly_details: Option<AnomalyFinding>,
}

impl ClaimPatch {
    /// Patch that flags a record with the given finding
    pub fn flag(finding: AnomalyFinding) -> Self {
        Self {
            is_anomaly: Some(true),
            anomaly_details: Some(finding),
        }
    }

    /// True when the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.is_anomaly.is_none() && self.anomaly_details.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::Severity;

    fn sample_record() -> ClaimRecord {
        NewClaim {
            claimant_name: "Ramesh Gond".to_string(),
            state: "Madhya Pradesh".to_string(),
            district: "Balaghat".to_string(),
            village: "Kanha".to_string(),
            claim_type: ClaimCategory::Individual,
            area: 2.5,
            is_anomaly: false,
            anomaly_details: None,
            submitted_at: 1_700_000_000,
            extracted_metadata: FieldMap::new(),
            processing_method: ProcessingMethod::DirectInput,
            status: ReviewStatus::Pending,
        }
        .into_record(ClaimId::new())
    }

    #[test]
    fn test_claim_id_display_and_parse() {
        let id = ClaimId::new();
        let id_str = id.to_string();
        assert_eq!(id_str.len(), 36);
        assert_eq!(ClaimId::from_string(&id_str).unwrap(), id);
        assert!(ClaimId::from_string("not-a-uuid").is_err());
    }

    #[test]
    fn test_claim_id_serializes_as_string() {
        let id = ClaimId::from_value(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: ClaimId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(ClaimCategory::parse(" Community "), Some(ClaimCategory::Community));
        assert_eq!(ClaimCategory::parse("INDIVIDUAL"), Some(ClaimCategory::Individual));
        assert_eq!(ClaimCategory::parse("joint"), None);
        assert!("forest".parse::<ClaimCategory>().is_err());
    }

    #[test]
    fn test_processing_method_tags() {
        for method in [
            ProcessingMethod::DirectInput,
            ProcessingMethod::AiExtraction,
            ProcessingMethod::FallbackNoCredential,
        ] {
            assert_eq!(ProcessingMethod::parse(method.as_str()), Some(method));
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.as_str()));
        }
    }

    #[test]
    fn test_review_status() {
        assert_eq!(ReviewStatus::default(), ReviewStatus::Pending);
        assert_eq!(ReviewStatus::parse(" Approved "), Some(ReviewStatus::Approved));
        assert_eq!(ReviewStatus::parse("rejected"), None);
        assert_eq!(serde_json::to_string(&ReviewStatus::Approved).unwrap(), "\"approved\"");

        let mut json = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(json["status"], "pending");
        json.as_object_mut().unwrap().remove("status");
        let record: ClaimRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.status, ReviewStatus::Pending);
    }

    #[test]
    fn test_apply_flag_patch_is_idempotent() {
        let mut record = sample_record();
        let finding = AnomalyFinding::new(
            record.id.to_string(),
            "Large Area Claim",
            Severity::High,
            85.5,
            "Area of 25.00 exceeds typical allocation",
        );
        let patch = ClaimPatch::flag(finding.clone());

        assert!(record.apply(&patch));
        assert!(record.is_anomaly);
        assert_eq!(record.anomaly_details.as_ref(), Some(&finding));

        let snapshot = record.clone();
        assert!(!record.apply(&patch));
        assert_eq!(record, snapshot);
    }

    #[test]
    fn test_empty_patch() {
        assert!(ClaimPatch::default().is_empty());
        let mut record = sample_record();
        assert!(!record.apply(&ClaimPatch::default()));
    }
}
