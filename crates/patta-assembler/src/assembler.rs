//! Core Assembler implementation

use crate::error::AssemblerError;
use crate::payload::ClaimPayload;
use patta_domain::traits::ClaimStore;
use patta_domain::{
    canonical_text, normalize_area, normalize_category, ClaimRecord, FieldMap, FieldValue,
    NewClaim, ProcessingMethod, ReviewStatus,
};
use patta_extractor::{Extractor, ExtractorError, FIELD_VOCABULARY};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Metadata key explaining why placeholder data was stored
pub const EXTRACTION_NOTE_KEY: &str = "extraction_note";

const PLACEHOLDER_NOTE: &str =
    "Extraction service not configured; placeholder data stored for manual review";

/// Assembles caller payloads into stored claim records
pub struct Assembler<S: ClaimStore> {
    store: Arc<Mutex<S>>,
    extractor: Extractor,
}

impl<S> Assembler<S>
where
    S: ClaimStore,
    S::Error: std::fmt::Display,
{
    /// Create a new Assembler sharing the given store
    pub fn new(store: Arc<Mutex<S>>, extractor: Extractor) -> Self {
        Self { store, extractor }
    }

    /// Extraction gateway used for text payloads
    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Build the record a payload would produce, without storing it
    ///
    /// Text payloads go through extraction. A missing extraction credential
    /// is not an error: placeholder fields are used and the record is tagged
    /// [`ProcessingMethod::FallbackNoCredential`].
    pub async fn assemble(&self, payload: ClaimPayload) -> Result<NewClaim, AssemblerError> {
        let (fields, method) = match payload {
            ClaimPayload::Structured(fields) => (fields, ProcessingMethod::DirectInput),
            ClaimPayload::Text(text) => match self.extractor.extract(&text).await {
                Ok(fields) => (fields, ProcessingMethod::AiExtraction),
                Err(ExtractorError::Unavailable) => {
                    warn!("No extraction credential configured, storing placeholder claim");
                    (placeholder_fields(), ProcessingMethod::FallbackNoCredential)
                }
                Err(e) => return Err(e.into()),
            },
        };

        Ok(build_claim(fields, method, now_secs()))
    }

    /// Assemble a payload and insert the result
    ///
    /// Exactly one insert per call. The store lock is taken only after
    /// extraction has finished.
    pub async fn assemble_and_store(
        &self,
        payload: ClaimPayload,
    ) -> Result<ClaimRecord, AssemblerError> {
        let claim = self.assemble(payload).await?;
        let method = claim.processing_method;

        let id = {
            let mut store = self
                .store
                .lock()
                .map_err(|e| AssemblerError::Persistence(format!("Store lock error: {}", e)))?;
            store
                .insert(claim.clone())
                .map_err(|e| AssemblerError::Persistence(e.to_string()))?
        };

        info!(claim_id = %id, method = %method, "Stored claim");
        Ok(claim.into_record(id))
    }
}

/// Map a field map onto a canonical claim
///
/// The map itself is kept verbatim as the record's metadata.
pub fn build_claim(fields: FieldMap, method: ProcessingMethod, now: u64) -> NewClaim {
    let submitted_at = submitted_at(fields.get("submitted_at")).unwrap_or(now);
    let is_anomaly = anomaly_seed(fields.get("is_anomaly"));
    let status = fields
        .get("status")
        .as_str()
        .and_then(ReviewStatus::parse)
        .unwrap_or_default();

    let claim = NewClaim {
        claimant_name: canonical_text(fields.get("claimant_name")),
        state: canonical_text(fields.get("state")),
        district: canonical_text(fields.get("district")),
        village: canonical_text(fields.get("village")),
        claim_type: normalize_category(fields.get("claim_type")),
        area: normalize_area(fields.get("area")),
        is_anomaly,
        anomaly_details: None,
        submitted_at,
        extracted_metadata: fields,
        processing_method: method,
        status,
    };

    debug!(
        area = claim.area,
        claim_type = claim.claim_type.as_str(),
        "Assembled claim"
    );
    claim
}

/// Fixed field map used when extraction is not configured
pub fn placeholder_fields() -> FieldMap {
    let mut fields: FieldMap = FIELD_VOCABULARY
        .iter()
        .map(|(key, _)| (key.to_string(), FieldValue::Null))
        .collect();
    fields.insert("claim_type", "individual");
    fields.insert(EXTRACTION_NOTE_KEY, PLACEHOLDER_NOTE);
    fields
}

fn anomaly_seed(value: &FieldValue) -> bool {
    match value {
        FieldValue::Bool(flag) => *flag,
        FieldValue::Text(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn submitted_at(value: &FieldValue) -> Option<u64> {
    match value {
        FieldValue::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        _ => None,
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
