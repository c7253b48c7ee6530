//! Patta Domain Layer
//!
//! Core data model for land-claim intake and anomaly review. Every other crate
//! in the workspace depends on the types and traits defined here.
//!
//! ## Key Concepts
//!
//! - **ClaimRecord**: The canonical unit of storage, produced once per intake
//! - **FieldMap**: Loosely-typed key/value bag from a caller or an extraction call
//! - **AnomalyFinding**: One detected irregularity, scored and tagged with severity
//! - **ProcessingMethod**: Provenance tag recording how a record was produced
//!
//! ## Architecture
//!
//! - Pure data and normalisation functions only
//! - Storage, LLM and HTTP implementations live in other crates
//! - Trait definitions for the storage boundary

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod anomaly;
pub mod claim;
pub mod field_map;
pub mod normalize;
pub mod traits;

// Re-exports for convenience
pub use anomaly::{AnomalyFinding, Severity};
pub use claim::{
    ClaimCategory, ClaimId, ClaimPatch, ClaimRecord, NewClaim, ProcessingMethod, ReviewStatus,
};
pub use field_map::{FieldMap, FieldValue};
pub use normalize::{canonical_text, normalize_area, normalize_area_str, normalize_category, UNKNOWN};
