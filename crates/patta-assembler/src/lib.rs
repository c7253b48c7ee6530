//! Patta Claim Assembler
//!
//! Single point of conversion from caller input into a persisted
//! [`ClaimRecord`](patta_domain::ClaimRecord).
//!
//! # Overview
//!
//! ```text
//! ClaimPayload::Structured(FieldMap) ─────────────────────┐
//! ClaimPayload::Text(String) → Extractor → FieldMap ──────┼→ normalise → NewClaim → ClaimStore::insert
//!                      └ no credential → placeholder ─────┘
//! ```
//!
//! Every path tags the record with the [`ProcessingMethod`] that produced it
//! and keeps the source field map verbatim as `extracted_metadata`.
//!
//! [`ProcessingMethod`]: patta_domain::ProcessingMethod

#![warn(missing_docs)]

mod assembler;
mod error;
mod payload;

pub use assembler::{build_claim, placeholder_fields, Assembler, EXTRACTION_NOTE_KEY};
pub use error::AssemblerError;
pub use payload::ClaimPayload;
