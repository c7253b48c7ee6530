//! Patta Extraction Gateway
//!
//! Turns free-form claim-form text into a loosely-typed [`FieldMap`] by asking
//! an external chat-completion model.
//!
//! # Architecture
//!
//! ```text
//! Text → PromptBuilder → LlmProvider → tolerant JSON recovery → FieldMap
//! ```
//!
//! The gateway makes exactly one attempt per call under a fixed timeout and
//! never interprets field values: the `area` field comes back as written and
//! is normalised later by the assembler.
//!
//! # Example Usage
//!
//! ```no_run
//! use patta_extractor::{Extractor, ExtractorConfig};
//! use patta_llm::MockProvider;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(r#"{"claimant_name": "Karan Singh", "area": "2 ha"}"#);
//! let extractor = Extractor::new(Some(Arc::new(llm)), ExtractorConfig::default());
//!
//! let fields = extractor.extract("Claim form of Karan Singh ...").await?;
//! println!("village = {}", fields.get("village"));
//! # Ok(())
//! # }
//! ```
//!
//! [`FieldMap`]: patta_domain::FieldMap

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
mod prompt;

pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use prompt::{PromptBuilder, FIELD_VOCABULARY};
