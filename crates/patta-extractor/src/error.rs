//! Error types for the Extraction Gateway

use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractorError {
    /// No extraction credential is configured
    #[error("Extraction service is not configured")]
    Unavailable,

    /// Upstream call failed or timed out
    #[error("Extraction service error: {0}")]
    Service(String),

    /// Upstream reply could not be read as a field map
    #[error("Failed to parse extraction response as JSON: {raw}")]
    Parse {
        /// Reply content, kept for diagnostics
        raw: String,
    },

    /// Text exceeds maximum length
    #[error("Text too long: {0} chars (max: {1})")]
    TextTooLong(usize, usize),

    /// Nothing to extract from
    #[error("Text is empty")]
    EmptyText,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
