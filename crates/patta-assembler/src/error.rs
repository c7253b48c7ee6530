//! Error types for the Claim Assembler

use patta_extractor::ExtractorError;
use thiserror::Error;

/// Errors that can occur while assembling a claim
#[derive(Error, Debug)]
pub enum AssemblerError {
    /// Caller input has an unsupported shape or content
    #[error("Validation error: {0}")]
    Validation(String),

    /// Extraction service failed or replied with something unreadable
    #[error(transparent)]
    Extraction(ExtractorError),

    /// Store rejected the insert
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl From<ExtractorError> for AssemblerError {
    fn from(e: ExtractorError) -> Self {
        match e {
            ExtractorError::EmptyText | ExtractorError::TextTooLong(..) => {
                AssemblerError::Validation(e.to_string())
            }
            other => AssemblerError::Extraction(other),
        }
    }
}
