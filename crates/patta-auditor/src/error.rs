//! Error types for Auditor operations

use thiserror::Error;

/// Errors that can occur during Auditor operations
///
/// Classification failures are absorbed by falling back to the rule engine,
/// so only storage problems reach callers of [`Auditor::run`].
///
/// [`Auditor::run`]: crate::Auditor::run
#[derive(Error, Debug)]
pub enum AuditorError {
    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),

    /// Remote classifier failed or replied with something unreadable
    #[error("Classification error: {0}")]
    Classification(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
