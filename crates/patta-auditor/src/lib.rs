//! Patta Auditor
//!
//! Batch anomaly analysis over the stored claim population.
//!
//! # Overview
//!
//! The Auditor is responsible for:
//! - **Classification**: scoring records through a remote model when one is
//!   configured, otherwise through a deterministic rule engine
//! - **Fallback**: absorbing remote failures by answering with the rules
//! - **Flagging**: writing high-confidence findings back onto their records
//! - **Summaries**: counting findings by severity
//!
//! # Rules
//!
//! | Rule | Predicate | Severity | Confidence (i = scan index) |
//! |------|-----------|----------|-----------------------------|
//! | Large Area Claim | area > 10 | High if area > 20, else Medium | 85.5 + 2·i |
//! | Suspicious Small Area | 0 < area < 0.1 | Medium | 76.8 + 1.5·i |
//!
//! # Configuration
//!
//! ```toml
//! [auditor]
//! flag_threshold = 80.0
//! sample_size = 50
//! rule_scan_limit = 100
//!
//! [classification]
//! endpoint = "https://api.aimlapi.com/v1"
//! model = "google/gemini-2.0-flash"
//! api_key = "..."
//! timeout_secs = 30
//! max_tokens = 2000
//! ```

#![warn(missing_docs)]

mod auditor;
mod classifier;
mod config;
mod error;
mod summary;

pub use auditor::Auditor;
pub use classifier::{Classifier, RemoteClassifier, RuleClassifier};
pub use config::{AuditorConfig, ClassifierConfig};
pub use error::AuditorError;
pub use summary::{AnalysisReport, AnalysisSummary};
