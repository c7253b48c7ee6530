//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::prompt::PromptBuilder;
use patta_domain::FieldMap;
use patta_llm::json::parse_embedded;
use patta_llm::{ChatRequest, LlmProvider};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Sampling temperature for extraction requests
const EXTRACTION_TEMPERATURE: f32 = 0.1;

/// The Extractor converts claim-form text into a field map
///
/// A missing provider means the capability is not configured; every call then
/// fails with [`ExtractorError::Unavailable`] and callers pick their fallback.
#[derive(Clone)]
pub struct Extractor {
    provider: Option<Arc<dyn LlmProvider>>,
    config: ExtractorConfig,
}

impl Extractor {
    /// Create a new Extractor around an optional provider
    pub fn new(provider: Option<Arc<dyn LlmProvider>>, config: ExtractorConfig) -> Self {
        Self { provider, config }
    }

    /// Create an Extractor from configuration
    ///
    /// Builds an HTTP provider when the config carries a credential.
    pub fn from_config(config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;

        let provider = config
            .provider
            .build()
            .map_err(|e| ExtractorError::Config(e.to_string()))?
            .map(|p| Arc::new(p) as Arc<dyn LlmProvider>);

        Ok(Self::new(provider, config))
    }

    /// Whether a provider is configured
    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    /// Model identifier, when configured
    pub fn model_name(&self) -> Option<&str> {
        self.provider.as_ref().map(|p| p.model_name())
    }

    /// Extract a field map from text
    ///
    /// One attempt, bounded by the configured timeout.
    pub async fn extract(&self, text: &str) -> Result<FieldMap, ExtractorError> {
        let provider = self.provider.as_ref().ok_or(ExtractorError::Unavailable)?;

        if text.trim().is_empty() {
            return Err(ExtractorError::EmptyText);
        }

        let length = text.chars().count();
        if length > self.config.max_text_length {
            return Err(ExtractorError::TextTooLong(length, self.config.max_text_length));
        }

        let prompt = PromptBuilder::new(text).build();
        debug!("Prompt length: {} chars", prompt.len());

        let request = ChatRequest::user(prompt)
            .with_temperature(EXTRACTION_TEMPERATURE)
            .with_max_tokens(self.config.max_tokens);

        let content = timeout(self.config.extraction_timeout(), provider.complete(&request))
            .await
            .map_err(|_| {
                ExtractorError::Service(format!(
                    "timed out after {}s",
                    self.config.provider.timeout_secs
                ))
            })?
            .map_err(|e| ExtractorError::Service(e.to_string()))?;

        debug!("LLM response length: {} chars", content.len());

        let fields = parse_embedded::<FieldMap>(&content).map_err(|e| {
            warn!("Extraction response was not a JSON object: {}", e);
            ExtractorError::Parse { raw: content.clone() }
        })?;

        info!(
            model = provider.model_name(),
            fields = fields.len(),
            "Extracted field map"
        );
        Ok(fields)
    }
}
