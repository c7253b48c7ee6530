//! Configuration for the Extractor

use patta_llm::ProviderConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Extractor
///
/// Connection settings are flattened in, so one TOML table carries both:
///
/// ```toml
/// endpoint = "https://openrouter.ai/api/v1"
/// model = "google/gemini-2.0-flash-exp:free"
/// api_key = "sk-or-..."
/// timeout_secs = 30
/// max_tokens = 1000
/// max_text_length = 50000
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Endpoint, model, credential and timeout
    #[serde(flatten)]
    pub provider: ProviderConfig,

    /// Response-size cap sent with each request
    pub max_tokens: u32,

    /// Maximum input text length (characters)
    pub max_text_length: usize,
}

impl ExtractorConfig {
    /// Get the extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        if self.provider.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if self.provider.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            max_tokens: 1000,
            max_text_length: 50_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.extraction_timeout(), Duration::from_secs(30));
        assert!(!config.provider.has_credential());
    }

    #[test]
    fn test_invalid_values() {
        let mut config = ExtractorConfig::default();
        config.max_text_length = 0;
        assert!(config.validate().is_err());

        let mut config = ExtractorConfig::default();
        config.provider.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = ExtractorConfig::default();
        config.provider.model = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_flattened() {
        let config = ExtractorConfig::from_toml(
            r#"
            api_key = "sk-test"
            model = "some/model"
            max_text_length = 1000
            "#,
        )
        .unwrap();

        assert_eq!(config.provider.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.provider.model, "some/model");
        assert_eq!(config.max_text_length, 1000);
        assert_eq!(config.max_tokens, 1000);
        assert_eq!(config.provider.timeout_secs, 30);
    }
}
