//! Configuration for anomaly analysis

use patta_llm::ProviderConfig;
use serde::{Deserialize, Serialize};

/// Default API base URL for the classification service
pub const DEFAULT_CLASSIFICATION_ENDPOINT: &str = "https://api.aimlapi.com/v1";

/// Default classification model
pub const DEFAULT_CLASSIFICATION_MODEL: &str = "google/gemini-2.0-flash";

/// Configuration for the Auditor
///
/// # Examples
///
/// ```
/// use patta_auditor::AuditorConfig;
///
/// let config = AuditorConfig::default();
/// assert_eq!(config.flag_threshold, 80.0);
/// assert_eq!(config.sample_size, 50);
/// assert_eq!(config.rule_scan_limit, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditorConfig {
    /// Findings scoring strictly above this are written back as flags
    pub flag_threshold: f64,

    /// Records sent to the remote classifier per run
    pub sample_size: usize,

    /// Records examined by the rule engine per run
    pub rule_scan_limit: usize,
}

impl Default for AuditorConfig {
    fn default() -> Self {
        Self {
            flag_threshold: 80.0,
            sample_size: 50,
            rule_scan_limit: 100,
        }
    }
}

impl AuditorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.flag_threshold.is_finite() || self.flag_threshold < 0.0 {
            return Err("flag_threshold must be a finite, non-negative number".to_string());
        }
        if self.sample_size == 0 {
            return Err("sample_size must be greater than 0".to_string());
        }
        if self.rule_scan_limit == 0 {
            return Err("rule_scan_limit must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }
}

/// Connection settings for the remote classifier
///
/// Kept separate from [`ProviderConfig`] because its defaults point at a
/// different service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// API base URL
    pub endpoint: String,

    /// Model identifier
    pub model: String,

    /// Bearer credential; absent means rule-based analysis only
    pub api_key: Option<String>,

    /// Per-call timeout (seconds)
    pub timeout_secs: u64,

    /// Response-size cap
    pub max_tokens: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CLASSIFICATION_ENDPOINT.to_string(),
            model: DEFAULT_CLASSIFICATION_MODEL.to_string(),
            api_key: None,
            timeout_secs: 30,
            max_tokens: 2000,
        }
    }
}

impl ClassifierConfig {
    /// Provider settings derived from this config
    pub fn provider(&self) -> ProviderConfig {
        ProviderConfig {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            api_key: self.api_key.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AuditorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_values() {
        let config = AuditorConfig {
            flag_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AuditorConfig {
            sample_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AuditorConfig {
            rule_scan_limit: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml() {
        let config = AuditorConfig::from_toml("flag_threshold = 75.5").unwrap();
        assert_eq!(config.flag_threshold, 75.5);
        assert_eq!(config.sample_size, 50);
    }

    #[test]
    fn test_classifier_defaults() {
        let config: ClassifierConfig = toml::from_str(r#"api_key = "k""#).unwrap();
        assert_eq!(config.endpoint, DEFAULT_CLASSIFICATION_ENDPOINT);
        assert_eq!(config.max_tokens, 2000);

        let provider = config.provider();
        assert_eq!(provider.model, DEFAULT_CLASSIFICATION_MODEL);
        assert!(provider.has_credential());
    }
}
