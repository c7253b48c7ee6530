//! OpenRouter Provider Implementation
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint (OpenRouter,
//! AIML API, a local gateway) with bearer authentication.
//!
//! # Features
//!
//! - Async HTTP communication via reqwest
//! - Configurable endpoint, model and credential
//! - Fixed per-call timeout, single attempt
//!
//! # Examples
//!
//! ```no_run
//! use patta_llm::{OpenRouterProvider, ProviderConfig};
//!
//! let config = ProviderConfig {
//!     api_key: Some("sk-or-...".to_string()),
//!     ..ProviderConfig::default()
//! };
//! let provider = OpenRouterProvider::from_config(&config).unwrap();
//! ```

use crate::{ChatMessage, ChatRequest, LlmError, LlmProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default OpenRouter API base URL
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1";

/// Default model for extraction
pub const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-exp:free";

/// Default timeout for LLM requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for a chat-completion provider
///
/// The credential is optional: a config without one describes a capability
/// that is not available, and [`ProviderConfig::build`] returns `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API base URL (without the `/chat/completions` suffix)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier sent with each request
    #[serde(default = "default_model")]
    pub model: String,

    /// Bearer credential
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-call timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ProviderConfig {
    /// Whether a non-blank credential is present
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Build a provider if a credential is configured
    pub fn build(&self) -> Result<Option<OpenRouterProvider>, LlmError> {
        if !self.has_credential() {
            return Ok(None);
        }
        OpenRouterProvider::from_config(self).map(Some)
    }
}

/// OpenAI-compatible chat-completion provider
pub struct OpenRouterProvider {
    endpoint: String,
    model: String,
    api_key: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

/// Request body for `/chat/completions`
#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

/// Response envelope from `/chat/completions`
#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenRouterProvider {
    /// Create a provider from explicit settings
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` when the credential is missing or the HTTP
    /// client cannot be built.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::Config("api_key is required".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            timeout_secs: config.timeout_secs,
            client,
        })
    }

    /// Full URL of the completion endpoint
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    /// Run one completion
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The endpoint cannot be reached or times out
    /// - The model is not available
    /// - The response status is not a success
    /// - The envelope has no first choice with content
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let body = CompletionRequest {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!(model = %self.model, messages = request.messages.len(), "Sending completion request");

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.timeout_secs)
                } else {
                    LlmError::Communication(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.model.clone()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitExceeded);
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Communication(format!("HTTP {}: {}", status, error_text)));
        }

        let envelope: CompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        envelope
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("Response has no choices".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(endpoint: &str) -> ProviderConfig {
        ProviderConfig {
            endpoint: endpoint.to_string(),
            api_key: Some("test-key".to_string()),
            timeout_secs: 2,
            ..ProviderConfig::default()
        }
    }

    #[test]
    fn test_provider_creation() {
        let provider = OpenRouterProvider::from_config(&configured("https://example.test/v1/")).unwrap();
        assert_eq!(provider.completions_url(), "https://example.test/v1/chat/completions");
        assert_eq!(provider.model_name(), DEFAULT_MODEL);
        assert_eq!(provider.timeout_secs, 2);
    }

    #[test]
    fn test_build_without_credential() {
        let config = ProviderConfig::default();
        assert!(!config.has_credential());
        assert!(config.build().unwrap().is_none());

        let blank = ProviderConfig {
            api_key: Some("   ".to_string()),
            ..ProviderConfig::default()
        };
        assert!(blank.build().unwrap().is_none());
        assert!(matches!(
            OpenRouterProvider::from_config(&blank),
            Err(LlmError::Config(_))
        ));
    }

    #[test]
    fn test_config_defaults_from_toml() {
        let config: ProviderConfig = toml::from_str(r#"api_key = "k""#).unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.has_credential());
    }

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest::user("hi").with_system("sys");
        let body = CompletionRequest {
            model: "m",
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["max_tokens"], 1000);
    }

    #[test]
    fn test_envelope_parsing() {
        let raw = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"{\"a\":1}"}}]}"#;
        let envelope: CompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            envelope.choices[0].message.content.as_deref(),
            Some("{\"a\":1}")
        );
    }

    #[tokio::test]
    async fn test_error_handling_unreachable_endpoint() {
        let provider = OpenRouterProvider::from_config(&configured("http://127.0.0.1:9")).unwrap();

        let result = provider.complete(&ChatRequest::user("test")).await;
        assert!(matches!(
            result,
            Err(LlmError::Communication(_)) | Err(LlmError::Timeout(_))
        ));
    }
}
