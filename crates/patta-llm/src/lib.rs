//! Patta LLM Provider Layer
//!
//! Chat-completion providers used by extraction and classification.
//!
//! # Architecture
//!
//! Callers build a [`ChatRequest`] (messages, temperature, token cap) and hand
//! it to an [`LlmProvider`]. The provider owns the model id, the credential and
//! the transport. Responses are returned as raw text; [`json::parse_embedded`]
//! recovers JSON that the model wrapped in prose or code fences.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OpenRouterProvider`: OpenAI-compatible `/chat/completions` over HTTPS
//!
//! # Examples
//!
//! ```
//! use patta_llm::{ChatRequest, LlmProvider, MockProvider};
//!
//! # async fn example() {
//! let provider = MockProvider::new("Hello from LLM!");
//! let request = ChatRequest::user("test prompt");
//! let result = provider.complete(&request).await.unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! # }
//! ```

#![warn(missing_docs)]

pub mod json;
pub mod openrouter;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

pub use openrouter::{OpenRouterProvider, ProviderConfig};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Request did not complete within the configured timeout
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider could not be constructed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Standing instructions
    System,
    /// Caller content
    User,
    /// Model output
    Assistant,
}

/// One message in a chat exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author role
    pub role: Role,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// System-role message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// User-role message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Provider-independent chat request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Conversation, in order
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature
    pub temperature: f32,
    /// Response-size cap
    pub max_tokens: u32,
}

impl ChatRequest {
    /// Single user message with default sampling settings
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::user(content)],
            temperature: 0.1,
            max_tokens: 1000,
        }
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the response-size cap
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Prepend a system message
    pub fn with_system(mut self, content: impl Into<String>) -> Self {
        self.messages.insert(0, ChatMessage::system(content));
        self
    }

    /// Content of the last user message, if any
    pub fn last_user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// Chat-completion capability
///
/// Implementations perform a single round trip per call; retry policy belongs
/// to callers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run one completion and return the first choice's content
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;

    /// Model identifier used for requests
    fn model_name(&self) -> &str;
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls. Responses
/// are keyed by the content of the last user message.
///
/// # Examples
///
/// ```
/// use patta_llm::{ChatRequest, LlmProvider, MockProvider};
///
/// # async fn example() {
/// let mut provider = MockProvider::default();
/// provider.add_response("prompt1", "response1");
/// let out = provider.complete(&ChatRequest::user("prompt1")).await.unwrap();
/// assert_eq!(out, "response1");
/// assert_eq!(provider.call_count(), 1);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: Result<String, String>,
    responses: Arc<Mutex<HashMap<String, Result<String, String>>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockProvider {
    /// Create a MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: Ok(response.into()),
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a MockProvider that fails every call
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            default_response: Err(message.into()),
            ..Self::new("")
        }
    }

    /// Add a specific response for a given user prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(prompt.into(), Ok(response.into()));
    }

    /// Configure to return an error for a specific user prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(prompt.into(), Err("Mock error".to_string()));
    }

    /// Number of completed calls
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Most recent request received
    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let prompt = request.last_user_content().unwrap_or_default();
        let configured = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(prompt)
            .cloned();

        configured
            .unwrap_or_else(|| self.default_response.clone())
            .map_err(LlmError::Other)
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
