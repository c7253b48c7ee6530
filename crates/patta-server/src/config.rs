//! Configuration file parsing for the server.
//!
//! Loads bind settings, the database path and one section per capability
//! from a TOML file. Every key has a default, so an empty file is valid.

use patta_auditor::{AuditorConfig, ClassifierConfig};
use patta_extractor::ExtractorConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A section failed validation
    #[error("Invalid [{section}] configuration: {message}")]
    Invalid {
        /// TOML section name
        section: &'static str,
        /// Validation message
        message: String,
    },
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8000)
    pub bind_port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Extraction service settings
    pub extraction: ExtractorConfig,

    /// Classification service settings
    pub classification: ClassifierConfig,

    /// Analysis settings
    pub auditor: AuditorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8000,
            database_path: PathBuf::from("patta.db"),
            extraction: ExtractorConfig::default(),
            classification: ClassifierConfig::default(),
            auditor: AuditorConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.extraction
            .validate()
            .map_err(|message| ConfigError::Invalid {
                section: "extraction",
                message,
            })?;
        self.auditor
            .validate()
            .map_err(|message| ConfigError::Invalid {
                section: "auditor",
                message,
            })?;
        Ok(())
    }

    /// Fill in credentials the file left out
    ///
    /// Values already present in the file win.
    pub fn with_fallback_credentials(
        mut self,
        extraction_key: Option<String>,
        classification_key: Option<String>,
    ) -> Self {
        if self.extraction.provider.api_key.is_none() {
            self.extraction.provider.api_key = extraction_key;
        }
        if self.classification.api_key.is_none() {
            self.classification.api_key = classification_key;
        }
        self
    }

    /// Create a default configuration for testing (in-memory database)
    pub fn default_test_config() -> Self {
        ServerConfig {
            database_path: PathBuf::from(":memory:"),
            ..Default::default()
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}
