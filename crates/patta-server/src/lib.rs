//! Patta Server
//!
//! HTTP surface for claim intake and anomaly review.
//! Wires the store, the intake pipeline and the auditor together from one
//! configuration value.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::ServerConfig;
use handlers::{create_router, AppState};
use patta_assembler::Assembler;
use patta_auditor::{Auditor, AuditorError};
use patta_extractor::{Extractor, ExtractorError};
use patta_store::{SqliteStore, StoreError};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Database could not be opened
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Extraction gateway could not be built
    #[error("Extractor error: {0}")]
    Extractor(#[from] ExtractorError),

    /// Auditor could not be built
    #[error("Auditor error: {0}")]
    Auditor(#[from] AuditorError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build the shared state from configuration
///
/// Opens the database and constructs each capability; missing credentials
/// select the fallback implementations.
pub fn build_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    let store = Arc::new(Mutex::new(SqliteStore::new(&config.database_path)?));

    let extractor = Extractor::from_config(config.extraction.clone())?;
    if !extractor.is_available() {
        warn!("No extraction credential configured; text submissions will store placeholder data");
    }

    let auditor = Auditor::from_config(config.auditor.clone(), &config.classification)?;
    if !auditor.has_remote() {
        info!("No classification credential configured; analysis uses the rule engine");
    }

    Ok(AppState {
        assembler: Arc::new(Assembler::new(Arc::clone(&store), extractor)),
        auditor: Arc::new(auditor),
        store,
    })
}

/// Start the HTTP server
///
/// Builds the application state and serves until the process stops.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Starting Patta server");
    info!("Bind address: {}", config.bind_addr());
    info!("Database: {}", config.database_path.display());

    let state = build_state(&config)?;
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
