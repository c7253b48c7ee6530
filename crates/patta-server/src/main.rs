//! Patta Server CLI
//!
//! Starts the HTTP server for claim intake and anomaly review.

use patta_server::{config::ServerConfig, start_server, ServerError};
use std::env;
use std::process;
use tracing_subscriber::EnvFilter;

const EXTRACTION_KEY_VAR: &str = "PATTA_EXTRACTION_API_KEY";
const CLASSIFICATION_KEY_VAR: &str = "PATTA_CLASSIFICATION_API_KEY";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        ServerConfig::from_file(&args[2])?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        eprintln!("Warning: No config file specified, using defaults");
        eprintln!("Usage: patta-server --config <path-to-config.toml>");
        eprintln!();
        ServerConfig::default()
    };

    let config = config.with_fallback_credentials(
        non_empty_env(EXTRACTION_KEY_VAR),
        non_empty_env(CLASSIFICATION_KEY_VAR),
    );

    start_server(config).await
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn print_help() {
    println!("Patta Server - Land-claim intake and anomaly review");
    println!();
    println!("USAGE:");
    println!("    patta-server --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    {}      Extraction credential if the file has none", EXTRACTION_KEY_VAR);
    println!("    {}  Classification credential if the file has none", CLASSIFICATION_KEY_VAR);
    println!("    RUST_LOG                      Log filter (default: info)");
    println!();
    println!("CONFIGURATION:");
    println!("    - bind_address, bind_port, database_path");
    println!("    - [extraction]: endpoint, model, api_key, timeout_secs, max_tokens, max_text_length");
    println!("    - [classification]: endpoint, model, api_key, timeout_secs, max_tokens");
    println!("    - [auditor]: flag_threshold, sample_size, rule_scan_limit");
    println!();
}
