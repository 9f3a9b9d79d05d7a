//! # Whisper Service
//!
//! Binary entry point for the one-time-secret HTTP service.
//!
//! This executable:
//! - Loads configuration from an optional TOML file and `WHISPER_*` env vars
//! - Initializes `tracing` logging
//! - Constructs the configured vault backend
//! - Starts the HTTP server from `whisper-api`

use clap::Parser;
use tracing::error;
use whisper_api::{config::ServiceConfig, ServiceError};

#[derive(Debug, Parser)]
#[command(name = "whisper-service", about = "One-time-secret HTTP service")]
struct Args {
    /// Path to a TOML configuration file (without extension), layered under
    /// built-in defaults and `WHISPER_*` environment variable overrides.
    #[arg(long, env = "WHISPER_CONFIG_PATH")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match whisper_service::load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            // Logging isn't initialized yet: a bad config is reported on
            // stderr directly rather than through a tracing subscriber that
            // doesn't exist.
            eprintln!("whisper-service failed to load configuration: {e}");
            std::process::exit(3);
        }
    };

    whisper_service::init_tracing(&config);

    if let Err(e) = whisper_service::run_with_config(config).await {
        error!("whisper-service failed: {e}");

        let exit_code = match e {
            ServiceError::BindFailed { .. } => 1,
            ServiceError::ServerFailed { .. } => 2,
            ServiceError::Configuration(_) => 3,
        };

        std::process::exit(exit_code);
    }

    Ok(())
}
