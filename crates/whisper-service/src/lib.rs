//! # Whisper Service
//!
//! Binary-support library for the one-time-secret HTTP service.
//!
//! This crate owns everything `whisper-api` deliberately stays agnostic of:
//! loading [`ServiceConfig`] from file and environment, initializing
//! `tracing-subscriber`, constructing the configured
//! [`whisper_core::vault::VaultClient`] backend, and combining the
//! ctrl-c/SIGTERM signals into the shutdown future `whisper_api::serve`
//! expects.

use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use whisper_api::{AppState, ServiceConfig, ServiceError};
use whisper_core::adapters::InMemoryVault;
use whisper_core::vault::VaultClient;

pub use whisper_api::config::VaultBackendConfig;

/// Initialize the global `tracing` subscriber from [`ServiceConfig::logging`].
///
/// Honors `RUST_LOG` when set; otherwise scopes the default directive to
/// this workspace's crates plus `tower_http=debug`, matching the donor's
/// `main.rs` filter.
pub fn init_tracing(config: &ServiceConfig) {
    let default_directive = format!(
        "whisper_service={level},whisper_api={level},whisper_core={level},tower_http=debug",
        level = config.logging.level
    );
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive.into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.logging.json_format {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Construct the [`VaultClient`] selected by [`VaultBackendConfig`].
///
/// The `Azure` variant requires this crate's `azure` feature; without it,
/// selecting `Azure` in configuration is a startup-time configuration error
/// rather than a silent fallback to the in-memory double.
pub fn build_vault(config: &ServiceConfig) -> Result<Arc<dyn VaultClient>, ServiceError> {
    match &config.vault {
        VaultBackendConfig::InMemory => {
            info!("using in-memory vault backend");
            Ok(Arc::new(InMemoryVault::new()))
        }
        VaultBackendConfig::Azure { vault_url } => build_azure_vault(vault_url, config),
    }
}

#[cfg(feature = "azure")]
fn build_azure_vault(
    vault_url: &str,
    config: &ServiceConfig,
) -> Result<Arc<dyn VaultClient>, ServiceError> {
    use std::time::Duration;
    use whisper_core::adapters::AzureVault;

    info!(vault_url, "using Azure Key Vault backend");
    let vault = AzureVault::new(whisper_core::adapters::azure_vault::AzureVaultConfig {
        vault_url: vault_url.to_string(),
        request_timeout: Duration::from_secs(config.server.request_timeout_seconds),
    })
    .map_err(|e| whisper_api::ConfigError::Invalid {
        message: format!("failed to construct Azure Key Vault client: {e}"),
    })?;
    Ok(Arc::new(vault))
}

#[cfg(not(feature = "azure"))]
fn build_azure_vault(
    _vault_url: &str,
    _config: &ServiceConfig,
) -> Result<Arc<dyn VaultClient>, ServiceError> {
    Err(whisper_api::ConfigError::Invalid {
        message: "vault.backend = \"azure\" requires whisper-service to be built with the \
                  `azure` feature enabled"
            .to_string(),
    }
    .into())
}

/// A future that resolves once the process receives `Ctrl+C` or, on Unix,
/// `SIGTERM`.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => info!("received SIGTERM, initiating graceful shutdown"),
    }
}

/// Load configuration from an optional TOML file layered under
/// `WHISPER_*` environment overrides.
pub fn load_config(config_path: Option<&str>) -> Result<ServiceConfig, ServiceError> {
    Ok(ServiceConfig::load(config_path)?)
}

/// Build dependencies from an already-loaded configuration and run the
/// server to completion. Returns once a graceful shutdown has finished.
pub async fn run_with_config(config: ServiceConfig) -> Result<(), ServiceError> {
    if matches!(config.vault, VaultBackendConfig::InMemory) {
        warn!(
            "running with the in-memory vault backend: secrets do not survive a restart, \
             not suitable for production"
        );
    }

    let vault = build_vault(&config)?;
    let state = AppState::new(config, vault);

    whisper_api::serve(state, shutdown_signal()).await
}

/// Load configuration, build dependencies, and run the server to
/// completion. Returns once a graceful shutdown has finished.
pub async fn run(config_path: Option<&str>) -> Result<(), ServiceError> {
    run_with_config(load_config(config_path)?).await
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
