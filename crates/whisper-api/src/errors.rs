//! Error types for the HTTP service.
//!
//! Grounded in the donor crate's `WebhookHandlerError`/`ServiceError`/
//! `ConfigError` split (`errors.rs`): a request-facing error type that maps
//! onto the status codes of the distilled specification's §6/§7, and
//! separate bootstrap-level error types for the service binary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::{error, warn};
use whisper_core::{SecretError, VaultError};

/// Request-facing error type, wrapping [`SecretError`] and request
/// validation failures behind [`IntoResponse`].
///
/// Maps onto the status code table of §7:
/// - `SecretNotFound` -> 404
/// - `NotAuthorized` -> 401
/// - `AlreadyExists` (surfaced only if the Token Minter's retries are
///   exhausted) -> 500
/// - `FileSizeLimit` / `TimeToLive` / bad request shape -> 400
/// - `PermissionDenied` / `NotLoaded` / unexpected vault failure -> 500
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Secret(#[from] SecretError),

    #[error("malformed request: {message}")]
    BadRequest { message: String },

    #[error("service is shutting down")]
    Unavailable,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Secret(SecretError::SecretNotFound) => {
                (StatusCode::NOT_FOUND, "secret not found".to_string())
            }
            Self::Secret(SecretError::NotAuthorized) => {
                (StatusCode::UNAUTHORIZED, "not authorized".to_string())
            }
            Self::Secret(SecretError::FileSizeLimit) => (
                StatusCode::BAD_REQUEST,
                "secret exceeds the maximum payload size".to_string(),
            ),
            Self::Secret(SecretError::TimeToLive) => (
                StatusCode::BAD_REQUEST,
                "lifetime is too short or too long".to_string(),
            ),
            Self::Secret(SecretError::AlreadyExists) => {
                warn!("token collision surfaced to the facade after exhausting mint retries");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "could not mint a unique token".to_string(),
                )
            }
            Self::Secret(SecretError::PermissionDenied) => {
                error!("vault permission denied");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            Self::Secret(SecretError::NotLoaded) => {
                error!("misuse: secret context operation attempted before load");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            Self::Secret(SecretError::KeyDerivation(e)) => {
                error!(error = %e, "key derivation failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            Self::Secret(SecretError::TokenMint(e)) => {
                error!(error = %e, "token minting failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            Self::Secret(SecretError::Vault(VaultError::PermissionDenied { message })) => {
                error!(%message, "vault permission denied");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            Self::Secret(SecretError::Vault(e)) => {
                error!(error = %e, "unexpected vault failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            Self::BadRequest { message } => (StatusCode::BAD_REQUEST, message.clone()),
            Self::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service is shutting down".to_string(),
            ),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}

/// Service bootstrap errors (server binding, startup wiring).
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("failed to bind to address {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("server failed: {message}")]
    ServerFailed { message: String },

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

/// Configuration load/validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {message}")]
    Invalid { message: String },

    #[error("missing required configuration: {key}")]
    Missing { key: String },

    #[error("configuration parsing failed: {0}")]
    Parsing(#[from] config::ConfigError),
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
