//! Wire request/response types for the one-time-secret HTTP API (§6).

use crate::duration::WireDuration;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use whisper_core::Timestamp;

fn default_accesses() -> i64 {
    1
}

/// `POST /v1/secrets` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSecretRequest {
    /// The secret text; may itself be base64-encoded file content.
    pub secret: String,

    /// Optional password gating retrieval and destruction.
    #[serde(default)]
    pub password: String,

    /// Retrieval budget. Defaults to 1 when omitted.
    #[serde(default = "default_accesses")]
    pub accesses: i64,

    /// Lifetime until expiration. Defaults to the server's configured
    /// default (7 days per §4.5) when omitted.
    #[serde(default)]
    pub lifetime: Option<WireDuration>,

    /// Original file name, for client-side restore.
    #[serde(default)]
    pub filename: String,

    /// True if `secret` is base64-encoded file content.
    #[serde(default)]
    pub is_base64: bool,
}

/// `POST /v1/secrets` success response: 201 `{token, expires}`.
#[derive(Debug, Serialize)]
pub struct CreateSecretReply {
    pub token: String,
    pub expires: Timestamp,
}

/// `GET /v1/secrets/:token` success response.
///
/// Per §4.5, the wire field `accesses` carries the *post-fetch retrievals*
/// count, not the retrieval budget — preserved for wire compatibility.
#[derive(Debug, Serialize)]
pub struct FetchSecretReply {
    pub secret: String,
    pub filename: String,
    pub is_base64: bool,
    pub created: Timestamp,
    pub accesses: i64,
    pub destroyed: bool,
}

/// `DELETE /v1/secrets/:token` success response.
#[derive(Debug, Serialize)]
pub struct DestroySecretReply {
    pub destroyed: bool,
}

/// `GET /v1/status` response. Never blocks on the vault.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub uptime: WireDuration,
    pub version: String,
}

impl StatusResponse {
    pub fn new(uptime: Duration) -> Self {
        Self {
            status: "ok".to_string(),
            uptime: WireDuration(uptime),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Shallow liveness/health response body, shared by `/healthz` and `/livez`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

/// `/readyz` response body.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
}

#[cfg(test)]
#[path = "responses_tests.rs"]
mod tests;
