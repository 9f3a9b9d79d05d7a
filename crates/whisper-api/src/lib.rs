//! # Whisper API
//!
//! HTTP API library for the one-time-secret service: an `axum` `Router`,
//! shared `AppState`, the wire request/response DTOs of §6, and the error
//! mapping of §7. This crate never touches a vault backend directly — it
//! mints tokens and drives `whisper_core::SecretContext`, translating core
//! errors into the HTTP status codes the distilled specification requires.
//!
//! See `whisper_service` for the binary that wires a concrete
//! [`whisper_core::vault::VaultClient`] into this crate's [`AppState`] and
//! starts the server.

pub mod auth;
pub mod config;
pub mod duration;
pub mod errors;
pub mod responses;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{info, instrument, warn};
use whisper_core::{vault::VaultClient, SecretContext, SecretError, Timestamp, Token};

pub use config::ServiceConfig;
pub use errors::{ApiError, ConfigError, ServiceError};
pub use responses::*;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: ServiceConfig,
    pub vault: Arc<dyn VaultClient>,
    started_at: Instant,
    /// Flips to true once graceful shutdown has begun; `/readyz` then
    /// reports not-ready so a load balancer stops routing new traffic,
    /// matching the 503 "shutting down" status of §6.
    shutting_down: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(config: ServiceConfig, vault: Arc<dyn VaultClient>) -> Self {
        Self {
            config,
            vault,
            started_at: Instant::now(),
            shutting_down: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn begin_shutdown(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }
}

/// Build the HTTP router (§6 Wire API plus the health endpoints of
/// SPEC_FULL §10.6).
pub fn create_router(state: AppState) -> Router {
    let secret_routes = Router::new()
        .route("/v1/secrets", post(create_secret))
        .route(
            "/v1/secrets/{token}",
            get(fetch_secret).delete(destroy_secret),
        );

    let status_routes = Router::new().route("/v1/status", get(status));

    let health_routes = Router::new()
        .route("/healthz", get(healthz))
        .route("/livez", get(livez))
        .route("/readyz", get(readyz));

    Router::new()
        .merge(secret_routes)
        .merge(status_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(CorsLayer::permissive())
                .into_inner(),
        )
        .with_state(state)
}

/// Bind and serve the router until `shutdown` resolves, honoring the
/// configured shutdown timeout (SPEC_FULL §10.6: the donor's 35s-budget
/// graceful shutdown, re-expressed with `axum::serve`'s
/// `with_graceful_shutdown`).
pub async fn serve(
    state: AppState,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), ServiceError> {
    let addr = SocketAddr::new(
        state
            .config
            .server
            .host
            .parse()
            .unwrap_or_else(|_| "0.0.0.0".parse().unwrap()),
        state.config.server.port,
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServiceError::BindFailed {
            address: addr.to_string(),
            message: e.to_string(),
        })?;

    info!(%addr, "whisper-service listening");

    let shutdown_state = state.clone();
    let shutdown_timeout = Duration::from_secs(state.config.server.shutdown_timeout_seconds);
    let app = create_router(state);

    let graceful = async move {
        shutdown.await;
        shutdown_state.begin_shutdown();
        info!(
            timeout_secs = shutdown_timeout.as_secs(),
            "graceful shutdown initiated"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(graceful)
        .await
        .map_err(|e| ServiceError::ServerFailed {
            message: e.to_string(),
        })
}

// ============================================================================
// Handlers
// ============================================================================

#[instrument(skip(state, body))]
async fn create_secret(
    State(state): State<AppState>,
    Json(body): Json<CreateSecretRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.secret.is_empty() {
        return Err(ApiError::BadRequest {
            message: "secret must not be empty".to_string(),
        });
    }

    let lifetime = body
        .lifetime
        .map(|d| d.as_duration())
        .unwrap_or_else(|| Duration::from_secs(state.config.secrets.default_lifetime_seconds));
    if lifetime > Duration::from_secs(state.config.secrets.max_lifetime_seconds) {
        return Err(ApiError::BadRequest {
            message: "lifetime exceeds the configured maximum".to_string(),
        });
    }

    let token = Token::mint(state.vault.as_ref())
        .await
        .map_err(SecretError::from)?;
    let mut ctx = SecretContext::new(state.vault.clone(), token);

    ctx.set_password(&body.password)?;
    let created = Timestamp::now();
    ctx.metadata.created = created;
    ctx.metadata.expires = created.add(lifetime);
    ctx.metadata.accesses = body.accesses;
    ctx.metadata.filename = body.filename;
    ctx.metadata.is_base64 = body.is_base64;

    ctx.create(Bytes::from(body.secret)).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateSecretReply {
            token: ctx.token().to_string(),
            expires: ctx.metadata.expires,
        }),
    ))
}

fn candidate_password_from(headers: &HeaderMap) -> String {
    auth::candidate_password(
        headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok()),
    )
}

#[instrument(skip(state, headers))]
async fn fetch_secret(
    State(state): State<AppState>,
    Path(token): Path<String>,
    headers: HeaderMap,
) -> Result<Json<FetchSecretReply>, ApiError> {
    let candidate = candidate_password_from(&headers);
    let token: Token = token.parse().expect("Token parsing is infallible");
    let mut ctx = SecretContext::new(state.vault.clone(), token);

    let outcome = ctx.fetch(&candidate).await?;

    Ok(Json(FetchSecretReply {
        secret: String::from_utf8_lossy(&outcome.payload).into_owned(),
        filename: ctx.metadata.filename.clone(),
        is_base64: ctx.metadata.is_base64,
        created: ctx.metadata.created,
        accesses: ctx.metadata.retrievals,
        destroyed: outcome.destroyed,
    }))
}

#[instrument(skip(state, headers))]
async fn destroy_secret(
    State(state): State<AppState>,
    Path(token): Path<String>,
    headers: HeaderMap,
) -> Result<Json<DestroySecretReply>, ApiError> {
    let candidate = candidate_password_from(&headers);
    let token: Token = token.parse().expect("Token parsing is infallible");
    let mut ctx = SecretContext::new(state.vault.clone(), token);
    ctx.destroy(&candidate).await?;
    Ok(Json(DestroySecretReply { destroyed: true }))
}

#[instrument(skip(state))]
async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse::new(state.uptime()))
}

async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

async fn livez() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[instrument(skip(state))]
async fn readyz(State(state): State<AppState>) -> Result<Json<ReadinessResponse>, StatusCode> {
    if state.is_shutting_down() {
        warn!("readiness probe failed: service is shutting down");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    Ok(Json(ReadinessResponse { ready: true }))
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
