//! Shared black-box test harness: spawns a real `whisper-api` router bound
//! to a real loopback socket, the way a production deployment serves it,
//! then drives it purely over HTTP with `reqwest`.
//!
//! No Docker image is involved — the service is a pure-Rust binary with no
//! native dependencies, so a real `TcpListener` on an OS-assigned port is
//! enough to exercise it end to end in-process.

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use whisper_api::config::ServiceConfig;
use whisper_api::{create_router, AppState};
use whisper_core::adapters::InMemoryVault;

/// A running `whisper-api` instance, bound to an ephemeral port on
/// `127.0.0.1`.
///
/// Dropping this value aborts the server task; the listener itself closes
/// when the last `TcpListener` clone is dropped.
pub struct TestServer {
    pub base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Spawn a server with default configuration over a fresh, empty
    /// in-memory vault.
    #[allow(dead_code)]
    pub async fn spawn() -> Self {
        Self::spawn_with_state(AppState::new(
            ServiceConfig::default(),
            Arc::new(InMemoryVault::new()),
        ))
        .await
    }

    /// Spawn a server with caller-supplied configuration, still over a
    /// fresh, empty in-memory vault.
    #[allow(dead_code)]
    pub async fn spawn_with_config(config: ServiceConfig) -> Self {
        Self::spawn_with_state(AppState::new(config, Arc::new(InMemoryVault::new()))).await
    }

    async fn spawn_with_state(state: AppState) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind an ephemeral test port");
        let addr = listener.local_addr().unwrap();
        let router = create_router(state);

        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        // Give the accept loop a moment to start taking connections.
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            base_url: format!("http://{addr}"),
            handle,
        }
    }

    #[allow(dead_code)]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[allow(dead_code)]
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .expect("failed to build reqwest client")
}

/// `Authorization: Bearer <b64url(password)>`, the only supported auth shape
/// (§6).
#[allow(dead_code)]
pub fn bearer_header(password: &str) -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
    format!("Bearer {}", URL_SAFE_NO_PAD.encode(password.as_bytes()))
}
