//! Common test utilities for whisper-api integration tests.
//!
//! Builds real [`AppState`] values backed by a real
//! [`whisper_core::adapters::InMemoryVault`] — these tests exercise the
//! assembled service (router + state + core) in-process, unlike
//! `whisper-e2e-tests`, which drives it over a real socket.

use std::sync::Arc;
use whisper_api::{AppState, ServiceConfig};
use whisper_core::adapters::InMemoryVault;
use whisper_core::vault::VaultClient;

/// A fresh [`AppState`] over an empty in-memory vault and default
/// configuration.
#[allow(dead_code)]
pub fn create_test_app_state() -> AppState {
    create_test_app_state_with_vault(Arc::new(InMemoryVault::new()))
}

/// An [`AppState`] over a caller-supplied vault, for tests that need to
/// inspect vault contents directly alongside the router.
#[allow(dead_code)]
pub fn create_test_app_state_with_vault(vault: Arc<dyn VaultClient>) -> AppState {
    AppState::new(ServiceConfig::default(), vault)
}

/// An [`AppState`] over a caller-supplied configuration, for tests exercising
/// configuration-dependent behavior (lifetime bounds, server settings).
#[allow(dead_code)]
pub fn create_test_app_state_with_config(config: ServiceConfig) -> AppState {
    AppState::new(config, Arc::new(InMemoryVault::new()))
}
