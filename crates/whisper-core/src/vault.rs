//! The backend-agnostic Vault Client contract (§4.3).
//!
//! The core depends only on this five-operation trait. A production adapter
//! and an in-memory test double both implement it; neither leaks
//! backend-specific types across the boundary.

use crate::{Timestamp, VaultError};
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;

/// The fixed string literals a vault key is suffixed with. Each token `T` has
/// at most one container at `T-secret` and one at `T-metadata`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suffix {
    Secret,
    Metadata,
}

impl Suffix {
    pub fn as_str(&self) -> &'static str {
        match self {
            Suffix::Secret => "secret",
            Suffix::Metadata => "metadata",
        }
    }
}

impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A versioned, per-key-expiring key-value store. Every call carries an
/// implicit per-operation deadline of ~30s, enforced by each implementation
/// (the in-memory double simulates it; the production adapter wraps its
/// transport call in a `tokio::time::timeout`).
#[async_trait]
pub trait VaultClient: Send + Sync {
    /// True if the metadata entry for `token` exists and has not expired;
    /// false on absence; errors on permission failure or transport.
    async fn check(&self, token: &str) -> Result<bool, VaultError>;

    /// Create an empty versioned container at `token-suffix` with a hard
    /// expiration of `expires`. Fails `AlreadyExists` on collision;
    /// `InvalidArgument` if `expires` is not strictly in the future by at
    /// least one minute.
    async fn create(
        &self,
        token: &str,
        suffix: Suffix,
        expires: Timestamp,
    ) -> Result<(), VaultError>;

    /// Append a new version whose body is `payload`. Fails `NotFound` if the
    /// container does not exist; `InvalidArgument` if the payload exceeds the
    /// backend's size limit.
    async fn add_version(
        &self,
        token: &str,
        suffix: Suffix,
        payload: Bytes,
    ) -> Result<(), VaultError>;

    /// Return the payload of the most recent version. Fails `NotFound` if
    /// absent or expired.
    async fn access_latest(&self, token: &str, suffix: Suffix) -> Result<Bytes, VaultError>;

    /// Remove the container and all of its versions. Fails `NotFound` if
    /// absent.
    async fn delete(&self, token: &str, suffix: Suffix) -> Result<(), VaultError>;
}

/// The backend payload-size ceiling enforced at `add_version`: 65 KiB, taken
/// from the reference backend's exact enforced limit rather than the
/// distilled spec's rounder "~64 KiB".
pub const MAX_PAYLOAD_BYTES: usize = 65 * 1024;

/// The minimum lead time `expires` must have over "now" at `create` time.
pub const MIN_LIFETIME: std::time::Duration = std::time::Duration::from_secs(60);

/// The per-operation deadline every Vault Client call is bounded by.
pub const OPERATION_DEADLINE: std::time::Duration = std::time::Duration::from_secs(30);

#[cfg(test)]
#[path = "vault_tests.rs"]
mod tests;
