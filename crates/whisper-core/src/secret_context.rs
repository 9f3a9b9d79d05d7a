//! The per-token Secret Context (§4.4): a handle carrying the metadata of §3
//! plus a non-owning reference to a Vault Client, orchestrating
//! Create/Fetch/Destroy against it.
//!
//! Grounded directly in the reference implementation's `SecretContext`
//! (`vault.go`): the protocol steps, ordering, and the best-effort
//! destroy-and-log behavior on an invalid load are carried over verbatim in
//! meaning, re-expressed against the `VaultClient` trait instead of a
//! concrete Google Secret Manager client.

use crate::vault::{Suffix, VaultClient};
use crate::{SecretError, Timestamp, VaultError};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

fn default_accesses() -> i64 {
    1
}

/// Policy record attached to each token (§3). Serialized verbatim as the
/// vault's `metadata` version payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretMetadata {
    /// Self-describing derived-key string; empty means no password required.
    #[serde(default)]
    pub password_hash: String,

    /// Original file name for client-side restore, if any.
    #[serde(default)]
    pub filename: String,

    /// True if the payload bytes were base64-encoded by the client.
    #[serde(default)]
    pub is_base64: bool,

    /// Retrieval budget. `<= 0` means unlimited until expiration.
    #[serde(default = "default_accesses")]
    pub accesses: i64,

    /// Count of successful fetches. Monotonically non-decreasing.
    #[serde(default)]
    pub retrievals: i64,

    /// Wall-clock instant of creation. Required, non-zero.
    #[serde(default)]
    pub created: Timestamp,

    /// Wall-clock instant of the most recent successful fetch; zero until
    /// first.
    #[serde(default)]
    pub last_accessed: Timestamp,

    /// Wall-clock instant after which the secret is invalid.
    #[serde(default)]
    pub expires: Timestamp,
}

impl Default for SecretMetadata {
    fn default() -> Self {
        Self {
            password_hash: String::new(),
            filename: String::new(),
            is_base64: false,
            accesses: 1,
            retrievals: 0,
            created: Timestamp::zero(),
            last_accessed: Timestamp::zero(),
            expires: Timestamp::zero(),
        }
    }
}

impl SecretMetadata {
    /// The invariant of §3: `expires > now` AND (`accesses <= 0` OR
    /// `retrievals < accesses`) AND `created` and `expires` are both
    /// non-zero.
    pub fn is_valid(&self) -> bool {
        if self.created.is_zero() || self.expires.is_zero() {
            return false;
        }
        if self.expires <= Timestamp::now() {
            return false;
        }
        if self.accesses > 0 && self.retrievals >= self.accesses {
            return false;
        }
        true
    }
}

/// Outcome of a successful [`SecretContext::fetch`].
pub struct FetchOutcome {
    pub payload: Bytes,
    /// True if this fetch was the terminal read: both vault entries have
    /// already been removed by the time this outcome is returned.
    pub destroyed: bool,
}

/// A per-token handle. The Vault Client is a non-owning, shared reference
/// (§9: "the Vault Client outlives all Secret Contexts"); this handle may be
/// used by exactly one worker for the duration of one public call.
pub struct SecretContext {
    vault: Arc<dyn VaultClient>,
    token: crate::Token,
    pub metadata: SecretMetadata,
    loaded: bool,
}

impl SecretContext {
    /// A fresh handle for a newly minted token, ready to be populated and
    /// passed to [`SecretContext::create`].
    pub fn new(vault: Arc<dyn VaultClient>, token: crate::Token) -> Self {
        Self {
            vault,
            token,
            metadata: SecretMetadata::default(),
            loaded: false,
        }
    }

    pub fn token(&self) -> &crate::Token {
        &self.token
    }

    /// §4.4.1: empty clears the password; otherwise derive and store a hash.
    pub fn set_password(&mut self, plain: &str) -> Result<(), SecretError> {
        if plain.is_empty() {
            self.metadata.password_hash.clear();
            return Ok(());
        }
        self.metadata.password_hash = crate::key_derivation::derive_password_hash(plain)?;
        Ok(())
    }

    /// §4.4.2: the invariants of §3 hold and the handle has a non-empty
    /// token. A bound Vault Client is a type-level guarantee in this
    /// implementation, so only the metadata and token are checked here.
    pub fn valid(&self) -> bool {
        !self.token.as_str().is_empty() && self.metadata.is_valid()
    }

    /// §4.4.3: Create. Pre: the caller has populated `created`, `expires`,
    /// `accesses`, `filename`, `is_base64`, `password_hash` on
    /// `self.metadata`.
    pub async fn create(&mut self, payload: Bytes) -> Result<(), SecretError> {
        let serialized = serde_json::to_vec(&self.metadata)
            .expect("SecretMetadata always serializes");

        self.vault
            .create(self.token.as_str(), Suffix::Metadata, self.metadata.expires)
            .await
            .map_err(map_create_err)?;

        self.vault
            .add_version(self.token.as_str(), Suffix::Metadata, Bytes::from(serialized))
            .await
            .map_err(map_add_version_err)?;

        self.vault
            .create(self.token.as_str(), Suffix::Secret, self.metadata.expires)
            .await
            .map_err(map_create_err)?;

        self.vault
            .add_version(self.token.as_str(), Suffix::Secret, payload)
            .await
            .map_err(map_add_version_err)?;

        self.loaded = true;
        Ok(())
    }

    /// §4.4.4: Fetch.
    pub async fn fetch(&mut self, candidate_password: &str) -> Result<FetchOutcome, SecretError> {
        self.load(false).await?;

        if !self.valid() {
            if let Err(e) = self.destroy(candidate_password).await {
                warn!(token = %self.token, error = %e, "best-effort destroy of invalid secret failed");
            }
            return Err(SecretError::SecretNotFound);
        }

        if !self.metadata.password_hash.is_empty() {
            if candidate_password.is_empty() {
                return Err(SecretError::NotAuthorized);
            }
            let verified = crate::key_derivation::verify_password_hash(
                &self.metadata.password_hash,
                candidate_password,
            )?;
            if !verified {
                return Err(SecretError::NotAuthorized);
            }
        }

        let payload = self
            .vault
            .access_latest(self.token.as_str(), Suffix::Secret)
            .await
            .map_err(VaultError::into_secret_error)?;

        self.metadata.retrievals += 1;
        self.metadata.last_accessed = Timestamp::now();

        if self.valid() {
            let serialized = serde_json::to_vec(&self.metadata)
                .expect("SecretMetadata always serializes");
            self.vault
                .add_version(self.token.as_str(), Suffix::Metadata, Bytes::from(serialized))
                .await
                .map_err(map_add_version_err)?;
            Ok(FetchOutcome {
                payload,
                destroyed: false,
            })
        } else {
            if let Err(e) = self.destroy(candidate_password).await {
                warn!(token = %self.token, error = %e, "best-effort destroy on exhaustion failed");
            }
            Ok(FetchOutcome {
                payload,
                destroyed: true,
            })
        }
    }

    /// §4.4.5: Destroy.
    pub async fn destroy(&mut self, candidate_password: &str) -> Result<(), SecretError> {
        self.load(false).await?;

        // An already-invalid secret may be collected by anyone (§4.4.6): the
        // verification cost and requirement only apply while still valid.
        if self.valid() && !self.metadata.password_hash.is_empty() {
            if candidate_password.is_empty() {
                return Err(SecretError::NotAuthorized);
            }
            let verified = crate::key_derivation::verify_password_hash(
                &self.metadata.password_hash,
                candidate_password,
            )?;
            if !verified {
                return Err(SecretError::NotAuthorized);
            }
        }

        self.vault
            .delete(self.token.as_str(), Suffix::Secret)
            .await
            .map_err(VaultError::into_secret_error)?;
        self.vault
            .delete(self.token.as_str(), Suffix::Metadata)
            .await
            .map_err(VaultError::into_secret_error)?;
        Ok(())
    }

    /// Load metadata from the vault, decoding it into `self.metadata`. A
    /// no-op if already loaded this session and `reload` is false.
    pub async fn load(&mut self, reload: bool) -> Result<(), SecretError> {
        if self.loaded && !reload {
            return Ok(());
        }
        let raw = self
            .vault
            .access_latest(self.token.as_str(), Suffix::Metadata)
            .await
            .map_err(VaultError::into_secret_error)?;
        self.metadata = serde_json::from_slice(&raw)
            .map_err(|_| SecretError::SecretNotFound)?;
        self.loaded = true;
        Ok(())
    }
}

fn map_create_err(e: VaultError) -> SecretError {
    match e {
        VaultError::InvalidArgument { .. } => SecretError::TimeToLive,
        other => other.into_secret_error(),
    }
}

fn map_add_version_err(e: VaultError) -> SecretError {
    match e {
        VaultError::InvalidArgument { .. } => SecretError::FileSizeLimit,
        other => other.into_secret_error(),
    }
}

#[cfg(test)]
#[path = "secret_context_tests.rs"]
mod tests;
