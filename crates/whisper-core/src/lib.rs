//! # Whisper Core
//!
//! Core business logic for the one-time-secret custody engine.
//!
//! This crate owns unique token minting, paired secret/metadata storage against
//! an external versioned key-value vault, the validity state machine (retrieval
//! budget, expiration), password-protected access via a memory-hard key
//! derivation function, and the create/fetch/destroy protocol that composes all
//! of the above against a vault whose native primitives do not otherwise give
//! these semantics for free.
//!
//! ## Architecture
//!
//! The core follows clean architecture principles:
//! - Business logic depends only on the [`vault::VaultClient`] trait abstraction
//! - Vault backends are injected at runtime (in-memory test double, or a
//!   cloud-backed production adapter behind the `azure` feature)
//! - No in-process shared mutable state is introduced by the core itself
//!
//! ## Usage
//!
//! ```rust
//! use whisper_core::{adapters::InMemoryVault, SecretContext, Token};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let vault = Arc::new(InMemoryVault::new());
//! let token = Token::mint(vault.as_ref()).await?;
//! let mut ctx = SecretContext::new(vault, token);
//! ctx.set_password("")?;
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration as StdDuration;

/// Standard result type for whisper-core operations.
pub type CoreResult<T> = Result<T, SecretError>;

// ============================================================================
// Timestamp
// ============================================================================

/// Wall-clock instant, serialized as RFC3339 on the wire.
///
/// A zero-value `Timestamp` (the Unix epoch) stands in for "unset" the way the
/// reference implementation uses Go's zero `time.Time`: `created` and `expires`
/// are required to be non-zero, `last_accessed` is zero until the first fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current instant.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// The Unix epoch, used as the "unset" sentinel.
    pub fn zero() -> Self {
        Self(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// True if this timestamp is the zero sentinel.
    pub fn is_zero(&self) -> bool {
        self.0 == DateTime::<Utc>::UNIX_EPOCH
    }

    /// Add a duration, producing a new timestamp.
    pub fn add(&self, duration: StdDuration) -> Self {
        let delta = chrono::Duration::from_std(duration).unwrap_or_default();
        Self(self.0 + delta)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::zero()
    }
}

// ============================================================================
// Error categories
// ============================================================================

/// Broad classification used by callers deciding whether to retry or report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Transient,
    Permanent,
    Security,
    Configuration,
}

/// Failure categories surfaced by a [`vault::VaultClient`] backend.
///
/// These map 1:1 onto the operation semantics of §4.3: each backend
/// implementation (in-memory test double, cloud adapter) is responsible for
/// translating its own transport errors into this fixed vocabulary so the
/// rest of the core never has to know which backend it is talking to.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("vault entry not found")]
    NotFound,

    #[error("vault entry already exists")]
    AlreadyExists,

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("vault call timed out after {timeout_seconds}s")]
    Timeout { timeout_seconds: u64 },

    #[error("vault transport error: {message}")]
    Transport { message: String },
}

impl VaultError {
    /// Whether retrying the same call might succeed without caller changes.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Transport { .. })
    }

    pub fn error_category(&self) -> ErrorCategory {
        match self {
            Self::NotFound | Self::AlreadyExists | Self::InvalidArgument { .. } => {
                ErrorCategory::Permanent
            }
            Self::PermissionDenied { .. } => ErrorCategory::Security,
            Self::Timeout { .. } | Self::Transport { .. } => ErrorCategory::Transient,
        }
    }
}

/// Error kinds surfaced by the secret custody engine (§7).
///
/// Names are indicative of the distilled specification's error table; the
/// Service Facade maps each variant onto an HTTP status (see
/// `whisper-api::errors`).
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    /// Metadata or secret absent, expired, or exhausted.
    #[error("secret not found")]
    SecretNotFound,

    /// Password required and missing or wrong.
    #[error("not authorized")]
    NotAuthorized,

    /// Token collision at Create; retryable by the Token Minter.
    #[error("token already exists")]
    AlreadyExists,

    /// Payload too large for the vault backend.
    #[error("payload exceeds the vault's size limit")]
    FileSizeLimit,

    /// `expires` is not far enough in the future.
    #[error("lifetime too short")]
    TimeToLive,

    /// Vault credential or path failure.
    #[error("permission denied")]
    PermissionDenied,

    /// Misuse: an operation requiring loaded metadata was called before Load.
    #[error("metadata not loaded")]
    NotLoaded,

    /// Key derivation failed to decode or compute a hash.
    #[error("key derivation error: {0}")]
    KeyDerivation(#[from] crate::key_derivation::KeyDerivationError),

    /// Token minting could not produce a unique token.
    #[error("token minting error: {0}")]
    TokenMint(#[from] crate::token::TokenMintError),

    /// Any vault failure not re-categorized by the rules above.
    #[error("vault error: {0}")]
    Vault(#[from] VaultError),
}

impl SecretError {
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Vault(e) => e.is_transient(),
            _ => false,
        }
    }

    pub fn error_category(&self) -> ErrorCategory {
        match self {
            Self::SecretNotFound | Self::AlreadyExists | Self::FileSizeLimit | Self::TimeToLive => {
                ErrorCategory::Permanent
            }
            Self::NotAuthorized => ErrorCategory::Security,
            Self::PermissionDenied => ErrorCategory::Security,
            Self::NotLoaded => ErrorCategory::Permanent,
            Self::KeyDerivation(_) => ErrorCategory::Permanent,
            Self::TokenMint(_) => ErrorCategory::Transient,
            Self::Vault(e) => e.error_category(),
        }
    }
}

/// Translate a raw [`VaultError`] into the Secret Context's own error
/// vocabulary, per the mapping implied by §4.3/§7.
///
/// `InvalidArgument` covers two distinct gates in §4.3 (an `expires` not far
/// enough in the future at `Create`, or a payload too large at
/// `AddVersion`) that only the call site can disambiguate, so it is left
/// generic here; `secret_context` maps it to `TimeToLive` or `FileSizeLimit`
/// at each call site instead of through this conversion.
impl VaultError {
    pub fn into_secret_error(self) -> SecretError {
        match self {
            VaultError::NotFound => SecretError::SecretNotFound,
            VaultError::AlreadyExists => SecretError::AlreadyExists,
            VaultError::PermissionDenied { .. } => SecretError::PermissionDenied,
            other => SecretError::Vault(other),
        }
    }
}

// ============================================================================
// Module declarations
// ============================================================================

/// Self-describing, memory-hard password hashing (derive/verify).
pub mod key_derivation;

/// URL-safe random token generation with vault-backed uniqueness probing.
pub mod token;

/// The backend-agnostic Vault Client contract (§4.3).
pub mod vault;

/// The per-token Secret Context state machine (§4.4).
pub mod secret_context;

/// Vault Client implementations: an in-memory test double and, behind the
/// `azure` feature, a cloud-backed production adapter.
pub mod adapters;

pub use key_derivation::{derive_password_hash, verify_password_hash, KeyDerivationError};
pub use secret_context::{SecretContext, SecretMetadata};
pub use token::{Token, TokenMintError};
pub use vault::{Suffix, VaultClient};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
