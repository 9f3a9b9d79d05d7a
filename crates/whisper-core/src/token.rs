//! URL-safe random token generation with vault-backed uniqueness probing
//! (§4.2), grounded directly in the reference implementation's
//! `GenerateUniqueURL`: 32 cryptographically secure random bytes, encoded
//! without padding, retried up to 8 times against a uniqueness probe.

use crate::vault::VaultClient;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, TryRngCore};
use std::fmt;
use std::str::FromStr;

const TOKEN_BYTES: usize = 32;
const MAX_MINT_ATTEMPTS: u32 = 8;

/// Opaque 43-character URL-safe identifier minted by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Token(String);

impl Token {
    /// Mint a unique token: read 32 random bytes, encode as URL-safe base64
    /// without padding, and probe the vault for uniqueness. On collision,
    /// retry up to 8 times total before failing.
    pub async fn mint(vault: &dyn VaultClient) -> Result<Self, TokenMintError> {
        for _attempt in 0..MAX_MINT_ATTEMPTS {
            let mut buf = [0u8; TOKEN_BYTES];
            OsRng
                .try_fill_bytes(&mut buf)
                .map_err(|e| TokenMintError::Prng(e.to_string()))?;
            let candidate = Self(URL_SAFE_NO_PAD.encode(buf));

            let exists = vault
                .check(candidate.as_str())
                .await
                .map_err(TokenMintError::Vault)?;
            if !exists {
                return Ok(candidate);
            }
        }
        Err(TokenMintError::Exhausted {
            attempts: MAX_MINT_ATTEMPTS,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Token {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenMintError {
    #[error("secure random number generator unavailable: {0}")]
    Prng(String),

    #[error("could not generate a unique token after {attempts} attempts")]
    Exhausted { attempts: u32 },

    #[error(transparent)]
    Vault(#[from] crate::VaultError),
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;
