//! Production [`VaultClient`] backed by Azure Key Vault secrets.
//!
//! Grounded in the donor crate's `AzureKeyVaultProvider`
//! (`azure_key_vault.rs`): `DefaultAzureCredential` authentication, the same
//! `SecretClient`, and the same error-string substring mapping from the Azure
//! SDK's opaque `azure_core::Error` onto a fixed vocabulary (here
//! `VaultError` rather than `KeyVaultError`).
//!
//! Key Vault secrets are a name -> UTF-8 string mapping with automatic
//! versioning on every `set_secret` of the same name, which does not line up
//! exactly with the five-operation container model of [`VaultClient`]:
//! payloads are base64-encoded before upload, and a Key Vault secret name
//! only permits ASCII letters, digits and `-`, so a minted token (which may
//! contain `_`) is transliterated before use as a name. This is a narrower
//! guarantee than the in-memory double's exact key space and is treated as
//! an accepted production limitation.

use crate::vault::{Suffix, VaultClient, MAX_PAYLOAD_BYTES, MIN_LIFETIME};
use crate::{Timestamp, VaultError};
use async_trait::async_trait;
use azure_core::auth::TokenCredential;
use azure_identity::DefaultAzureCredential;
use azure_security_keyvault::SecretClient;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Configuration for the Azure-backed vault adapter.
#[derive(Debug, Clone)]
pub struct AzureVaultConfig {
    pub vault_url: String,
    pub request_timeout: Duration,
}

/// Azure Key Vault-backed [`VaultClient`], authenticated via
/// `DefaultAzureCredential` (managed identity in production, Azure CLI or
/// environment variables for local development).
pub struct AzureVault {
    client: SecretClient,
    config: AzureVaultConfig,
}

impl AzureVault {
    #[instrument(skip(config))]
    pub fn new(config: AzureVaultConfig) -> Result<Self, VaultError> {
        if config.vault_url.is_empty() {
            return Err(VaultError::InvalidArgument {
                message: "vault_url is required".to_string(),
            });
        }
        let credential = Arc::new(DefaultAzureCredential::default());
        Self::with_credential(config, credential)
    }

    pub fn with_credential(
        config: AzureVaultConfig,
        credential: Arc<dyn TokenCredential>,
    ) -> Result<Self, VaultError> {
        let client = SecretClient::new(&config.vault_url, credential).map_err(|e| {
            VaultError::Transport {
                message: format!("failed to create Key Vault client: {e}"),
            }
        })?;
        Ok(Self { client, config })
    }

    /// Key Vault secret names permit only ASCII letters, digits and `-`.
    fn name_for(token: &str, suffix: Suffix) -> String {
        let sanitized: String = token
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        format!("{sanitized}-{suffix}")
    }

    fn map_azure_error(&self, error: azure_core::Error) -> VaultError {
        let error_string = error.to_string();
        if error_string.contains("404") || error_string.contains("NotFound") {
            VaultError::NotFound
        } else if error_string.contains("403")
            || error_string.contains("Forbidden")
            || error_string.contains("Unauthorized")
        {
            VaultError::PermissionDenied {
                message: error_string,
            }
        } else if error_string.contains("timeout")
            || error_string.contains("Timeout")
            || error_string.contains("deadline")
        {
            VaultError::Timeout {
                timeout_seconds: self.config.request_timeout.as_secs(),
            }
        } else {
            VaultError::Transport {
                message: error_string,
            }
        }
    }
}

#[async_trait]
impl VaultClient for AzureVault {
    #[instrument(skip(self))]
    async fn check(&self, token: &str) -> Result<bool, VaultError> {
        let name = Self::name_for(token, Suffix::Metadata);
        match self.client.get(&name).await {
            Ok(secret) => {
                let not_expired = secret
                    .properties()
                    .expires_on()
                    .map(|exp| exp.unix_timestamp() > Timestamp::now().as_datetime().timestamp())
                    .unwrap_or(true);
                Ok(not_expired)
            }
            Err(e) => match self.map_azure_error(e) {
                VaultError::NotFound => Ok(false),
                other => Err(other),
            },
        }
    }

    #[instrument(skip(self, expires))]
    async fn create(
        &self,
        token: &str,
        suffix: Suffix,
        expires: Timestamp,
    ) -> Result<(), VaultError> {
        if expires <= Timestamp::now().add(MIN_LIFETIME) {
            return Err(VaultError::InvalidArgument {
                message: "expires must be at least the minimum lifetime in the future"
                    .to_string(),
            });
        }

        let name = Self::name_for(token, suffix);
        match self.client.get(&name).await {
            Ok(_) => return Err(VaultError::AlreadyExists),
            Err(e) => {
                let mapped = self.map_azure_error(e);
                if !matches!(mapped, VaultError::NotFound) {
                    // A transport/permission error while probing existence
                    // is surfaced rather than silently treated as absence.
                    return Err(mapped);
                }
                debug!(secret_name = %name, "existence probe found no prior secret, proceeding to create");
            }
        }

        self.client
            .set(&name, "")
            .await
            .map_err(|e| self.map_azure_error(e))?;
        Ok(())
    }

    #[instrument(skip(self, payload))]
    async fn add_version(
        &self,
        token: &str,
        suffix: Suffix,
        payload: Bytes,
    ) -> Result<(), VaultError> {
        if payload.len() > MAX_PAYLOAD_BYTES {
            return Err(VaultError::InvalidArgument {
                message: format!(
                    "payload of {} bytes exceeds the {} byte limit",
                    payload.len(),
                    MAX_PAYLOAD_BYTES
                ),
            });
        }

        let name = Self::name_for(token, suffix);
        self.client.get(&name).await.map_err(|e| self.map_azure_error(e))?;

        let encoded = STANDARD.encode(&payload);
        self.client
            .set(&name, encoded)
            .await
            .map_err(|e| self.map_azure_error(e))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn access_latest(&self, token: &str, suffix: Suffix) -> Result<Bytes, VaultError> {
        let name = Self::name_for(token, suffix);
        let secret = self
            .client
            .get(&name)
            .await
            .map_err(|e| self.map_azure_error(e))?;

        let value = secret.value().ok_or_else(|| VaultError::Transport {
            message: "secret has no value".to_string(),
        })?;
        let raw = STANDARD.decode(value).map_err(|e| {
            error!(secret_name = %name, error = %e, "stored secret value was not valid base64");
            VaultError::Transport {
                message: "stored secret value was not valid base64".to_string(),
            }
        })?;
        Ok(Bytes::from(raw))
    }

    #[instrument(skip(self))]
    async fn delete(&self, token: &str, suffix: Suffix) -> Result<(), VaultError> {
        let name = Self::name_for(token, suffix);
        self.client
            .begin_delete(&name)
            .await
            .map_err(|e| self.map_azure_error(e))?;
        Ok(())
    }
}
