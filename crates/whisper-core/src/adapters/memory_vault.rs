//! An in-memory [`VaultClient`] test double.
//!
//! Grounded in two sources: the reference implementation's own mock backend
//! (`pkg/vault/mock.go`) for the exact error conditions and the lazy
//! expiration-on-access behavior, and the donor crate's
//! `InMemoryKeyVaultProvider` (`memory_key_vault.rs`) for the
//! `Arc<RwLock<HashMap<..>>>` shape of a thread-safe, dependency-free
//! in-process store.
//!
//! Not a production backend: data does not survive a restart and nothing is
//! ever encrypted at rest. Suitable for unit tests, integration tests, and
//! local development.

use crate::vault::{Suffix, VaultClient, MAX_PAYLOAD_BYTES, MIN_LIFETIME};
use crate::{Timestamp, VaultError};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::RwLock;

struct Container {
    expires: Timestamp,
    versions: Vec<Bytes>,
}

impl Container {
    fn expired(&self) -> bool {
        self.expires <= Timestamp::now()
    }
}

fn key(token: &str, suffix: Suffix) -> String {
    format!("{token}-{suffix}")
}

/// Thread-safe in-memory implementation of the Vault Client contract.
pub struct InMemoryVault {
    containers: RwLock<HashMap<String, Container>>,
}

impl InMemoryVault {
    pub fn new() -> Self {
        Self {
            containers: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryVault {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VaultClient for InMemoryVault {
    async fn check(&self, token: &str) -> Result<bool, VaultError> {
        let containers = self.containers.read().unwrap();
        let exists = containers
            .get(&key(token, Suffix::Metadata))
            .map(|c| !c.expired())
            .unwrap_or(false);
        Ok(exists)
    }

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

        let mut containers = self.containers.write().unwrap();
        let k = key(token, suffix);
        if containers.contains_key(&k) {
            return Err(VaultError::AlreadyExists);
        }
        containers.insert(
            k,
            Container {
                expires,
                versions: Vec::new(),
            },
        );
        Ok(())
    }

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

        let mut containers = self.containers.write().unwrap();
        let k = key(token, suffix);
        let expired = match containers.get(&k) {
            None => return Err(VaultError::NotFound),
            Some(c) => c.expired(),
        };
        if expired {
            containers.remove(&k);
            return Err(VaultError::NotFound);
        }
        containers.get_mut(&k).unwrap().versions.push(payload);
        Ok(())
    }

    async fn access_latest(&self, token: &str, suffix: Suffix) -> Result<Bytes, VaultError> {
        let mut containers = self.containers.write().unwrap();
        let k = key(token, suffix);
        let expired = match containers.get(&k) {
            None => return Err(VaultError::NotFound),
            Some(c) => c.expired(),
        };
        if expired {
            containers.remove(&k);
            return Err(VaultError::NotFound);
        }
        containers
            .get(&k)
            .and_then(|c| c.versions.last().cloned())
            .ok_or(VaultError::NotFound)
    }

    async fn delete(&self, token: &str, suffix: Suffix) -> Result<(), VaultError> {
        let mut containers = self.containers.write().unwrap();
        let k = key(token, suffix);
        match containers.remove(&k) {
            None => Err(VaultError::NotFound),
            Some(c) if c.expired() => Err(VaultError::NotFound),
            Some(_) => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "memory_vault_tests.rs"]
mod tests;
