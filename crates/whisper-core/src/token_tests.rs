use super::*;
use crate::vault::Suffix;
use crate::{Timestamp, VaultError};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicU32, Ordering};

struct AlwaysUnique;

#[async_trait]
impl VaultClient for AlwaysUnique {
    async fn check(&self, _token: &str) -> Result<bool, VaultError> {
        Ok(false)
    }
    async fn create(&self, _token: &str, _suffix: Suffix, _expires: Timestamp) -> Result<(), VaultError> {
        unimplemented!()
    }
    async fn add_version(&self, _token: &str, _suffix: Suffix, _payload: Bytes) -> Result<(), VaultError> {
        unimplemented!()
    }
    async fn access_latest(&self, _token: &str, _suffix: Suffix) -> Result<Bytes, VaultError> {
        unimplemented!()
    }
    async fn delete(&self, _token: &str, _suffix: Suffix) -> Result<(), VaultError> {
        unimplemented!()
    }
}

struct AlwaysCollides {
    checks: AtomicU32,
}

#[async_trait]
impl VaultClient for AlwaysCollides {
    async fn check(&self, _token: &str) -> Result<bool, VaultError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }
    async fn create(&self, _token: &str, _suffix: Suffix, _expires: Timestamp) -> Result<(), VaultError> {
        unimplemented!()
    }
    async fn add_version(&self, _token: &str, _suffix: Suffix, _payload: Bytes) -> Result<(), VaultError> {
        unimplemented!()
    }
    async fn access_latest(&self, _token: &str, _suffix: Suffix) -> Result<Bytes, VaultError> {
        unimplemented!()
    }
    async fn delete(&self, _token: &str, _suffix: Suffix) -> Result<(), VaultError> {
        unimplemented!()
    }
}

#[tokio::test]
async fn minted_tokens_are_43_url_safe_characters() {
    let vault = AlwaysUnique;
    let token = Token::mint(&vault).await.unwrap();
    assert_eq!(token.as_str().len(), 43);
    assert!(token
        .as_str()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
}

#[tokio::test]
async fn forty_eight_consecutive_mints_against_an_empty_vault_are_unique() {
    let vault = AlwaysUnique;
    let mut seen = std::collections::HashSet::new();
    for _ in 0..48 {
        let token = Token::mint(&vault).await.unwrap();
        assert!(seen.insert(token.as_str().to_string()));
    }
}

#[tokio::test]
async fn persistent_collision_fails_after_eight_attempts() {
    let vault = AlwaysCollides {
        checks: AtomicU32::new(0),
    };
    let err = Token::mint(&vault).await.unwrap_err();
    assert!(matches!(err, TokenMintError::Exhausted { attempts: 8 }));
    assert_eq!(vault.checks.load(Ordering::SeqCst), 8);
}
