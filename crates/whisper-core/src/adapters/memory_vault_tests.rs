use super::*;
use std::time::Duration;

fn far_future() -> Timestamp {
    Timestamp::now().add(Duration::from_secs(3600))
}

#[tokio::test]
async fn a_fresh_token_is_not_found_by_check() {
    let vault = InMemoryVault::new();
    assert!(!vault.check("tok").await.unwrap());
}

#[tokio::test]
async fn create_then_check_reports_true() {
    let vault = InMemoryVault::new();
    vault
        .create("tok", Suffix::Metadata, far_future())
        .await
        .unwrap();
    assert!(vault.check("tok").await.unwrap());
}

#[tokio::test]
async fn create_rejects_an_expiration_inside_the_minimum_lifetime() {
    let vault = InMemoryVault::new();
    let soon = Timestamp::now().add(Duration::from_secs(5));
    let err = vault.create("tok", Suffix::Secret, soon).await.unwrap_err();
    assert!(matches!(err, VaultError::InvalidArgument { .. }));
}

#[tokio::test]
async fn create_twice_at_the_same_key_is_already_exists() {
    let vault = InMemoryVault::new();
    vault
        .create("tok", Suffix::Secret, far_future())
        .await
        .unwrap();
    let err = vault
        .create("tok", Suffix::Secret, far_future())
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::AlreadyExists));
}

#[tokio::test]
async fn secret_and_metadata_containers_are_independent() {
    let vault = InMemoryVault::new();
    vault
        .create("tok", Suffix::Secret, far_future())
        .await
        .unwrap();
    // Same token, the other suffix, must not collide.
    vault
        .create("tok", Suffix::Metadata, far_future())
        .await
        .unwrap();
}

#[tokio::test]
async fn add_version_against_a_missing_container_is_not_found() {
    let vault = InMemoryVault::new();
    let err = vault
        .add_version("tok", Suffix::Secret, Bytes::from_static(b"hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::NotFound));
}

#[tokio::test]
async fn add_version_over_the_payload_ceiling_is_invalid_argument() {
    let vault = InMemoryVault::new();
    vault
        .create("tok", Suffix::Secret, far_future())
        .await
        .unwrap();
    let oversized = Bytes::from(vec![0u8; MAX_PAYLOAD_BYTES + 1]);
    let err = vault
        .add_version("tok", Suffix::Secret, oversized)
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::InvalidArgument { .. }));
}

#[tokio::test]
async fn add_version_at_exactly_the_ceiling_succeeds() {
    let vault = InMemoryVault::new();
    vault
        .create("tok", Suffix::Secret, far_future())
        .await
        .unwrap();
    let exact = Bytes::from(vec![0u8; MAX_PAYLOAD_BYTES]);
    vault.add_version("tok", Suffix::Secret, exact).await.unwrap();
}

#[tokio::test]
async fn access_latest_returns_the_most_recent_version() {
    let vault = InMemoryVault::new();
    vault
        .create("tok", Suffix::Secret, far_future())
        .await
        .unwrap();
    vault
        .add_version("tok", Suffix::Secret, Bytes::from_static(b"first"))
        .await
        .unwrap();
    vault
        .add_version("tok", Suffix::Secret, Bytes::from_static(b"second"))
        .await
        .unwrap();
    let payload = vault.access_latest("tok", Suffix::Secret).await.unwrap();
    assert_eq!(payload, Bytes::from_static(b"second"));
}

#[tokio::test]
async fn access_latest_with_no_versions_yet_is_not_found() {
    let vault = InMemoryVault::new();
    vault
        .create("tok", Suffix::Secret, far_future())
        .await
        .unwrap();
    let err = vault.access_latest("tok", Suffix::Secret).await.unwrap_err();
    assert!(matches!(err, VaultError::NotFound));
}

#[tokio::test]
async fn an_expired_container_reads_as_not_found_and_is_collected() {
    let vault = InMemoryVault::new();
    let almost_now = Timestamp::now().add(Duration::from_secs(61));
    vault
        .create("tok", Suffix::Secret, almost_now)
        .await
        .unwrap();
    vault
        .add_version("tok", Suffix::Secret, Bytes::from_static(b"x"))
        .await
        .unwrap();

    // Simulate elapsed time by re-inserting an already-expired container.
    {
        let mut containers = vault.containers.write().unwrap();
        containers.get_mut("tok-secret").unwrap().expires = Timestamp::now();
    }

    let err = vault.access_latest("tok", Suffix::Secret).await.unwrap_err();
    assert!(matches!(err, VaultError::NotFound));

    // Lazily collected: a second read also reports not found, not a panic.
    let err = vault.access_latest("tok", Suffix::Secret).await.unwrap_err();
    assert!(matches!(err, VaultError::NotFound));
}

#[tokio::test]
async fn delete_removes_the_container() {
    let vault = InMemoryVault::new();
    vault
        .create("tok", Suffix::Secret, far_future())
        .await
        .unwrap();
    vault.delete("tok", Suffix::Secret).await.unwrap();
    let err = vault
        .add_version("tok", Suffix::Secret, Bytes::from_static(b"x"))
        .await
        .unwrap_err();
    assert!(matches!(err, VaultError::NotFound));
}

#[tokio::test]
async fn delete_of_a_missing_container_is_not_found() {
    let vault = InMemoryVault::new();
    let err = vault.delete("tok", Suffix::Secret).await.unwrap_err();
    assert!(matches!(err, VaultError::NotFound));
}

#[tokio::test]
async fn delete_of_an_already_expired_container_is_not_found() {
    let vault = InMemoryVault::new();
    vault
        .create("tok", Suffix::Secret, far_future())
        .await
        .unwrap();
    {
        let mut containers = vault.containers.write().unwrap();
        containers.get_mut("tok-secret").unwrap().expires = Timestamp::now();
    }
    let err = vault.delete("tok", Suffix::Secret).await.unwrap_err();
    assert!(matches!(err, VaultError::NotFound));
}
