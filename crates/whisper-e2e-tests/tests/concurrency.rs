//! End-to-end coverage of the concurrent-fetch race described in §5:
//! "Two concurrent fetches of a nearly-exhausted secret may both succeed and
//! both observe `destroyed = true`".

mod common;

use common::{http_client, TestServer};
use serde_json::json;

#[tokio::test]
async fn two_concurrent_fetches_of_a_single_access_secret_can_both_succeed() {
    let server = TestServer::spawn().await;
    let client = http_client();

    let created: serde_json::Value = client
        .post(server.url("/v1/secrets"))
        .json(&json!({ "secret": "race me", "accesses": 1, "lifetime": "1h" }))
        .send()
        .await
        .expect("failed to send request")
        .json()
        .await
        .expect("failed to parse JSON");
    let token = created["token"].as_str().unwrap().to_string();

    let url = server.url(&format!("/v1/secrets/{token}"));
    let (first, second) = tokio::join!(client.get(&url).send(), client.get(&url).send());

    let first = first.expect("first fetch failed to send");
    let second = second.expect("second fetch failed to send");

    // Neither request observes an internal error; each either reads the
    // secret (possibly both, per §5's documented race) or finds it already
    // gone.
    for status in [first.status(), second.status()] {
        assert!(
            status == 200 || status == 404,
            "unexpected status {status}"
        );
    }

    // At least one of the two necessarily wins the read.
    assert!(first.status() == 200 || second.status() == 200);
}

#[tokio::test]
async fn a_multi_access_secret_serializes_sequential_fetches_correctly() {
    let server = TestServer::spawn().await;
    let client = http_client();

    let created: serde_json::Value = client
        .post(server.url("/v1/secrets"))
        .json(&json!({ "secret": "five reads", "accesses": 5, "lifetime": "1h" }))
        .send()
        .await
        .expect("failed to send request")
        .json()
        .await
        .expect("failed to parse JSON");
    let token = created["token"].as_str().unwrap().to_string();

    let url = server.url(&format!("/v1/secrets/{token}"));
    let mut destroyed_count = 0;
    for _ in 0..5 {
        let fetched: serde_json::Value = client
            .get(&url)
            .send()
            .await
            .expect("failed to send request")
            .json()
            .await
            .expect("failed to parse JSON");
        if fetched["destroyed"] == true {
            destroyed_count += 1;
        }
    }

    assert_eq!(
        destroyed_count, 1,
        "exactly the final sequential fetch should observe destroyed = true"
    );

    let response = client
        .get(&url)
        .send()
        .await
        .expect("failed to send request");
    assert_eq!(response.status(), 404);
}
