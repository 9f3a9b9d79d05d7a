use super::*;
use axum::body::to_bytes;

async fn status_of(err: ApiError) -> StatusCode {
    err.into_response().status()
}

#[tokio::test]
async fn secret_not_found_maps_to_404() {
    assert_eq!(
        status_of(ApiError::Secret(SecretError::SecretNotFound)).await,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn not_authorized_maps_to_401() {
    assert_eq!(
        status_of(ApiError::Secret(SecretError::NotAuthorized)).await,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn file_size_limit_maps_to_400() {
    assert_eq!(
        status_of(ApiError::Secret(SecretError::FileSizeLimit)).await,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn time_to_live_maps_to_400() {
    assert_eq!(
        status_of(ApiError::Secret(SecretError::TimeToLive)).await,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn already_exists_maps_to_500() {
    assert_eq!(
        status_of(ApiError::Secret(SecretError::AlreadyExists)).await,
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn permission_denied_maps_to_500() {
    assert_eq!(
        status_of(ApiError::Secret(SecretError::PermissionDenied)).await,
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn bad_request_carries_its_message() {
    let response = ApiError::BadRequest {
        message: "secret must not be empty".to_string(),
    }
    .into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "secret must not be empty");
}

#[tokio::test]
async fn unavailable_maps_to_503() {
    assert_eq!(status_of(ApiError::Unavailable).await, StatusCode::SERVICE_UNAVAILABLE);
}
