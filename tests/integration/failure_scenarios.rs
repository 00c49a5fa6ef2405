//! Failure tests for the API client
//!
//! These tests verify that backend failures surface as typed errors:
//! - Rejected sessions
//! - Error statuses with and without a JSON body
//! - Malformed payloads
//! - Unreachable or slow backends

use std::time::Duration;

use assert_matches::assert_matches;
use instance_deck::{ApiClient, ApiError, Config};
use reqwest::StatusCode;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

#[tokio::test]
async fn test_expired_session_is_unauthorized() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/instances"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(serde_json::json!({ "error": "expired" })),
        )
        .mount(&mock_server)
        .await;

    let result = authed_client(&mock_server).list_instances().await;

    let err = result.unwrap_err();
    assert_matches!(err, ApiError::Unauthorized);
    assert_eq!(err.to_string(), "session expired, log in again");
}

#[tokio::test]
async fn test_backend_message_is_kept() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/instances/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({ "detail": "instance not found" })),
        )
        .mount(&mock_server)
        .await;

    let err = authed_client(&mock_server)
        .get_instance("missing")
        .await
        .unwrap_err();

    assert_matches!(
        &err,
        ApiError::Status { status, message }
            if *status == StatusCode::NOT_FOUND && message == "instance not found"
    );
}

#[tokio::test]
async fn test_plain_text_error_falls_back_to_reason() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/instances/i-1/backups"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&mock_server)
        .await;

    let err = authed_client(&mock_server)
        .create_backup("i-1")
        .await
        .unwrap_err();

    assert_matches!(
        &err,
        ApiError::Status { status, message }
            if *status == StatusCode::SERVICE_UNAVAILABLE && message == "Service Unavailable"
    );
}

#[tokio::test]
async fn test_wrong_shape_is_decode_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/instances/i-1/metrics"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "cpu_percent": "high" })),
        )
        .mount(&mock_server)
        .await;

    let result = authed_client(&mock_server).live_metrics("i-1").await;

    assert_matches!(result, Err(ApiError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    // Nothing listens on this port
    let client = ApiClient::with_base_url("http://127.0.0.1:9")
        .unwrap()
        .with_token(Some(TOKEN.to_string()));

    let result = client.list_tickets().await;

    assert_matches!(result, Err(ApiError::Transport(_)));
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/help-tickets"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let config = Config {
        api_url: mock_server.uri(),
        request_timeout_secs: 1,
        ..Config::default()
    };
    let client = ApiClient::new(&config)
        .unwrap()
        .with_token(Some(TOKEN.to_string()));

    let result = client.list_tickets().await;

    assert_matches!(result, Err(ApiError::Transport(_)));
}
