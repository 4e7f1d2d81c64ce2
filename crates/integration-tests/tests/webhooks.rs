//! Integration tests for Shopify webhook ingestion.
//!
//! Each test runs the relay router in process against a `wiremock` server
//! standing in for the downstream automation endpoint.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::{Value, json};
use shopify_relay_integration_tests::{
    TestEnv, WEBHOOK_SECRET, send, signed_webhook, wait_for_requests, webhook_with_digest,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ORDER_BODY: &[u8] = br#"{"id":820982911946154508,"email":"jon@example.com","total_price":"199.65"}"#;

async fn relay_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/relay"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_valid_webhook_is_acknowledged_and_forwarded() {
    let admin = MockServer::start().await;
    let relay = relay_server().await;
    let app = TestEnv::full(&admin, &relay).app();

    let (status, body) = send(app, signed_webhook(ORDER_BODY, WEBHOOK_SECRET)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    let received = wait_for_requests(&relay, 1).await;
    assert_eq!(received.len(), 1);

    let envelope: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(envelope["source"], "shopify");
    assert_eq!(envelope["topic"], "orders/create");
    assert_eq!(envelope["webhookId"], "b54557e4-bdd9-4b37-8a5f-bf7d70bcd043");
    assert_eq!(envelope["shopDomain"], "demo.myshopify.com");
    assert_eq!(envelope["triggeredAt"], "2026-10-19T12:00:00.000Z");
    assert_eq!(envelope["payload"]["id"], json!(820_982_911_946_154_508_u64));
    assert!(envelope["receivedAt"].is_string());
}

#[tokio::test]
async fn test_tampered_body_is_rejected_and_not_forwarded() {
    let admin = MockServer::start().await;
    let relay = relay_server().await;
    let app = TestEnv::full(&admin, &relay).app();

    let digest = shopify_relay::shopify::compute_webhook_hmac(ORDER_BODY, WEBHOOK_SECRET).unwrap();
    let tampered = br#"{"id":820982911946154508,"email":"jon@example.com","total_price":"0.00"}"#;

    let (status, body) = send(app, webhook_with_digest(tampered, &digest)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "unauthorized");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(relay.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_signature_is_rejected() {
    let admin = MockServer::start().await;
    let relay = relay_server().await;
    let app = TestEnv::full(&admin, &relay).app();

    let request = axum::http::Request::post("/shopify/webhooks")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(ORDER_BODY))
        .unwrap();

    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signature_with_wrong_secret_is_rejected() {
    let admin = MockServer::start().await;
    let relay = relay_server().await;
    let app = TestEnv::full(&admin, &relay).app();

    let (status, _) = send(app, signed_webhook(ORDER_BODY, "some-other-secret")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unconfigured_secret_rejects_everything() {
    let admin = MockServer::start().await;
    let relay = relay_server().await;
    let app = TestEnv::full(&admin, &relay)
        .unset("SHOPIFY_WEBHOOK_SECRET")
        .app();

    let (status, _) = send(app, signed_webhook(ORDER_BODY, WEBHOOK_SECRET)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_lowercase_header_names_verify() {
    let admin = MockServer::start().await;
    let relay = relay_server().await;
    let app = TestEnv::full(&admin, &relay).app();

    let digest = shopify_relay::shopify::compute_webhook_hmac(ORDER_BODY, WEBHOOK_SECRET).unwrap();
    let request = axum::http::Request::post("/shopify/webhooks")
        .header("x-shopify-hmac-sha256", digest)
        .header("x-shopify-topic", "orders/paid")
        .body(axum::body::Body::from(ORDER_BODY))
        .unwrap();

    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);

    let received = wait_for_requests(&relay, 1).await;
    let envelope: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(envelope["topic"], "orders/paid");
}

#[tokio::test]
async fn test_slow_downstream_does_not_delay_acknowledgment() {
    let admin = MockServer::start().await;
    let relay = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/relay"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&relay)
        .await;
    let app = TestEnv::full(&admin, &relay).app();

    let (status, _) = tokio::time::timeout(
        Duration::from_secs(1),
        send(app, signed_webhook(ORDER_BODY, WEBHOOK_SECRET)),
    )
    .await
    .expect("acknowledgment waited on the downstream endpoint");
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_failing_downstream_still_acknowledges() {
    let admin = MockServer::start().await;
    let relay = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/relay"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&relay)
        .await;
    let app = TestEnv::full(&admin, &relay).app();

    let (status, body) = send(app, signed_webhook(ORDER_BODY, WEBHOOK_SECRET)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    wait_for_requests(&relay, 1).await;
}

#[tokio::test]
async fn test_unconfigured_relay_url_still_acknowledges() {
    let admin = MockServer::start().await;
    let relay = relay_server().await;
    let app = TestEnv::full(&admin, &relay)
        .unset("RELAY_WEBHOOK_URL")
        .app();

    let (status, _) = send(app, signed_webhook(ORDER_BODY, WEBHOOK_SECRET)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_non_json_body_is_forwarded_as_string() {
    let admin = MockServer::start().await;
    let relay = relay_server().await;
    let app = TestEnv::full(&admin, &relay).app();

    let raw = b"not json at all";
    let (status, _) = send(app, signed_webhook(raw, WEBHOOK_SECRET)).await;
    assert_eq!(status, StatusCode::OK);

    let received = wait_for_requests(&relay, 1).await;
    let envelope: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(envelope["payload"], "not json at all");
}
