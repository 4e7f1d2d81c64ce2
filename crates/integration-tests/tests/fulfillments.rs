//! Integration tests for fulfillment creation.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::{Value, json};
use shopify_relay_integration_tests::{ENV_TOKEN, TestEnv, post_json, send};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FULFILLMENTS_PATH: &str = "/admin/api/2026-01/fulfillments.json";

fn fulfillment(fulfillment_order_id: &Value) -> Value {
    json!({
        "notify_customer": false,
        "tracking_info": { "number": "1Z001985YW99744790", "company": "UPS" },
        "line_items_by_fulfillment_order": [
            { "fulfillment_order_id": fulfillment_order_id }
        ]
    })
}

#[tokio::test]
async fn test_numeric_id_is_relayed() {
    let admin = MockServer::start().await;
    let relay = MockServer::start().await;
    let input = fulfillment(&json!(1_046_000_778));
    Mock::given(method("POST"))
        .and(path(FULFILLMENTS_PATH))
        .and(header("x-shopify-access-token", ENV_TOKEN))
        .and(body_json(json!({ "fulfillment": input })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "fulfillment": { "id": 1_069_019_862, "status": "success" } })),
        )
        .expect(2)
        .mount(&admin)
        .await;
    let env = TestEnv::full(&admin, &relay);

    for uri in ["/shopify/fulfillments", "/shopify/fulfillments/create"] {
        let (status, body) = send(env.app(), post_json(uri, &json!({ "fulfillment": input }))).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["ok"], true);
        assert_eq!(body["result"]["fulfillment"]["status"], "success");
    }
}

#[tokio::test]
async fn test_string_id_is_rejected_before_any_call() {
    let admin = MockServer::start().await;
    let relay = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&admin)
        .await;
    let app = TestEnv::full(&admin, &relay).app();

    let (status, body) = send(
        app,
        post_json(
            "/shopify/fulfillments",
            &json!({ "fulfillment": fulfillment(&json!("123")) }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "validation_failed");
    assert_eq!(
        body["field"],
        "fulfillment.line_items_by_fulfillment_order[0].fulfillment_order_id"
    );
    assert!(body["message"].as_str().unwrap().contains("received string"));
}

#[tokio::test]
async fn test_missing_fulfillment_is_rejected() {
    let app = TestEnv::default().app();

    let (status, body) = send(app, post_json("/shopify/fulfillments", &json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "fulfillment");
}

#[tokio::test]
async fn test_dry_run_previews_payload() {
    let admin = MockServer::start().await;
    let relay = MockServer::start().await;
    let app = TestEnv::full(&admin, &relay).app();
    let input = fulfillment(&json!(1_046_000_778));

    let (status, body) = send(
        app,
        post_json(
            "/shopify/fulfillments?dryRun=true",
            &json!({ "fulfillment": input }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dryRun"], true);
    assert_eq!(body["wouldCall"]["url"], format!("{}{FULFILLMENTS_PATH}", admin.uri()));
    assert_eq!(body["wouldCall"]["body"], json!({ "fulfillment": input }));
    assert_eq!(body["wouldCall"]["headers"]["X-Shopify-Access-Token"], "*****");
    assert!(admin.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_no_credentials_is_configuration_error() {
    let app = TestEnv::default()
        .set("SHOPIFY_STORE", "demo.myshopify.com")
        .app();

    let (status, body) = send(
        app,
        post_json(
            "/shopify/fulfillments",
            &json!({ "fulfillment": fulfillment(&json!(1)) }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "configuration_error");
}

#[tokio::test]
async fn test_unreachable_shopify_is_server_error() {
    let relay = MockServer::start().await;
    let admin = MockServer::start().await;
    let env = TestEnv::full(&admin, &relay).set("SHOPIFY_ADMIN_ORIGIN", "http://127.0.0.1:9");

    let (status, body) = send(
        env.app(),
        post_json(
            "/shopify/fulfillments",
            &json!({ "fulfillment": fulfillment(&json!(1)) }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "upstream_unreachable");
    assert_eq!(
        body["url"],
        "http://127.0.0.1:9/admin/api/2026-01/fulfillments.json"
    );
}

#[tokio::test]
async fn test_malformed_query_is_json_validation_error() {
    let app = TestEnv::default().app();

    let (status, body) = send(
        app,
        post_json(
            "/shopify/fulfillments/create?apiVersion=2026-01&apiVersion=2025-10",
            &json!({ "fulfillment": fulfillment(&json!(1)) }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_failed");
    assert_eq!(body["field"], "query");
}
