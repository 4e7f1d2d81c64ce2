//! Integration tests for the Shopify relay.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopify-relay-integration-tests
//! ```
//!
//! The router is driven in process with `tower::ServiceExt::oneshot`. The
//! Shopify Admin API and the downstream automation endpoint are `wiremock`
//! servers, wired in through `SHOPIFY_ADMIN_ORIGIN` and `RELAY_WEBHOOK_URL`.
//!
//! # Test Categories
//!
//! - `webhooks` - signature verification, acknowledgment, forwarding
//! - `refunds` - refund create/calculate, dry runs, credential precedence
//! - `fulfillments` - fulfillment validation and relay
//! - `health` - configuration flags

#![allow(clippy::missing_panics_doc)]
#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use shopify_relay::config::RelayConfig;
use shopify_relay::state::AppState;
use tower::ServiceExt;
use wiremock::MockServer;

/// Webhook signing secret used by every test configuration.
pub const WEBHOOK_SECRET: &str = "whsec_it_7Hq2Lx9Pz4Vn1Kd8";
/// Environment fallback access token used by test configurations.
pub const ENV_TOKEN: &str = "shpat_env_3Fh8Kd02Lm5Qx9Zr";
/// Default shop used by test configurations.
pub const ENV_SHOP: &str = "env-shop.myshopify.com";

/// Environment variables for a test relay.
#[derive(Debug, Default, Clone)]
pub struct TestEnv {
    vars: HashMap<String, String>,
}

impl TestEnv {
    /// A fully configured relay pointed at the given mock servers.
    #[must_use]
    pub fn full(admin: &MockServer, relay: &MockServer) -> Self {
        Self::default()
            .set("SHOPIFY_WEBHOOK_SECRET", WEBHOOK_SECRET)
            .set("SHOPIFY_ADMIN_ACCESS_TOKEN", ENV_TOKEN)
            .set("SHOPIFY_STORE", ENV_SHOP)
            .set("SHOPIFY_API_VERSION", "2026-01")
            .set("SHOPIFY_ADMIN_ORIGIN", &admin.uri())
            .set("RELAY_WEBHOOK_URL", &format!("{}/relay", relay.uri()))
    }

    /// Set a variable.
    #[must_use]
    pub fn set(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    /// Remove a variable.
    #[must_use]
    pub fn unset(mut self, key: &str) -> Self {
        self.vars.remove(key);
        self
    }

    /// Build the relay configuration.
    #[must_use]
    pub fn config(&self) -> RelayConfig {
        RelayConfig::from_lookup(|key| self.vars.get(key).cloned()).unwrap()
    }

    /// Build the relay router.
    #[must_use]
    pub fn app(&self) -> Router {
        shopify_relay::app(AppState::new(self.config()))
    }
}

/// Send a request through the router and decode the JSON response.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// A JSON `POST` request.
#[must_use]
pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// A Shopify webhook request signed with `secret`.
#[must_use]
pub fn signed_webhook(body: &[u8], secret: &str) -> Request<Body> {
    let digest = shopify_relay::shopify::compute_webhook_hmac(body, secret).unwrap();
    webhook_with_digest(body, &digest)
}

/// A Shopify webhook request with an explicit digest header.
#[must_use]
pub fn webhook_with_digest(body: &[u8], digest: &str) -> Request<Body> {
    Request::post("/shopify/webhooks")
        .header("content-type", "application/json")
        .header("X-Shopify-Hmac-Sha256", digest)
        .header("X-Shopify-Topic", "orders/create")
        .header("X-Shopify-Webhook-Id", "b54557e4-bdd9-4b37-8a5f-bf7d70bcd043")
        .header("X-Shopify-Shop-Domain", "demo.myshopify.com")
        .header("X-Shopify-Triggered-At", "2026-10-19T12:00:00.000Z")
        .header("X-Shopify-Test", "false")
        .body(Body::from(body.to_vec()))
        .unwrap()
}

/// Poll `server` until it has received at least `count` requests.
pub async fn wait_for_requests(server: &MockServer, count: usize) -> Vec<wiremock::Request> {
    for _ in 0..100 {
        let received = server.received_requests().await.unwrap_or_default();
        if received.len() >= count {
            return received;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    server.received_requests().await.unwrap_or_default()
}
