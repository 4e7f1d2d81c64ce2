//! Shopify webhook receiver.
//!
//! `received → verified → acknowledged → forwarded (best-effort)`.
//!
//! The origin is acknowledged before the downstream forward runs. Shopify
//! applies its own timeout and retry policy, so a slow or broken downstream
//! must not make a delivered webhook look failed.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
};
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use crate::error::AppError;
use crate::shopify::{RelayEnvelope, WebhookHeaders, verify_webhook_hmac};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/shopify/webhooks", post(receive_webhook))
}

/// POST /shopify/webhooks - Verify the HMAC over the raw body, acknowledge,
/// then forward in the background.
#[instrument(skip_all, fields(topic, webhook_id, shop))]
async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let metadata = WebhookHeaders::from_headers(&headers);

    let span = tracing::Span::current();
    span.record("topic", metadata.topic.as_deref().unwrap_or_default());
    span.record("webhook_id", metadata.webhook_id.as_deref().unwrap_or_default());
    span.record("shop", metadata.shop_domain.as_deref().unwrap_or_default());

    let secret = state.config().shopify.webhook_secret.as_ref();
    if secret.is_none() {
        warn!("SHOPIFY_WEBHOOK_SECRET is not configured; rejecting webhook");
    }

    if !verify_webhook_hmac(Some(&body[..]), metadata.hmac.as_deref(), secret) {
        return Err(AppError::Unauthorized(
            "invalid or missing webhook signature".to_string(),
        ));
    }

    info!("Webhook verified");

    // Spawned, not awaited: the response below does not depend on it.
    state
        .forwarder()
        .dispatch(RelayEnvelope::new(metadata, &body));

    Ok(Json(json!({ "ok": true })))
}
