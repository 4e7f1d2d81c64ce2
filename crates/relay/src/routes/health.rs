//! Health check.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::state::AppState;

/// Health response. Reports which settings are present, never their values.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub ok: bool,
    pub webhook_secret_configured: bool,
    pub relay_url_configured: bool,
    pub admin_token_configured: bool,
    pub default_shop_configured: bool,
    pub api_version: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// GET /health - Liveness plus configuration flags. No side effects.
async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    let config = state.config();

    Json(HealthStatus {
        ok: true,
        webhook_secret_configured: config.shopify.webhook_secret.is_some(),
        relay_url_configured: config.relay_url.is_some(),
        admin_token_configured: config.shopify.access_token.is_some(),
        default_shop_configured: config.shopify.default_shop.is_some(),
        api_version: config.shopify.api_version.to_string(),
    })
}
