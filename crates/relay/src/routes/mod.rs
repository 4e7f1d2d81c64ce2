//! HTTP route handlers for the relay.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Configuration flags and active API version
//!
//! # Webhooks (HMAC-verified)
//! POST /shopify/webhooks             - Verify, acknowledge, forward to RELAY_WEBHOOK_URL
//!
//! # Admin API commands (dry-run capable)
//! POST /shopify/refund               - Create a refund
//! POST /shopify/refund/calculate     - Calculate a refund
//! POST /shopify/fulfillments         - Create a fulfillment
//! POST /shopify/fulfillments/create  - Create a fulfillment (alias)
//! ```

use axum::Router;

use crate::state::AppState;

mod commands;
pub mod fulfillments;
pub mod health;
pub mod refunds;
pub mod webhooks;

/// Build the relay router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(webhooks::router())
        .merge(refunds::router())
        .merge(fulfillments::router())
}
