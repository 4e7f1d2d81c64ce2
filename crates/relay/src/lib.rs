//! Shopify Relay library.
//!
//! Receives Shopify webhooks, verifies their HMAC signatures and forwards
//! them to a downstream automation endpoint. Also relays refund and
//! fulfillment commands to the Shopify Admin REST API with per-request or
//! environment-sourced credentials.
//!
//! The crate is a library so the router can be exercised in process by the
//! integration tests.
//!
//! # Security
//!
//! This crate handles HIGH PRIVILEGE Admin API access tokens. They are never
//! logged and are masked in dry-run previews.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod forward;
pub mod routes;
pub mod shopify;
pub mod state;

use axum::Router;

use state::AppState;

/// Build the application router with state attached.
///
/// Tracing and Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    routes::routes().with_state(state)
}
