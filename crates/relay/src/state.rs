//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::forward::RelayForwarder;
use crate::shopify::AdminClient;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Nothing in here is mutated after startup,
/// so handlers never need locks.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RelayConfig,
    admin: AdminClient,
    forwarder: RelayForwarder,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Both outbound clients share one connection pool.
    #[must_use]
    pub fn new(config: RelayConfig) -> Self {
        let http = reqwest::Client::new();
        let admin = AdminClient::new(http.clone(), config.shopify.admin_origin.clone());
        let forwarder = RelayForwarder::new(http, config.relay_url.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                admin,
                forwarder,
            }),
        }
    }

    /// Get a reference to the relay configuration.
    #[must_use]
    pub fn config(&self) -> &RelayConfig {
        &self.inner.config
    }

    /// Get a reference to the Shopify Admin API client.
    #[must_use]
    pub fn admin(&self) -> &AdminClient {
        &self.inner.admin
    }

    /// Get a reference to the downstream webhook forwarder.
    #[must_use]
    pub fn forwarder(&self) -> &RelayForwarder {
        &self.inner.forwarder
    }
}
