//! Shopify integration (HIGH PRIVILEGE).
//!
//! # Security
//!
//! Admin API access tokens flow through this module, either from the
//! environment or from the calling request. They are held as
//! `SecretString`, never logged, and masked in dry-run previews.
//!
//! # Modules
//!
//! - [`webhook`] - `X-Shopify-Hmac-Sha256` verification and relay envelopes
//! - [`credentials`] - Per-request shop/token/version resolution
//! - [`admin`] - Admin REST API relay client

pub mod admin;
pub mod credentials;
pub mod webhook;

pub use admin::{AdminClient, AdminRequest, WouldCall};
pub use credentials::{AdminCredentials, CredentialError, CredentialOverrides, CredentialSource};
pub use webhook::{RelayEnvelope, WebhookHeaders, compute_webhook_hmac, verify_webhook_hmac};

use serde_json::Value;
use thiserror::Error;

/// Errors from a Shopify Admin API call.
///
/// `Rejected` means Shopify answered with a non-2xx status; `Transport`
/// means the request never produced a response.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Shopify Admin API returned {status} for {url}")]
    Rejected {
        status: u16,
        /// Parsed JSON body, or `{"raw": text}` when it was not JSON.
        body: Value,
        url: String,
    },

    #[error("Shopify Admin API request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl UpstreamError {
    /// Upstream status code, if Shopify responded.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport { .. } => None,
        }
    }

    /// The URL that was attempted.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Rejected { url, .. } | Self::Transport { url, .. } => url,
        }
    }
}
