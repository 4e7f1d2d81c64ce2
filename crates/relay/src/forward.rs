//! Best-effort forwarding of verified webhooks to the downstream automation
//! endpoint (`RELAY_WEBHOOK_URL`).
//!
//! One attempt per webhook. No retry, no dead-lettering, no persistence.
//! Failures are logged and never reach the webhook origin, which has already
//! been acknowledged.

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{Instrument, info_span};
use url::Url;

use crate::shopify::RelayEnvelope;

/// Errors from a single forward attempt.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("RELAY_WEBHOOK_URL is not configured")]
    NotConfigured,

    #[error("relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("relay endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Posts relay envelopes to the downstream endpoint.
#[derive(Debug, Clone)]
pub struct RelayForwarder {
    client: reqwest::Client,
    url: Option<Url>,
}

impl RelayForwarder {
    /// Create a forwarder. With `url` unset every forward fails with
    /// [`ForwardError::NotConfigured`].
    #[must_use]
    pub const fn new(client: reqwest::Client, url: Option<Url>) -> Self {
        Self { client, url }
    }

    /// Whether a downstream endpoint is configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    /// Send one envelope and wait for the outcome.
    ///
    /// # Errors
    ///
    /// Returns `ForwardError` if no endpoint is configured, the request fails,
    /// or the endpoint answers with a non-2xx status.
    pub async fn forward(&self, envelope: &RelayEnvelope) -> Result<(), ForwardError> {
        let url = self.url.as_ref().ok_or(ForwardError::NotConfigured)?;

        let response = self
            .client
            .post(url.clone())
            .json(envelope)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ForwardError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    /// Forward in a background task.
    ///
    /// Does not block the caller; the outcome is only logged. The handle is
    /// returned for tests and may be dropped.
    pub fn dispatch(&self, envelope: RelayEnvelope) -> JoinHandle<()> {
        let forwarder = self.clone();
        let span = info_span!(
            "relay_forward",
            topic = envelope.topic.as_deref().unwrap_or_default(),
            webhook_id = envelope.webhook_id.as_deref().unwrap_or_default(),
        );

        tokio::spawn(
            async move {
                match forwarder.forward(&envelope).await {
                    Ok(()) => tracing::info!("Webhook forwarded to relay"),
                    Err(ForwardError::NotConfigured) => {
                        tracing::warn!("Webhook not forwarded: RELAY_WEBHOOK_URL is not configured");
                    }
                    Err(e) => tracing::error!(error = %e, "Webhook forward failed"),
                }
            }
            .instrument(span),
        )
    }
}
