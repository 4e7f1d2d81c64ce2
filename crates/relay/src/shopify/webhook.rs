//! Shopify webhook signature verification and relay envelopes.
//!
//! Shopify signs every webhook with HMAC-SHA256 over the raw request body and
//! sends the base64 digest in `X-Shopify-Hmac-Sha256`. The digest must be
//! computed over the exact bytes received; re-serializing the parsed JSON
//! does not reproduce it.

use axum::http::HeaderMap;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use sha2::Sha256;

/// Base64 HMAC-SHA256 digest of the raw body.
pub const HEADER_HMAC: &str = "x-shopify-hmac-sha256";
/// Event topic, e.g. `orders/create`.
pub const HEADER_TOPIC: &str = "x-shopify-topic";
/// Unique delivery identifier.
pub const HEADER_WEBHOOK_ID: &str = "x-shopify-webhook-id";
/// Shop that triggered the event.
pub const HEADER_SHOP_DOMAIN: &str = "x-shopify-shop-domain";
/// When Shopify triggered the event.
pub const HEADER_TRIGGERED_AT: &str = "x-shopify-triggered-at";
/// `true` for test deliveries sent from the Shopify admin.
pub const HEADER_TEST: &str = "x-shopify-test";

type HmacSha256 = Hmac<Sha256>;

/// Verify a webhook digest against the raw request body.
///
/// Returns `false` when the body, digest or secret is missing, when the
/// digest is not valid base64, or when it does not match. The comparison is
/// constant-time (`Mac::verify_slice`).
#[must_use]
pub fn verify_webhook_hmac(
    raw_body: Option<&[u8]>,
    supplied_digest: Option<&str>,
    secret: Option<&SecretString>,
) -> bool {
    let (Some(body), Some(supplied), Some(secret)) = (raw_body, supplied_digest, secret) else {
        return false;
    };

    let Some(mut mac) = keyed_mac(secret.expose_secret()) else {
        return false;
    };
    let Ok(expected) = BASE64.decode(supplied.trim()) else {
        return false;
    };
    mac.update(body);

    mac.verify_slice(&expected).is_ok()
}

/// Compute the base64 HMAC-SHA256 digest Shopify would send for `body`.
///
/// Used to sign test deliveries. Returns `None` for an empty secret, which
/// [`verify_webhook_hmac`] never accepts.
#[must_use]
pub fn compute_webhook_hmac(body: &[u8], secret: &str) -> Option<String> {
    let mut mac = keyed_mac(secret)?;
    mac.update(body);
    Some(BASE64.encode(mac.finalize().into_bytes()))
}

fn keyed_mac(secret: &str) -> Option<HmacSha256> {
    if secret.is_empty() {
        return None;
    }
    HmacSha256::new_from_slice(secret.as_bytes()).ok()
}

/// Webhook metadata carried in Shopify's request headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookHeaders {
    pub hmac: Option<String>,
    pub topic: Option<String>,
    pub webhook_id: Option<String>,
    pub shop_domain: Option<String>,
    pub triggered_at: Option<String>,
    pub test: bool,
}

impl WebhookHeaders {
    /// Read the Shopify webhook headers. Lookup is case-insensitive.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        };

        Self {
            hmac: get(HEADER_HMAC),
            topic: get(HEADER_TOPIC),
            webhook_id: get(HEADER_WEBHOOK_ID),
            shop_domain: get(HEADER_SHOP_DOMAIN),
            triggered_at: get(HEADER_TRIGGERED_AT),
            test: get(HEADER_TEST).is_some_and(|v| v.eq_ignore_ascii_case("true")),
        }
    }
}

/// Payload forwarded to the downstream automation endpoint.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RelayEnvelope {
    pub source: &'static str,
    pub topic: Option<String>,
    pub webhook_id: Option<String>,
    pub shop_domain: Option<String>,
    pub triggered_at: Option<String>,
    pub test: bool,
    pub received_at: DateTime<Utc>,
    pub payload: Value,
}

impl RelayEnvelope {
    /// Build an envelope from verified headers and the raw body.
    ///
    /// A body that is not JSON is kept as a JSON string of its text.
    #[must_use]
    pub fn new(headers: WebhookHeaders, raw_body: &[u8]) -> Self {
        let payload = serde_json::from_slice(raw_body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(raw_body).into_owned()));

        Self {
            source: "shopify",
            topic: headers.topic,
            webhook_id: headers.webhook_id,
            shop_domain: headers.shop_domain,
            triggered_at: headers.triggered_at,
            test: headers.test,
            received_at: Utc::now(),
            payload,
        }
    }
}
