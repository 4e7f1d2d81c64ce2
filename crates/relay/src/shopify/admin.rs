//! Shopify Admin REST API relay client.
//!
//! Issues a single request per command with the resolved credentials and
//! normalizes the response. No retries, no rate limiting, no explicit
//! timeout beyond the transport's own.

use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::instrument;
use url::Url;

use super::UpstreamError;
use super::credentials::{ACCESS_TOKEN_HEADER, AdminCredentials};

/// Replacement for the access token in dry-run previews.
pub const MASKED_TOKEN: &str = "*****";

const JSON_CONTENT_TYPE: &str = "application/json";

/// A single Admin API call produced by a command handler.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminRequest {
    pub method: Method,
    /// Path relative to `/admin/api/{version}`, starting with `/`.
    pub path: String,
    pub body: Option<Value>,
}

impl AdminRequest {
    /// A `POST` with a JSON body.
    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// Description of the request that would be sent, with the token masked.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WouldCall {
    pub method: String,
    pub url: String,
    pub headers: PreviewHeaders,
    pub body: Option<Value>,
}

/// Headers shown in a dry-run preview.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PreviewHeaders {
    #[serde(rename = "X-Shopify-Access-Token")]
    pub access_token: &'static str,
    #[serde(rename = "Content-Type")]
    pub content_type: &'static str,
    #[serde(rename = "Accept")]
    pub accept: &'static str,
}

/// Shopify Admin REST API client.
///
/// Cheap to clone; the underlying `reqwest::Client` pools connections.
#[derive(Debug, Clone)]
pub struct AdminClient {
    client: reqwest::Client,
    origin: Option<Url>,
}

impl AdminClient {
    /// Create a new client.
    ///
    /// `origin` replaces `https://{shop}` when set.
    #[must_use]
    pub const fn new(client: reqwest::Client, origin: Option<Url>) -> Self {
        Self { client, origin }
    }

    /// Full URL for `path` under the credentials' shop and API version.
    #[must_use]
    pub fn endpoint(&self, credentials: &AdminCredentials, path: &str) -> String {
        let origin = self.origin.as_ref().map_or_else(
            || format!("https://{}", credentials.shop_domain),
            |url| url.as_str().trim_end_matches('/').to_string(),
        );
        format!("{origin}/admin/api/{}{path}", credentials.api_version)
    }

    /// Describe `request` without sending it.
    #[must_use]
    pub fn preview(&self, credentials: &AdminCredentials, request: &AdminRequest) -> WouldCall {
        WouldCall {
            method: request.method.as_str().to_string(),
            url: self.endpoint(credentials, &request.path),
            headers: PreviewHeaders {
                access_token: MASKED_TOKEN,
                content_type: JSON_CONTENT_TYPE,
                accept: JSON_CONTENT_TYPE,
            },
            body: request.body.clone(),
        }
    }

    /// Send `request` and return the parsed response payload.
    ///
    /// # Errors
    ///
    /// `UpstreamError::Rejected` for any non-2xx status (with the parsed or
    /// raw body and the URL), `UpstreamError::Transport` if the request never
    /// completed.
    #[instrument(
        skip(self, credentials, request),
        fields(shop = %credentials.shop_domain, method = %request.method, path = %request.path)
    )]
    pub async fn send(
        &self,
        credentials: &AdminCredentials,
        request: &AdminRequest,
    ) -> Result<Value, UpstreamError> {
        let url = self.endpoint(credentials, &request.path);

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .header(ACCESS_TOKEN_HEADER, credentials.access_token.expose_secret())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(ACCEPT, JSON_CONTENT_TYPE);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|source| UpstreamError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| UpstreamError::Transport {
                url: url.clone(),
                source,
            })?;
        let payload = parse_payload(&text);

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), %url, "Shopify Admin API rejected request");
            return Err(UpstreamError::Rejected {
                status: status.as_u16(),
                body: payload,
                url,
            });
        }

        tracing::info!(status = status.as_u16(), "Shopify Admin API request succeeded");
        Ok(payload)
    }
}

/// Parse a response body as JSON, keeping non-JSON text as `{"raw": text}`.
///
/// An empty body becomes `null`.
#[must_use]
pub fn parse_payload(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "raw": text }))
}
