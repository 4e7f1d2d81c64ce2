//! Unified error handling for the relay.
//!
//! Every error response is JSON: `{"ok": false, "error": <code>, "message": ...}`
//! plus code-specific fields.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

use crate::shopify::{CredentialError, UpstreamError};

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Webhook signature missing or invalid.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller sent a missing or malformed field.
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// The relay itself is misconfigured (e.g., no access token available).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Shopify Admin API call failed.
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),
}

impl AppError {
    /// Shorthand for a validation error on `field`.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream(e) => e
                .status()
                .filter(|s| (400..=599).contains(s))
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    fn body(&self) -> Value {
        match self {
            Self::Unauthorized(message) => json!({
                "ok": false,
                "error": "unauthorized",
                "message": message,
            }),
            Self::Validation { field, message } => json!({
                "ok": false,
                "error": "validation_failed",
                "field": field,
                "message": message,
            }),
            Self::Configuration(message) => json!({
                "ok": false,
                "error": "configuration_error",
                "message": message,
            }),
            Self::Upstream(UpstreamError::Rejected { status, body, url }) => json!({
                "ok": false,
                "error": "upstream_error",
                "message": self.to_string(),
                "status": status,
                "url": url,
                "details": body,
            }),
            Self::Upstream(UpstreamError::Transport { url, .. }) => json!({
                "ok": false,
                "error": "upstream_unreachable",
                "message": self.to_string(),
                "url": url,
            }),
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        if err.is_client_error() {
            Self::validation(err.field(), err.to_string())
        } else {
            Self::Configuration(err.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Relay request error"
            );
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Relay request rejected");
        }

        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::validation("orderId", "is required");
        assert_eq!(err.to_string(), "Invalid orderId: is required");

        let err = AppError::Unauthorized("invalid webhook signature".to_string());
        assert_eq!(err.to_string(), "Unauthorized: invalid webhook signature");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::validation("test", "test")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Configuration("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_status_is_preserved() {
        let err = AppError::Upstream(UpstreamError::Rejected {
            status: 422,
            body: json!({"errors": "bad"}),
            url: "https://x/admin/api/2026-01/fulfillments.json".to_string(),
        });
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = err.body();
        assert_eq!(body["error"], "upstream_error");
        assert_eq!(body["status"], 422);
        assert_eq!(body["details"], json!({"errors": "bad"}));
        assert_eq!(body["url"], "https://x/admin/api/2026-01/fulfillments.json");
    }

    #[test]
    fn test_non_error_upstream_status_defaults_to_500() {
        let err = AppError::Upstream(UpstreamError::Rejected {
            status: 302,
            body: Value::Null,
            url: "https://x".to_string(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_credential_errors_map_by_kind() {
        let err: AppError = CredentialError::MissingShopDomain.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "shopDomain"));

        let err: AppError = CredentialError::MissingAccessToken.into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
