//! Refund commands.
//!
//! `orderId` (or `order_id`) may be a JSON number or a digit string. It only
//! ends up in the URL path, where Shopify does not care about the JSON type.
//! Contrast with fulfillments, where the ID sits inside the payload.

use axum::{
    Router,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    http::HeaderMap,
    response::Response,
    routing::post,
};
use serde::Deserialize;
use serde_json::{Value, json};
use shopify_relay_core::ResourceId;
use tracing::instrument;

use super::commands::{self, Command, CommandOptions, CommandQuery};
use crate::error::AppError;
use crate::shopify::AdminRequest;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/shopify/refund", post(create_refund))
        .route("/shopify/refund/calculate", post(calculate_refund))
}

/// Which refund endpoint to target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundAction {
    Create,
    Calculate,
}

impl RefundAction {
    /// Admin API path for `order_id`.
    #[must_use]
    pub fn path(self, order_id: ResourceId) -> String {
        match self {
            Self::Create => format!("/orders/{order_id}/refunds.json"),
            Self::Calculate => format!("/orders/{order_id}/refunds/calculate.json"),
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefundBody {
    #[serde(flatten)]
    options: CommandOptions,
    #[serde(alias = "order_id")]
    order_id: Option<Value>,
    refund: Option<Value>,
}

/// POST /shopify/refund
async fn create_refund(
    State(state): State<AppState>,
    query: Result<Query<CommandQuery>, QueryRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let query = commands::command_query(query)?;
    relay_refund(&state, RefundAction::Create, query, &headers, &body).await
}

/// POST /shopify/refund/calculate
async fn calculate_refund(
    State(state): State<AppState>,
    query: Result<Query<CommandQuery>, QueryRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let query = commands::command_query(query)?;
    relay_refund(&state, RefundAction::Calculate, query, &headers, &body).await
}

#[instrument(skip(state, query, headers, body))]
async fn relay_refund(
    state: &AppState,
    action: RefundAction,
    query: CommandQuery,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<Response, AppError> {
    let body: RefundBody = commands::parse_body(body)?;
    let request = build_refund_request(action, body.order_id.as_ref(), body.refund.as_ref())?;
    let command = Command::new(query, headers, body.options)?;

    commands::run(state, &command, &request).await
}

/// Validate refund input and build the Admin API request.
///
/// # Errors
///
/// `AppError::Validation` naming `orderId` or `refund`.
pub fn build_refund_request(
    action: RefundAction,
    order_id: Option<&Value>,
    refund: Option<&Value>,
) -> Result<AdminRequest, AppError> {
    let order_id = match order_id {
        None | Some(Value::Null) => return Err(AppError::validation("orderId", "is required")),
        Some(value) => ResourceId::from_lenient_json(value)
            .map_err(|e| AppError::validation("orderId", e.to_string()))?,
    };
    let refund = commands::require_object("refund", refund)?;

    Ok(AdminRequest::post(
        action.path(order_id),
        json!({ "refund": refund }),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let id = ResourceId::new(123);
        assert_eq!(RefundAction::Create.path(id), "/orders/123/refunds.json");
        assert_eq!(
            RefundAction::Calculate.path(id),
            "/orders/123/refunds/calculate.json"
        );
    }

    #[test]
    fn test_accepts_numeric_and_string_order_ids() {
        let refund = json!({"shipping": {"full_refund": true}});

        let request =
            build_refund_request(RefundAction::Create, Some(&json!(123)), Some(&refund)).unwrap();
        assert_eq!(request.path, "/orders/123/refunds.json");
        assert_eq!(request.body, Some(json!({"refund": refund})));

        let request =
            build_refund_request(RefundAction::Calculate, Some(&json!("123")), Some(&refund))
                .unwrap();
        assert_eq!(request.path, "/orders/123/refunds/calculate.json");
    }

    #[test]
    fn test_missing_order_id() {
        let err = build_refund_request(RefundAction::Create, None, Some(&json!({}))).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "orderId"));
    }

    #[test]
    fn test_malformed_order_id() {
        let err = build_refund_request(
            RefundAction::Create,
            Some(&json!("123/../../shop.json")),
            Some(&json!({})),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "orderId"));
    }

    #[test]
    fn test_refund_must_be_object() {
        let err = build_refund_request(RefundAction::Create, Some(&json!(1)), None).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "refund"));

        let err = build_refund_request(RefundAction::Create, Some(&json!(1)), Some(&json!([])))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "refund"));
    }

    #[test]
    fn test_body_accepts_snake_case_order_id() {
        let body: RefundBody =
            commands::parse_body(&Bytes::from_static(br#"{"order_id": 5, "refund": {}}"#))
                .unwrap();
        assert_eq!(body.order_id, Some(json!(5)));
    }
}
