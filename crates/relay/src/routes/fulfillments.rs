//! Fulfillment creation.
//!
//! Shopify rejects a fulfillment whose `fulfillment_order_id` is a string, so
//! the first line item group's ID must be a JSON number here. Refunds are
//! more lenient (see `refunds`).

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

const LINE_ITEMS_FIELD: &str = "fulfillment.line_items_by_fulfillment_order";
const FULFILLMENT_ORDER_ID_FIELD: &str =
    "fulfillment.line_items_by_fulfillment_order[0].fulfillment_order_id";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/shopify/fulfillments", post(create_fulfillment))
        .route("/shopify/fulfillments/create", post(create_fulfillment))
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FulfillmentBody {
    #[serde(flatten)]
    options: CommandOptions,
    fulfillment: Option<Value>,
}

/// POST /shopify/fulfillments - Create a fulfillment via `/fulfillments.json`.
#[instrument(skip_all)]
async fn create_fulfillment(
    State(state): State<AppState>,
    query: Result<Query<CommandQuery>, QueryRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let query = commands::command_query(query)?;
    let body: FulfillmentBody = commands::parse_body(&body)?;
    let request = build_fulfillment_request(body.fulfillment.as_ref())?;
    let command = Command::new(query, &headers, body.options)?;

    commands::run(&state, &command, &request).await
}

/// Validate fulfillment input and build the Admin API request.
///
/// # Errors
///
/// `AppError::Validation` naming the first offending field.
pub fn build_fulfillment_request(fulfillment: Option<&Value>) -> Result<AdminRequest, AppError> {
    let fulfillment = commands::require_object("fulfillment", fulfillment)?;

    let first_group = match fulfillment.get("line_items_by_fulfillment_order") {
        None | Some(Value::Null) => {
            return Err(AppError::validation(LINE_ITEMS_FIELD, "is required"));
        }
        Some(Value::Array(groups)) => groups
            .first()
            .ok_or_else(|| AppError::validation(LINE_ITEMS_FIELD, "must not be empty"))?,
        Some(_) => {
            return Err(AppError::validation(LINE_ITEMS_FIELD, "must be an array"));
        }
    };

    match first_group.get("fulfillment_order_id") {
        None | Some(Value::Null) => {
            return Err(AppError::validation(
                FULFILLMENT_ORDER_ID_FIELD,
                "is required",
            ));
        }
        Some(value) => {
            ResourceId::from_strict_json(value)
                .map_err(|e| AppError::validation(FULFILLMENT_ORDER_ID_FIELD, e.to_string()))?;
        }
    }

    Ok(AdminRequest::post(
        "/fulfillments.json",
        json!({ "fulfillment": fulfillment }),
    ))
}
