//! Shared plumbing for Admin API command endpoints.
//!
//! Every command runs the same pipeline after its own input validation:
//! credential resolution, then either a dry-run preview or the live call.

use axum::{
    Json,
    body::Bytes,
    extract::{Query, rejection::QueryRejection},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use shopify_relay_core::JsonKind;
use tracing::info;

use crate::error::AppError;
use crate::shopify::admin::WouldCall;
use crate::shopify::credentials::{self, ACCESS_TOKEN_HEADER, CredentialOverrides};
use crate::shopify::AdminRequest;
use crate::state::AppState;

/// Field name reported when the access token header is unreadable.
const ACCESS_TOKEN_FIELD: &str = "X-Shopify-Access-Token";

/// Query parameters shared by all command endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandQuery {
    pub shop_domain: Option<String>,
    pub api_version: Option<String>,
    pub dry_run: Option<String>,
}

/// Body fields shared by all command endpoints.
///
/// No `Debug`: it holds the caller's access token in plain text until
/// [`Command::new`] moves it into a `SecretString`.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOptions {
    pub shop_domain: Option<String>,
    pub shopify_access_token: Option<String>,
    pub api_version: Option<String>,
    pub dry_run: Option<Value>,
}

/// Credential overrides and dry-run flag for one command.
#[derive(Debug)]
pub struct Command {
    pub overrides: CredentialOverrides,
    pub dry_run: bool,
}

impl Command {
    /// Collect per-request overrides from the header, query and body.
    ///
    /// # Errors
    ///
    /// `AppError::Validation` if the access token header is present but not
    /// visible ASCII. Such a header is never skipped in favor of a
    /// lower-precedence token.
    pub fn new(
        query: CommandQuery,
        headers: &HeaderMap,
        options: CommandOptions,
    ) -> Result<Self, AppError> {
        let header_token = headers
            .get(ACCESS_TOKEN_HEADER)
            .map(|v| v.to_str().map(String::from))
            .transpose()
            .map_err(|_| {
                AppError::validation(
                    ACCESS_TOKEN_FIELD,
                    "must contain only visible ASCII characters",
                )
            })?;

        let dry_run = is_dry_run(query.dry_run.as_deref(), options.dry_run.as_ref());

        Ok(Self {
            overrides: CredentialOverrides {
                header_token: non_blank(header_token).map(SecretString::from),
                body_token: non_blank(options.shopify_access_token).map(SecretString::from),
                body_shop: non_blank(options.shop_domain),
                query_shop: non_blank(query.shop_domain),
                body_api_version: non_blank(options.api_version),
                query_api_version: non_blank(query.api_version),
            },
            dry_run,
        })
    }
}

/// Unwrap the command query, turning axum's plain-text rejection into a
/// JSON validation error.
///
/// # Errors
///
/// `AppError::Validation` on field `query` for a malformed or duplicated
/// query string.
pub fn command_query(
    query: Result<Query<CommandQuery>, QueryRejection>,
) -> Result<CommandQuery, AppError> {
    query
        .map(|Query(query)| query)
        .map_err(|rejection| AppError::validation("query", rejection.body_text()))
}

/// Dry-run response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunResponse {
    pub ok: bool,
    pub dry_run: bool,
    pub would_call: WouldCall,
}

/// Live response body.
#[derive(Debug, Serialize)]
pub struct RelayResponse {
    pub ok: bool,
    pub result: Value,
}

/// `true` if the query says `dryRun=true` (any case) or the body carries
/// `dryRun: true` / `"true"`.
pub fn is_dry_run(query: Option<&str>, body: Option<&Value>) -> bool {
    let query_flag = query.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));
    let body_flag = match body {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    };
    query_flag || body_flag
}

/// Parse a command body that must be a JSON object.
///
/// # Errors
///
/// `AppError::Validation` on field `body` if the bytes are not JSON, not an
/// object, or do not match `T`.
pub fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::validation("body", format!("must be valid JSON: {e}")))?;

    if !value.is_object() {
        return Err(AppError::validation(
            "body",
            format!("must be a JSON object (received {})", JsonKind::of(&value)),
        ));
    }

    serde_json::from_value(value).map_err(|e| AppError::validation("body", e.to_string()))
}

/// Require `value` to be present and a JSON object.
pub fn require_object<'a>(
    field: &str,
    value: Option<&'a Value>,
) -> Result<&'a serde_json::Map<String, Value>, AppError> {
    match value {
        None | Some(Value::Null) => Err(AppError::validation(field, "is required")),
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(AppError::validation(
            field,
            format!("must be an object (received {})", JsonKind::of(other)),
        )),
    }
}

/// Resolve credentials, then preview or send `request`.
///
/// # Errors
///
/// Credential errors (400 or 500) and upstream errors (upstream status).
pub async fn run(
    state: &AppState,
    command: &Command,
    request: &AdminRequest,
) -> Result<Response, AppError> {
    let credentials = credentials::resolve(&command.overrides, &state.config().shopify)?;

    if command.dry_run {
        let would_call = state.admin().preview(&credentials, request);
        info!(url = %would_call.url, "Dry run, not calling Shopify");
        return Ok(Json(DryRunResponse {
            ok: true,
            dry_run: true,
            would_call,
        })
        .into_response());
    }

    let result = state.admin().send(&credentials, request).await?;

    Ok(Json(RelayResponse { ok: true, result }).into_response())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
