//! Per-request Admin API credential resolution.
//!
//! Each credential is taken from the first source that supplies it:
//!
//! | Credential   | Precedence                                           |
//! |--------------|------------------------------------------------------|
//! | shop domain  | body `shopDomain` → query `shopDomain` → `SHOPIFY_STORE` |
//! | access token | `X-Shopify-Access-Token` header → body `shopifyAccessToken` → `SHOPIFY_ADMIN_ACCESS_TOKEN` |
//! | API version  | body `apiVersion` → query `apiVersion` → `SHOPIFY_API_VERSION` |
//!
//! Nothing is cached between requests. The access token is never logged;
//! only the source it came from is.

use std::fmt;

use secrecy::SecretString;
use shopify_relay_core::{ApiVersion, ApiVersionError, ShopDomain, ShopDomainError};
use thiserror::Error;

use crate::config::ShopifyConfig;

/// Header carrying a per-request Admin API access token.
pub const ACCESS_TOKEN_HEADER: &str = "x-shopify-access-token";

/// Where a resolved credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Header,
    Body,
    Query,
    Environment,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Header => "header",
            Self::Body => "body",
            Self::Query => "query",
            Self::Environment => "environment",
        })
    }
}

/// Why a credential could not be resolved.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("shopDomain is required (no request value and SHOPIFY_STORE is not set)")]
    MissingShopDomain,

    #[error("shopDomain is invalid: {0}")]
    InvalidShopDomain(#[source] ShopDomainError),

    #[error("apiVersion is invalid: {0}")]
    InvalidApiVersion(#[source] ApiVersionError),

    #[error("no Shopify access token available (SHOPIFY_ADMIN_ACCESS_TOKEN is not set)")]
    MissingAccessToken,
}

impl CredentialError {
    /// `true` when the caller sent something wrong, `false` when the relay
    /// itself is misconfigured.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::MissingAccessToken)
    }

    /// Request field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::MissingShopDomain | Self::InvalidShopDomain(_) => "shopDomain",
            Self::InvalidApiVersion(_) => "apiVersion",
            Self::MissingAccessToken => "shopifyAccessToken",
        }
    }
}

/// Per-request credential values, already stripped of blank strings.
#[derive(Debug, Default, Clone)]
pub struct CredentialOverrides {
    pub header_token: Option<SecretString>,
    pub body_token: Option<SecretString>,
    pub body_shop: Option<String>,
    pub query_shop: Option<String>,
    pub body_api_version: Option<String>,
    pub query_api_version: Option<String>,
}

/// A value together with the source it was resolved from.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    pub value: T,
    pub source: CredentialSource,
}

/// Fully resolved credentials for one Admin API call.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub shop_domain: ShopDomain,
    pub access_token: SecretString,
    pub api_version: ApiVersion,
    pub token_source: CredentialSource,
}

/// Return the first candidate that carries a value.
fn first_present<T>(
    candidates: impl IntoIterator<Item = (CredentialSource, Option<T>)>,
) -> Option<(CredentialSource, T)> {
    candidates
        .into_iter()
        .find_map(|(source, value)| value.map(|v| (source, v)))
}

/// Resolve the shop domain.
///
/// # Errors
///
/// `InvalidShopDomain` if the request value is not a hostname,
/// `MissingShopDomain` if no source supplies one.
pub fn resolve_shop_domain(
    overrides: &CredentialOverrides,
    config: &ShopifyConfig,
) -> Result<Resolved<ShopDomain>, CredentialError> {
    if let Some((source, raw)) = first_present([
        (CredentialSource::Body, overrides.body_shop.as_deref()),
        (CredentialSource::Query, overrides.query_shop.as_deref()),
    ]) {
        return ShopDomain::parse(raw)
            .map(|value| Resolved { value, source })
            .map_err(CredentialError::InvalidShopDomain);
    }

    config
        .default_shop
        .clone()
        .map(|value| Resolved {
            value,
            source: CredentialSource::Environment,
        })
        .ok_or(CredentialError::MissingShopDomain)
}

/// Resolve the access token.
///
/// # Errors
///
/// `MissingAccessToken` if neither the request nor the environment supplies one.
pub fn resolve_access_token(
    overrides: &CredentialOverrides,
    config: &ShopifyConfig,
) -> Result<Resolved<SecretString>, CredentialError> {
    first_present([
        (CredentialSource::Header, overrides.header_token.as_ref()),
        (CredentialSource::Body, overrides.body_token.as_ref()),
        (CredentialSource::Environment, config.access_token.as_ref()),
    ])
    .map(|(source, token)| Resolved {
        value: token.clone(),
        source,
    })
    .ok_or(CredentialError::MissingAccessToken)
}

/// Resolve the API version. Always succeeds unless a request value is malformed.
///
/// # Errors
///
/// `InvalidApiVersion` if the request value contains path characters.
pub fn resolve_api_version(
    overrides: &CredentialOverrides,
    config: &ShopifyConfig,
) -> Result<Resolved<ApiVersion>, CredentialError> {
    match first_present([
        (CredentialSource::Body, overrides.body_api_version.as_deref()),
        (CredentialSource::Query, overrides.query_api_version.as_deref()),
    ]) {
        Some((source, raw)) => ApiVersion::parse(raw)
            .map(|value| Resolved { value, source })
            .map_err(CredentialError::InvalidApiVersion),
        None => Ok(Resolved {
            value: config.api_version.clone(),
            source: CredentialSource::Environment,
        }),
    }
}

/// Resolve all three credentials.
///
/// Client errors (shop domain, API version) are reported before the
/// server-side missing-token error.
///
/// # Errors
///
/// See [`resolve_shop_domain`], [`resolve_api_version`] and [`resolve_access_token`].
pub fn resolve(
    overrides: &CredentialOverrides,
    config: &ShopifyConfig,
) -> Result<AdminCredentials, CredentialError> {
    let shop = resolve_shop_domain(overrides, config)?;
    let version = resolve_api_version(overrides, config)?;
    let token = resolve_access_token(overrides, config)?;

    tracing::debug!(
        shop = %shop.value,
        shop_source = %shop.source,
        api_version = %version.value,
        api_version_source = %version.source,
        token_source = %token.source,
        "Resolved Admin API credentials"
    );

    Ok(AdminCredentials {
        shop_domain: shop.value,
        access_token: token.value,
        api_version: version.value,
        token_source: token.source,
    })
}
