//! Relay configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Webhooks
//! - `SHOPIFY_WEBHOOK_SECRET` - Shared secret for `X-Shopify-Hmac-Sha256`
//!   verification. Without it every webhook is rejected.
//! - `RELAY_WEBHOOK_URL` - Downstream automation endpoint for verified webhooks
//!
//! ## Admin API
//! - `SHOPIFY_ADMIN_ACCESS_TOKEN` - Fallback Admin API access token (HIGH PRIVILEGE)
//! - `SHOPIFY_STORE` - Default shop domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_API_VERSION` - Default API version (default: 2026-01)
//! - `SHOPIFY_ADMIN_ORIGIN` - Override for `https://{shop}` (staging proxies, tests)
//!
//! ## Server
//! - `RELAY_HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`
//!
//! Empty values are treated as unset.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use shopify_relay_core::{ApiVersion, ShopDomain};
use thiserror::Error;
use url::Url;

/// Admin API version used when neither the request nor the environment pins one.
pub const DEFAULT_API_VERSION: &str = "2026-01";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: &str = "3000";
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Relay configuration.
///
/// Built once at startup and shared read-only by every request.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Shopify webhook and Admin API configuration
    pub shopify: ShopifyConfig,
    /// Downstream automation endpoint for verified webhooks
    pub relay_url: Option<Url>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Shopify configuration.
///
/// Implements `Debug` manually to redact the webhook secret and access token.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// Shared secret used to sign webhooks
    pub webhook_secret: Option<SecretString>,
    /// Fallback Admin API access token (HIGH PRIVILEGE)
    pub access_token: Option<SecretString>,
    /// Default shop domain when a request does not name one
    pub default_shop: Option<ShopDomain>,
    /// Default Admin API version
    pub api_version: ApiVersion,
    /// Replaces `https://{shop}` when building Admin API URLs
    pub admin_origin: Option<Url>,
}

impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("default_shop", &self.default_shop)
            .field("api_version", &self.api_version)
            .field("admin_origin", &self.admin_origin)
            .finish()
    }
}

impl RelayConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let host = env
            .or_default("RELAY_HOST", DEFAULT_HOST)
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("RELAY_HOST".to_string(), e.to_string()))?;
        let port = env
            .or_default("PORT", DEFAULT_PORT)
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;

        let shopify = ShopifyConfig::from_env(&env)?;
        let relay_url = env.url("RELAY_WEBHOOK_URL")?;

        Ok(Self {
            host,
            port,
            shopify,
            relay_url,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env
                .optional("SENTRY_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1.0),
            sentry_traces_sample_rate: env
                .optional("SENTRY_TRACES_SAMPLE_RATE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1.0),
        })
    }

    /// Strength problems with the configured secrets.
    ///
    /// Weak secrets do not abort startup. `main` logs these once the tracing
    /// subscriber is installed.
    #[must_use]
    pub fn secret_warnings(&self) -> Vec<ConfigError> {
        [
            ("SHOPIFY_WEBHOOK_SECRET", self.shopify.webhook_secret.as_ref()),
            ("SHOPIFY_ADMIN_ACCESS_TOKEN", self.shopify.access_token.as_ref()),
        ]
        .into_iter()
        .filter_map(|(key, secret)| {
            validate_secret_strength(secret?.expose_secret(), key).err()
        })
        .collect()
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ShopifyConfig {
    fn from_env<F>(env: &Env<F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_shop = env
            .optional("SHOPIFY_STORE")
            .map(|s| ShopDomain::parse(&s))
            .transpose()
            .map_err(|e| ConfigError::InvalidEnvVar("SHOPIFY_STORE".to_string(), e.to_string()))?;
        let api_version = ApiVersion::parse(&env.or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION))
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SHOPIFY_API_VERSION".to_string(), e.to_string())
            })?;

        Ok(Self {
            webhook_secret: env.secret("SHOPIFY_WEBHOOK_SECRET"),
            access_token: env.secret("SHOPIFY_ADMIN_ACCESS_TOKEN"),
            default_shop,
            api_version,
            admin_origin: env.url("SHOPIFY_ADMIN_ORIGIN")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Environment lookup that treats empty values as unset.
struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get an optional absolute URL.
    fn url(&self, key: &str) -> Result<Option<Url>, ConfigError> {
        self.optional(key)
            .map(|s| Url::parse(s.trim()))
            .transpose()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    /// Get an optional secret.
    fn secret(&self, key: &str) -> Option<SecretString> {
        self.optional(key).map(SecretString::from)
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}
