//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (live backend)
//! - `SHOPIFY_STORE_DOMAIN` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_STOREFRONT_API_VERSION` - Storefront API version (e.g., 2025-01)
//! - `SHOPIFY_STOREFRONT_API_PUBLIC_TOKEN` - Storefront API public access token
//!
//! ## Optional
//! - `STOREFRONT_BACKEND` - `live` or `mock` (default: live)
//! - `STOREFRONT_DATA_DIR` - Directory for the persisted cart (default: .shopfront)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_DATA_DIR: &str = ".shopfront";

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
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Which commerce backend implementation to use
    pub backend: BackendConfig,
    /// Directory holding the persisted cart record
    pub data_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., production, staging)
    pub sentry_environment: Option<String>,
}

/// Commerce backend selection, resolved once at startup.
#[derive(Debug, Clone)]
pub enum BackendConfig {
    /// Hosted Shopify Storefront API.
    Live(ShopifyStorefrontConfig),
    /// In-memory demo catalog and cart backend.
    Mock,
}

/// Shopify Storefront API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ShopifyStorefrontConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub store_domain: String,
    /// Shopify API version (e.g., 2025-01)
    pub api_version: String,
    /// Storefront API public access token
    pub public_token: SecretString,
}

impl std::fmt::Debug for ShopifyStorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyStorefrontConfig")
            .field("store_domain", &self.store_domain)
            .field("api_version", &self.api_version)
            .field("public_token", &"[REDACTED]")
            .finish()
    }
}

impl ShopifyStorefrontConfig {
    /// GraphQL endpoint for this store and API version.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "https://{}/api/{}/graphql.json",
            self.store_domain, self.api_version
        )
    }

    /// Expose the access token for request headers.
    #[must_use]
    pub fn access_token(&self) -> &str {
        self.public_token.expose_secret()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let backend = match get_env_or_default("STOREFRONT_BACKEND", "live")
            .to_lowercase()
            .as_str()
        {
            "live" => BackendConfig::Live(ShopifyStorefrontConfig::from_env()?),
            "mock" => BackendConfig::Mock,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "STOREFRONT_BACKEND".to_string(),
                    format!("expected 'live' or 'mock', got '{other}'"),
                ));
            }
        };

        Ok(Self {
            backend,
            data_dir: PathBuf::from(get_env_or_default("STOREFRONT_DATA_DIR", DEFAULT_DATA_DIR)),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration for the mock backend, persisting under `data_dir`.
    #[must_use]
    pub fn mock(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: BackendConfig::Mock,
            data_dir: data_dir.into(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Whether the in-memory backend is selected.
    #[must_use]
    pub const fn is_mock(&self) -> bool {
        matches!(self.backend, BackendConfig::Mock)
    }
}

impl ShopifyStorefrontConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let store_domain = get_required_env("SHOPIFY_STORE_DOMAIN")?;
        validate_store_domain(&store_domain, "SHOPIFY_STORE_DOMAIN")?;

        let api_version = get_required_env("SHOPIFY_STOREFRONT_API_VERSION")?;
        validate_api_version(&api_version, "SHOPIFY_STOREFRONT_API_VERSION")?;

        let public_token = get_required_env("SHOPIFY_STOREFRONT_API_PUBLIC_TOKEN")?;
        validate_not_placeholder(&public_token, "SHOPIFY_STOREFRONT_API_PUBLIC_TOKEN")?;

        Ok(Self {
            store_domain,
            api_version,
            public_token: SecretString::from(public_token),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvVar(key.to_string())),
    }
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// The store domain must be a bare host: no scheme, path, or port.
fn validate_store_domain(domain: &str, var_name: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidEnvVar(var_name.to_string(), reason.to_string());

    if domain.contains("://") || domain.contains('/') {
        return Err(invalid("must be a bare domain without scheme or path"));
    }

    let url = Url::parse(&format!("https://{domain}")).map_err(|e| invalid(&e.to_string()))?;
    match url.host_str() {
        Some(host) if host.eq_ignore_ascii_case(domain) && url.port().is_none() => Ok(()),
        _ => Err(invalid("must be a bare domain without port or credentials")),
    }
}

/// API versions are `YYYY-MM` or the literal `unstable`.
fn validate_api_version(version: &str, var_name: &str) -> Result<(), ConfigError> {
    if version == "unstable" {
        return Ok(());
    }

    let valid = matches!(
        version.split_once('-'),
        Some((year, month))
            if year.len() == 4
                && month.len() == 2
                && year.chars().all(|c| c.is_ascii_digit())
                && matches!(month.parse::<u8>(), Ok(1..=12))
    );

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("expected YYYY-MM or 'unstable', got '{version}'"),
        ))
    }
}

/// Reject tokens copied verbatim from sample `.env` files.
fn validate_not_placeholder(value: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = value.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}
