//! CLI error type.

use shopfront_storefront::CartStoreError;
use shopfront_storefront::config::ConfigError;
use shopfront_storefront::shopify::ShopifyError;
use thiserror::Error;

/// Errors that abort a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A catalog request failed.
    #[error(transparent)]
    Shopify(#[from] ShopifyError),

    /// A cart operation failed.
    #[error(transparent)]
    Cart(#[from] CartStoreError),

    /// The requested product or collection does not exist.
    #[error("{kind} not found: {handle}")]
    NotFound {
        /// What was looked up.
        kind: &'static str,
        /// Handle that was requested.
        handle: String,
    },
}

impl CliError {
    /// Report the error to Sentry when it is configured.
    pub fn capture(&self) {
        let event_id = sentry::capture_error(self);
        tracing::debug!(%event_id, "Error reported");
    }
}
