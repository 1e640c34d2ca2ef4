//! Shopify Storefront API clients.
//!
//! # Architecture
//!
//! - [`StorefrontApi`] is the seam between the cart store and the backend
//! - [`StorefrontClient`] talks GraphQL to the hosted Storefront API
//! - [`MockStorefront`] is a local backend with a demo catalog
//! - Shopify is source of truth - the client holds no state between calls
//!   apart from a 15 minute read cache for catalog data
//!
//! The implementation is chosen once at startup from configuration, see
//! [`connect`].
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_storefront::shopify::{self, CartLineInput};
//!
//! let api = shopify::connect(&config).await;
//!
//! // Get a product
//! let product = api.get_product("classic-manicure").await?;
//!
//! // Create a cart and add items
//! let cart = api.create_cart().await?;
//! let cart = api.add_lines(&cart.id, vec![CartLineInput {
//!     merchandise_id: product.variants[0].id.clone(),
//!     quantity: 1,
//! }]).await?;
//! ```

mod mock;
mod storefront;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use shopfront_core::{CartId, LineId};
use thiserror::Error;

use crate::config::{BackendConfig, StorefrontConfig};

pub use mock::{MOCK_BACKEND_FILE, MockStorefront};
pub use storefront::StorefrontClient;
pub use types::*;

/// Errors that can occur when interacting with Shopify APIs.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("Network error: invalid response body: {0}")]
    Parse(#[from] serde_json::Error),

    /// Backend answered with a non-success HTTP status.
    #[error("Network error: HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// User errors from a cart mutation (e.g., invalid merchandise).
    #[error("{operation}: {}", format_user_errors(.errors))]
    UserErrors {
        /// Description of the failed operation.
        operation: &'static str,
        /// Raw user errors reported by the backend.
        errors: Vec<CartUserError>,
    },

    /// A mutation returned no object despite reporting no errors.
    #[error("{0}: no data returned")]
    MissingPayload(&'static str),
}

/// Coarse classification of [`ShopifyError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The backend answered and reported a failure.
    Remote,
    /// The backend could not be reached or answered unintelligibly.
    Network,
}

impl ShopifyError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(_) | Self::Parse(_) | Self::Status { .. } | Self::RateLimited(_) => {
                ErrorKind::Network
            }
            Self::GraphQL(_) | Self::UserErrors { .. } | Self::MissingPayload(_) => {
                ErrorKind::Remote
            }
        }
    }

    /// Shorthand for a single-message GraphQL error.
    #[must_use]
    pub fn graphql(message: impl Into<String>) -> Self {
        Self::GraphQL(vec![GraphQLError {
            message: message.into(),
            locations: vec![],
            path: vec![],
        }])
    }
}

/// A GraphQL error returned by the Shopify API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

/// Operation labels prefixed to cart mutation errors.
pub mod operation {
    pub const CREATE_CART: &str = "Error creating cart";
    pub const ADD_TO_CART: &str = "Error adding to cart";
    pub const UPDATE_CART: &str = "Error updating cart";
    pub const REMOVE_FROM_CART: &str = "Error removing from cart";
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if let Some(loc) = e.locations.first() {
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn format_user_errors(errors: &[CartUserError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// StorefrontApi
// =============================================================================

/// Operations against the commerce backend.
///
/// Every call is a single round trip with no retries. Absent objects (an
/// unknown handle, an expired cart) are `Ok(None)`, never errors.
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    /// Get a product by its handle.
    async fn get_product(&self, handle: &str) -> Result<Option<Product>, ShopifyError>;

    /// Get a page of products.
    async fn get_products(&self, query: ProductsQuery) -> Result<ProductConnection, ShopifyError>;

    /// Get up to 100 collections.
    async fn get_collections(&self) -> Result<Vec<Collection>, ShopifyError>;

    /// Get a collection with its first `first` products.
    async fn get_collection(
        &self,
        handle: &str,
        first: i64,
    ) -> Result<Option<Collection>, ShopifyError>;

    /// Create a new empty cart.
    async fn create_cart(&self) -> Result<Cart, ShopifyError>;

    /// Add lines to a cart.
    async fn add_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError>;

    /// Update quantities of existing lines.
    async fn update_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, ShopifyError>;

    /// Remove lines from a cart.
    async fn remove_lines(
        &self,
        cart_id: &CartId,
        line_ids: Vec<LineId>,
    ) -> Result<Cart, ShopifyError>;

    /// Get a cart by ID; `None` if it no longer exists.
    async fn get_cart(&self, cart_id: &CartId) -> Result<Option<Cart>, ShopifyError>;
}

/// Build the backend selected by configuration.
///
/// The mock backend keeps its carts under the configured data directory.
pub async fn connect(config: &StorefrontConfig) -> Arc<dyn StorefrontApi> {
    match &config.backend {
        BackendConfig::Live(shopify) => {
            tracing::info!(store = %shopify.store_domain, "Using Shopify Storefront API");
            Arc::new(StorefrontClient::new(shopify))
        }
        BackendConfig::Mock => {
            tracing::info!(data_dir = %config.data_dir.display(), "Using mock storefront");
            Arc::new(MockStorefront::persistent(&config.data_dir).await)
        }
    }
}
