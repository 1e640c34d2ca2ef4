//! Cache types for Storefront API read responses.
//!
//! Only catalog reads are cached. Carts are mutable state owned by the
//! backend and are never cached.

use std::time::Duration;

use crate::shopify::types::{Collection, Product, ProductConnection, ProductSortKey};

/// How long a cached catalog response stays valid.
pub const CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// Maximum number of cached responses.
pub const CACHE_CAPACITY: u64 = 1000;

/// Cache key for products and collections.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(String),
    Products {
        sort_key: ProductSortKey,
        reverse: bool,
        first: i64,
        cursor: Option<String>,
    },
    Collection {
        handle: String,
        first: i64,
    },
    Collections,
}

/// Cached value types.
///
/// `None` entries remember that a handle does not exist.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Option<Box<Product>>),
    Products(ProductConnection),
    Collection(Option<Box<Collection>>),
    Collections(Vec<Collection>),
}
