//! Shopify Storefront API client implementation.
//!
//! Uses `graphql_client` request/response envelopes with `reqwest` for HTTP.
//! Caches products and collections using `moka` (15-minute TTL).

mod cache;
mod conversions;
pub mod queries;

use std::sync::Arc;

use async_trait::async_trait;
use graphql_client::{GraphQLQuery, Response};
use moka::future::Cache;
use reqwest::StatusCode;
use shopfront_core::{CartId, LineId};
use tracing::{debug, instrument};

use crate::config::ShopifyStorefrontConfig;
use crate::shopify::types::{
    Cart, CartLineInput, CartLineUpdateInput, Collection, Product, ProductConnection,
    ProductsQuery,
};
use crate::shopify::{GraphQLError, GraphQLErrorLocation, ShopifyError, StorefrontApi, operation};

use cache::{CACHE_CAPACITY, CACHE_TTL, CacheKey, CacheValue};
use conversions::{
    convert_cart, convert_collection, convert_collections, convert_product,
    convert_product_connection, convert_user_errors,
};
use queries::{
    AddToCart, CartPayload, CreateCart, GetCart, GetCollection, GetCollections, GetProduct,
    GetProducts, RemoveFromCart, UpdateCart, add_to_cart, create_cart, get_cart, get_collection,
    get_collections, get_product, get_products, remove_from_cart, update_cart,
};

/// Header carrying the public Storefront API token.
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Storefront-Access-Token";

/// Number of collections requested by [`StorefrontApi::get_collections`].
const COLLECTIONS_PAGE_SIZE: i64 = 100;

/// Body excerpt length kept in logs and errors.
const BODY_EXCERPT_CHARS: usize = 500;

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
///
/// Provides type-safe access to products, collections, and cart operations.
/// Catalog reads are cached for 15 minutes; cart reads and mutations always
/// go to the network.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    #[must_use]
    pub fn new(config: &ShopifyStorefrontConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(StorefrontClientInner {
                client: reqwest::Client::new(),
                endpoint: config.endpoint(),
                access_token: config.access_token().to_string(),
                cache,
            }),
        }
    }

    /// GraphQL endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Execute a GraphQL operation.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError> {
        let request_body = Q::build_query(variables);
        debug!(operation = request_body.operation_name, "Sending Storefront API request");

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header(ACCESS_TOKEN_HEADER, &self.inner.access_token)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Storefront API request failed"))?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        parse_response::<Q>(status, &response_text)
    }

    /// Look up a cached value or load and cache it.
    async fn cached<F, Fut>(&self, key: CacheKey, load: F) -> Result<CacheValue, ShopifyError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CacheValue, ShopifyError>>,
    {
        if let Some(value) = self.inner.cache.get(&key).await {
            debug!(?key, "Cache hit");
            return Ok(value);
        }

        let value = load().await?;
        self.inner.cache.insert(key, value.clone()).await;
        Ok(value)
    }

    /// Invalidate all cached data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

/// Turn a raw HTTP response into operation data.
///
/// A non-empty `errors` array fails the call even when `data` is present.
fn parse_response<Q: GraphQLQuery>(
    status: StatusCode,
    response_text: &str,
) -> Result<Q::ResponseData, ShopifyError> {
    let excerpt = || response_text.chars().take(BODY_EXCERPT_CHARS).collect::<String>();

    if !status.is_success() {
        tracing::error!(
            status = %status,
            body = %excerpt(),
            "Shopify API returned non-success status"
        );
        return Err(ShopifyError::Status {
            status: status.as_u16(),
            body: excerpt(),
        });
    }

    let response: Response<Q::ResponseData> = serde_json::from_str(response_text)
        .inspect_err(|e| {
            tracing::error!(
                error = %e,
                body = %excerpt(),
                "Failed to parse Shopify GraphQL response"
            );
        })?;

    if let Some(errors) = response.errors
        && !errors.is_empty()
    {
        debug!(errors = ?errors, "GraphQL errors in response");

        return Err(ShopifyError::GraphQL(
            errors
                .into_iter()
                .map(|e| GraphQLError {
                    message: e.message,
                    locations: e.locations.map_or_else(Vec::new, |locs| {
                        locs.into_iter()
                            .map(|l| GraphQLErrorLocation {
                                line: i64::from(l.line),
                                column: i64::from(l.column),
                            })
                            .collect()
                    }),
                    path: e.path.map_or_else(Vec::new, |p| {
                        p.into_iter()
                            .map(|fragment| match fragment {
                                graphql_client::PathFragment::Key(s) => {
                                    serde_json::Value::String(s)
                                }
                                graphql_client::PathFragment::Index(i) => {
                                    serde_json::Value::Number(i.into())
                                }
                            })
                            .collect()
                    }),
                })
                .collect(),
        ));
    }

    response.data.ok_or_else(|| {
        tracing::error!(
            body = %excerpt(),
            "Shopify GraphQL response has no data and no errors"
        );
        ShopifyError::graphql("No data in response")
    })
}

/// Unwrap a cart mutation payload.
fn cart_from_payload(
    payload: Option<CartPayload>,
    operation: &'static str,
) -> Result<Cart, ShopifyError> {
    let Some(payload) = payload else {
        return Err(ShopifyError::MissingPayload(operation));
    };

    if !payload.user_errors.is_empty() {
        return Err(ShopifyError::UserErrors {
            operation,
            errors: convert_user_errors(payload.user_errors),
        });
    }

    payload
        .cart
        .map(convert_cart)
        .ok_or(ShopifyError::MissingPayload(operation))
}

#[async_trait]
impl StorefrontApi for StorefrontClient {
    // =========================================================================
    // Product Methods
    // =========================================================================

    #[instrument(skip(self), fields(handle = %handle))]
    async fn get_product(&self, handle: &str) -> Result<Option<Product>, ShopifyError> {
        let value = self
            .cached(CacheKey::Product(handle.to_string()), || async {
                let data = self
                    .execute::<GetProduct>(get_product::Variables {
                        handle: handle.to_string(),
                    })
                    .await?;
                Ok(CacheValue::Product(
                    data.product.map(|p| Box::new(convert_product(p))),
                ))
            })
            .await?;

        match value {
            CacheValue::Product(product) => Ok(product.map(|p| *p)),
            _ => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn get_products(&self, query: ProductsQuery) -> Result<ProductConnection, ShopifyError> {
        let variables = get_products::Variables {
            first: query.first,
            after: query.after.clone(),
            query: query.query.clone(),
            sort_key: query.sort_key,
            reverse: query.reverse,
        };

        // Search results are not cached
        if query.query.is_some() {
            let data = self.execute::<GetProducts>(variables).await?;
            return Ok(convert_product_connection(data.products));
        }

        let key = CacheKey::Products {
            sort_key: query.sort_key,
            reverse: query.reverse,
            first: query.first,
            cursor: query.after,
        };

        let value = self
            .cached(key, || async {
                let data = self.execute::<GetProducts>(variables).await?;
                Ok(CacheValue::Products(convert_product_connection(data.products)))
            })
            .await?;

        match value {
            CacheValue::Products(connection) => Ok(connection),
            _ => Ok(ProductConnection::default()),
        }
    }

    // =========================================================================
    // Collection Methods
    // =========================================================================

    #[instrument(skip(self))]
    async fn get_collections(&self) -> Result<Vec<Collection>, ShopifyError> {
        let value = self
            .cached(CacheKey::Collections, || async {
                let data = self
                    .execute::<GetCollections>(get_collections::Variables {
                        first: COLLECTIONS_PAGE_SIZE,
                    })
                    .await?;
                Ok(CacheValue::Collections(convert_collections(data.collections)))
            })
            .await?;

        match value {
            CacheValue::Collections(collections) => Ok(collections),
            _ => Ok(Vec::new()),
        }
    }

    #[instrument(skip(self), fields(handle = %handle))]
    async fn get_collection(
        &self,
        handle: &str,
        first: i64,
    ) -> Result<Option<Collection>, ShopifyError> {
        let key = CacheKey::Collection {
            handle: handle.to_string(),
            first,
        };

        let value = self
            .cached(key, || async {
                let data = self
                    .execute::<GetCollection>(get_collection::Variables {
                        handle: handle.to_string(),
                        first,
                        after: None,
                    })
                    .await?;
                Ok(CacheValue::Collection(
                    data.collection.map(|c| Box::new(convert_collection(c))),
                ))
            })
            .await?;

        match value {
            CacheValue::Collection(collection) => Ok(collection.map(|c| *c)),
            _ => Ok(None),
        }
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    #[instrument(skip(self))]
    async fn create_cart(&self) -> Result<Cart, ShopifyError> {
        let data = self
            .execute::<CreateCart>(create_cart::Variables::default())
            .await?;
        cart_from_payload(data.cart_create, operation::CREATE_CART)
    }

    #[instrument(skip(self, lines), fields(cart_id = %cart_id, lines = lines.len()))]
    async fn add_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError> {
        let data = self
            .execute::<AddToCart>(add_to_cart::Variables {
                cart_id: cart_id.to_string(),
                lines,
            })
            .await?;
        cart_from_payload(data.cart_lines_add, operation::ADD_TO_CART)
    }

    #[instrument(skip(self, lines), fields(cart_id = %cart_id, lines = lines.len()))]
    async fn update_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, ShopifyError> {
        let data = self
            .execute::<UpdateCart>(update_cart::Variables {
                cart_id: cart_id.to_string(),
                lines,
            })
            .await?;
        cart_from_payload(data.cart_lines_update, operation::UPDATE_CART)
    }

    #[instrument(skip(self, line_ids), fields(cart_id = %cart_id, lines = line_ids.len()))]
    async fn remove_lines(
        &self,
        cart_id: &CartId,
        line_ids: Vec<LineId>,
    ) -> Result<Cart, ShopifyError> {
        let data = self
            .execute::<RemoveFromCart>(remove_from_cart::Variables {
                cart_id: cart_id.to_string(),
                line_ids: line_ids.into_iter().map(LineId::into_inner).collect(),
            })
            .await?;
        cart_from_payload(data.cart_lines_remove, operation::REMOVE_FROM_CART)
    }

    #[instrument(skip(self), fields(cart_id = %cart_id))]
    async fn get_cart(&self, cart_id: &CartId) -> Result<Option<Cart>, ShopifyError> {
        let data = self
            .execute::<GetCart>(get_cart::Variables {
                cart_id: cart_id.to_string(),
            })
            .await?;
        Ok(data.cart.map(convert_cart))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use secrecy::SecretString;

    use super::*;
    use crate::shopify::ErrorKind;

    /// Client whose endpoint refuses connections.
    fn offline_client() -> StorefrontClient {
        StorefrontClient::new(&ShopifyStorefrontConfig {
            store_domain: "127.0.0.1:9".to_string(),
            api_version: "2025-01".to_string(),
            public_token: SecretString::from("token"),
        })
    }

    async fn load_collections(loads: &AtomicUsize) -> Result<CacheValue, ShopifyError> {
        loads.fetch_add(1, Ordering::SeqCst);
        Ok(CacheValue::Collections(Vec::new()))
    }

    async fn cache_len(client: &StorefrontClient) -> u64 {
        client.inner.cache.run_pending_tasks().await;
        client.inner.cache.entry_count()
    }

    fn empty_cart_json() -> serde_json::Value {
        serde_json::json!({
            "id": "gid://shopify/Cart/c1",
            "checkoutUrl": "https://shop.example/cart/c/c1",
            "cost": {
                "subtotalAmount": {"amount": "0.0", "currencyCode": "USD"},
                "totalAmount": {"amount": "0.0", "currencyCode": "USD"},
                "totalTaxAmount": null
            },
            "lines": {"edges": []},
            "totalQuantity": 0
        })
    }

    #[test]
    fn test_client_endpoint() {
        let client = StorefrontClient::new(&ShopifyStorefrontConfig {
            store_domain: "test.myshopify.com".to_string(),
            api_version: "2025-01".to_string(),
            public_token: SecretString::from("token"),
        });
        assert_eq!(
            client.endpoint(),
            "https://test.myshopify.com/api/2025-01/graphql.json"
        );
    }

    #[test]
    fn test_parse_response_errors_win_over_data() {
        let body = serde_json::json!({
            "data": {"cart": empty_cart_json()},
            "errors": [{"message": "Variant out of stock"}]
        })
        .to_string();

        let err = parse_response::<GetCart>(StatusCode::OK, &body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert!(err.to_string().contains("Variant out of stock"));
    }

    #[test]
    fn test_parse_response_error_path_and_location() {
        let body = serde_json::json!({
            "errors": [{
                "message": "Field 'foo' doesn't exist",
                "locations": [{"line": 3, "column": 5}],
                "path": ["cart", 0]
            }]
        })
        .to_string();

        let err = parse_response::<GetCart>(StatusCode::OK, &body).unwrap_err();
        let ShopifyError::GraphQL(errors) = err else {
            panic!("expected GraphQL error");
        };
        assert_eq!(errors[0].locations[0].line, 3);
        assert_eq!(errors[0].path[1], serde_json::json!(0));
    }

    #[test]
    fn test_parse_response_absent_cart_is_none() {
        let body = serde_json::json!({"data": {"cart": null}}).to_string();
        let data = parse_response::<GetCart>(StatusCode::OK, &body).unwrap();
        assert!(data.cart.is_none());
    }

    #[test]
    fn test_parse_response_non_json_is_network_error() {
        let err = parse_response::<GetCart>(StatusCode::OK, "<html>oops</html>").unwrap_err();
        assert!(matches!(err, ShopifyError::Parse(_)));
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[test]
    fn test_parse_response_http_status() {
        let err = parse_response::<GetCart>(StatusCode::BAD_GATEWAY, "upstream").unwrap_err();
        assert!(matches!(err, ShopifyError::Status { status: 502, .. }));
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[test]
    fn test_parse_response_without_data_or_errors() {
        let err = parse_response::<GetCart>(StatusCode::OK, "{}").unwrap_err();
        assert!(err.to_string().contains("No data in response"));
    }

    #[test]
    fn test_cart_from_payload_user_errors() {
        let payload: CartPayload = serde_json::from_value(serde_json::json!({
            "cart": empty_cart_json(),
            "userErrors": [{"field": ["lines"], "message": "Merchandise does not exist"}]
        }))
        .unwrap();

        let err = cart_from_payload(Some(payload), "Error adding to cart").unwrap_err();
        let ShopifyError::UserErrors { operation, errors } = err else {
            panic!("expected user errors");
        };
        assert_eq!(operation, "Error adding to cart");
        assert_eq!(errors[0].field, vec!["lines"]);
    }

    #[test]
    fn test_cart_from_payload_missing_cart() {
        let payload: CartPayload =
            serde_json::from_value(serde_json::json!({"cart": null, "userErrors": []})).unwrap();
        let err = cart_from_payload(Some(payload), "Error creating cart").unwrap_err();
        assert!(matches!(err, ShopifyError::MissingPayload("Error creating cart")));

        let err = cart_from_payload(None, "Error creating cart").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Remote);
    }

    #[test]
    fn test_cart_from_payload_success() {
        let payload: CartPayload = serde_json::from_value(serde_json::json!({
            "cart": empty_cart_json(),
            "userErrors": []
        }))
        .unwrap();
        let cart = cart_from_payload(Some(payload), "Error creating cart").unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.total_quantity, 0);
    }

    // =========================================================================
    // Read cache
    // =========================================================================

    #[tokio::test]
    async fn test_cached_skips_loader_on_hit() {
        let client = offline_client();
        let loads = AtomicUsize::new(0);

        for _ in 0..2 {
            let value = client
                .cached(CacheKey::Collections, || load_collections(&loads))
                .await
                .unwrap();
            assert!(matches!(value, CacheValue::Collections(ref c) if c.is_empty()));
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cached_does_not_keep_errors() {
        let client = offline_client();
        let loads = AtomicUsize::new(0);

        let err = client
            .cached(CacheKey::Collections, || async {
                loads.fetch_add(1, Ordering::SeqCst);
                Err(ShopifyError::graphql("boom"))
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert_eq!(cache_len(&client).await, 0);

        client
            .cached(CacheKey::Collections, || load_collections(&loads))
            .await
            .unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_all_forces_reload() {
        let client = offline_client();
        let loads = AtomicUsize::new(0);

        client
            .cached(CacheKey::Collections, || load_collections(&loads))
            .await
            .unwrap();
        client.invalidate_all().await;
        assert_eq!(cache_len(&client).await, 0);

        client
            .cached(CacheKey::Collections, || load_collections(&loads))
            .await
            .unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_catalog_reads_use_cache_and_search_does_not() {
        let client = offline_client();
        let query = ProductsQuery::default();
        let key = CacheKey::Products {
            sort_key: query.sort_key,
            reverse: query.reverse,
            first: query.first,
            cursor: None,
        };
        client
            .cached(key, || async {
                Ok(CacheValue::Products(ProductConnection::default()))
            })
            .await
            .unwrap();

        let listing = client.get_products(query.clone()).await.unwrap();
        assert!(listing.products.is_empty());

        let err = client
            .get_products(ProductsQuery {
                query: Some("gel".to_string()),
                ..query
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[tokio::test]
    async fn test_cart_calls_bypass_cache() {
        let client = offline_client();

        let err = client
            .get_cart(&CartId::new("gid://shopify/Cart/c1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);

        let err = client.create_cart().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(cache_len(&client).await, 0);
    }

    #[tokio::test]
    async fn test_failed_catalog_read_is_not_cached() {
        let client = offline_client();

        let err = client.get_product("classic-manicure").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(cache_len(&client).await, 0);
    }
}
