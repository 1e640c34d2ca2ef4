//! Integration test support for Shopfront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! The tests drive a [`CartStore`](shopfront_storefront::CartStore) against
//! the in-memory backend, so no network access or credentials are needed.
//!
//! # Test Categories
//!
//! - `cart_store` - Store operations and their backend round trips
//! - `cart_persistence` - Restoring the cart across process restarts

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use shopfront_core::{CartId, LineId};
use shopfront_storefront::MockStorefront;
use shopfront_storefront::shopify::{
    Cart, CartLineInput, CartLineUpdateInput, Collection, Product, ProductConnection,
    ProductsQuery, ShopifyError, StorefrontApi,
};

/// A call made through [`StorefrontApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetProduct(String),
    GetProducts(ProductsQuery),
    GetCollections,
    GetCollection { handle: String, first: i64 },
    CreateCart,
    AddLines { cart_id: CartId, lines: Vec<CartLineInput> },
    UpdateLines { cart_id: CartId, lines: Vec<CartLineUpdateInput> },
    RemoveLines { cart_id: CartId, line_ids: Vec<LineId> },
    GetCart(CartId),
}

impl Call {
    /// Operation name, for matching injected failures.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::GetProduct(_) => Operation::GetProduct,
            Self::GetProducts(_) => Operation::GetProducts,
            Self::GetCollections => Operation::GetCollections,
            Self::GetCollection { .. } => Operation::GetCollection,
            Self::CreateCart => Operation::CreateCart,
            Self::AddLines { .. } => Operation::AddLines,
            Self::UpdateLines { .. } => Operation::UpdateLines,
            Self::RemoveLines { .. } => Operation::RemoveLines,
            Self::GetCart(_) => Operation::GetCart,
        }
    }
}

/// Backend operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetProduct,
    GetProducts,
    GetCollections,
    GetCollection,
    CreateCart,
    AddLines,
    UpdateLines,
    RemoveLines,
    GetCart,
}

/// Failure to inject into the next matching call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The backend answers with a GraphQL error carrying this message.
    GraphQL(String),
    /// The backend answers with an HTTP error status.
    Status(u16),
}

impl Failure {
    fn into_error(self) -> ShopifyError {
        match self {
            Self::GraphQL(message) => ShopifyError::graphql(message),
            Self::Status(status) => ShopifyError::Status {
                status,
                body: String::new(),
            },
        }
    }
}

/// [`StorefrontApi`] wrapper around [`MockStorefront`] that records every
/// call and can fail selected ones.
///
/// Failed calls are recorded too, and never reach the backend.
pub struct RecordingStorefront {
    backend: MockStorefront,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<VecDeque<(Operation, Failure)>>,
}

impl RecordingStorefront {
    /// Wrap `backend`.
    #[must_use]
    pub fn wrap(backend: MockStorefront) -> Arc<Self> {
        Arc::new(Self {
            backend,
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(VecDeque::new()),
        })
    }

    /// Wrap the seeded demo backend.
    #[must_use]
    pub fn seeded() -> Arc<Self> {
        Self::wrap(MockStorefront::seeded())
    }

    /// The wrapped backend.
    #[must_use]
    pub const fn backend(&self) -> &MockStorefront {
        &self.backend
    }

    /// Fail the next call of `operation`.
    pub fn fail_next(&self, operation: Operation, failure: Failure) {
        lock(&self.failures).push_back((operation, failure));
    }

    /// All calls so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    /// Number of calls of `operation` so far.
    #[must_use]
    pub fn count(&self, operation: Operation) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    fn record(&self, call: Call) -> Result<(), ShopifyError> {
        let operation = call.operation();
        lock(&self.calls).push(call);

        let mut failures = lock(&self.failures);
        match failures.iter().position(|(op, _)| *op == operation) {
            Some(index) => failures
                .remove(index)
                .map_or(Ok(()), |(_, failure)| Err(failure.into_error())),
            None => Ok(()),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl StorefrontApi for RecordingStorefront {
    async fn get_product(&self, handle: &str) -> Result<Option<Product>, ShopifyError> {
        self.record(Call::GetProduct(handle.to_string()))?;
        self.backend.get_product(handle).await
    }

    async fn get_products(&self, query: ProductsQuery) -> Result<ProductConnection, ShopifyError> {
        self.record(Call::GetProducts(query.clone()))?;
        self.backend.get_products(query).await
    }

    async fn get_collections(&self) -> Result<Vec<Collection>, ShopifyError> {
        self.record(Call::GetCollections)?;
        self.backend.get_collections().await
    }

    async fn get_collection(
        &self,
        handle: &str,
        first: i64,
    ) -> Result<Option<Collection>, ShopifyError> {
        self.record(Call::GetCollection {
            handle: handle.to_string(),
            first,
        })?;
        self.backend.get_collection(handle, first).await
    }

    async fn create_cart(&self) -> Result<Cart, ShopifyError> {
        self.record(Call::CreateCart)?;
        self.backend.create_cart().await
    }

    async fn add_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError> {
        self.record(Call::AddLines {
            cart_id: cart_id.clone(),
            lines: lines.clone(),
        })?;
        self.backend.add_lines(cart_id, lines).await
    }

    async fn update_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, ShopifyError> {
        self.record(Call::UpdateLines {
            cart_id: cart_id.clone(),
            lines: lines.clone(),
        })?;
        self.backend.update_lines(cart_id, lines).await
    }

    async fn remove_lines(
        &self,
        cart_id: &CartId,
        line_ids: Vec<LineId>,
    ) -> Result<Cart, ShopifyError> {
        self.record(Call::RemoveLines {
            cart_id: cart_id.clone(),
            line_ids: line_ids.clone(),
        })?;
        self.backend.remove_lines(cart_id, line_ids).await
    }

    async fn get_cart(&self, cart_id: &CartId) -> Result<Option<Cart>, ShopifyError> {
        self.record(Call::GetCart(cart_id.clone()))?;
        self.backend.get_cart(cart_id).await
    }
}
