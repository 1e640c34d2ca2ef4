//! Client-side cart store.
//!
//! # Architecture
//!
//! - [`CartStore`] holds the single authoritative cart snapshot
//! - Every write is one round trip through [`StorefrontApi`]; the snapshot is
//!   replaced wholesale with the cart the backend returns
//! - Writes are serialized per store, so each one starts from the snapshot
//!   the previous one produced
//! - Failures land in the `error` slot and leave the last good snapshot in
//!   place; nothing is retried
//! - [`CartStorage`] keeps the snapshot across restarts

mod storage;

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rust_decimal::Decimal;
use shopfront_core::{
    LineId, MerchandiseId, free_shipping_progress, is_eligible_for_free_shipping,
    remaining_for_free_shipping,
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::shopify::{
    Cart, CartLineInput, CartLineUpdateInput, ErrorKind, ShopifyError, StorefrontApi,
};

pub use storage::{CartStorage, STORE_NAME, StorageError};
pub(crate) use storage::{read_json, write_json_atomic};

/// Subtotal reported when there is no cart.
pub const EMPTY_SUBTOTAL: &str = "0.00";

/// Errors returned by cart store operations.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// The backend call failed.
    #[error(transparent)]
    Remote(#[from] ShopifyError),

    /// No cart could be obtained before adding an item.
    #[error("Failed to initialize cart")]
    NotInitialized,
}

/// Classification of [`CartStoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartErrorKind {
    /// The backend answered and reported a failure.
    Remote,
    /// The backend could not be reached.
    Network,
    /// No cart was available for the operation.
    NotInitialized,
}

impl CartStoreError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> CartErrorKind {
        match self {
            Self::Remote(e) => match e.kind() {
                ErrorKind::Remote => CartErrorKind::Remote,
                ErrorKind::Network => CartErrorKind::Network,
            },
            Self::NotInitialized => CartErrorKind::NotInitialized,
        }
    }
}

/// Observable store state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    /// Last cart returned by the backend (or restored from disk).
    pub cart: Option<Cart>,
    /// Whether a write is in flight.
    pub is_loading: bool,
    /// Message of the last failed write.
    pub error: Option<String>,
}

/// Free-shipping standing of the current subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeShippingStatus {
    /// Subtotal meets the threshold.
    pub eligible: bool,
    /// Amount still needed, zero once eligible.
    pub remaining: Decimal,
    /// Progress toward the threshold, 0 to 100.
    pub progress_percent: Decimal,
}

/// Authoritative client-side cart snapshot.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    api: Arc<dyn StorefrontApi>,
    storage: Option<CartStorage>,
    state: RwLock<CartState>,
    writes: Mutex<()>,
}

impl CartStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(api: Arc<dyn StorefrontApi>, storage: Option<CartStorage>) -> Self {
        Self::with_cart(api, storage, None)
    }

    /// Create a store showing the persisted cart until [`Self::initialize`]
    /// reconciles it.
    ///
    /// An unreadable record is logged and treated as absent.
    pub async fn restore(api: Arc<dyn StorefrontApi>, storage: CartStorage) -> Self {
        let cart = match storage.load().await {
            Ok(cart) => cart,
            Err(e) => {
                warn!(error = %e, path = %storage.path().display(), "Ignoring unreadable cart record");
                None
            }
        };
        debug!(restored = cart.is_some(), "Cart store restored");
        Self::with_cart(api, Some(storage), cart)
    }

    fn with_cart(
        api: Arc<dyn StorefrontApi>,
        storage: Option<CartStorage>,
        cart: Option<Cart>,
    ) -> Self {
        Self {
            inner: Arc::new(CartStoreInner {
                api,
                storage,
                state: RwLock::new(CartState {
                    cart,
                    ..CartState::default()
                }),
                writes: Mutex::new(()),
            }),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Copy of the whole state.
    #[must_use]
    pub fn snapshot(&self) -> CartState {
        self.read().clone()
    }

    /// Current cart, if any.
    #[must_use]
    pub fn cart(&self) -> Option<Cart> {
        self.read().cart.clone()
    }

    /// Whether a write is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read().is_loading
    }

    /// Message of the last failed write.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    /// Total quantity across lines, as reported by the backend.
    #[must_use]
    pub fn total_items(&self) -> i64 {
        self.read().cart.as_ref().map_or(0, |c| c.total_quantity)
    }

    /// Subtotal amount string, [`EMPTY_SUBTOTAL`] without a cart.
    #[must_use]
    pub fn subtotal(&self) -> String {
        self.read()
            .cart
            .as_ref()
            .map_or_else(|| EMPTY_SUBTOTAL.to_string(), |c| c.cost.subtotal.amount.clone())
    }

    /// Checkout hand-off URL.
    #[must_use]
    pub fn checkout_url(&self) -> Option<String> {
        self.read().cart.as_ref().map(|c| c.checkout_url.clone())
    }

    /// Free-shipping standing of the current subtotal.
    #[must_use]
    pub fn free_shipping(&self) -> FreeShippingStatus {
        let subtotal = self.subtotal();
        FreeShippingStatus {
            eligible: is_eligible_for_free_shipping(&subtotal),
            remaining: remaining_for_free_shipping(&subtotal),
            progress_percent: free_shipping_progress(&subtotal),
        }
    }

    /// Clear the error slot.
    pub fn clear_error(&self) {
        self.write().error = None;
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Reconcile the held cart with the backend, creating one if needed.
    ///
    /// # Errors
    ///
    /// Returns the creation failure when no existing cart could be fetched
    /// and a new one could not be created.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<Cart, CartStoreError> {
        let _write = self.inner.writes.lock().await;
        self.initialize_locked().await
    }

    /// Add merchandise to the cart, creating the cart first if there is none.
    ///
    /// # Errors
    ///
    /// Returns [`CartStoreError::NotInitialized`] if no cart could be
    /// obtained, or the backend failure of the add itself.
    #[instrument(skip(self), fields(merchandise_id = %merchandise_id))]
    pub async fn add_item(
        &self,
        merchandise_id: MerchandiseId,
        quantity: i64,
    ) -> Result<Cart, CartStoreError> {
        let _write = self.inner.writes.lock().await;
        self.begin();

        let cart_id = match self.cart_id() {
            Some(id) => id,
            None => {
                let initialized = self.initialize_locked().await.ok();
                self.begin();
                match initialized {
                    Some(cart) => cart.id,
                    None => return Err(self.fail(CartStoreError::NotInitialized)),
                }
            }
        };

        let result = self
            .inner
            .api
            .add_lines(
                &cart_id,
                vec![CartLineInput {
                    merchandise_id,
                    quantity,
                }],
            )
            .await;
        self.settle(result).await
    }

    /// Remove a line. Does nothing without a cart.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn remove_item(&self, line_id: LineId) -> Result<Option<Cart>, CartStoreError> {
        let _write = self.inner.writes.lock().await;
        self.remove_locked(line_id).await
    }

    /// Set a line's quantity; zero or less removes it.
    ///
    /// Does nothing without a cart or when the line is not in the current
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn update_item(
        &self,
        line_id: LineId,
        quantity: i64,
    ) -> Result<Option<Cart>, CartStoreError> {
        let _write = self.inner.writes.lock().await;

        let Some((cart_id, merchandise_id)) = self.read().cart.as_ref().and_then(|cart| {
            cart.line(&line_id)
                .map(|line| (cart.id.clone(), line.merchandise.id.clone()))
        }) else {
            debug!("No matching cart line, ignoring update");
            return Ok(None);
        };

        if quantity <= 0 {
            return self.remove_locked(line_id).await;
        }

        self.begin();
        let result = self
            .inner
            .api
            .update_lines(
                &cart_id,
                vec![CartLineUpdateInput {
                    id: line_id,
                    merchandise_id,
                    quantity,
                }],
            )
            .await;
        self.settle(result).await.map(Some)
    }

    async fn initialize_locked(&self) -> Result<Cart, CartStoreError> {
        self.begin();

        if let Some(cart_id) = self.cart_id() {
            match self.inner.api.get_cart(&cart_id).await {
                Ok(Some(cart)) => return Ok(self.commit(cart).await),
                Ok(None) => debug!(cart_id = %cart_id, "Held cart no longer exists"),
                Err(e) => warn!(
                    error = %e,
                    cart_id = %cart_id,
                    "Failed to fetch existing cart, creating new one"
                ),
            }
        }

        let result = self.inner.api.create_cart().await;
        self.settle(result).await
    }

    async fn remove_locked(&self, line_id: LineId) -> Result<Option<Cart>, CartStoreError> {
        let Some(cart_id) = self.cart_id() else {
            debug!("No cart, ignoring removal");
            return Ok(None);
        };

        self.begin();
        let result = self.inner.api.remove_lines(&cart_id, vec![line_id]).await;
        self.settle(result).await.map(Some)
    }

    // =========================================================================
    // State transitions
    // =========================================================================

    fn cart_id(&self) -> Option<shopfront_core::CartId> {
        self.read().cart.as_ref().map(|c| c.id.clone())
    }

    fn begin(&self) {
        let mut state = self.write();
        state.is_loading = true;
        state.error = None;
    }

    async fn settle(&self, result: Result<Cart, ShopifyError>) -> Result<Cart, CartStoreError> {
        match result {
            Ok(cart) => Ok(self.commit(cart).await),
            Err(e) => Err(self.fail(e.into())),
        }
    }

    async fn commit(&self, cart: Cart) -> Cart {
        {
            let mut state = self.write();
            state.cart = Some(cart.clone());
            state.is_loading = false;
        }
        self.persist(&cart).await;
        cart
    }

    fn fail(&self, error: CartStoreError) -> CartStoreError {
        warn!(error = %error, kind = ?error.kind(), "Cart operation failed");
        let mut state = self.write();
        state.error = Some(error.to_string());
        state.is_loading = false;
        error
    }

    async fn persist(&self, cart: &Cart) {
        if let Some(storage) = &self.inner.storage
            && let Err(e) = storage.save(Some(cart)).await
        {
            warn!(error = %e, "Failed to persist cart");
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, CartState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CartState> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &*self.read())
            .field("storage", &self.inner.storage)
            .finish_non_exhaustive()
    }
}
