//! In-memory commerce backend.
//!
//! Behaves like the hosted Storefront API for the subset of behavior the
//! cart store depends on: it owns cart state, assigns ids, and computes
//! quantities and costs. Catalog data is fixed at construction.
//!
//! Carts live in memory, or in `mock-backend.json` under the data directory
//! when built with [`MockStorefront::persistent`], so that carts survive
//! between CLI invocations.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopfront_core::{CartId, LineId, MerchandiseId, ProductId, parse_amount};

use crate::shopify::types::{
    Cart, CartCost, CartLine, CartLineCost, CartLineInput, CartLineUpdateInput, CartMerchandise,
    CartMerchandiseProduct, CartUserError, Collection, Image, Money, PageInfo, PriceRange,
    Product, ProductConnection, ProductOption, ProductSortKey, ProductVariant, ProductsQuery,
    SelectedOption, Seo,
};
use crate::cart::{read_json, write_json_atomic};
use crate::shopify::{ShopifyError, StorefrontApi, operation};

/// File holding the cart table of a persistent mock backend.
pub const MOCK_BACKEND_FILE: &str = "mock-backend.json";

const MOCK_CHECKOUT_HOST: &str = "https://checkout.shopfront.test";
const COLLECTIONS_LIMIT: usize = 100;
const QUANTITY_LIMIT: &str = "The quantity exceeds the maximum allowed.";

/// In-memory [`StorefrontApi`] implementation.
pub struct MockStorefront {
    state: Mutex<MockState>,
    journal: Option<Journal>,
}

/// Backing file for the cart table. Writes are serialized so the file
/// always holds the latest table.
struct Journal {
    path: PathBuf,
    writes: tokio::sync::Mutex<()>,
}

struct MockState {
    products: Vec<Product>,
    collections: Vec<MockCollection>,
    table: CartTable,
}

#[derive(Clone, Serialize, Deserialize)]
struct CartTable {
    carts: Vec<MockCart>,
    next_cart: u64,
    next_line: u64,
}

impl Default for CartTable {
    fn default() -> Self {
        Self {
            carts: Vec::new(),
            next_cart: 1,
            next_line: 1,
        }
    }
}

struct MockCollection {
    collection: Collection,
    product_handles: Vec<String>,
}

#[derive(Clone, Serialize, Deserialize)]
struct MockCart {
    id: CartId,
    token: String,
    lines: Vec<MockLine>,
}

#[derive(Clone, Serialize, Deserialize)]
struct MockLine {
    id: LineId,
    merchandise_id: MerchandiseId,
    quantity: i64,
}

impl MockStorefront {
    /// Create a backend serving the given catalog.
    ///
    /// Each collection is paired with the handles of its member products.
    #[must_use]
    pub fn new(products: Vec<Product>, collections: Vec<(Collection, Vec<String>)>) -> Self {
        Self {
            state: Mutex::new(MockState {
                products,
                collections: collections
                    .into_iter()
                    .map(|(collection, product_handles)| MockCollection {
                        collection,
                        product_handles,
                    })
                    .collect(),
                table: CartTable::default(),
            }),
            journal: None,
        }
    }

    /// Create a backend with the demo catalog.
    #[must_use]
    pub fn seeded() -> Self {
        let products = vec![classic_manicure(), gel_polish_trio()];
        let featured = products.iter().map(|p| p.handle.clone()).collect();
        Self::new(products, vec![(featured_nails(), featured)])
    }

    /// Create a backend with the demo catalog whose carts are kept in
    /// [`MOCK_BACKEND_FILE`] under `data_dir`.
    ///
    /// A file that cannot be read is logged and replaced on the next cart
    /// write.
    pub async fn persistent(data_dir: impl AsRef<Path>) -> Self {
        let path = data_dir.as_ref().join(MOCK_BACKEND_FILE);
        let table = match read_json::<CartTable>(&path).await {
            Ok(table) => table.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %path.display(),
                    "Ignoring unreadable mock backend file"
                );
                CartTable::default()
            }
        };

        let mut backend = Self::seeded();
        backend
            .state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .table = table;
        backend.journal = Some(Journal {
            path,
            writes: tokio::sync::Mutex::new(()),
        });
        backend
    }

    /// Forget a cart, as if it had expired on the backend.
    ///
    /// Returns whether the cart existed. The backing file, if any, catches
    /// up on the next cart write.
    pub fn expire_cart(&self, cart_id: &CartId) -> bool {
        let mut state = self.lock();
        let carts = &mut state.table.carts;
        let before = carts.len();
        carts.retain(|c| &c.id != cart_id);
        carts.len() != before
    }

    /// Number of carts currently held.
    #[must_use]
    pub fn cart_count(&self) -> usize {
        self.lock().table.carts.len()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a cart mutation, then write the table to the backing file.
    async fn write<T, F>(&self, apply: F) -> Result<T, ShopifyError>
    where
        F: FnOnce(&mut MockState) -> Result<T, ShopifyError> + Send,
        T: Send,
    {
        let Some(journal) = &self.journal else {
            return apply(&mut self.lock());
        };

        let _serial = journal.writes.lock().await;
        let (result, table) = {
            let mut state = self.lock();
            let result = apply(&mut state);
            let table = result.is_ok().then(|| state.table.clone());
            (result, table)
        };

        if let Some(table) = table
            && let Err(e) = write_json_atomic(&journal.path, &table).await
        {
            tracing::warn!(error = %e, "Failed to write mock backend file");
        }
        result
    }
}

impl Default for MockStorefront {
    fn default() -> Self {
        Self::seeded()
    }
}

// =============================================================================
// Catalog queries
// =============================================================================

impl MockState {
    fn variant(&self, id: &MerchandiseId) -> Option<(&Product, &ProductVariant)> {
        self.products.iter().find_map(|product| {
            product
                .variants
                .iter()
                .find(|v| &v.id == id)
                .map(|variant| (product, variant))
        })
    }

    fn product_page(
        &self,
        handles: Option<&[String]>,
        query: &ProductsQuery,
    ) -> ProductConnection {
        let mut matching: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| handles.is_none_or(|hs| hs.contains(&p.handle)))
            .filter(|p| query.query.as_deref().is_none_or(|q| matches_search(p, q)))
            .collect();

        sort_products(&mut matching, query.sort_key);
        if query.reverse {
            matching.reverse();
        }

        let start = query
            .after
            .as_deref()
            .and_then(decode_cursor)
            .map_or(0, |index| index + 1)
            .min(matching.len());
        let first = usize::try_from(query.first).unwrap_or(0);
        let end = start.saturating_add(first).min(matching.len());

        let products: Vec<Product> = matching
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|p| (*p).clone())
            .collect();

        let page_info = PageInfo {
            has_next_page: end < matching.len(),
            has_previous_page: start > 0,
            start_cursor: (start < end).then(|| encode_cursor(start)),
            end_cursor: (start < end).then(|| encode_cursor(end - 1)),
        };

        ProductConnection {
            products,
            page_info,
        }
    }
}

fn matches_search(product: &Product, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    needle.is_empty()
        || product.title.to_lowercase().contains(&needle)
        || product.vendor.to_lowercase().contains(&needle)
        || product.product_type.to_lowercase().contains(&needle)
        || product.tags.iter().any(|t| t.to_lowercase() == needle)
}

fn sort_products(products: &mut [&Product], sort_key: ProductSortKey) {
    match sort_key {
        ProductSortKey::Title => products.sort_by(|a, b| a.title.cmp(&b.title)),
        ProductSortKey::ProductType => products.sort_by(|a, b| a.product_type.cmp(&b.product_type)),
        ProductSortKey::Vendor => products.sort_by(|a, b| a.vendor.cmp(&b.vendor)),
        ProductSortKey::UpdatedAt => products.sort_by(|a, b| a.updated_at.cmp(&b.updated_at)),
        ProductSortKey::CreatedAt => products.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        ProductSortKey::Id => products.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str())),
        ProductSortKey::Price => products.sort_by_key(|p| {
            parse_amount(&p.price_range.min_variant_price.amount).unwrap_or_default()
        }),
        ProductSortKey::BestSelling | ProductSortKey::Relevance => {}
    }
}

fn encode_cursor(index: usize) -> String {
    format!("cursor:{index}")
}

fn decode_cursor(cursor: &str) -> Option<usize> {
    cursor.strip_prefix("cursor:")?.parse().ok()
}

/// Sum of line quantities, `None` on overflow.
fn total_quantity(quantities: impl IntoIterator<Item = i64>) -> Option<i64> {
    quantities.into_iter().try_fold(0_i64, i64::checked_add)
}

// =============================================================================
// Cart mutations
// =============================================================================

fn user_error(field: &[&str], message: impl Into<String>) -> CartUserError {
    CartUserError {
        field: field.iter().map(ToString::to_string).collect(),
        message: message.into(),
    }
}

fn missing_cart() -> CartUserError {
    user_error(&["cartId"], "The specified cart does not exist.")
}

fn rejected(operation: &'static str, errors: Vec<CartUserError>) -> ShopifyError {
    ShopifyError::UserErrors { operation, errors }
}

impl MockState {
    fn cart(&self, id: &CartId) -> Option<&MockCart> {
        self.table.carts.iter().find(|c| &c.id == id)
    }

    fn cart_mut(&mut self, id: &CartId) -> Option<&mut MockCart> {
        self.table.carts.iter_mut().find(|c| &c.id == id)
    }

    fn create_cart(&mut self) -> CartId {
        let token = format!("mock-{}", self.table.next_cart);
        self.table.next_cart += 1;
        let id = CartId::new(format!("gid://shopify/Cart/{token}"));
        self.table.carts.push(MockCart {
            id: id.clone(),
            token,
            lines: Vec::new(),
        });
        id
    }

    /// Unknown and sold-out merchandise are rejected.
    fn check_merchandise(
        &self,
        field: &[&str],
        id: &MerchandiseId,
        errors: &mut Vec<CartUserError>,
    ) {
        match self.variant(id) {
            None => errors.push(user_error(
                field,
                format!("The merchandise with id {id} does not exist."),
            )),
            Some((_, variant)) if !variant.available_for_sale => errors.push(user_error(
                field,
                format!("The merchandise with id {id} is out of stock."),
            )),
            Some(_) => {}
        }
    }

    fn add_lines(&mut self, cart_id: &CartId, lines: Vec<CartLineInput>) -> Result<(), ShopifyError> {
        let Some(cart) = self.cart(cart_id) else {
            return Err(rejected(operation::ADD_TO_CART, vec![missing_cart()]));
        };

        let mut quantities: Vec<(MerchandiseId, i64)> = cart
            .lines
            .iter()
            .map(|l| (l.merchandise_id.clone(), l.quantity))
            .collect();
        let mut errors = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            let index = index.to_string();
            if line.quantity <= 0 {
                errors.push(user_error(
                    &["lines", &index, "quantity"],
                    "The quantity must be greater than 0.",
                ));
            }
            self.check_merchandise(
                &["lines", &index, "merchandiseId"],
                &line.merchandise_id,
                &mut errors,
            );

            let within_limit = if let Some((_, quantity)) = quantities
                .iter_mut()
                .find(|(id, _)| id == &line.merchandise_id)
            {
                match quantity.checked_add(line.quantity) {
                    Some(sum) => {
                        *quantity = sum;
                        true
                    }
                    None => false,
                }
            } else {
                quantities.push((line.merchandise_id.clone(), line.quantity));
                true
            };
            if !within_limit {
                errors.push(user_error(&["lines", &index, "quantity"], QUANTITY_LIMIT));
            }
        }
        if errors.is_empty() && total_quantity(quantities.iter().map(|(_, q)| *q)).is_none() {
            errors.push(user_error(&["lines"], QUANTITY_LIMIT));
        }
        if !errors.is_empty() {
            return Err(rejected(operation::ADD_TO_CART, errors));
        }

        let mut next_line = self.table.next_line;
        let Some(cart) = self.cart_mut(cart_id) else {
            return Err(rejected(operation::ADD_TO_CART, vec![missing_cart()]));
        };
        for line in lines {
            if let Some(existing) = cart
                .lines
                .iter_mut()
                .find(|l| l.merchandise_id == line.merchandise_id)
            {
                existing.quantity = existing.quantity.saturating_add(line.quantity);
            } else {
                cart.lines.push(MockLine {
                    id: LineId::new(format!("gid://shopify/CartLine/{next_line}")),
                    merchandise_id: line.merchandise_id,
                    quantity: line.quantity,
                });
                next_line += 1;
            }
        }
        self.table.next_line = next_line;
        Ok(())
    }

    fn update_lines(
        &mut self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<(), ShopifyError> {
        let Some(cart) = self.cart(cart_id) else {
            return Err(rejected(operation::UPDATE_CART, vec![missing_cart()]));
        };

        let mut errors = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            let index = index.to_string();
            if !cart.lines.iter().any(|l| l.id == line.id) {
                errors.push(user_error(
                    &["lines", &index, "id"],
                    format!("The cart line with id {} does not exist.", line.id),
                ));
            }
            if line.quantity < 0 {
                errors.push(user_error(
                    &["lines", &index, "quantity"],
                    "The quantity must not be negative.",
                ));
            }
            self.check_merchandise(
                &["lines", &index, "merchandiseId"],
                &line.merchandise_id,
                &mut errors,
            );
        }

        let projected = cart.lines.iter().map(|l| {
            lines
                .iter()
                .rev()
                .find(|u| u.id == l.id)
                .map_or(l.quantity, |u| u.quantity)
        });
        if errors.is_empty() && total_quantity(projected).is_none() {
            errors.push(user_error(&["lines"], QUANTITY_LIMIT));
        }
        if !errors.is_empty() {
            return Err(rejected(operation::UPDATE_CART, errors));
        }

        let Some(cart) = self.cart_mut(cart_id) else {
            return Err(rejected(operation::UPDATE_CART, vec![missing_cart()]));
        };
        for update in lines {
            if let Some(line) = cart.lines.iter_mut().find(|l| l.id == update.id) {
                line.quantity = update.quantity;
                line.merchandise_id = update.merchandise_id;
            }
        }
        cart.lines.retain(|l| l.quantity > 0);
        Ok(())
    }

    fn remove_lines(&mut self, cart_id: &CartId, line_ids: &[LineId]) -> Result<(), ShopifyError> {
        let Some(cart) = self.cart_mut(cart_id) else {
            return Err(rejected(operation::REMOVE_FROM_CART, vec![missing_cart()]));
        };

        let errors: Vec<CartUserError> = line_ids
            .iter()
            .enumerate()
            .filter(|(_, id)| !cart.lines.iter().any(|l| &l.id == *id))
            .map(|(index, id)| {
                user_error(
                    &["lineIds", &index.to_string()],
                    format!("The cart line with id {id} does not exist."),
                )
            })
            .collect();
        if !errors.is_empty() {
            return Err(rejected(operation::REMOVE_FROM_CART, errors));
        }

        cart.lines.retain(|l| !line_ids.contains(&l.id));
        Ok(())
    }

    /// Build the client-facing view of a stored cart.
    fn render_cart(&self, cart_id: &CartId) -> Option<Cart> {
        let cart = self.cart(cart_id)?;

        let mut subtotal = Decimal::ZERO;
        let mut currency = "USD".to_string();
        let mut lines = Vec::with_capacity(cart.lines.len());

        for line in &cart.lines {
            let Some((product, variant)) = self.variant(&line.merchandise_id) else {
                continue;
            };
            let unit = parse_amount(&variant.price.amount).unwrap_or_default();
            let line_total = unit * Decimal::from(line.quantity);
            subtotal += line_total;
            currency.clone_from(&variant.price.currency_code);

            lines.push(CartLine {
                id: line.id.clone(),
                quantity: line.quantity,
                cost: CartLineCost {
                    total_amount: money(line_total, &currency),
                },
                merchandise: CartMerchandise {
                    id: variant.id.clone(),
                    title: variant.title.clone(),
                    selected_options: variant.selected_options.clone(),
                    product: CartMerchandiseProduct {
                        id: product.id.clone(),
                        handle: product.handle.clone(),
                        title: product.title.clone(),
                        images: product.images.iter().take(1).cloned().collect(),
                    },
                },
            });
        }

        Some(Cart {
            id: cart.id.clone(),
            checkout_url: format!("{MOCK_CHECKOUT_HOST}/cart/c/{}", cart.token),
            cost: CartCost {
                subtotal: money(subtotal, &currency),
                total: money(subtotal, &currency),
                total_tax: None,
            },
            total_quantity: total_quantity(lines.iter().map(|l| l.quantity))
                .unwrap_or(i64::MAX),
            lines,
        })
    }

    fn cart_after(&self, cart_id: &CartId, operation: &'static str) -> Result<Cart, ShopifyError> {
        self.render_cart(cart_id)
            .ok_or(ShopifyError::MissingPayload(operation))
    }
}

#[async_trait]
impl StorefrontApi for MockStorefront {
    async fn get_product(&self, handle: &str) -> Result<Option<Product>, ShopifyError> {
        Ok(self
            .lock()
            .products
            .iter()
            .find(|p| p.handle == handle)
            .cloned())
    }

    async fn get_products(&self, query: ProductsQuery) -> Result<ProductConnection, ShopifyError> {
        Ok(self.lock().product_page(None, &query))
    }

    async fn get_collections(&self) -> Result<Vec<Collection>, ShopifyError> {
        Ok(self
            .lock()
            .collections
            .iter()
            .take(COLLECTIONS_LIMIT)
            .map(|c| c.collection.clone())
            .collect())
    }

    async fn get_collection(
        &self,
        handle: &str,
        first: i64,
    ) -> Result<Option<Collection>, ShopifyError> {
        let state = self.lock();
        let Some(entry) = state
            .collections
            .iter()
            .find(|c| c.collection.handle == handle)
        else {
            return Ok(None);
        };

        let query = ProductsQuery {
            first,
            ..ProductsQuery::default()
        };
        let mut collection = entry.collection.clone();
        collection.products = Some(state.product_page(Some(&entry.product_handles), &query));
        Ok(Some(collection))
    }

    async fn create_cart(&self) -> Result<Cart, ShopifyError> {
        let cart = self
            .write(|state| {
                let id = state.create_cart();
                state.cart_after(&id, operation::CREATE_CART)
            })
            .await?;
        tracing::debug!(cart_id = %cart.id, "Mock cart created");
        Ok(cart)
    }

    async fn add_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError> {
        self.write(|state| {
            state.add_lines(cart_id, lines)?;
            state.cart_after(cart_id, operation::ADD_TO_CART)
        })
        .await
    }

    async fn update_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdateInput>,
    ) -> Result<Cart, ShopifyError> {
        self.write(|state| {
            state.update_lines(cart_id, lines)?;
            state.cart_after(cart_id, operation::UPDATE_CART)
        })
        .await
    }

    async fn remove_lines(
        &self,
        cart_id: &CartId,
        line_ids: Vec<LineId>,
    ) -> Result<Cart, ShopifyError> {
        self.write(|state| {
            state.remove_lines(cart_id, &line_ids)?;
            state.cart_after(cart_id, operation::REMOVE_FROM_CART)
        })
        .await
    }

    async fn get_cart(&self, cart_id: &CartId) -> Result<Option<Cart>, ShopifyError> {
        Ok(self.lock().render_cart(cart_id))
    }
}

// =============================================================================
// Demo catalog
// =============================================================================

fn money(amount: Decimal, currency_code: &str) -> Money {
    let mut amount = amount;
    amount.rescale(2);
    Money {
        amount: amount.to_string(),
        currency_code: currency_code.to_string(),
    }
}

fn usd(amount: &str) -> Money {
    Money {
        amount: amount.to_string(),
        currency_code: "USD".to_string(),
    }
}

fn image(id: &str, url: &str, alt: &str) -> Image {
    Image {
        id: Some(id.to_string()),
        url: url.to_string(),
        alt_text: Some(alt.to_string()),
        width: Some(800),
        height: Some(600),
    }
}

fn classic_manicure() -> Product {
    let description =
        "Professional nail care with classic polish application. Perfect for everyday elegance.";
    Product {
        id: ProductId::new("gid://shopify/Product/1"),
        handle: "classic-manicure".to_string(),
        title: "Classic Manicure Set".to_string(),
        description: description.to_string(),
        description_html: format!("<p>{description}</p>"),
        available_for_sale: true,
        total_inventory: Some(100),
        tags: vec![
            "manicure".to_string(),
            "classic".to_string(),
            "professional".to_string(),
        ],
        vendor: "Demo Brand".to_string(),
        product_type: "Nail Care".to_string(),
        created_at: Some("2024-01-01T00:00:00Z".to_string()),
        updated_at: Some("2024-01-01T00:00:00Z".to_string()),
        published_at: Some("2024-01-01T00:00:00Z".to_string()),
        images: vec![image(
            "1",
            "https://images.unsplash.com/photo-1522337360788-8b13dee7a37e?w=800&h=600&fit=crop",
            "Classic manicure set",
        )],
        variants: vec![ProductVariant {
            id: MerchandiseId::new("gid://shopify/ProductVariant/1"),
            title: "Default Title".to_string(),
            available_for_sale: true,
            selected_options: vec![],
            price: usd("35.00"),
            compare_at_price: None,
            image: None,
        }],
        options: vec![],
        price_range: PriceRange {
            min_variant_price: usd("35.00"),
            max_variant_price: usd("35.00"),
        },
        compare_at_price_range: PriceRange {
            min_variant_price: usd("0.00"),
            max_variant_price: usd("0.00"),
        },
        seo: Seo {
            title: Some("Classic Manicure Set - Professional Nail Care".to_string()),
            description: Some(description.to_string()),
        },
    }
}

fn gel_polish_trio() -> Product {
    let description = "Three long-wear gel shades in a travel-ready case.";
    let variant = |id: &str, size: &str, price: &str, compare_at: &str, available: bool| {
        ProductVariant {
            id: MerchandiseId::new(id),
            title: size.to_string(),
            available_for_sale: available,
            selected_options: vec![SelectedOption {
                name: "Size".to_string(),
                value: size.to_string(),
            }],
            price: usd(price),
            compare_at_price: Some(usd(compare_at)),
            image: None,
        }
    };

    Product {
        id: ProductId::new("gid://shopify/Product/2"),
        handle: "gel-polish-trio".to_string(),
        title: "Gel Polish Trio".to_string(),
        description: description.to_string(),
        description_html: format!("<p>{description}</p>"),
        available_for_sale: true,
        total_inventory: Some(12),
        tags: vec!["gel".to_string(), "polish".to_string()],
        vendor: "Demo Brand".to_string(),
        product_type: "Polish".to_string(),
        created_at: Some("2024-02-01T00:00:00Z".to_string()),
        updated_at: Some("2024-02-01T00:00:00Z".to_string()),
        published_at: Some("2024-02-01T00:00:00Z".to_string()),
        images: vec![],
        variants: vec![
            variant("gid://shopify/ProductVariant/21", "Mini", "24.00", "30.00", true),
            variant("gid://shopify/ProductVariant/22", "Full", "48.00", "60.00", false),
        ],
        options: vec![ProductOption {
            id: "gid://shopify/ProductOption/2".to_string(),
            name: "Size".to_string(),
            values: vec!["Mini".to_string(), "Full".to_string()],
        }],
        price_range: PriceRange {
            min_variant_price: usd("24.00"),
            max_variant_price: usd("48.00"),
        },
        compare_at_price_range: PriceRange {
            min_variant_price: usd("30.00"),
            max_variant_price: usd("60.00"),
        },
        seo: Seo::default(),
    }
}

fn featured_nails() -> Collection {
    let description = "Our most popular nail designs and collections";
    Collection {
        id: "gid://shopify/Collection/1".to_string(),
        handle: "featured-nails".to_string(),
        title: "Featured Nails".to_string(),
        description: description.to_string(),
        description_html: format!("<p>{description}</p>"),
        image: Some(Image {
            id: Some("1".to_string()),
            url: "https://images.unsplash.com/photo-1604654894610-df63bc536371?w=800&h=600&fit=crop"
                .to_string(),
            alt_text: Some("Featured nail collection".to_string()),
            width: None,
            height: None,
        }),
        seo: Seo {
            title: Some("Featured Nails Collection".to_string()),
            description: Some(description.to_string()),
        },
        updated_at: Some("2024-01-01T00:00:00Z".to_string()),
        products: None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::shopify::ErrorKind;

    fn manicure() -> MerchandiseId {
        MerchandiseId::new("gid://shopify/ProductVariant/1")
    }

    fn gel_mini() -> MerchandiseId {
        MerchandiseId::new("gid://shopify/ProductVariant/21")
    }

    fn add(merchandise_id: MerchandiseId, quantity: i64) -> Vec<CartLineInput> {
        vec![CartLineInput {
            merchandise_id,
            quantity,
        }]
    }

    #[tokio::test]
    async fn test_seeded_catalog() {
        let api = MockStorefront::seeded();

        let product = api.get_product("classic-manicure").await.unwrap().unwrap();
        assert_eq!(product.title, "Classic Manicure Set");
        assert_eq!(product.price_range.min_variant_price.amount, "35.00");
        assert!(!product.is_on_sale());

        assert!(api.get_product("nope").await.unwrap().is_none());

        let collections = api.get_collections().await.unwrap();
        assert_eq!(collections.len(), 1);
        assert!(collections[0].products.is_none());
    }

    #[tokio::test]
    async fn test_collection_embeds_products() {
        let api = MockStorefront::seeded();
        let collection = api
            .get_collection("featured-nails", 1)
            .await
            .unwrap()
            .unwrap();
        let page = collection.products.unwrap();
        assert_eq!(page.products.len(), 1);
        assert!(page.page_info.has_next_page);

        assert!(api.get_collection("missing", 10).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_products_search_sort_and_paging() {
        let api = MockStorefront::seeded();

        let page = api
            .get_products(ProductsQuery {
                query: Some("gel".to_string()),
                ..ProductsQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(page.products.len(), 1);
        assert_eq!(page.products[0].handle, "gel-polish-trio");

        let first = api
            .get_products(ProductsQuery {
                sort_key: ProductSortKey::Price,
                reverse: true,
                first: 1,
                ..ProductsQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(first.products[0].handle, "classic-manicure");
        assert!(first.page_info.has_next_page);

        let second = api
            .get_products(ProductsQuery {
                sort_key: ProductSortKey::Price,
                reverse: true,
                first: 1,
                after: first.page_info.end_cursor,
                ..ProductsQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(second.products[0].handle, "gel-polish-trio");
        assert!(!second.page_info.has_next_page);
        assert!(second.page_info.has_previous_page);
    }

    #[tokio::test]
    async fn test_create_cart_is_empty() {
        let api = MockStorefront::seeded();
        let cart = api.create_cart().await.unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.total_quantity, 0);
        assert_eq!(cart.cost.subtotal.amount, "0.00");
        assert!(cart.checkout_url.starts_with(MOCK_CHECKOUT_HOST));
    }

    #[tokio::test]
    async fn test_add_lines_merges_and_totals() {
        let api = MockStorefront::seeded();
        let cart = api.create_cart().await.unwrap();

        api.add_lines(&cart.id, add(manicure(), 1)).await.unwrap();
        let cart = api.add_lines(&cart.id, add(manicure(), 2)).await.unwrap();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity, 3);
        assert_eq!(cart.lines[0].cost.total_amount.amount, "105.00");

        let cart = api.add_lines(&cart.id, add(gel_mini(), 1)).await.unwrap();
        assert_eq!(cart.lines.len(), 2);
        assert_eq!(cart.total_quantity, 4);
        assert_eq!(cart.cost.subtotal.amount, "129.00");
        assert_eq!(cart.lines[1].merchandise.options_label(), "Mini");
    }

    #[tokio::test]
    async fn test_add_lines_rejects_bad_input() {
        let api = MockStorefront::seeded();
        let cart = api.create_cart().await.unwrap();

        let err = api
            .add_lines(&cart.id, add(MerchandiseId::new("gid://shopify/ProductVariant/999"), 1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert!(err.to_string().starts_with("Error adding to cart"));

        let err = api.add_lines(&cart.id, add(manicure(), 0)).await.unwrap_err();
        assert!(err.to_string().contains("greater than 0"));

        let unchanged = api.get_cart(&cart.id).await.unwrap().unwrap();
        assert!(unchanged.is_empty());
    }

    #[tokio::test]
    async fn test_update_to_zero_removes_line() {
        let api = MockStorefront::seeded();
        let cart = api.create_cart().await.unwrap();
        let cart = api.add_lines(&cart.id, add(manicure(), 2)).await.unwrap();
        let line = &cart.lines[0];

        let cart = api
            .update_lines(
                &cart.id,
                vec![CartLineUpdateInput {
                    id: line.id.clone(),
                    merchandise_id: line.merchandise.id.clone(),
                    quantity: 0,
                }],
            )
            .await
            .unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.cost.subtotal.amount, "0.00");
    }

    #[tokio::test]
    async fn test_remove_unknown_line_is_user_error() {
        let api = MockStorefront::seeded();
        let cart = api.create_cart().await.unwrap();
        let err = api
            .remove_lines(&cart.id, vec![LineId::new("gid://shopify/CartLine/404")])
            .await
            .unwrap_err();
        assert!(matches!(err, ShopifyError::UserErrors { .. }));
    }

    #[tokio::test]
    async fn test_expired_cart() {
        let api = MockStorefront::seeded();
        let cart = api.create_cart().await.unwrap();
        assert!(api.expire_cart(&cart.id));
        assert!(!api.expire_cart(&cart.id));

        assert!(api.get_cart(&cart.id).await.unwrap().is_none());
        let err = api.add_lines(&cart.id, add(manicure(), 1)).await.unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[tokio::test]
    async fn test_add_past_quantity_limit_is_user_error() {
        let api = MockStorefront::seeded();
        let cart = api.create_cart().await.unwrap();
        api.add_lines(&cart.id, add(manicure(), i64::MAX)).await.unwrap();

        let err = api.add_lines(&cart.id, add(manicure(), 1)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert!(err.to_string().contains("exceeds the maximum"));

        let err = api.add_lines(&cart.id, add(gel_mini(), 1)).await.unwrap_err();
        assert!(err.to_string().contains("exceeds the maximum"));

        let unchanged = api.get_cart(&cart.id).await.unwrap().unwrap();
        assert_eq!(unchanged.lines.len(), 1);
        assert_eq!(unchanged.total_quantity, i64::MAX);
    }

    #[tokio::test]
    async fn test_update_past_quantity_limit_is_user_error() {
        let api = MockStorefront::seeded();
        let cart = api.create_cart().await.unwrap();
        api.add_lines(&cart.id, add(manicure(), 1)).await.unwrap();
        let cart = api.add_lines(&cart.id, add(gel_mini(), 1)).await.unwrap();
        let line = &cart.lines[0];

        let err = api
            .update_lines(
                &cart.id,
                vec![CartLineUpdateInput {
                    id: line.id.clone(),
                    merchandise_id: line.merchandise.id.clone(),
                    quantity: i64::MAX,
                }],
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("exceeds the maximum"));
    }

    #[tokio::test]
    async fn test_add_sold_out_variant_is_user_error() {
        let api = MockStorefront::seeded();
        let cart = api.create_cart().await.unwrap();

        let err = api
            .add_lines(&cart.id, add(MerchandiseId::new("gid://shopify/ProductVariant/22"), 1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert!(err.to_string().contains("is out of stock"));
        assert!(api.get_cart(&cart.id).await.unwrap().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persistent_carts_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let first = MockStorefront::persistent(dir.path()).await;
        let cart = first.create_cart().await.unwrap();
        let cart = first.add_lines(&cart.id, add(manicure(), 2)).await.unwrap();
        assert!(dir.path().join(MOCK_BACKEND_FILE).exists());
        drop(first);

        let second = MockStorefront::persistent(dir.path()).await;
        assert_eq!(second.get_cart(&cart.id).await.unwrap(), Some(cart.clone()));

        let other = second.create_cart().await.unwrap();
        assert_ne!(other.id, cart.id);
        let cart = second.add_lines(&cart.id, add(manicure(), 1)).await.unwrap();
        assert_eq!(cart.lines[0].id.as_str(), "gid://shopify/CartLine/1");
        assert_eq!(cart.total_quantity, 3);
    }

    #[tokio::test]
    async fn test_persistent_ignores_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MOCK_BACKEND_FILE), b"{not json").unwrap();

        let api = MockStorefront::persistent(dir.path()).await;
        assert_eq!(api.cart_count(), 0);

        let cart = api.create_cart().await.unwrap();
        let reopened = MockStorefront::persistent(dir.path()).await;
        assert!(reopened.get_cart(&cart.id).await.unwrap().is_some());
    }
}
