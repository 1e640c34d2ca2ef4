//! Domain types for the Shopify Storefront API.
//!
//! These types provide a flat, ergonomic API separate from the nested
//! edge/node wire format returned by the backend. Every connection has
//! already been flattened into a `Vec` by the time a value of these types
//! exists.

use serde::{Deserialize, Serialize};
use shopfront_core::{CartId, LineId, MerchandiseId, ProductId, parse_amount};

// =============================================================================
// Money Types
// =============================================================================

/// Monetary amount with currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Decimal amount as string (preserves precision).
    pub amount: String,
    /// ISO 4217 currency code.
    pub currency_code: String,
}

impl Money {
    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        shopfront_core::format_money(&self.amount, &self.currency_code)
    }
}

/// Price range for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Minimum price among all variants.
    pub min_variant_price: Money,
    /// Maximum price among all variants.
    pub max_variant_price: Money,
}

// =============================================================================
// Image Types
// =============================================================================

/// Product or collection image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Shopify image ID.
    pub id: Option<String>,
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
    /// Image width in pixels.
    pub width: Option<i64>,
    /// Image height in pixels.
    pub height: Option<i64>,
}

// =============================================================================
// SEO Types
// =============================================================================

/// SEO metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seo {
    /// Page title for search engines.
    pub title: Option<String>,
    /// Meta description.
    pub description: Option<String>,
}

// =============================================================================
// Product Types
// =============================================================================

/// A selected product option (e.g., Size: Large).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Option name.
    pub name: String,
    /// Selected value.
    pub value: String,
}

/// A product option with its possible values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    /// Option ID.
    pub id: String,
    /// Option name (e.g., "Size").
    pub name: String,
    /// Available values.
    pub values: Vec<String>,
}

/// A product variant (specific combination of options).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Variant ID, used as the merchandise ID when adding to a cart.
    pub id: MerchandiseId,
    /// Variant title (combination of option values).
    pub title: String,
    /// Whether this variant is available for sale.
    pub available_for_sale: bool,
    /// Selected options for this variant.
    pub selected_options: Vec<SelectedOption>,
    /// Current price.
    pub price: Money,
    /// Compare-at price (original price if on sale).
    pub compare_at_price: Option<Money>,
    /// Variant image.
    pub image: Option<Image>,
}

/// A product in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// URL handle.
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Plain text description.
    pub description: String,
    /// HTML description.
    pub description_html: String,
    /// Whether any variant is available.
    pub available_for_sale: bool,
    /// Total inventory across variants, if tracked.
    pub total_inventory: Option<i64>,
    /// Product tags.
    pub tags: Vec<String>,
    /// Vendor name.
    pub vendor: String,
    /// Product type/category.
    pub product_type: String,
    /// Creation timestamp.
    pub created_at: Option<String>,
    /// Last update timestamp.
    pub updated_at: Option<String>,
    /// Publication timestamp.
    pub published_at: Option<String>,
    /// All product images.
    pub images: Vec<Image>,
    /// Product variants.
    pub variants: Vec<ProductVariant>,
    /// Product options.
    pub options: Vec<ProductOption>,
    /// Price range across variants.
    pub price_range: PriceRange,
    /// Compare-at price range, used for sale detection.
    pub compare_at_price_range: PriceRange,
    /// SEO metadata.
    pub seo: Seo,
}

impl Product {
    /// Whether the lowest compare-at price exceeds the lowest selling price.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        let compare_at = parse_amount(&self.compare_at_price_range.min_variant_price.amount);
        let price = parse_amount(&self.price_range.min_variant_price.amount);
        matches!((compare_at, price), (Some(c), Some(p)) if c > p)
    }

    /// Whether variants are priced differently.
    #[must_use]
    pub fn has_variable_pricing(&self) -> bool {
        self.price_range.min_variant_price.amount != self.price_range.max_variant_price.amount
    }

    /// First variant that can currently be bought.
    #[must_use]
    pub fn first_available_variant(&self) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| v.available_for_sale)
    }
}

// =============================================================================
// Collection Types
// =============================================================================

/// A collection of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection ID.
    pub id: String,
    /// URL handle.
    pub handle: String,
    /// Collection title.
    pub title: String,
    /// Plain text description.
    pub description: String,
    /// HTML description.
    pub description_html: String,
    /// Collection image.
    pub image: Option<Image>,
    /// SEO metadata.
    pub seo: Seo,
    /// Last update timestamp.
    pub updated_at: Option<String>,
    /// Embedded product page (only when fetched by handle).
    pub products: Option<ProductConnection>,
}

// =============================================================================
// Pagination Types
// =============================================================================

/// Pagination information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Whether there are more items after this page.
    pub has_next_page: bool,
    /// Whether there are items before this page.
    pub has_previous_page: bool,
    /// Cursor for the first item.
    pub start_cursor: Option<String>,
    /// Cursor for the last item.
    pub end_cursor: Option<String>,
}

/// Paginated list of products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductConnection {
    /// Products in this page.
    pub products: Vec<Product>,
    /// Pagination info.
    pub page_info: PageInfo,
}

/// Sort keys for product listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductSortKey {
    Title,
    ProductType,
    Vendor,
    UpdatedAt,
    #[default]
    CreatedAt,
    BestSelling,
    Price,
    Id,
    Relevance,
}

impl std::str::FromStr for ProductSortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "title" => Ok(Self::Title),
            "producttype" => Ok(Self::ProductType),
            "vendor" => Ok(Self::Vendor),
            "updatedat" => Ok(Self::UpdatedAt),
            "createdat" => Ok(Self::CreatedAt),
            "bestselling" => Ok(Self::BestSelling),
            "price" => Ok(Self::Price),
            "id" => Ok(Self::Id),
            "relevance" => Ok(Self::Relevance),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

/// Parameters for a product listing page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductsQuery {
    /// Search query string.
    pub query: Option<String>,
    /// Sort order.
    pub sort_key: ProductSortKey,
    /// Reverse the sort order.
    pub reverse: bool,
    /// Page size.
    pub first: i64,
    /// Cursor to continue after.
    pub after: Option<String>,
}

impl ProductsQuery {
    /// Default number of products per page.
    pub const DEFAULT_PAGE_SIZE: i64 = 20;
}

impl Default for ProductsQuery {
    fn default() -> Self {
        Self {
            query: None,
            sort_key: ProductSortKey::default(),
            reverse: false,
            first: Self::DEFAULT_PAGE_SIZE,
            after: None,
        }
    }
}

// =============================================================================
// Cart Types
// =============================================================================

/// Product summary attached to a cart line's merchandise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartMerchandiseProduct {
    /// Product ID.
    pub id: ProductId,
    /// Product handle.
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Product images (at most the first one is requested).
    pub images: Vec<Image>,
}

/// Merchandise (product variant) in a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartMerchandise {
    /// Variant ID.
    pub id: MerchandiseId,
    /// Variant title.
    pub title: String,
    /// Selected options.
    pub selected_options: Vec<SelectedOption>,
    /// Parent product summary.
    pub product: CartMerchandiseProduct,
}

impl CartMerchandise {
    /// Selected option values joined for display (e.g., "Large, Red").
    #[must_use]
    pub fn options_label(&self) -> String {
        self.selected_options
            .iter()
            .map(|o| o.value.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Cost breakdown for a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineCost {
    /// Total for this line.
    pub total_amount: Money,
}

/// A line item in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Line ID, assigned by the backend.
    pub id: LineId,
    /// Quantity (always at least 1).
    pub quantity: i64,
    /// Line cost.
    pub cost: CartLineCost,
    /// Merchandise details.
    pub merchandise: CartMerchandise,
}

/// Cart cost breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCost {
    /// Subtotal before taxes.
    pub subtotal: Money,
    /// Total including taxes.
    pub total: Money,
    /// Tax amount.
    pub total_tax: Option<Money>,
}

/// A shopping cart, exactly as last returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Cart ID.
    pub id: CartId,
    /// Checkout URL.
    pub checkout_url: String,
    /// Cost breakdown.
    pub cost: CartCost,
    /// Line items.
    pub lines: Vec<CartLine>,
    /// Total quantity of all items.
    pub total_quantity: i64,
}

impl Cart {
    /// Find a line by its ID.
    #[must_use]
    pub fn line(&self, line_id: &LineId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.id == line_id)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Input for adding a line to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    /// Variant ID to add.
    pub merchandise_id: MerchandiseId,
    /// Quantity to add.
    pub quantity: i64,
}

/// Input for updating a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineUpdateInput {
    /// Line ID to update.
    pub id: LineId,
    /// Variant ID of the line.
    pub merchandise_id: MerchandiseId,
    /// New quantity.
    pub quantity: i64,
}

/// User error from a cart mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartUserError {
    /// Field path that caused the error.
    pub field: Vec<String>,
    /// Error message.
    pub message: String,
}
