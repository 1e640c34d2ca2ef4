//! Plain-text views of catalog and cart snapshots.
//!
//! Every function here is pure: it takes data and returns the text to print.

use std::fmt::Write as _;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use shopfront_core::format_money;
use shopfront_storefront::cart::{CartState, FreeShippingStatus};
use shopfront_storefront::shopify::{Collection, Money, Product, ProductConnection};

const MAX_TAGS: usize = 3;
const PROGRESS_WIDTH: usize = 20;

/// Currency used for free-shipping amounts when no cart says otherwise.
const DEFAULT_CURRENCY: &str = "USD";

// =============================================================================
// Catalog
// =============================================================================

/// Price text as shown on a product card.
#[must_use]
pub fn price_label(product: &Product) -> String {
    let min = &product.price_range.min_variant_price;
    let mut label = if product.has_variable_pricing() {
        format!("From {}", min.display())
    } else {
        min.display()
    };

    if product.is_on_sale() {
        let compare_at = &product.compare_at_price_range.min_variant_price;
        let _ = write!(label, " (was {}) SALE", compare_at.display());
    }
    label
}

/// Compact product summary for listings.
#[must_use]
pub fn product_card(product: &Product) -> String {
    let mut out = product.title.clone();
    if !product.vendor.is_empty() {
        let _ = write!(out, " by {}", product.vendor);
    }
    let _ = write!(out, "\n  {}", price_label(product));
    if !product.available_for_sale {
        out.push_str("  [Out of Stock]");
    }
    if !product.tags.is_empty() {
        let tags: Vec<&str> = product
            .tags
            .iter()
            .take(MAX_TAGS)
            .map(String::as_str)
            .collect();
        let _ = write!(out, "\n  tags: {}", tags.join(", "));
    }
    let _ = write!(out, "\n  handle: {}", product.handle);
    out
}

/// A page of products followed by the cursor for the next page.
#[must_use]
pub fn product_list(connection: &ProductConnection) -> String {
    if connection.products.is_empty() {
        return "No products found.".to_string();
    }

    let mut out = connection
        .products
        .iter()
        .map(product_card)
        .collect::<Vec<_>>()
        .join("\n\n");

    if connection.page_info.has_next_page
        && let Some(cursor) = &connection.page_info.end_cursor
    {
        let _ = write!(out, "\n\nMore products: --after {cursor}");
    }
    out
}

/// Full product page, including the variant ids used to add to the cart.
#[must_use]
pub fn product_detail(product: &Product) -> String {
    let mut out = product_card(product);

    if !product.description.is_empty() {
        let _ = write!(out, "\n\n{}", product.description);
    }

    out.push_str("\n\nVariants:");
    for variant in &product.variants {
        let _ = write!(out, "\n  {} {}", variant.title, variant.price.display());
        if let Some(compare_at) = &variant.compare_at_price
            && compare_at.amount != variant.price.amount
        {
            let _ = write!(out, " (was {})", compare_at.display());
        }
        if !variant.available_for_sale {
            out.push_str(" [Out of Stock]");
        }
        let _ = write!(out, "\n    id: {}", variant.id);
    }
    out
}

/// Collection index.
#[must_use]
pub fn collection_list(collections: &[Collection]) -> String {
    if collections.is_empty() {
        return "No collections found.".to_string();
    }

    collections
        .iter()
        .map(|c| {
            if c.description.is_empty() {
                format!("{} ({})", c.title, c.handle)
            } else {
                format!("{} ({})\n  {}", c.title, c.handle, c.description)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collection page with its embedded products.
#[must_use]
pub fn collection_detail(collection: &Collection) -> String {
    let mut out = collection.title.clone();
    if !collection.description.is_empty() {
        let _ = write!(out, "\n{}", collection.description);
    }
    if let Some(products) = &collection.products {
        let _ = write!(out, "\n\n{}", product_list(products));
    }
    out
}

// =============================================================================
// Cart
// =============================================================================

/// "1 item" / "3 items".
#[must_use]
pub fn item_count(count: i64) -> String {
    if count == 1 {
        "1 item".to_string()
    } else {
        format!("{count} items")
    }
}

/// Free-shipping banner with a progress bar when not yet eligible.
#[must_use]
pub fn free_shipping_banner(status: &FreeShippingStatus, currency_code: &str) -> String {
    if status.eligible {
        return "You qualify for FREE shipping!".to_string();
    }

    let remaining = format_money(&status.remaining.to_string(), currency_code);
    let percent = status
        .progress_percent
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let filled = (status.progress_percent * Decimal::from(PROGRESS_WIDTH) / Decimal::ONE_HUNDRED)
        .floor()
        .to_usize()
        .unwrap_or(0)
        .min(PROGRESS_WIDTH);

    format!(
        "Add {remaining} more for FREE shipping!\n[{}{}] {percent}%",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled),
    )
}

/// Error banner shown above a view.
#[must_use]
pub fn error_banner(message: &str) -> String {
    format!("Error: {message}")
}

/// Cart view: error banner, lines, item count, subtotal, free-shipping banner.
#[must_use]
pub fn cart_view(state: &CartState, shipping: &FreeShippingStatus) -> String {
    let mut sections = Vec::new();

    if let Some(message) = &state.error {
        sections.push(error_banner(message));
    }

    let Some(cart) = state.cart.as_ref().filter(|c| !c.is_empty()) else {
        sections.push("Your cart is empty".to_string());
        return sections.join("\n\n");
    };

    sections.push(format!(
        "Shopping Cart\n{} in your cart",
        item_count(cart.total_quantity)
    ));

    let lines = cart
        .lines
        .iter()
        .map(|line| {
            let options = line.merchandise.options_label();
            let title = if options.is_empty() || line.merchandise.title == "Default Title" {
                line.merchandise.product.title.clone()
            } else {
                format!("{} ({options})", line.merchandise.product.title)
            };
            format!(
                "{} x {title}  {}\n    line: {}",
                line.quantity,
                line.cost.total_amount.display(),
                line.id
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    sections.push(lines);

    sections.push(format!(
        "Subtotal ({}): {}",
        item_count(cart.total_quantity),
        cart.cost.subtotal.display()
    ));
    sections.push(free_shipping_banner(
        shipping,
        currency_of(&cart.cost.subtotal),
    ));

    sections.join("\n\n")
}

fn currency_of(money: &Money) -> &str {
    if money.currency_code.is_empty() {
        DEFAULT_CURRENCY
    } else {
        &money.currency_code
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopfront_storefront::MockStorefront;
    use shopfront_storefront::StorefrontApi;
    use shopfront_storefront::cart::CartStore;
    use shopfront_storefront::shopify::ProductsQuery;
    use std::sync::Arc;

    use super::*;

    async fn product(handle: &str) -> Product {
        MockStorefront::seeded()
            .get_product(handle)
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_product_card_plain() {
        let card = product_card(&product("classic-manicure").await);
        assert_eq!(
            card,
            "Classic Manicure Set by Demo Brand\n  $35.00\n  tags: manicure, classic, professional\n  handle: classic-manicure"
        );
    }

    #[tokio::test]
    async fn test_price_label_variable_and_sale() {
        let label = price_label(&product("gel-polish-trio").await);
        assert_eq!(label, "From $24.00 (was $30.00) SALE");
    }

    #[tokio::test]
    async fn test_out_of_stock_and_tag_limit() {
        let mut p = product("classic-manicure").await;
        p.available_for_sale = false;
        p.tags.push("extra".to_string());

        let card = product_card(&p);
        assert!(card.contains("[Out of Stock]"));
        assert!(!card.contains("extra"));
    }

    #[tokio::test]
    async fn test_product_detail_lists_variant_ids() {
        let detail = product_detail(&product("gel-polish-trio").await);
        assert!(detail.contains("id: gid://shopify/ProductVariant/21"));
        assert!(detail.contains("Full $48.00 (was $60.00) [Out of Stock]"));
    }

    #[tokio::test]
    async fn test_product_list_paging_hint() {
        let page = MockStorefront::seeded()
            .get_products(ProductsQuery {
                first: 1,
                ..ProductsQuery::default()
            })
            .await
            .unwrap();
        assert!(product_list(&page).ends_with("More products: --after cursor:0"));
        assert_eq!(
            product_list(&ProductConnection::default()),
            "No products found."
        );
    }

    #[test]
    fn test_item_count_wording() {
        assert_eq!(item_count(0), "0 items");
        assert_eq!(item_count(1), "1 item");
        assert_eq!(item_count(2), "2 items");
    }

    #[test]
    fn test_free_shipping_banner() {
        let eligible = FreeShippingStatus {
            eligible: true,
            remaining: Decimal::ZERO,
            progress_percent: Decimal::ONE_HUNDRED,
        };
        assert_eq!(
            free_shipping_banner(&eligible, "USD"),
            "You qualify for FREE shipping!"
        );

        let halfway = FreeShippingStatus {
            eligible: false,
            remaining: Decimal::new(3950, 2),
            progress_percent: Decimal::new(50, 0),
        };
        assert_eq!(
            free_shipping_banner(&halfway, "USD"),
            "Add $39.50 more for FREE shipping!\n[##########----------] 50%"
        );
    }

    #[test]
    fn test_empty_cart_view() {
        let shipping = FreeShippingStatus {
            eligible: false,
            remaining: Decimal::new(79, 0),
            progress_percent: Decimal::ZERO,
        };
        assert_eq!(
            cart_view(&CartState::default(), &shipping),
            "Your cart is empty"
        );

        let failed = CartState {
            error: Some("Network error: timed out".to_string()),
            ..CartState::default()
        };
        assert_eq!(
            cart_view(&failed, &shipping),
            "Error: Network error: timed out\n\nYour cart is empty"
        );
    }

    #[tokio::test]
    async fn test_cart_view_with_lines() {
        let store = CartStore::new(Arc::new(MockStorefront::seeded()), None);
        store
            .add_item("gid://shopify/ProductVariant/1".into(), 2)
            .await
            .unwrap();
        store
            .add_item("gid://shopify/ProductVariant/21".into(), 1)
            .await
            .unwrap();

        let view = cart_view(&store.snapshot(), &store.free_shipping());
        assert!(view.contains("3 items in your cart"));
        assert!(view.contains("2 x Classic Manicure Set  $70.00"));
        assert!(view.contains("1 x Gel Polish Trio (Mini)  $24.00"));
        assert!(view.contains("Subtotal (3 items): $94.00"));
        assert!(view.ends_with("You qualify for FREE shipping!"));
    }
}
