//! Type conversion functions for Shopify Storefront API responses.
//!
//! Every `{edges: [{node}]}` connection is flattened here, including the
//! nested image, variant and line connections.

pub mod cart;
pub mod collections;
pub mod products;

pub use cart::{convert_cart, convert_user_errors};
pub use collections::{convert_collection, convert_collections};
pub use products::{convert_product, convert_product_connection};

use crate::shopify::types::{Image, Money, PageInfo, SelectedOption, Seo};

use super::queries::{ImageFields, MoneyFields, PageInfoFields, SelectedOptionFields, SeoFields};

fn convert_money(m: MoneyFields) -> Money {
    Money {
        amount: m.amount,
        currency_code: m.currency_code,
    }
}

fn convert_image(i: ImageFields) -> Image {
    Image {
        id: i.id,
        url: i.url,
        alt_text: i.alt_text,
        width: i.width,
        height: i.height,
    }
}

fn convert_seo(s: SeoFields) -> Seo {
    Seo {
        title: s.title,
        description: s.description,
    }
}

fn convert_selected_options(options: Vec<SelectedOptionFields>) -> Vec<SelectedOption> {
    options
        .into_iter()
        .map(|o| SelectedOption {
            name: o.name,
            value: o.value,
        })
        .collect()
}

fn convert_page_info(p: Option<PageInfoFields>) -> PageInfo {
    let p = p.unwrap_or_default();
    PageInfo {
        has_next_page: p.has_next_page,
        has_previous_page: p.has_previous_page,
        start_cursor: p.start_cursor,
        end_cursor: p.end_cursor,
    }
}
