//! Product type conversion functions.

use crate::shopify::types::{
    PriceRange, Product, ProductConnection, ProductOption, ProductVariant,
};
use shopfront_core::{MerchandiseId, ProductId};

use super::super::queries::{
    Connection, PriceRangeFields, ProductFields, VariantFields,
};
use super::{convert_image, convert_money, convert_page_info, convert_selected_options, convert_seo};

pub fn convert_product(p: ProductFields) -> Product {
    Product {
        id: ProductId::new(p.id),
        handle: p.handle,
        title: p.title,
        description: p.description,
        description_html: p.description_html,
        available_for_sale: p.available_for_sale,
        total_inventory: p.total_inventory,
        tags: p.tags,
        vendor: p.vendor,
        product_type: p.product_type,
        created_at: p.created_at,
        updated_at: p.updated_at,
        published_at: p.published_at,
        images: p.images.into_nodes().into_iter().map(convert_image).collect(),
        variants: p
            .variants
            .into_nodes()
            .into_iter()
            .map(convert_variant)
            .collect(),
        options: p
            .options
            .into_iter()
            .map(|o| ProductOption {
                id: o.id,
                name: o.name,
                values: o.values,
            })
            .collect(),
        price_range: convert_price_range(p.price_range),
        compare_at_price_range: convert_price_range(p.compare_at_price_range),
        seo: convert_seo(p.seo),
    }
}

pub fn convert_product_connection(connection: Connection<ProductFields>) -> ProductConnection {
    let page_info = convert_page_info(connection.page_info.clone());
    ProductConnection {
        products: connection
            .into_nodes()
            .into_iter()
            .map(convert_product)
            .collect(),
        page_info,
    }
}

fn convert_variant(v: VariantFields) -> ProductVariant {
    ProductVariant {
        id: MerchandiseId::new(v.id),
        title: v.title,
        available_for_sale: v.available_for_sale,
        selected_options: convert_selected_options(v.selected_options),
        price: convert_money(v.price),
        compare_at_price: v.compare_at_price.map(convert_money),
        image: v.image.map(convert_image),
    }
}

fn convert_price_range(r: PriceRangeFields) -> PriceRange {
    PriceRange {
        min_variant_price: convert_money(r.min_variant_price),
        max_variant_price: convert_money(r.max_variant_price),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product_json() -> serde_json::Value {
        serde_json::json!({
            "id": "gid://shopify/Product/1",
            "handle": "classic-manicure",
            "title": "Classic Manicure Set",
            "description": "Professional nail care.",
            "descriptionHtml": "<p>Professional nail care.</p>",
            "availableForSale": true,
            "totalInventory": 100,
            "tags": ["manicure", "classic"],
            "vendor": "Demo Brand",
            "productType": "Nail Care",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z",
            "publishedAt": null,
            "images": {"edges": [
                {"node": {"id": "1", "url": "https://cdn.example/a.jpg", "altText": null, "width": 800, "height": 600}},
                {"node": {"id": "2", "url": "https://cdn.example/b.jpg", "altText": "Side", "width": null, "height": null}}
            ]},
            "variants": {"edges": [
                {"node": {
                    "id": "gid://shopify/ProductVariant/1",
                    "title": "Default Title",
                    "availableForSale": true,
                    "selectedOptions": [],
                    "price": {"amount": "35.0", "currencyCode": "USD"},
                    "compareAtPrice": null,
                    "image": null
                }}
            ]},
            "options": [{"id": "o1", "name": "Title", "values": ["Default Title"]}],
            "priceRange": {
                "minVariantPrice": {"amount": "35.0", "currencyCode": "USD"},
                "maxVariantPrice": {"amount": "35.0", "currencyCode": "USD"}
            },
            "compareAtPriceRange": {
                "minVariantPrice": {"amount": "0.0", "currencyCode": "USD"},
                "maxVariantPrice": {"amount": "0.0", "currencyCode": "USD"}
            },
            "seo": {"title": null, "description": null}
        })
    }

    #[test]
    fn test_convert_product_flattens_connections() {
        let fields: ProductFields = serde_json::from_value(product_json()).unwrap();
        let product = convert_product(fields);

        assert_eq!(product.images.len(), 2);
        assert_eq!(product.images[1].alt_text.as_deref(), Some("Side"));
        assert_eq!(product.variants.len(), 1);
        assert_eq!(
            product.variants[0].id,
            MerchandiseId::new("gid://shopify/ProductVariant/1")
        );
        assert!(product.variants[0].compare_at_price.is_none());
        assert_eq!(product.options[0].values, vec!["Default Title"]);
        assert!(!product.is_on_sale());
    }

    #[test]
    fn test_convert_product_connection_page_info() {
        let connection: Connection<ProductFields> = serde_json::from_value(serde_json::json!({
            "edges": [{"node": product_json()}],
            "pageInfo": {
                "hasNextPage": true,
                "hasPreviousPage": false,
                "startCursor": "a",
                "endCursor": "b"
            }
        }))
        .unwrap();

        let page = convert_product_connection(connection);
        assert_eq!(page.products.len(), 1);
        assert!(page.page_info.has_next_page);
        assert_eq!(page.page_info.end_cursor.as_deref(), Some("b"));
    }

    #[test]
    fn test_missing_nested_connections_become_empty() {
        let mut json = product_json();
        let object = json.as_object_mut().unwrap();
        object.remove("images");
        object.remove("variants");

        let product = convert_product(serde_json::from_value(json).unwrap());
        assert!(product.images.is_empty());
        assert!(product.variants.is_empty());
    }
}
