//! Cart type conversion functions.

use shopfront_core::{CartId, LineId, MerchandiseId, ProductId};

use crate::shopify::types::{
    Cart, CartCost, CartLine, CartLineCost, CartMerchandise, CartMerchandiseProduct,
    CartUserError,
};

use super::super::queries::{CartFields, CartLineFields, UserErrorFields};
use super::{convert_image, convert_money, convert_selected_options};

pub fn convert_cart(cart: CartFields) -> Cart {
    Cart {
        id: CartId::new(cart.id),
        checkout_url: cart.checkout_url,
        cost: CartCost {
            subtotal: convert_money(cart.cost.subtotal_amount),
            total: convert_money(cart.cost.total_amount),
            total_tax: cart.cost.total_tax_amount.map(convert_money),
        },
        lines: cart
            .lines
            .into_nodes()
            .into_iter()
            .map(convert_cart_line)
            .collect(),
        total_quantity: cart.total_quantity,
    }
}

fn convert_cart_line(line: CartLineFields) -> CartLine {
    let merchandise = line.merchandise;
    let product = merchandise.product;

    CartLine {
        id: LineId::new(line.id),
        quantity: line.quantity,
        cost: CartLineCost {
            total_amount: convert_money(line.cost.total_amount),
        },
        merchandise: CartMerchandise {
            id: MerchandiseId::new(merchandise.id),
            title: merchandise.title,
            selected_options: convert_selected_options(merchandise.selected_options),
            product: CartMerchandiseProduct {
                id: ProductId::new(product.id),
                handle: product.handle,
                title: product.title,
                images: product
                    .images
                    .into_nodes()
                    .into_iter()
                    .map(convert_image)
                    .collect(),
            },
        },
    }
}

pub fn convert_user_errors(errors: Vec<UserErrorFields>) -> Vec<CartUserError> {
    errors
        .into_iter()
        .map(|e| CartUserError {
            field: e.field.unwrap_or_default(),
            message: e.message,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cart_json() -> serde_json::Value {
        serde_json::json!({
            "id": "gid://shopify/Cart/c1",
            "checkoutUrl": "https://shop.example/cart/c/c1",
            "cost": {
                "subtotalAmount": {"amount": "70.0", "currencyCode": "USD"},
                "totalAmount": {"amount": "75.6", "currencyCode": "USD"},
                "totalTaxAmount": null
            },
            "lines": {"edges": [
                {"node": {
                    "id": "gid://shopify/CartLine/1",
                    "quantity": 2,
                    "cost": {"totalAmount": {"amount": "70.0", "currencyCode": "USD"}},
                    "merchandise": {
                        "id": "gid://shopify/ProductVariant/42",
                        "title": "Large",
                        "selectedOptions": [{"name": "Size", "value": "Large"}],
                        "product": {
                            "id": "gid://shopify/Product/1",
                            "handle": "classic-manicure",
                            "title": "Classic Manicure Set",
                            "images": {"edges": []}
                        }
                    }
                }}
            ]},
            "totalQuantity": 2
        })
    }

    #[test]
    fn test_convert_cart_flattens_lines() {
        let fields: CartFields = serde_json::from_value(cart_json()).unwrap();
        let cart = convert_cart(fields);

        assert_eq!(cart.id, CartId::new("gid://shopify/Cart/c1"));
        assert_eq!(cart.total_quantity, 2);
        assert_eq!(cart.cost.subtotal.amount, "70.0");
        assert!(cart.cost.total_tax.is_none());
        assert_eq!(cart.lines.len(), 1);

        let line = &cart.lines[0];
        assert_eq!(line.id, LineId::new("gid://shopify/CartLine/1"));
        assert_eq!(
            line.merchandise.id,
            MerchandiseId::new("gid://shopify/ProductVariant/42")
        );
        assert_eq!(line.merchandise.options_label(), "Large");
        assert!(line.merchandise.product.images.is_empty());
    }

    #[test]
    fn test_convert_cart_takes_totals_verbatim() {
        let mut json = cart_json();
        // Backend totals disagree with the lines on purpose.
        json["totalQuantity"] = serde_json::json!(5);
        let cart = convert_cart(serde_json::from_value(json).unwrap());
        assert_eq!(cart.total_quantity, 5);
        assert_eq!(cart.cost.total.amount, "75.6");
    }

    #[test]
    fn test_convert_user_errors_defaults_missing_field() {
        let errors = convert_user_errors(vec![UserErrorFields {
            field: None,
            message: "Variant out of stock".to_string(),
        }]);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].field.is_empty());
        assert_eq!(errors[0].message, "Variant out of stock");
    }
}
