//! GraphQL operations for the Shopify Storefront API.
//!
//! Each operation is a unit struct implementing [`GraphQLQuery`] with a
//! module holding its `Variables` and `ResponseData`, the same shape
//! `graphql_client` codegen produces. The documents are written by hand
//! against the fragments below so no schema file is needed at build time.
//!
//! Wire types keep the backend's `{edges: [{node}]}` connection shape;
//! flattening happens in `conversions`.

use graphql_client::{GraphQLQuery, QueryBody};
use serde::{Deserialize, Serialize};

// =============================================================================
// Fragments
// =============================================================================

macro_rules! product_fragment {
    () => {
        r"
fragment ProductFragment on Product {
  id
  handle
  title
  description
  descriptionHtml
  availableForSale
  totalInventory
  tags
  vendor
  productType
  createdAt
  updatedAt
  publishedAt
  images(first: 20) {
    edges { node { id url altText width height } }
  }
  variants(first: 250) {
    edges {
      node {
        id
        title
        availableForSale
        selectedOptions { name value }
        price { amount currencyCode }
        compareAtPrice { amount currencyCode }
        image { id url altText width height }
      }
    }
  }
  options { id name values }
  priceRange {
    minVariantPrice { amount currencyCode }
    maxVariantPrice { amount currencyCode }
  }
  compareAtPriceRange {
    minVariantPrice { amount currencyCode }
    maxVariantPrice { amount currencyCode }
  }
  seo { title description }
}
"
    };
}

macro_rules! collection_fragment {
    () => {
        r"
fragment CollectionFragment on Collection {
  id
  handle
  title
  description
  descriptionHtml
  image { id url altText width height }
  seo { title description }
  updatedAt
}
"
    };
}

macro_rules! cart_fragment {
    () => {
        r"
fragment CartFragment on Cart {
  id
  checkoutUrl
  cost {
    subtotalAmount { amount currencyCode }
    totalAmount { amount currencyCode }
    totalTaxAmount { amount currencyCode }
  }
  lines(first: 100) {
    edges {
      node {
        id
        quantity
        cost { totalAmount { amount currencyCode } }
        merchandise {
          ... on ProductVariant {
            id
            title
            selectedOptions { name value }
            product {
              id
              handle
              title
              images(first: 1) {
                edges { node { id url altText width height } }
              }
            }
          }
        }
      }
    }
  }
  totalQuantity
}
"
    };
}

macro_rules! cart_payload {
    () => {
        r"
    cart { ...CartFragment }
    userErrors { field message }
"
    };
}

// =============================================================================
// Shared Wire Types
// =============================================================================

/// Paginated list in edge/node form.
#[derive(Debug, Clone, Deserialize)]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<T>>,
    #[serde(rename = "pageInfo")]
    pub page_info: Option<PageInfoFields>,
}

impl<T> Connection<T> {
    /// Drop the edge wrappers, preserving order.
    pub fn into_nodes(self) -> Vec<T> {
        self.edges.into_iter().map(|edge| edge.node).collect()
    }
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self {
            edges: Vec::new(),
            page_info: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfoFields {
    pub has_next_page: bool,
    #[serde(default)]
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyFields {
    pub amount: String,
    pub currency_code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFields {
    pub id: Option<String>,
    pub url: String,
    pub alt_text: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeoFields {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectedOptionFields {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRangeFields {
    pub min_variant_price: MoneyFields,
    pub max_variant_price: MoneyFields,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantFields {
    pub id: String,
    pub title: String,
    pub available_for_sale: bool,
    #[serde(default)]
    pub selected_options: Vec<SelectedOptionFields>,
    pub price: MoneyFields,
    pub compare_at_price: Option<MoneyFields>,
    pub image: Option<ImageFields>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductOptionFields {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFields {
    pub id: String,
    pub handle: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_html: String,
    pub available_for_sale: bool,
    pub total_inventory: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub product_type: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub published_at: Option<String>,
    #[serde(default)]
    pub images: Connection<ImageFields>,
    #[serde(default)]
    pub variants: Connection<VariantFields>,
    #[serde(default)]
    pub options: Vec<ProductOptionFields>,
    pub price_range: PriceRangeFields,
    pub compare_at_price_range: PriceRangeFields,
    #[serde(default)]
    pub seo: SeoFields,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionFields {
    pub id: String,
    pub handle: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_html: String,
    pub image: Option<ImageFields>,
    #[serde(default)]
    pub seo: SeoFields,
    pub updated_at: Option<String>,
    pub products: Option<Connection<ProductFields>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartCostFields {
    pub subtotal_amount: MoneyFields,
    pub total_amount: MoneyFields,
    pub total_tax_amount: Option<MoneyFields>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineCostFields {
    pub total_amount: MoneyFields,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartProductFields {
    pub id: String,
    pub handle: String,
    pub title: String,
    #[serde(default)]
    pub images: Connection<ImageFields>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartMerchandiseFields {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selected_options: Vec<SelectedOptionFields>,
    pub product: CartProductFields,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartLineFields {
    pub id: String,
    pub quantity: i64,
    pub cost: CartLineCostFields,
    pub merchandise: CartMerchandiseFields,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartFields {
    pub id: String,
    pub checkout_url: String,
    pub cost: CartCostFields,
    #[serde(default)]
    pub lines: Connection<CartLineFields>,
    pub total_quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserErrorFields {
    pub field: Option<Vec<String>>,
    pub message: String,
}

/// Payload shared by every cart mutation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPayload {
    pub cart: Option<CartFields>,
    #[serde(default)]
    pub user_errors: Vec<UserErrorFields>,
}

// =============================================================================
// Operations
// =============================================================================

macro_rules! operation {
    ($name:ident, $module:ident, $operation_name:literal) => {
        pub struct $name;

        impl GraphQLQuery for $name {
            type Variables = $module::Variables;
            type ResponseData = $module::ResponseData;

            fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
                QueryBody {
                    variables,
                    query: $module::QUERY,
                    operation_name: $operation_name,
                }
            }
        }
    };
}

operation!(GetProduct, get_product, "getProduct");
operation!(GetProducts, get_products, "getProducts");
operation!(GetCollections, get_collections, "getCollections");
operation!(GetCollection, get_collection, "getCollection");
operation!(GetCart, get_cart, "getCart");
operation!(CreateCart, create_cart, "createCart");
operation!(AddToCart, add_to_cart, "addToCart");
operation!(UpdateCart, update_cart, "updateCart");
operation!(RemoveFromCart, remove_from_cart, "removeFromCart");

pub mod get_product {
    use super::{Deserialize, ProductFields, Serialize};

    pub const QUERY: &str = concat!(
        product_fragment!(),
        r"
query getProduct($handle: String!) {
  product(handle: $handle) { ...ProductFragment }
}
"
    );

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub handle: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub product: Option<ProductFields>,
    }
}

pub mod get_products {
    use super::{Connection, Deserialize, ProductFields, Serialize};
    use crate::shopify::types::ProductSortKey;

    pub const QUERY: &str = concat!(
        product_fragment!(),
        r"
query getProducts($first: Int!, $after: String, $query: String, $sortKey: ProductSortKeys, $reverse: Boolean) {
  products(first: $first, after: $after, query: $query, sortKey: $sortKey, reverse: $reverse) {
    edges { node { ...ProductFragment } }
    pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
  }
}
"
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub first: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub after: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub query: Option<String>,
        pub sort_key: ProductSortKey,
        pub reverse: bool,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub products: Connection<ProductFields>,
    }
}

pub mod get_collections {
    use super::{CollectionFields, Connection, Deserialize, Serialize};

    pub const QUERY: &str = concat!(
        collection_fragment!(),
        r"
query getCollections($first: Int!) {
  collections(first: $first) {
    edges { node { ...CollectionFragment } }
  }
}
"
    );

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub first: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub collections: Connection<CollectionFields>,
    }
}

pub mod get_collection {
    use super::{CollectionFields, Deserialize, Serialize};

    pub const QUERY: &str = concat!(
        collection_fragment!(),
        product_fragment!(),
        r"
query getCollection($handle: String!, $first: Int!, $after: String) {
  collection(handle: $handle) {
    ...CollectionFragment
    products(first: $first, after: $after) {
      edges { node { ...ProductFragment } }
      pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
    }
  }
}
"
    );

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub handle: String,
        pub first: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub after: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub collection: Option<CollectionFields>,
    }
}

pub mod get_cart {
    use super::{CartFields, Deserialize, Serialize};

    pub const QUERY: &str = concat!(
        cart_fragment!(),
        r"
query getCart($cartId: ID!) {
  cart(id: $cartId) { ...CartFragment }
}
"
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub cart: Option<CartFields>,
    }
}

pub mod create_cart {
    use super::{CartPayload, Deserialize, Serialize};

    pub const QUERY: &str = concat!(
        cart_fragment!(),
        r"
mutation createCart {
  cartCreate(input: {}) {",
        cart_payload!(),
        r"  }
}
"
    );

    #[derive(Debug, Clone, Default, Serialize)]
    pub struct Variables {}

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_create: Option<CartPayload>,
    }
}

pub mod add_to_cart {
    use super::{CartPayload, Deserialize, Serialize};
    use crate::shopify::types::CartLineInput;

    pub const QUERY: &str = concat!(
        cart_fragment!(),
        r"
mutation addToCart($cartId: ID!, $lines: [CartLineInput!]!) {
  cartLinesAdd(cartId: $cartId, lines: $lines) {",
        cart_payload!(),
        r"  }
}
"
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub lines: Vec<CartLineInput>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_lines_add: Option<CartPayload>,
    }
}

pub mod update_cart {
    use super::{CartPayload, Deserialize, Serialize};
    use crate::shopify::types::CartLineUpdateInput;

    pub const QUERY: &str = concat!(
        cart_fragment!(),
        r"
mutation updateCart($cartId: ID!, $lines: [CartLineUpdateInput!]!) {
  cartLinesUpdate(cartId: $cartId, lines: $lines) {",
        cart_payload!(),
        r"  }
}
"
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub lines: Vec<CartLineUpdateInput>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_lines_update: Option<CartPayload>,
    }
}

pub mod remove_from_cart {
    use super::{CartPayload, Deserialize, Serialize};

    pub const QUERY: &str = concat!(
        cart_fragment!(),
        r"
mutation removeFromCart($cartId: ID!, $lineIds: [ID!]!) {
  cartLinesRemove(cartId: $cartId, lineIds: $lineIds) {",
        cart_payload!(),
        r"  }
}
"
    );

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub line_ids: Vec<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_lines_remove: Option<CartPayload>,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_uses_operation_name() {
        let body = GetCart::build_query(get_cart::Variables {
            cart_id: "gid://shopify/Cart/1".to_string(),
        });
        assert_eq!(body.operation_name, "getCart");
        assert!(body.query.contains("fragment CartFragment on Cart"));
        assert!(body.query.contains("cart(id: $cartId)"));

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["variables"]["cartId"], "gid://shopify/Cart/1");
        assert_eq!(json["operationName"], "getCart");
    }

    #[test]
    fn test_mutation_documents_request_user_errors() {
        for query in [
            create_cart::QUERY,
            add_to_cart::QUERY,
            update_cart::QUERY,
            remove_from_cart::QUERY,
        ] {
            assert!(query.contains("userErrors { field message }"));
            assert!(query.contains("cart { ...CartFragment }"));
        }
    }

    #[test]
    fn test_products_variables_skip_absent_fields() {
        let vars = get_products::Variables {
            first: 20,
            after: None,
            query: None,
            sort_key: crate::shopify::types::ProductSortKey::CreatedAt,
            reverse: false,
        };
        let json = serde_json::to_value(&vars).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"first": 20, "sortKey": "CREATED_AT", "reverse": false})
        );
    }

    #[test]
    fn test_connection_into_nodes_preserves_order() {
        let connection: Connection<SelectedOptionFields> = serde_json::from_value(serde_json::json!({
            "edges": [
                {"node": {"name": "Size", "value": "S"}},
                {"node": {"name": "Size", "value": "M"}}
            ]
        }))
        .unwrap();
        let values: Vec<_> = connection.into_nodes().into_iter().map(|o| o.value).collect();
        assert_eq!(values, vec!["S", "M"]);
    }
}
