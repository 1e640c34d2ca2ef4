//! Catalog browsing commands.

use shopfront_storefront::StorefrontApi;
use shopfront_storefront::shopify::ProductsQuery;

use crate::commands::Output;
use crate::error::CliError;
use crate::render;

/// List a page of products.
pub async fn products(api: &dyn StorefrontApi, query: ProductsQuery) -> Result<Output, CliError> {
    let page = api.get_products(query).await?;
    Ok(Output::ok(render::product_list(&page)))
}

/// Show one product by handle.
pub async fn product(api: &dyn StorefrontApi, handle: &str) -> Result<Output, CliError> {
    let product = api
        .get_product(handle)
        .await?
        .ok_or_else(|| CliError::NotFound {
            kind: "Product",
            handle: handle.to_string(),
        })?;
    Ok(Output::ok(render::product_detail(&product)))
}

/// List collections.
pub async fn collections(api: &dyn StorefrontApi) -> Result<Output, CliError> {
    let collections = api.get_collections().await?;
    Ok(Output::ok(render::collection_list(&collections)))
}

/// Show one collection with its first `first` products.
pub async fn collection(
    api: &dyn StorefrontApi,
    handle: &str,
    first: i64,
) -> Result<Output, CliError> {
    let collection = api
        .get_collection(handle, first)
        .await?
        .ok_or_else(|| CliError::NotFound {
            kind: "Collection",
            handle: handle.to_string(),
        })?;
    Ok(Output::ok(render::collection_detail(&collection)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopfront_storefront::MockStorefront;

    use super::*;

    #[tokio::test]
    async fn test_product_not_found() {
        let api = MockStorefront::seeded();
        let err = product(&api, "missing").await.unwrap_err();
        assert_eq!(err.to_string(), "Product not found: missing");
    }

    #[tokio::test]
    async fn test_collection_renders_products() {
        let api = MockStorefront::seeded();
        let output = collection(&api, "featured-nails", 10).await.unwrap();
        assert!(output.success);
        assert!(output.text.starts_with("Featured Nails"));
        assert!(output.text.contains("Classic Manicure Set"));
        assert!(output.text.contains("Gel Polish Trio"));
    }

    #[tokio::test]
    async fn test_search_products() {
        let api = MockStorefront::seeded();
        let output = products(
            &api,
            ProductsQuery {
                query: Some("manicure".to_string()),
                ..ProductsQuery::default()
            },
        )
        .await
        .unwrap();
        assert!(output.text.contains("classic-manicure"));
        assert!(!output.text.contains("gel-polish-trio"));
    }
}
