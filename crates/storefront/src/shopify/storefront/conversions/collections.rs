//! Collection type conversion functions.

use crate::shopify::types::Collection;

use super::super::queries::{CollectionFields, Connection};
use super::{convert_image, convert_seo, products::convert_product_connection};

pub fn convert_collection(c: CollectionFields) -> Collection {
    Collection {
        id: c.id,
        handle: c.handle,
        title: c.title,
        description: c.description,
        description_html: c.description_html,
        image: c.image.map(convert_image),
        seo: convert_seo(c.seo),
        updated_at: c.updated_at,
        products: c.products.map(convert_product_connection),
    }
}

pub fn convert_collections(connection: Connection<CollectionFields>) -> Vec<Collection> {
    connection
        .into_nodes()
        .into_iter()
        .map(convert_collection)
        .collect()
}
