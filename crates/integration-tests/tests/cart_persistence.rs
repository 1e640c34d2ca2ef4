//! Integration tests for cart persistence across restarts.

use shopfront_core::MerchandiseId;
use shopfront_integration_tests::{Call, RecordingStorefront};
use shopfront_storefront::cart::{CartStorage, CartStore};
use shopfront_storefront::config::StorefrontConfig;
use shopfront_storefront::shopify::{self, MOCK_BACKEND_FILE};

const MANICURE: &str = "gid://shopify/ProductVariant/1";

#[tokio::test]
async fn test_restart_restores_snapshot_before_reconciling() {
    let dir = tempfile::tempdir().expect("tempdir");
    let api = RecordingStorefront::seeded();

    let store = CartStore::restore(api.clone(), CartStorage::new(dir.path())).await;
    store
        .add_item(MerchandiseId::new(MANICURE), 2)
        .await
        .expect("add");
    let before = store.snapshot();
    drop(store);
    api.clear_calls();

    let restarted = CartStore::restore(api.clone(), CartStorage::new(dir.path())).await;

    assert_eq!(restarted.cart(), before.cart);
    assert!(!restarted.is_loading());
    assert!(restarted.error().is_none());
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_restored_cart_is_reconciled_by_id() {
    let dir = tempfile::tempdir().expect("tempdir");
    let api = RecordingStorefront::seeded();

    let store = CartStore::restore(api.clone(), CartStorage::new(dir.path())).await;
    let cart = store
        .add_item(MerchandiseId::new(MANICURE), 1)
        .await
        .expect("add");
    api.clear_calls();

    let restarted = CartStore::restore(api.clone(), CartStorage::new(dir.path())).await;
    let reconciled = restarted.initialize().await.expect("initialize");

    assert_eq!(api.calls(), vec![Call::GetCart(cart.id.clone())]);
    assert_eq!(reconciled, cart);
}

#[tokio::test]
async fn test_expired_cart_is_replaced_on_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let api = RecordingStorefront::seeded();

    let store = CartStore::restore(api.clone(), CartStorage::new(dir.path())).await;
    let old = store
        .add_item(MerchandiseId::new(MANICURE), 1)
        .await
        .expect("add");
    api.backend().expire_cart(&old.id);

    let restarted = CartStore::restore(api.clone(), CartStorage::new(dir.path())).await;
    let fresh = restarted.initialize().await.expect("initialize");

    assert_ne!(fresh.id, old.id);
    assert!(fresh.lines.is_empty());

    let persisted = CartStorage::new(dir.path()).load().await.expect("load");
    assert_eq!(persisted, Some(fresh));
}

#[tokio::test]
async fn test_persisted_record_omits_flags() {
    let dir = tempfile::tempdir().expect("tempdir");
    let api = RecordingStorefront::seeded();

    let store = CartStore::restore(api, CartStorage::new(dir.path())).await;
    store.initialize().await.expect("initialize");

    let storage = CartStorage::new(dir.path());
    let raw = std::fs::read_to_string(storage.path()).expect("record written");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("json");

    let object = value.as_object().expect("object");
    assert_eq!(object.len(), 1);
    assert!(object.contains_key("cart"));
}

#[tokio::test]
async fn test_mock_backend_cart_survives_between_runs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = StorefrontConfig::mock(dir.path());

    let first_run =
        CartStore::restore(shopify::connect(&config).await, CartStorage::new(dir.path())).await;
    first_run.initialize().await.expect("initialize");
    let added = first_run
        .add_item(MerchandiseId::new(MANICURE), 2)
        .await
        .expect("add");
    drop(first_run);
    assert!(dir.path().join(MOCK_BACKEND_FILE).exists());

    let second_run =
        CartStore::restore(shopify::connect(&config).await, CartStorage::new(dir.path())).await;
    assert_eq!(second_run.cart(), Some(added.clone()));

    let reconciled = second_run.initialize().await.expect("initialize");
    assert_eq!(reconciled, added);
    assert_eq!(second_run.total_items(), 2);
}
