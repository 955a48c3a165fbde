mod common;

use chrono::Duration;
use rust_decimal::Decimal;
use storefront_api::{
    events::StoreEvent,
    models::{CartRow, Product},
    services::cart_store::CART_STORAGE_KEY,
    storage::{KeyValueStore, RemoteCartStore},
};
use uuid::Uuid;

use common::{Harness, discounted, product};

#[tokio::test]
async fn add_update_remove_respects_stock() -> anyhow::Result<()> {
    let tee = product("Echo Tee", 2500, 3);
    let mut h = Harness::new([tee.clone()]);
    let mut events = h.events.subscribe();

    assert!(h.cart.add_item(&tee, 2, "M", "", None).await);
    assert_eq!(h.cart.count(), 2);

    assert!(!h.cart.add_item(&tee, 2, "M", "", None).await);
    assert_eq!(h.cart.count(), 2);

    assert!(h.cart.update_quantity(tee.id, "M", "", 3, None).await);
    assert_eq!(h.cart.count(), 3);

    h.reservations.start_reservation(h.cart.lines().to_vec());
    assert_eq!(events.try_recv()?, StoreEvent::ReservationStarted);

    h.cart.remove_item(tee.id, "M", "", None).await;

    assert_eq!(h.cart.count(), 0);
    assert!(h.reservations.get_reservation().is_none());
    assert_eq!(events.try_recv()?, StoreEvent::ReservationCleared);
    Ok(())
}

#[tokio::test]
async fn stock_is_shared_across_variants() {
    let hoodie = product("Hoodie", 5500, 4);
    let mut h = Harness::new([hoodie.clone()]);

    assert!(h.cart.add_item(&hoodie, 2, "M", "Black:#111111", None).await);
    assert!(h.cart.add_item(&hoodie, 1, "L", "Black:#111111", None).await);
    assert!(!h.cart.add_item(&hoodie, 2, "S", "Navy:#1a1a2e", None).await);

    // 1 (L) + 4 would exceed 4 units of stock.
    assert!(!h.cart.update_quantity(hoodie.id, "M", "Black:#111111", 4, None).await);
    assert!(h.cart.update_quantity(hoodie.id, "M", "Black:#111111", 3, None).await);

    assert_eq!(h.cart.count(), 4);
    assert_eq!(h.cart.lines().len(), 2);
}

#[tokio::test]
async fn same_variant_merges_into_one_line() {
    let tee = product("Echo Tee", 2500, 10);
    let mut h = Harness::new([tee.clone()]);

    assert!(h.cart.add_item(&tee, 2, "S", "", None).await);
    assert!(h.cart.add_item(&tee, 3, "S", "", None).await);

    assert_eq!(h.cart.lines().len(), 1);
    assert_eq!(h.cart.line(tee.id, "S", "").map(|l| l.quantity), Some(5));
    assert!(h.cart.is_open());
}

#[tokio::test]
async fn removing_twice_is_a_no_op() {
    let tee = product("Echo Tee", 2500, 10);
    let cap = product("Cap", 1500, 10);
    let mut h = Harness::new([tee.clone(), cap.clone()]);
    h.cart.add_item(&tee, 1, "M", "", None).await;
    h.cart.add_item(&cap, 1, "M", "", None).await;

    h.cart.remove_item(tee.id, "M", "", None).await;
    let after_first = h.cart.lines().to_vec();
    h.cart.remove_item(tee.id, "M", "", None).await;

    assert_eq!(h.cart.lines(), after_first.as_slice());
    assert_eq!(h.cart.count(), 1);
}

#[tokio::test]
async fn zero_quantity_update_removes_and_missing_line_fails() {
    let tee = product("Echo Tee", 2500, 10);
    let mut h = Harness::new([tee.clone()]);
    h.cart.add_item(&tee, 2, "M", "", None).await;

    assert!(!h.cart.update_quantity(tee.id, "XL", "", 1, None).await);
    assert!(h.cart.update_quantity(tee.id, "M", "", 0, None).await);
    assert!(h.cart.is_empty());
}

#[tokio::test]
async fn total_follows_discount_window() {
    let ends = common::start_instant() + Duration::hours(1);
    let tee = discounted(product("Echo Tee", 1500, 5), Decimal::new(1000, 2), Some(ends));
    let mut h = Harness::new([tee.clone()]);

    h.cart.add_item(&tee, 1, "M", "", None).await;
    assert_eq!(h.cart.total(), 1000);

    h.clock.advance(Duration::hours(2));
    assert_eq!(h.cart.total(), 1500);
}

#[tokio::test]
async fn guest_cart_survives_reload() -> anyhow::Result<()> {
    let tee = product("Echo Tee", 2500, 5);
    let mut h = Harness::new([tee.clone()]);
    h.cart.add_item(&tee, 2, "M", "", None).await;
    assert!(h.local.get(CART_STORAGE_KEY)?.is_some());

    let mut reloaded = Harness::with_local(h.local.clone(), [tee.clone()]);
    reloaded.cart.load_cart(None).await;

    assert_eq!(reloaded.cart.count(), 2);
    Ok(())
}

#[tokio::test]
async fn login_merges_guest_lines_with_remote_winning() -> anyhow::Result<()> {
    let tee = product("Echo Tee", 2500, 10);
    let cap = product("Cap", 1500, 10);
    let user_id = Uuid::new_v4();
    let mut h = Harness::new([tee.clone(), cap.clone()]);

    h.cart.add_item(&tee, 1, "M", "", None).await;
    h.cart.add_item(&cap, 2, "M", "", None).await;
    let remote_rows = [CartRow {
        product_id: tee.id,
        quantity: 4,
        size: "M".into(),
        color: String::new(),
    }];
    h.remote.replace_rows(user_id, &remote_rows).await?;

    h.cart.load_cart(Some(user_id)).await;

    assert_eq!(h.cart.line(tee.id, "M", "").map(|l| l.quantity), Some(4));
    assert_eq!(h.cart.line(cap.id, "M", "").map(|l| l.quantity), Some(2));
    assert_eq!(h.remote.rows_for(user_id).len(), 2);
    assert_eq!(h.local.get(CART_STORAGE_KEY)?, None);
    Ok(())
}

#[tokio::test]
async fn failed_remote_save_falls_back_to_local() -> anyhow::Result<()> {
    let tee = product("Echo Tee", 2500, 10);
    let user_id = Uuid::new_v4();
    let mut h = Harness::new([tee.clone()]);
    h.remote.set_offline(true);

    assert!(h.cart.add_item(&tee, 1, "M", "", Some(user_id)).await);

    assert_eq!(h.cart.count(), 1);
    assert!(h.local.get(CART_STORAGE_KEY)?.is_some());
    assert!(h.remote.rows_for(user_id).is_empty());
    Ok(())
}

#[tokio::test]
async fn failed_remote_load_keeps_current_cart() {
    let tee = product("Echo Tee", 2500, 10);
    let mut h = Harness::new([tee.clone()]);
    h.cart.add_item(&tee, 3, "M", "", None).await;
    h.remote.set_offline(true);

    h.cart.load_cart(Some(Uuid::new_v4())).await;

    assert_eq!(h.cart.count(), 3);
}

#[tokio::test]
async fn corrupted_local_cart_resets_to_empty() -> anyhow::Result<()> {
    let mut h = Harness::new(Vec::<Product>::new());
    h.local.set(CART_STORAGE_KEY, "{not json")?;

    h.cart.load_cart(None).await;

    assert!(h.cart.is_empty());
    assert_eq!(h.local.get(CART_STORAGE_KEY)?, None);
    Ok(())
}

#[tokio::test]
async fn refresh_stock_tightens_later_checks() {
    let mut tee = product("Echo Tee", 2500, 10);
    let mut h = Harness::new([tee.clone()]);
    h.cart.add_item(&tee, 2, "M", "", None).await;

    tee.stock = 2;
    h.catalog.upsert(tee.clone());
    assert_eq!(h.cart.refresh_stock().await, 1);

    assert!(!h.cart.update_quantity(tee.id, "M", "", 3, None).await);
    assert_eq!(h.cart.count(), 2);
}
