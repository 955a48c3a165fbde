#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use storefront_api::{
    clock::ManualClock,
    events::EventBus,
    models::Product,
    services::{cart_store::CartStore, reservation::ReservationManager},
    storage::{MemoryCartStore, MemoryStore, StaticCatalog},
};
use uuid::Uuid;

pub fn start_instant() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default()
}

pub fn product(name: &str, price: i64, stock: i32) -> Product {
    Product {
        id: Uuid::new_v4(),
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        description: None,
        price,
        discount_price: None,
        discount_end_date: None,
        stock,
        sizes: vec!["S".into(), "M".into(), "L".into()],
        colors: vec!["Black:#111111".into(), "Navy:#1a1a2e".into()],
        images: vec![],
        artist: None,
    }
}

pub fn discounted(mut product: Product, euros: Decimal, ends: Option<DateTime<Utc>>) -> Product {
    product.discount_price = Some(euros);
    product.discount_end_date = ends;
    product
}

pub struct Harness {
    pub cart: CartStore,
    pub reservations: ReservationManager,
    pub local: Arc<MemoryStore>,
    pub remote: Arc<MemoryCartStore>,
    pub catalog: Arc<StaticCatalog>,
    pub clock: ManualClock,
    pub events: EventBus,
}

impl Harness {
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        Self::with_local(Arc::new(MemoryStore::new()), products)
    }

    /// A fresh cart over an existing local slot, like a page reload.
    pub fn with_local(local: Arc<MemoryStore>, products: impl IntoIterator<Item = Product>) -> Self {
        let clock = ManualClock::new(start_instant());
        let events = EventBus::default();
        let remote = Arc::new(MemoryCartStore::new());
        let catalog = Arc::new(StaticCatalog::new(products));
        let reservations = ReservationManager::new(local.clone(), Arc::new(clock.clone()), events.clone());
        let cart = CartStore::new(local.clone(), remote.clone(), catalog.clone(), reservations.clone());

        Self {
            cart,
            reservations,
            local,
            remote,
            catalog,
            clock,
            events,
        }
    }
}
