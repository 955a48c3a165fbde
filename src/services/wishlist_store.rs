use std::sync::Arc;

use uuid::Uuid;

use crate::{
    clock::Clock,
    models::{Product, WishlistEntry},
    storage::{KeyValueStore, load_json, save_json},
};

pub const WISHLIST_STORAGE_KEY: &str = "storefront-wishlist";

/// Saved products, at most one entry per product, kept in the local slot.
#[derive(Debug)]
pub struct WishlistStore {
    entries: Vec<WishlistEntry>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl WishlistStore {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Vec::new(),
            store,
            clock,
        }
    }

    pub fn load(&mut self) {
        self.entries = load_json(self.store.as_ref(), WISHLIST_STORAGE_KEY).unwrap_or_default();
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Entries, most recently added first.
    pub fn items(&self) -> Vec<WishlistEntry> {
        let mut items = self.entries.clone();
        items.sort_by(|a, b| b.added_at.cmp(&a.added_at));
        items
    }

    pub fn is_in_wishlist(&self, product_id: Uuid) -> bool {
        self.entries.iter().any(|entry| entry.product.id == product_id)
    }

    /// Adding a product that is already saved keeps the original entry.
    pub fn add(&mut self, product: &Product) {
        if self.is_in_wishlist(product.id) {
            return;
        }
        self.entries.push(WishlistEntry {
            product: product.clone(),
            added_at: self.clock.now(),
        });
        self.save();
    }

    pub fn remove(&mut self, product_id: Uuid) {
        self.entries.retain(|entry| entry.product.id != product_id);
        self.save();
    }

    /// Returns whether the product is saved after the toggle.
    pub fn toggle(&mut self, product: &Product) -> bool {
        if self.is_in_wishlist(product.id) {
            self.remove(product.id);
            false
        } else {
            self.add(product);
            true
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.save();
    }

    fn save(&self) {
        if let Err(err) = save_json(self.store.as_ref(), WISHLIST_STORAGE_KEY, &self.entries) {
            tracing::warn!(error = %err, "failed to save wishlist");
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration};

    use super::*;
    use crate::{clock::ManualClock, storage::MemoryStore};

    fn product(name: &str) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.into(),
            slug: name.to_lowercase(),
            description: None,
            price: 2500,
            discount_price: None,
            discount_end_date: None,
            stock: 4,
            sizes: vec![],
            colors: vec![],
            images: vec![],
            artist: None,
        }
    }

    fn setup() -> (WishlistStore, Arc<MemoryStore>, ManualClock) {
        let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default();
        let clock = ManualClock::new(start);
        let store = Arc::new(MemoryStore::new());
        let wishlist = WishlistStore::new(store.clone(), Arc::new(clock.clone()));
        (wishlist, store, clock)
    }

    #[test]
    fn add_twice_keeps_single_entry() {
        let (mut wishlist, _, _) = setup();
        let hoodie = product("Hoodie");

        wishlist.add(&hoodie);
        wishlist.add(&hoodie);

        assert_eq!(wishlist.count(), 1);
    }

    #[test]
    fn toggle_reports_membership() {
        let (mut wishlist, _, _) = setup();
        let cap = product("Cap");

        assert!(wishlist.toggle(&cap));
        assert!(wishlist.is_in_wishlist(cap.id));
        assert!(!wishlist.toggle(&cap));
        assert!(!wishlist.is_in_wishlist(cap.id));
    }

    #[test]
    fn items_are_newest_first() {
        let (mut wishlist, _, clock) = setup();
        let first = product("First");
        let second = product("Second");

        wishlist.add(&first);
        clock.advance(Duration::minutes(1));
        wishlist.add(&second);

        let names: Vec<String> = wishlist.items().into_iter().map(|e| e.product.name).collect();
        assert_eq!(names, vec!["Second".to_string(), "First".to_string()]);
    }

    #[test]
    fn load_restores_persisted_entries() {
        let (mut wishlist, store, clock) = setup();
        wishlist.add(&product("Jacket"));

        let mut reloaded = WishlistStore::new(store, Arc::new(clock));
        reloaded.load();

        assert_eq!(reloaded.count(), 1);
    }

    #[test]
    fn corrupted_payload_resets_to_empty() -> anyhow::Result<()> {
        let (mut wishlist, store, _) = setup();
        store.set(WISHLIST_STORAGE_KEY, "[{\"broken\"")?;

        wishlist.load();

        assert_eq!(wishlist.count(), 0);
        assert_eq!(store.get(WISHLIST_STORAGE_KEY)?, None);
        Ok(())
    }
}
