//! Shopper-side cart.
//!
//! Lines are keyed by `(product, size, color)`. Every mutation writes the
//! whole cart through to the scope the caller names: the local slot for
//! guests, or the remote per-user table for signed-in shoppers. A failed
//! remote write falls back to the local slot; nothing here returns a storage
//! error to the caller.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    clock::Clock,
    events::StoreEvent,
    models::{CartLine, CartRow, Product},
    services::reservation::ReservationManager,
    storage::{KeyValueStore, ProductCatalog, RemoteCartStore, load_json, save_json},
};

pub const CART_STORAGE_KEY: &str = "storefront-cart";

#[derive(Debug)]
pub struct CartStore {
    lines: Vec<CartLine>,
    is_open: bool,
    local: Arc<dyn KeyValueStore>,
    remote: Arc<dyn RemoteCartStore>,
    catalog: Arc<dyn ProductCatalog>,
    reservations: ReservationManager,
    clock: Arc<dyn Clock>,
}

impl CartStore {
    pub fn new(
        local: Arc<dyn KeyValueStore>,
        remote: Arc<dyn RemoteCartStore>,
        catalog: Arc<dyn ProductCatalog>,
        reservations: ReservationManager,
    ) -> Self {
        let clock = reservations.clock();
        Self {
            lines: Vec::new(),
            is_open: false,
            local,
            remote,
            catalog,
            reservations,
            clock,
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, product_id: Uuid, size: &str, color: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.matches(product_id, size, color))
    }

    /// Total units across all lines.
    pub fn count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Cart total in cents, pricing each line at the current time.
    pub fn total(&self) -> i64 {
        self.total_at(self.clock.now())
    }

    pub fn total_at(&self, now: DateTime<Utc>) -> i64 {
        self.lines.iter().map(|line| line.line_total(now)).sum()
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn open(&mut self) {
        self.is_open = true;
    }

    pub fn close(&mut self) {
        self.is_open = false;
    }

    pub fn toggle(&mut self) {
        self.is_open = !self.is_open;
    }

    /// Add `quantity` units of a variant.
    ///
    /// Returns `false` without touching the cart when the product's units
    /// across every variant would exceed `product.stock`.
    pub async fn add_item(
        &mut self,
        product: &Product,
        quantity: u32,
        size: &str,
        color: &str,
        user_id: Option<Uuid>,
    ) -> bool {
        if quantity == 0 {
            return false;
        }

        let existing = self.units_of(product.id, None);
        if existing.saturating_add(quantity) > product.available_stock() {
            tracing::debug!(
                product_id = %product.id,
                existing,
                requested = quantity,
                stock = product.stock,
                "add rejected, not enough stock"
            );
            return false;
        }

        // The caller's product is the freshest snapshot we have.
        for line in self.lines.iter_mut().filter(|l| l.product.id == product.id) {
            line.product = product.clone();
        }

        match self
            .lines
            .iter_mut()
            .find(|line| line.matches(product.id, size, color))
        {
            Some(line) => line.quantity += quantity,
            None => self.lines.push(CartLine {
                product: product.clone(),
                quantity,
                size: size.to_string(),
                color: color.to_string(),
            }),
        }

        self.is_open = true;
        self.save(user_id).await;
        true
    }

    /// Remove a variant; removing a missing variant is a no-op.
    pub async fn remove_item(
        &mut self,
        product_id: Uuid,
        size: &str,
        color: &str,
        user_id: Option<Uuid>,
    ) {
        let was_empty = self.lines.is_empty();
        self.lines.retain(|line| !line.matches(product_id, size, color));
        self.save(user_id).await;
        if !was_empty && self.lines.is_empty() {
            self.release_reservation();
        }
    }

    /// Set a variant's quantity. Zero or less removes the line.
    ///
    /// Returns `false` when the line does not exist or when the other
    /// variants of the product plus `quantity` would exceed the last known
    /// stock.
    pub async fn update_quantity(
        &mut self,
        product_id: Uuid,
        size: &str,
        color: &str,
        quantity: i64,
        user_id: Option<Uuid>,
    ) -> bool {
        if quantity <= 0 {
            self.remove_item(product_id, size, color, user_id).await;
            return true;
        }

        let Some(stock) = self
            .line(product_id, size, color)
            .map(|line| line.product.available_stock())
        else {
            return false;
        };

        let Ok(quantity) = u32::try_from(quantity) else {
            return false;
        };

        let others = self.units_of(product_id, Some((size, color)));
        if others.saturating_add(quantity) > stock {
            tracing::debug!(%product_id, others, requested = quantity, stock, "update rejected, not enough stock");
            return false;
        }

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.matches(product_id, size, color))
        {
            line.quantity = quantity;
        }

        self.save(user_id).await;
        true
    }

    pub async fn clear_cart(&mut self, user_id: Option<Uuid>) {
        self.lines.clear();
        self.save(user_id).await;
        self.release_reservation();
    }

    /// Load the cart for a scope.
    ///
    /// Guests read the local slot. Signed-in shoppers read their remote rows;
    /// if the local slot still holds guest lines they are merged in (remote
    /// wins on the same key), written back remotely, and the local slot is
    /// cleared. A failed remote read leaves the in-memory cart unchanged.
    pub async fn load_cart(&mut self, user_id: Option<Uuid>) {
        let Some(user_id) = user_id else {
            self.lines = self.read_local_lines();
            return;
        };

        let rows = match self.remote.fetch_rows(user_id).await {
            Ok(rows) => rows,
            Err(err) => {
                tracing::warn!(error = %err, %user_id, "failed to load remote cart");
                return;
            }
        };

        let Some(mut merged) = self.hydrate(rows).await else {
            return;
        };

        let guest_lines = self.read_local_lines();
        if guest_lines.is_empty() {
            self.lines = merged;
            return;
        }

        let guest_count = guest_lines.len();
        for line in guest_lines {
            if !merged.iter().any(|existing| existing.key() == line.key()) {
                merged.push(line);
            }
        }
        self.lines = merged;

        if self.write_remote(user_id).await {
            self.remove_local();
            tracing::info!(%user_id, guest_count, "merged guest cart into account");
        }
    }

    /// Replace each line's cached product with a fresh catalog read so later
    /// stock checks use current stock. Lines whose product is gone keep their
    /// last snapshot. Returns how many lines were refreshed.
    pub async fn refresh_stock(&mut self) -> usize {
        let ids = self.product_ids();
        let products = match self.catalog.products_by_ids(&ids).await {
            Ok(products) => products,
            Err(err) => {
                tracing::warn!(error = %err, "failed to refresh product stock");
                return 0;
            }
        };
        let by_id: HashMap<Uuid, Product> = products.into_iter().map(|p| (p.id, p)).collect();

        let mut refreshed = 0;
        for line in &mut self.lines {
            if let Some(product) = by_id.get(&line.product.id) {
                line.product = product.clone();
                refreshed += 1;
            }
        }
        refreshed
    }

    /// Units of `product_id` in the cart, optionally skipping one variant.
    fn units_of(&self, product_id: Uuid, skip: Option<(&str, &str)>) -> u32 {
        self.lines
            .iter()
            .filter(|line| line.product.id == product_id)
            .filter(|line| !skip.is_some_and(|(size, color)| line.size == size && line.color == color))
            .map(|line| line.quantity)
            .sum()
    }

    fn product_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self.lines.iter().map(|line| line.product.id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    fn release_reservation(&self) {
        self.reservations.clear_reservation();
        self.reservations
            .events()
            .publish(StoreEvent::ReservationCleared);
    }

    /// Turn remote rows into lines. Rows for unknown products or with a
    /// non-positive quantity are dropped.
    async fn hydrate(&self, rows: Vec<CartRow>) -> Option<Vec<CartLine>> {
        let mut ids: Vec<Uuid> = rows.iter().map(|row| row.product_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let products = match self.catalog.products_by_ids(&ids).await {
            Ok(products) => products,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read products for cart");
                return None;
            }
        };
        let by_id: HashMap<Uuid, Product> = products.into_iter().map(|p| (p.id, p)).collect();

        let lines = rows
            .into_iter()
            .filter_map(|row| {
                let product = by_id.get(&row.product_id)?;
                let quantity = u32::try_from(row.quantity).ok().filter(|q| *q > 0)?;
                Some(CartLine {
                    product: product.clone(),
                    quantity,
                    size: row.size,
                    color: row.color,
                })
            })
            .collect();

        Some(lines)
    }

    async fn save(&self, user_id: Option<Uuid>) {
        match user_id {
            Some(user_id) => {
                self.write_remote(user_id).await;
            }
            None => self.write_local(),
        }
    }

    /// Returns whether the remote write succeeded. On failure the cart is
    /// written to the local slot instead.
    async fn write_remote(&self, user_id: Uuid) -> bool {
        let rows: Vec<CartRow> = self.lines.iter().map(CartLine::to_row).collect();
        match self.remote.replace_rows(user_id, &rows).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, %user_id, "remote cart save failed, keeping a local copy");
                self.write_local();
                false
            }
        }
    }

    fn write_local(&self) {
        if let Err(err) = save_json(self.local.as_ref(), CART_STORAGE_KEY, &self.lines) {
            tracing::error!(error = %err, "failed to save cart locally");
        }
    }

    fn read_local_lines(&self) -> Vec<CartLine> {
        load_json(self.local.as_ref(), CART_STORAGE_KEY).unwrap_or_default()
    }

    fn remove_local(&self) {
        if let Err(err) = self.local.remove(CART_STORAGE_KEY) {
            tracing::warn!(error = %err, "failed to clear local cart");
        }
    }
}
