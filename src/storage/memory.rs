//! In-process implementations of the remote seams, for offline use and tests.

use std::{
    collections::HashMap,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use uuid::Uuid;

use super::{ProductCatalog, RemoteCartStore, StorageError};
use crate::models::{CartRow, Product};

#[derive(Debug, Default)]
pub struct MemoryCartStore {
    rows: Mutex<HashMap<Uuid, Vec<CartRow>>>,
    offline: AtomicBool,
}

impl MemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with [`StorageError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn rows_for(&self, user_id: Uuid) -> Vec<CartRow> {
        let rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        rows.get(&user_id).cloned().unwrap_or_default()
    }

    fn check_online(&self) -> Result<(), StorageError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("cart store offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteCartStore for MemoryCartStore {
    async fn fetch_rows(&self, user_id: Uuid) -> Result<Vec<CartRow>, StorageError> {
        self.check_online()?;
        Ok(self.rows_for(user_id))
    }

    async fn replace_rows(&self, user_id: Uuid, rows: &[CartRow]) -> Result<(), StorageError> {
        self.check_online()?;
        let mut all = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        all.insert(user_id, rows.to_vec());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct StaticCatalog {
    products: Mutex<HashMap<Uuid, Product>>,
}

impl StaticCatalog {
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: Mutex::new(products.into_iter().map(|p| (p.id, p)).collect()),
        }
    }

    pub fn upsert(&self, product: Product) {
        let mut products = self.products.lock().unwrap_or_else(PoisonError::into_inner);
        products.insert(product.id, product);
    }
}

#[async_trait]
impl ProductCatalog for StaticCatalog {
    async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, StorageError> {
        let products = self.products.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }
}
