//! Persistence seams used by the client-side stores.
//!
//! * [`KeyValueStore`] is the browser-style local slot (guest cart, wishlist,
//!   reservation).
//! * [`RemoteCartStore`] is the per-user cart table, written by replacing
//!   every row for the user.
//! * [`ProductCatalog`] reads products by id to resolve stock and prices.

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{CartRow, Product};

pub mod local;
pub mod memory;
pub mod remote;

pub use local::{FileStore, MemoryStore};
pub use memory::{MemoryCartStore, StaticCatalog};
pub use remote::{OrmCartStore, OrmProductCatalog};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("remote store error: {0}")]
    Remote(#[from] sea_orm::DbErr),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub trait KeyValueStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[async_trait]
pub trait RemoteCartStore: Send + Sync + Debug {
    async fn fetch_rows(&self, user_id: Uuid) -> Result<Vec<CartRow>, StorageError>;

    /// Delete every row for `user_id`, then insert `rows`.
    async fn replace_rows(&self, user_id: Uuid, rows: &[CartRow]) -> Result<(), StorageError>;
}

#[async_trait]
pub trait ProductCatalog: Send + Sync + Debug {
    /// Unknown ids are omitted from the result.
    async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, StorageError>;
}

/// Read and decode a JSON value from `key`.
///
/// A payload that fails to decode is deleted and reported as absent.
/// Read failures are logged and also reported as absent.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            tracing::warn!(error = %err, key, "local storage read failed");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(error = %err, key, "discarding corrupted local payload");
            if let Err(err) = store.remove(key) {
                tracing::warn!(error = %err, key, "failed to remove corrupted payload");
            }
            None
        }
    }
}

pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}
