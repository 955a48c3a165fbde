//! Postgres-backed cart rows and product catalog.

use async_trait::async_trait;
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use uuid::Uuid;

use super::{ProductCatalog, RemoteCartStore, StorageError};
use crate::{
    entity::{
        cart_items::{ActiveModel as CartItemActive, Column as CartCol, Entity as CartItems},
        products::{Column as ProdCol, Entity as Products},
    },
    models::{CartRow, Product},
    services::product_service::product_from_entity,
};

#[derive(Debug, Clone)]
pub struct OrmCartStore {
    orm: DatabaseConnection,
}

impl OrmCartStore {
    pub fn new(orm: DatabaseConnection) -> Self {
        Self { orm }
    }
}

#[async_trait]
impl RemoteCartStore for OrmCartStore {
    async fn fetch_rows(&self, user_id: Uuid) -> Result<Vec<CartRow>, StorageError> {
        let rows = CartItems::find()
            .filter(CartCol::UserId.eq(user_id))
            .order_by_asc(CartCol::CreatedAt)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(|item| CartRow {
                product_id: item.product_id,
                quantity: item.quantity,
                size: item.size,
                color: item.color,
            })
            .collect();

        Ok(rows)
    }

    async fn replace_rows(&self, user_id: Uuid, rows: &[CartRow]) -> Result<(), StorageError> {
        let txn = self.orm.begin().await?;

        CartItems::delete_many()
            .filter(CartCol::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        if !rows.is_empty() {
            let models = rows.iter().map(|row| CartItemActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                product_id: Set(row.product_id),
                quantity: Set(row.quantity),
                size: Set(row.size.clone()),
                color: Set(row.color.clone()),
                created_at: NotSet,
            });
            CartItems::insert_many(models).exec(&txn).await?;
        }

        txn.commit().await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct OrmProductCatalog {
    orm: DatabaseConnection,
}

impl OrmProductCatalog {
    pub fn new(orm: DatabaseConnection) -> Self {
        Self { orm }
    }
}

#[async_trait]
impl ProductCatalog for OrmProductCatalog {
    async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, StorageError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let products = Products::find()
            .filter(ProdCol::Id.is_in(ids.iter().copied()))
            .all(&self.orm)
            .await?
            .into_iter()
            .map(product_from_entity)
            .collect();

        Ok(products)
    }
}
