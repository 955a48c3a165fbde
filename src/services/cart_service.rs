//! Per-user cart rows, the remote side of the shopper cart.

use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    audit,
    dto::cart::{CartRowList, ReplaceCartRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::CartRow,
    response::{ApiResponse, Meta},
    state::AppState,
    storage::{OrmCartStore, OrmProductCatalog, ProductCatalog, RemoteCartStore},
};

pub async fn list_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartRowList>> {
    let store = OrmCartStore::new(state.orm.clone());
    let items = store.fetch_rows(user.user_id).await?;
    let total = items.len() as i64;

    Ok(ApiResponse::success(
        "OK",
        CartRowList { items },
        Some(Meta::new(1, total, total)),
    ))
}

/// Replace every row for the user: delete all, then insert `payload.items`.
pub async fn replace_cart(
    state: &AppState,
    user: &AuthUser,
    payload: ReplaceCartRequest,
) -> AppResult<ApiResponse<CartRowList>> {
    validate_rows(&payload.items)?;

    let ids: Vec<Uuid> = payload
        .items
        .iter()
        .map(|row| row.product_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let catalog = OrmProductCatalog::new(state.orm.clone());
    let known = catalog.products_by_ids(&ids).await?;
    if known.len() != ids.len() {
        return Err(AppError::BadRequest("product not found".to_string()));
    }
    for row in &payload.items {
        let offered = known
            .iter()
            .find(|p| p.id == row.product_id)
            .is_some_and(|p| p.sizes.is_empty() || p.offers_size(&row.size));
        if !offered {
            return Err(AppError::BadRequest(format!(
                "size {} is not offered for product {}",
                row.size, row.product_id
            )));
        }
    }

    let store = OrmCartStore::new(state.orm.clone());
    store.replace_rows(user.user_id, &payload.items).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "cart_replace",
        "cart_items",
        serde_json::json!({ "lines": payload.items.len() }),
    )
    .await;

    let total = payload.items.len() as i64;
    Ok(ApiResponse::success(
        "Cart saved",
        CartRowList {
            items: payload.items,
        },
        Some(Meta::new(1, total, total)),
    ))
}

/// Quantities must be positive and each `(product, size, color)` may appear once.
pub fn validate_rows(rows: &[CartRow]) -> AppResult<()> {
    let mut seen = HashSet::new();
    for row in rows {
        if row.quantity <= 0 {
            return Err(AppError::BadRequest(
                "quantity must be greater than 0".to_string(),
            ));
        }
        if !seen.insert((row.product_id, row.size.as_str(), row.color.as_str())) {
            return Err(AppError::BadRequest(format!(
                "duplicate cart line for product {}",
                row.product_id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(product_id: Uuid, quantity: i32, size: &str) -> CartRow {
        CartRow {
            product_id,
            quantity,
            size: size.to_string(),
            color: String::new(),
        }
    }

    #[test]
    fn accepts_distinct_variants() {
        let id = Uuid::new_v4();
        assert!(validate_rows(&[row(id, 1, "M"), row(id, 2, "L")]).is_ok());
    }

    #[test]
    fn rejects_non_positive_quantity() {
        let result = validate_rows(&[row(Uuid::new_v4(), 0, "M")]);
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn rejects_duplicate_keys() {
        let id = Uuid::new_v4();
        let result = validate_rows(&[row(id, 1, "M"), row(id, 3, "M")]);
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
