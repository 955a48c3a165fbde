//! Back-in-stock subscriptions. Sending the notification is handled elsewhere.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    dto::stock_notifications::StockNotificationRequest,
    entity::{
        products::Entity as Products,
        stock_notifications::{
            ActiveModel as NotificationActive, Column as NotificationCol,
            Entity as StockNotifications, Model as NotificationModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::StockNotification,
    response::ApiResponse,
    services::newsletter_service::normalize_email,
    state::AppState,
};

/// Register `email` for a restock alert. Subscribing twice returns the
/// existing registration.
pub async fn subscribe(
    state: &AppState,
    user: Option<&AuthUser>,
    payload: StockNotificationRequest,
) -> AppResult<ApiResponse<StockNotification>> {
    let email = normalize_email(&payload.email)?;

    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if product.stock > 0 {
        return Err(AppError::BadRequest(
            "product is already in stock".to_string(),
        ));
    }

    let existing = StockNotifications::find()
        .filter(NotificationCol::ProductId.eq(product.id))
        .filter(NotificationCol::UserEmail.eq(email.clone()))
        .one(&state.orm)
        .await?;
    if let Some(existing) = existing {
        return Ok(ApiResponse::success(
            "Already subscribed",
            notification_from_entity(existing),
            None,
        ));
    }

    let created = NotificationActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product.id),
        user_email: Set(email),
        user_id: Set(user.map(|u| u.user_id)),
        notified: Set(false),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(product_id = %product.id, "stock notification registered");

    Ok(ApiResponse::success(
        "We will let you know when it is back in stock",
        notification_from_entity(created),
        None,
    ))
}

fn notification_from_entity(model: NotificationModel) -> StockNotification {
    StockNotification {
        id: model.id,
        product_id: model.product_id,
        user_email: model.user_email,
        user_id: model.user_id,
        notified: model.notified,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
