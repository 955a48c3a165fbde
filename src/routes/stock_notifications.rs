use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::stock_notifications::StockNotificationRequest,
    error::AppResult,
    middleware::auth::OptionalAuthUser,
    models::StockNotification,
    response::ApiResponse,
    services::stock_alert_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(subscribe))
}

#[utoipa::path(
    post,
    path = "/api/stock-notifications",
    request_body = StockNotificationRequest,
    responses(
        (status = 200, description = "Registered, or already registered", body = ApiResponse<StockNotification>),
        (status = 400, description = "Missing email or product in stock"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Stock alerts"
)]
pub async fn subscribe(
    State(state): State<AppState>,
    OptionalAuthUser(user): OptionalAuthUser,
    Json(payload): Json<StockNotificationRequest>,
) -> AppResult<Json<ApiResponse<StockNotification>>> {
    let resp = stock_alert_service::subscribe(&state, user.as_ref(), payload).await?;
    Ok(Json(resp))
}
