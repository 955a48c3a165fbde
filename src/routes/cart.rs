use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::cart::{CartRowList, ReplaceCartRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(cart_list).put(replace_cart))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart rows for current user, oldest first", body = ApiResponse<CartRowList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn cart_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartRowList>>> {
    let resp = cart_service::list_cart(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/cart",
    request_body = ReplaceCartRequest,
    responses(
        (status = 200, description = "Replace every cart row for current user", body = ApiResponse<CartRowList>),
        (status = 400, description = "Bad request"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn replace_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ReplaceCartRequest>,
) -> AppResult<Json<ApiResponse<CartRowList>>> {
    let resp = cart_service::replace_cart(&state, &user, payload).await?;
    Ok(Json(resp))
}
