use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::coupons::GeneratedCouponCode,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::coupon_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/coupons/generate-code", post(generate_coupon_code))
}

#[utoipa::path(
    post,
    path = "/api/admin/coupons/generate-code",
    responses(
        (status = 200, description = "Unused PROMO- code", body = ApiResponse<GeneratedCouponCode>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn generate_coupon_code(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<GeneratedCouponCode>>> {
    let resp = coupon_service::generate_coupon_code(&state, &user).await?;
    Ok(Json(resp))
}
