use axum::{Json, Router, routing::post};

use crate::{
    dto::sizing::SizeRecommendationRequest,
    error::{AppError, AppResult},
    response::ApiResponse,
    services::sizing::{SizeRecommendation, recommend_for_sizes},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(recommend))
}

#[utoipa::path(
    post,
    path = "/api/size-recommendation",
    request_body = SizeRecommendationRequest,
    responses(
        (status = 200, description = "Recommended size and whether the product offers it", body = ApiResponse<SizeRecommendation>),
        (status = 400, description = "Height or weight out of range"),
    ),
    tag = "Sizing"
)]
pub async fn recommend(
    Json(payload): Json<SizeRecommendationRequest>,
) -> AppResult<Json<ApiResponse<SizeRecommendation>>> {
    let recommendation = recommend_for_sizes(
        payload.height_cm,
        payload.weight_kg,
        payload.fit,
        &payload.sizes,
    )
    .map_err(|err| AppError::BadRequest(err.to_string()))?;

    Ok(Json(ApiResponse::success(
        "Size recommendation",
        recommendation,
        None,
    )))
}
