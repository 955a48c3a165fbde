use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::newsletter::SubscribeRequest,
    error::AppResult,
    models::NewsletterSubscriber,
    response::ApiResponse,
    services::newsletter_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(subscribe))
}

#[utoipa::path(
    post,
    path = "/api/newsletter",
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Subscribed or reactivated", body = ApiResponse<NewsletterSubscriber>),
        (status = 400, description = "Missing, invalid or already subscribed email"),
    ),
    tag = "Newsletter"
)]
pub async fn subscribe(
    State(state): State<AppState>,
    Json(payload): Json<SubscribeRequest>,
) -> AppResult<Json<ApiResponse<NewsletterSubscriber>>> {
    let resp = newsletter_service::subscribe(&state, payload).await?;
    Ok(Json(resp))
}
