use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        products::{ProductList, ProductLookupRequest, SearchQuery},
        reviews::{CreateReviewRequest, ProductReviews},
    },
    error::AppResult,
    middleware::auth::{AuthUser, OptionalAuthUser},
    models::{Product, Review},
    response::ApiResponse,
    routes::params::ProductQuery,
    services::{product_service, review_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/search", get(search_products))
        .route("/lookup", post(lookup_products))
        .route("/{id}", get(get_product))
        .route("/{id}/reviews", get(list_reviews).post(create_review))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Match name or description"),
        ("min_price" = Option<i64>, Query, description = "Minimum price in cents"),
        ("max_price" = Option<i64>, Query, description = "Maximum price in cents"),
        ("in_stock" = Option<bool>, Query, description = "Only products with stock"),
        ("on_sale" = Option<bool>, Query, description = "Only discounted products"),
        ("sort_by" = Option<String>, Query, description = "created_at, price, name"),
        ("sort_order" = Option<String>, Query, description = "asc, desc")
    ),
    responses(
        (status = 200, description = "List products", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/search",
    params(
        ("q" = Option<String>, Query, description = "At least two characters; matches name or artist")
    ),
    responses(
        (status = 200, description = "Up to ten matching products", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::search_products(&state, query.q).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products/lookup",
    request_body = ProductLookupRequest,
    responses(
        (status = 200, description = "Products for the given ids; unknown ids are skipped", body = ApiResponse<ProductList>),
        (status = 400, description = "Too many ids"),
    ),
    tag = "Products"
)]
pub async fn lookup_products(
    State(state): State<AppState>,
    Json(payload): Json<ProductLookupRequest>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::lookup_products(&state, payload.ids).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Get product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::get_product(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/reviews",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Reviews newest first with rating stats", body = ApiResponse<ProductReviews>),
    ),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductReviews>>> {
    let resp = review_service::list_reviews(&state, id, viewer.as_ref()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/reviews",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = CreateReviewRequest,
    responses(
        (status = 200, description = "Review created", body = ApiResponse<Review>),
        (status = 400, description = "Invalid rating or already reviewed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateReviewRequest>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let resp = review_service::create_review(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
