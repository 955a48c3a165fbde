use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit,
    dto::reviews::{CreateReviewRequest, ProductReviews},
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems, Relation as OrderItemRel},
        orders::Column as OrderCol,
        products::Entity as Products,
        reviews::{ActiveModel as ReviewActive, Column as ReviewCol, Entity as Reviews, Model as ReviewModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Review, ReviewStats},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub const DEFAULT_REVIEWER_NAME: &str = "Customer";
pub const DELIVERED_STATUS: &str = "delivered";

pub async fn list_reviews(
    state: &AppState,
    product_id: Uuid,
    viewer: Option<&AuthUser>,
) -> AppResult<ApiResponse<ProductReviews>> {
    let reviews: Vec<Review> = Reviews::find()
        .filter(ReviewCol::ProductId.eq(product_id))
        .order_by_desc(ReviewCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(review_from_entity)
        .collect();

    let ratings: Vec<i16> = reviews.iter().map(|r| r.rating).collect();
    let stats = summarize_reviews(&ratings);
    let user_has_reviewed =
        viewer.is_some_and(|viewer| reviews.iter().any(|r| r.user_id == viewer.user_id));

    let total = reviews.len() as i64;
    Ok(ApiResponse::success(
        "Reviews",
        ProductReviews {
            reviews,
            stats,
            user_has_reviewed,
        },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::BadRequest(
            "rating must be between 1 and 5".to_string(),
        ));
    }

    if Products::find_by_id(product_id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let existing = Reviews::find()
        .filter(ReviewCol::ProductId.eq(product_id))
        .filter(ReviewCol::UserId.eq(user.user_id))
        .count(&state.orm)
        .await?;
    if existing > 0 {
        return Err(AppError::BadRequest(
            "you have already reviewed this product".to_string(),
        ));
    }

    let verified_purchase = has_delivered_purchase(state, user.user_id, product_id).await?;

    let user_name = payload
        .user_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_REVIEWER_NAME.to_string());

    let review = ReviewActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        user_id: Set(user.user_id),
        user_name: Set(user_name),
        rating: Set(payload.rating),
        title: Set(non_blank(payload.title)),
        comment: Set(non_blank(payload.comment)),
        verified_purchase: Set(verified_purchase),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "review_create",
        "reviews",
        serde_json::json!({ "product_id": product_id, "rating": review.rating }),
    )
    .await;

    Ok(ApiResponse::success(
        "Review created",
        review_from_entity(review),
        None,
    ))
}

/// Average (one decimal) plus a per-star histogram. Ratings outside 1..=5
/// count toward the average but not the histogram.
pub fn summarize_reviews(ratings: &[i16]) -> ReviewStats {
    let total = ratings.len() as i64;
    let average = if total == 0 {
        0.0
    } else {
        let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
        (sum as f64 / total as f64 * 10.0).round() / 10.0
    };
    let stars = |n: i16| ratings.iter().filter(|r| **r == n).count() as i64;

    ReviewStats {
        average_rating: average,
        total_reviews: total,
        rating_5: stars(5),
        rating_4: stars(4),
        rating_3: stars(3),
        rating_2: stars(2),
        rating_1: stars(1),
    }
}

async fn has_delivered_purchase(
    state: &AppState,
    user_id: Uuid,
    product_id: Uuid,
) -> AppResult<bool> {
    let count = OrderItems::find()
        .join(JoinType::InnerJoin, OrderItemRel::Orders.def())
        .filter(OrderItemCol::ProductId.eq(product_id))
        .filter(OrderCol::UserId.eq(user_id))
        .filter(OrderCol::Status.eq(DELIVERED_STATUS))
        .count(&state.orm)
        .await?;
    Ok(count > 0)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn review_from_entity(model: ReviewModel) -> Review {
    Review {
        id: model.id,
        product_id: model.product_id,
        user_id: model.user_id,
        user_name: model.user_name,
        rating: model.rating,
        title: model.title,
        comment: model.comment,
        verified_purchase: model.verified_purchase,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_reviews_have_zero_average() {
        let stats = summarize_reviews(&[]);
        assert_eq!(stats.average_rating, 0.0);
        assert_eq!(stats.total_reviews, 0);
    }

    #[test]
    fn average_is_rounded_to_one_decimal() {
        let stats = summarize_reviews(&[5, 4, 4]);

        assert_eq!(stats.average_rating, 4.3);
        assert_eq!(stats.total_reviews, 3);
        assert_eq!(stats.rating_5, 1);
        assert_eq!(stats.rating_4, 2);
        assert_eq!(stats.rating_1, 0);
    }

    #[test]
    fn blank_text_is_dropped() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some("Great".into())), Some("Great".into()));
    }
}
