use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Review, ReviewStats};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub rating: i16,
    pub title: Option<String>,
    pub comment: Option<String>,
    /// Display name; defaults to "Customer".
    pub user_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductReviews {
    pub reviews: Vec<Review>,
    pub stats: ReviewStats,
    pub user_has_reviewed: bool,
}
