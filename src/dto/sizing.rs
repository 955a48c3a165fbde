use serde::Deserialize;
use utoipa::ToSchema;

use crate::services::sizing::FitPreference;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SizeRecommendationRequest {
    pub height_cm: f64,
    pub weight_kg: f64,
    #[serde(default)]
    pub fit: FitPreference,
    /// Sizes the product offers.
    #[serde(default)]
    pub sizes: Vec<String>,
}
