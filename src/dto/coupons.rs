use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateCouponRequest {
    #[serde(default)]
    pub code: String,
    /// Cart subtotal in cents.
    #[serde(default)]
    pub cart_total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GeneratedCouponCode {
    pub code: String,
}
