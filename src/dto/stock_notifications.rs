use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct StockNotificationRequest {
    pub product_id: Uuid,
    #[serde(default)]
    pub email: String,
}
