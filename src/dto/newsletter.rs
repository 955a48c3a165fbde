use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub email: String,
    pub name: Option<String>,
    pub source: Option<String>,
}
