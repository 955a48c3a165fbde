use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::CartRow;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReplaceCartRequest {
    pub items: Vec<CartRow>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CartRowList {
    #[schema(value_type = Vec<CartRow>)]
    pub items: Vec<CartRow>,
}
