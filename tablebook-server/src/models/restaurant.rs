use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Restaurant {
    pub restaurant_id: i64,
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
}

/// Body for creating or fully replacing a restaurant.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RestaurantRequest {
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    #[serde(rename = "imageUrl", alias = "image_url")]
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantCreated {
    pub message: String,
    pub restaurant_id: i64,
}
