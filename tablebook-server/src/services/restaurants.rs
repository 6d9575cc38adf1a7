use crate::db::Store;
use crate::error::ApiError;
use crate::models::restaurant::{Restaurant, RestaurantRequest};

fn validate(req: &RestaurantRequest) -> Result<(), ApiError> {
    if req.name.trim().is_empty() || req.location.trim().is_empty() {
        return Err(ApiError::Validation(
            "Name and location are required".to_string(),
        ));
    }
    Ok(())
}

pub async fn list(store: &dyn Store) -> Result<Vec<Restaurant>, ApiError> {
    Ok(store.list_restaurants().await?)
}

pub async fn get(store: &dyn Store, id: i64) -> Result<Option<Restaurant>, ApiError> {
    Ok(store.get_restaurant(id).await?)
}

pub async fn create(store: &dyn Store, req: &RestaurantRequest) -> Result<i64, ApiError> {
    validate(req)?;
    Ok(store.create_restaurant(req).await?)
}

pub async fn update(store: &dyn Store, id: i64, req: &RestaurantRequest) -> Result<u64, ApiError> {
    validate(req)?;
    Ok(store.update_restaurant(id, req).await?)
}

/// Reservations pointing at the restaurant are left as they are.
pub async fn delete(store: &dyn Store, id: i64) -> Result<u64, ApiError> {
    Ok(store.delete_restaurant(id).await?)
}
