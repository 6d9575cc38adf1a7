use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::error::{ApiError, ErrorBody};
use crate::middleware::auth::AuthUser;
use crate::middleware::json::ApiJson;
use crate::models::restaurant::{Restaurant, RestaurantCreated, RestaurantRequest};
use crate::models::MessageResponse;
use crate::services::restaurants;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/restaurants", get(list_restaurants).post(create_restaurant))
        .route(
            "/restaurants/{id}",
            get(get_restaurant)
                .put(update_restaurant)
                .delete(delete_restaurant),
        )
}

#[utoipa::path(
    get,
    path = "/auth/restaurants",
    responses(
        (status = 200, description = "All restaurants", body = Vec<Restaurant>),
    ),
    tag = "Restaurants"
)]
pub(crate) async fn list_restaurants(
    State(state): State<AppState>,
) -> Result<Json<Vec<Restaurant>>, ApiError> {
    Ok(Json(restaurants::list(state.store.as_ref()).await?))
}

#[utoipa::path(
    get,
    path = "/auth/restaurants/{id}",
    params(("id" = i64, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Restaurant", body = Restaurant),
        (status = 404, description = "Not found", body = ErrorBody),
    ),
    tag = "Restaurants"
)]
pub(crate) async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Restaurant>, ApiError> {
    restaurants::get(state.store.as_ref(), id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Restaurant"))
}

#[utoipa::path(
    post,
    path = "/auth/restaurants",
    request_body = RestaurantRequest,
    responses(
        (status = 201, description = "Restaurant created", body = RestaurantCreated),
        (status = 400, description = "Missing name or location", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Restaurants"
)]
pub(crate) async fn create_restaurant(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiJson(req): ApiJson<RestaurantRequest>,
) -> Result<(StatusCode, Json<RestaurantCreated>), ApiError> {
    let restaurant_id = restaurants::create(state.store.as_ref(), &req).await?;
    Ok((
        StatusCode::CREATED,
        Json(RestaurantCreated {
            message: format!("Restaurant created with ID {restaurant_id}"),
            restaurant_id,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/auth/restaurants/{id}",
    params(("id" = i64, Path, description = "Restaurant id")),
    request_body = RestaurantRequest,
    responses(
        (status = 200, description = "Restaurant replaced", body = MessageResponse),
        (status = 404, description = "Not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Restaurants"
)]
pub(crate) async fn update_restaurant(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<RestaurantRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if restaurants::update(state.store.as_ref(), id, &req).await? == 0 {
        return Err(ApiError::NotFound("Restaurant"));
    }
    Ok(Json(MessageResponse::new(format!("Restaurant {id} updated"))))
}

#[utoipa::path(
    delete,
    path = "/auth/restaurants/{id}",
    params(("id" = i64, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Restaurant deleted", body = MessageResponse),
        (status = 404, description = "Not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Restaurants"
)]
pub(crate) async fn delete_restaurant(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if restaurants::delete(state.store.as_ref(), id).await? == 0 {
        return Err(ApiError::NotFound("Restaurant"));
    }
    Ok(Json(MessageResponse::new(format!("Restaurant {id} deleted"))))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::api_router;
    use crate::routes::test_support::{call, sign_up, state};

    #[tokio::test]
    async fn listing_is_public_but_writes_need_a_token() {
        let app = api_router(state());
        let body = json!({
            "name": "Taverna",
            "location": "Plaka",
            "description": "Greek",
            "imageUrl": "https://img/t.png",
        });

        let (status, _) =
            call(&app, Method::POST, "/auth/restaurants", None, Some(body.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (_, token) = sign_up(&app, "Alice", "a@x.com").await;
        let (status, created) =
            call(&app, Method::POST, "/auth/restaurants", Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["restaurantId"].as_i64().unwrap();

        let (status, list) = call(&app, Method::GET, "/auth/restaurants", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list[0]["restaurant_id"], id);
        assert_eq!(list[0]["imageUrl"], "https://img/t.png");
    }

    #[tokio::test]
    async fn missing_rows_are_404() {
        let app = api_router(state());
        let (_, token) = sign_up(&app, "Alice", "a@x.com").await;

        let (status, _) = call(&app, Method::GET, "/auth/restaurants/7", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(
            &app,
            Method::PUT,
            "/auth/restaurants/7",
            Some(&token),
            Some(json!({ "name": "X", "location": "Y" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) =
            call(&app, Method::DELETE, "/auth/restaurants/7", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
