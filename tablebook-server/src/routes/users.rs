use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::error::{ApiError, ErrorBody};
use crate::middleware::auth::AuthUser;
use crate::middleware::json::ApiJson;
use crate::models::user::{RegisterRequest, RegisterResponse, UserResponse};
use crate::models::MessageResponse;
use crate::services::users;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// Users may only rewrite or delete their own account. Anything else is
/// reported as a missing row.
fn require_self(auth: &AuthUser, id: i64) -> Result<(), ApiError> {
    if auth.user_id != id {
        return Err(ApiError::NotFound("User"));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/auth/users",
    responses(
        (status = 200, description = "All users, without password hashes", body = Vec<UserResponse>),
    ),
    security(("bearer" = [])),
    tag = "Users"
)]
pub(crate) async fn list_users(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = users::list(state.store.as_ref()).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/auth/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "Not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Users"
)]
pub(crate) async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    users::get(state.store.as_ref(), id)
        .await?
        .map(|u| Json(UserResponse::from(u)))
        .ok_or(ApiError::NotFound("User"))
}

#[utoipa::path(
    post,
    path = "/auth/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = RegisterResponse),
        (status = 400, description = "Missing fields or email already registered", body = ErrorBody),
    ),
    tag = "Users"
)]
pub(crate) async fn create_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let user_id = users::register(state.store.as_ref(), &req.name, &req.email, &req.password).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: format!("User created with ID {user_id}"),
            user_id,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/auth/users/{id}",
    params(("id" = i64, Path, description = "User id; must be the caller")),
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User replaced", body = MessageResponse),
        (status = 400, description = "Missing fields or email taken", body = ErrorBody),
        (status = 404, description = "Not found or not the caller", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Users"
)]
pub(crate) async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_self(&auth, id)?;
    let rows =
        users::update(state.store.as_ref(), id, &req.name, &req.email, &req.password).await?;
    if rows == 0 {
        return Err(ApiError::NotFound("User"));
    }
    Ok(Json(MessageResponse::new(format!("User {id} updated"))))
}

#[utoipa::path(
    delete,
    path = "/auth/users/{id}",
    params(("id" = i64, Path, description = "User id; must be the caller")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 404, description = "Not found or not the caller", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Users"
)]
pub(crate) async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_self(&auth, id)?;
    if users::delete(state.store.as_ref(), id).await? == 0 {
        return Err(ApiError::NotFound("User"));
    }
    tracing::info!("user {} deleted their account", id);
    Ok(Json(MessageResponse::new(format!("User {id} deleted"))))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::api_router;
    use crate::routes::test_support::{call, sign_up, state};

    #[tokio::test]
    async fn user_rows_never_expose_password_hash() {
        let app = api_router(state());
        let (user_id, token) = sign_up(&app, "Alice", "a@x.com").await;

        let (status, body) = call(
            &app,
            Method::GET,
            &format!("/auth/users/{user_id}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "user_id": user_id, "name": "Alice", "email": "a@x.com" }));

        let (_, list) = call(&app, Method::GET, "/auth/users", Some(&token), None).await;
        assert!(list[0].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn accounts_can_only_be_deleted_by_their_owner() {
        let app = api_router(state());
        let (alice, alice_token) = sign_up(&app, "Alice", "a@x.com").await;
        let (_, bob_token) = sign_up(&app, "Bob", "b@x.com").await;
        let uri = format!("/auth/users/{alice}");

        let (status, _) = call(&app, Method::DELETE, &uri, Some(&bob_token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&app, Method::DELETE, &uri, Some(&alice_token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&app, Method::GET, &uri, Some(&bob_token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn self_update_replaces_credentials() {
        let app = api_router(state());
        let (alice, token) = sign_up(&app, "Alice", "a@x.com").await;

        let (status, _) = call(
            &app,
            Method::PUT,
            &format!("/auth/users/{alice}"),
            Some(&token),
            Some(json!({ "name": "Alice", "email": "alice@x.com", "password": "another1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(
            &app,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "alice@x.com", "password": "another1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}
