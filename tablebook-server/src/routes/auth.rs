use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::error::{ApiError, ErrorBody};
use crate::middleware::auth::AuthUser;
use crate::middleware::json::ApiJson;
use crate::models::user::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserIdResponse, UserProfile,
};
use crate::services::{reservations, users};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile", get(profile))
        .route("/userid", get(user_id))
}

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Missing fields or email already registered", body = ErrorBody),
    ),
    tag = "Auth"
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let user_id = users::register(state.store.as_ref(), &req.name, &req.email, &req.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user_id,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
    ),
    tag = "Auth"
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let token = users::login(state.store.as_ref(), &state.keys, &req.email, &req.password).await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
    }))
}

#[utoipa::path(
    get,
    path = "/auth/profile",
    responses(
        (status = 200, description = "Profile with active and past reservations", body = UserProfile),
        (status = 401, description = "No token", body = ErrorBody),
        (status = 403, description = "Invalid or expired token", body = ErrorBody),
        (status = 404, description = "User no longer exists", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Auth"
)]
pub(crate) async fn profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserProfile>, ApiError> {
    let today = chrono::Utc::now().date_naive();
    tracing::debug!("profile for {} as of {}", auth.email, today);
    let profile = reservations::profile(state.store.as_ref(), auth.user_id, today).await?;
    Ok(Json(profile))
}

#[utoipa::path(
    get,
    path = "/auth/userid",
    responses(
        (status = 200, description = "Id of the authenticated user", body = UserIdResponse),
        (status = 401, description = "No token", body = ErrorBody),
        (status = 403, description = "Invalid or expired token", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Auth"
)]
pub(crate) async fn user_id(auth: AuthUser) -> Json<UserIdResponse> {
    Json(UserIdResponse {
        user_id: auth.user_id,
    })
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::api_router;
    use crate::routes::test_support::{call, sign_up, state};

    #[tokio::test]
    async fn register_login_profile_scenario() {
        let app = api_router(state());

        let (status, body) = call(
            &app,
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "name": "Alice", "email": "a@x.com", "password": "secret1" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "User registered successfully");

        let (status, body) = call(
            &app,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "a@x.com", "password": "secret1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap().to_string();

        let (status, body) = call(&app, Method::GET, "/auth/profile", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "name": "Alice",
                "email": "a@x.com",
                "activeReservations": [],
                "reservationHistory": [],
            })
        );
    }

    #[tokio::test]
    async fn duplicate_registration_is_a_bad_request() {
        let app = api_router(state());
        sign_up(&app, "Alice", "a@x.com").await;

        let (status, body) = call(
            &app,
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "name": "Alice", "email": "a@x.com", "password": "secret1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "User with this email already exists");
    }

    #[tokio::test]
    async fn bad_password_is_unauthorized() {
        let app = api_router(state());
        sign_up(&app, "Alice", "a@x.com").await;

        let (status, body) = call(
            &app,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "a@x.com", "password": "wrong-one" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn profile_without_header_is_401() {
        let app = api_router(state());
        let (status, _) = call(&app, Method::GET, "/auth/profile", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn profile_with_expired_token_is_403() {
        let state = state();
        let app = api_router(state.clone());
        let (user_id, _) = sign_up(&app, "Alice", "a@x.com").await;
        let two_hours_ago = chrono::Utc::now().timestamp() - 7200;
        let expired = state.keys.issue_at(user_id, "a@x.com", two_hours_ago).unwrap();

        let (status, _) = call(&app, Method::GET, "/auth/profile", Some(&expired), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn garbage_token_is_403_but_wrong_scheme_is_401() {
        let app = api_router(state());
        let (status, _) = call(&app, Method::GET, "/auth/userid", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let request = axum::http::Request::builder()
            .uri("/auth/userid")
            .header("Authorization", "Basic YTpi")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn userid_echoes_token_identity() {
        let app = api_router(state());
        let (user_id, token) = sign_up(&app, "Alice", "a@x.com").await;

        let (status, body) = call(&app, Method::GET, "/auth/userid", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userId"], user_id);
    }
}
