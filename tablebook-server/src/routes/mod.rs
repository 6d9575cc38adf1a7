pub mod auth;
pub mod health;
pub mod reservations;
pub mod restaurants;
pub mod users;

use axum::Router;
use crate::AppState;

pub fn api_router(state: AppState) -> Router {
    let auth_api = Router::new()
        .merge(auth::router())
        .merge(users::router())
        .merge(restaurants::router())
        .merge(reservations::router());

    Router::new()
        .nest("/auth", auth_api)
        .merge(health::router())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Drives the real router in-process against a `MemoryStore`.

    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::db::MemoryStore;
    use crate::services::token::TokenKeys;
    use crate::AppState;

    pub const SECRET: &str = "test-secret-test-secret-test-secret";

    pub fn state() -> AppState {
        AppState {
            store: Arc::new(MemoryStore::new()),
            keys: TokenKeys::new(SECRET, 3600),
        }
    }

    pub async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Register and log in, returning `(user_id, token)`.
    pub async fn sign_up(app: &Router, name: &str, email: &str) -> (i64, String) {
        let (status, body) = call(
            app,
            Method::POST,
            "/auth/register",
            None,
            Some(serde_json::json!({ "name": name, "email": email, "password": "secret1" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let user_id = body["userId"].as_i64().unwrap();

        let (status, body) = call(
            app,
            Method::POST,
            "/auth/login",
            None,
            Some(serde_json::json!({ "email": email, "password": "secret1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        (user_id, body["token"].as_str().unwrap().to_string())
    }
}
