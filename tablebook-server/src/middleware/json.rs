//! JSON body extractor whose rejections go through `ApiError`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Drop-in for `axum::Json` on request bodies. A body that is missing,
/// unparsable or lacks a field is a 400 with a `{message}` body.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("rejected request body: {}", rejection.body_text());
        match rejection {
            JsonRejection::JsonDataError(e) => ApiError::Validation(e.body_text()),
            JsonRejection::JsonSyntaxError(_) => {
                ApiError::Validation("Request body is not valid JSON".to_string())
            }
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::Validation("Expected a JSON body".to_string())
            }
            other => ApiError::Validation(other.body_text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::api_router;
    use crate::routes::test_support::{call, state};

    #[tokio::test]
    async fn missing_field_is_a_400_with_message() {
        let app = api_router(state());

        let (status, body) = call(
            &app,
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "name": "Alice", "email": "a@x.com" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("password"));
    }

    #[tokio::test]
    async fn body_without_json_content_type_is_a_400() {
        let app = api_router(state());
        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/auth/login")
            .body(axum::body::Body::from("email=a@x.com"))
            .unwrap();

        let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
