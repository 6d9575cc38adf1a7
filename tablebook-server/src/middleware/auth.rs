use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;
use crate::AppState;

/// Verified identity of the caller, extracted from the bearer token.
///
/// Listing it as a handler argument gates the route: a missing credential is
/// rejected with 401, a present but invalid or expired one with 403, and in
/// both cases the handler never runs.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let keys = state.keys.clone();
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        async move {
            let header =
                auth_header.ok_or(ApiError::MissingToken("Missing Authorization header"))?;

            let token = header
                .strip_prefix("Bearer ")
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .ok_or(ApiError::MissingToken("Invalid Authorization format"))?;

            let claims = keys.verify(token).map_err(|_| ApiError::TokenInvalid)?;

            Ok(AuthUser {
                user_id: claims.id,
                email: claims.email,
            })
        }
    }
}
