//! Error taxonomy for the HTTP surface.
//!
//! Store and service failures bubble up unchanged; `IntoResponse` below is the
//! only place they become status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::db::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed or duplicate input.
    #[error("{0}")]
    Validation(String),

    /// No bearer credential on a protected route.
    #[error("{0}")]
    MissingToken(&'static str),

    /// Bearer credential present but bad signature or expired.
    #[error("Invalid or expired token")]
    TokenInvalid,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Internal(String),

    #[error("Database error")]
    Store(#[from] StoreError),
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::MissingToken(_) | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::TokenInvalid => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            Self::Internal(detail) => {
                tracing::error!("internal error: {}", detail);
                ErrorBody {
                    message: "Internal server error".to_string(),
                    error: Some(detail.clone()),
                }
            }
            Self::Store(e) => {
                tracing::error!("store error: {}", e);
                ErrorBody {
                    message: self.to_string(),
                    error: Some(e.to_string()),
                }
            }
            _ => ErrorBody {
                message: self.to_string(),
                error: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
