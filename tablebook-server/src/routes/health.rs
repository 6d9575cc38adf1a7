use axum::{extract::State, routing::get, Json, Router};

use crate::error::ApiError;
use crate::models::MessageResponse;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Store reachable", body = MessageResponse),
        (status = 500, description = "Store unreachable", body = crate::error::ErrorBody),
    ),
    tag = "Health"
)]
pub(crate) async fn health(State(state): State<AppState>) -> Result<Json<MessageResponse>, ApiError> {
    state.store.ping().await?;
    Ok(Json(MessageResponse::new("ok")))
}
