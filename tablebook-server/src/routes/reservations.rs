use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::error::{ApiError, ErrorBody};
use crate::middleware::auth::AuthUser;
use crate::middleware::json::ApiJson;
use crate::models::reservation::{Reservation, ReservationCreated, ReservationRequest};
use crate::models::{parse_date, parse_time, MessageResponse};
use crate::services::reservations;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reservations", get(list_reservations).post(create_reservation))
        .route(
            "/reservations/{id}",
            get(get_reservation)
                .put(update_reservation)
                .delete(delete_reservation),
        )
}

fn ignore_body_owner(req: &ReservationRequest, auth: &AuthUser) {
    if let Some(claimed) = req.user_id {
        if claimed != auth.user_id {
            tracing::warn!(
                "ignoring user_id {} in body from user {}",
                claimed,
                auth.user_id
            );
        }
    }
}

#[utoipa::path(
    get,
    path = "/auth/reservations",
    responses(
        (status = 200, description = "All reservations", body = Vec<Reservation>),
    ),
    security(("bearer" = [])),
    tag = "Reservations"
)]
pub(crate) async fn list_reservations(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<Reservation>>, ApiError> {
    Ok(Json(reservations::list(state.store.as_ref()).await?))
}

#[utoipa::path(
    get,
    path = "/auth/reservations/{id}",
    params(("id" = i64, Path, description = "Reservation id")),
    responses(
        (status = 200, description = "Reservation owned by the caller", body = Reservation),
        (status = 404, description = "Not found or not owned by the caller", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Reservations"
)]
pub(crate) async fn get_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Reservation>, ApiError> {
    reservations::get(state.store.as_ref(), id)
        .await?
        .filter(|r| r.user_id == auth.user_id)
        .map(Json)
        .ok_or(ApiError::NotFound("Reservation"))
}

#[utoipa::path(
    post,
    path = "/auth/reservations",
    request_body = ReservationRequest,
    responses(
        (status = 201, description = "Reservation booked for the caller", body = ReservationCreated),
        (status = 400, description = "Bad date, time or party size", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Reservations"
)]
pub(crate) async fn create_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(req): ApiJson<ReservationRequest>,
) -> Result<(StatusCode, Json<ReservationCreated>), ApiError> {
    ignore_body_owner(&req, &auth);
    let date = parse_date(&req.date)?;
    let time = parse_time(&req.time)?;

    let reservation_id = reservations::create(
        state.store.as_ref(),
        auth.user_id,
        req.restaurant_id,
        date,
        time,
        req.people_count,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ReservationCreated {
            message: format!("Reservation created with ID {reservation_id}"),
            reservation_id,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/auth/reservations/{id}",
    params(("id" = i64, Path, description = "Reservation id")),
    request_body = ReservationRequest,
    responses(
        (status = 200, description = "Reservation replaced", body = MessageResponse),
        (status = 400, description = "Bad date, time or party size", body = ErrorBody),
        (status = 404, description = "Not found or not owned by the caller", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Reservations"
)]
pub(crate) async fn update_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<ReservationRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    ignore_body_owner(&req, &auth);
    let date = parse_date(&req.date)?;
    let time = parse_time(&req.time)?;

    let rows = reservations::update(
        state.store.as_ref(),
        id,
        auth.user_id,
        req.restaurant_id,
        date,
        time,
        req.people_count,
    )
    .await?;
    if rows == 0 {
        return Err(ApiError::NotFound("Reservation"));
    }
    Ok(Json(MessageResponse::new(format!("Reservation {id} updated"))))
}

#[utoipa::path(
    delete,
    path = "/auth/reservations/{id}",
    params(("id" = i64, Path, description = "Reservation id")),
    responses(
        (status = 200, description = "Reservation cancelled", body = MessageResponse),
        (status = 404, description = "Not found or not owned by the caller", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Reservations"
)]
pub(crate) async fn delete_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if reservations::delete(state.store.as_ref(), id, auth.user_id).await? == 0 {
        return Err(ApiError::NotFound("Reservation"));
    }
    Ok(Json(MessageResponse::new(format!("Reservation {id} cancelled"))))
}
