//! Reservation lifecycle and the profile view built on top of it.
//!
//! Ownership is an argument, never a body field: callers pass the user id from
//! the verified token, and update/delete only touch rows owned by that user.
//! A reservation someone else owns is reported exactly like a missing one.

use chrono::{NaiveDate, NaiveTime};

use crate::db::Store;
use crate::error::ApiError;
use crate::models::reservation::{NewReservation, ProfileReservation, Reservation};
use crate::models::user::UserProfile;

fn check_people_count(people_count: i32) -> Result<(), ApiError> {
    if people_count < 1 {
        return Err(ApiError::Validation(
            "people_count must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

/// Book a table. Overlapping bookings for the same slot are allowed.
pub async fn create(
    store: &dyn Store,
    user_id: i64,
    restaurant_id: i64,
    date: NaiveDate,
    time: NaiveTime,
    people_count: i32,
) -> Result<i64, ApiError> {
    check_people_count(people_count)?;
    let id = store
        .create_reservation(&NewReservation {
            user_id,
            restaurant_id,
            date,
            time,
            people_count,
        })
        .await?;
    tracing::info!("user {} booked reservation {}", user_id, id);
    Ok(id)
}

pub async fn get(store: &dyn Store, id: i64) -> Result<Option<Reservation>, ApiError> {
    Ok(store.get_reservation(id).await?)
}

/// Every reservation in the store, unfiltered.
pub async fn list(store: &dyn Store) -> Result<Vec<Reservation>, ApiError> {
    Ok(store.list_reservations().await?)
}

/// Full replace. Zero affected rows means no reservation `id` owned by `user_id`.
pub async fn update(
    store: &dyn Store,
    id: i64,
    user_id: i64,
    restaurant_id: i64,
    date: NaiveDate,
    time: NaiveTime,
    people_count: i32,
) -> Result<u64, ApiError> {
    check_people_count(people_count)?;
    let new = NewReservation {
        user_id,
        restaurant_id,
        date,
        time,
        people_count,
    };
    Ok(store.update_reservation(id, &new).await?)
}

/// Cancel. Zero affected rows means no reservation `id` owned by `user_id`.
pub async fn delete(store: &dyn Store, id: i64, user_id: i64) -> Result<u64, ApiError> {
    let rows = store.delete_reservation(id, user_id).await?;
    if rows > 0 {
        tracing::info!("user {} cancelled reservation {}", user_id, id);
    }
    Ok(rows)
}

/// Split reservations into (active, history) relative to `today`.
///
/// Active holds `date >= today` in ascending date order; history holds the rest
/// in descending date order. Input order does not matter.
pub fn partition(
    today: NaiveDate,
    rows: Vec<ProfileReservation>,
) -> (Vec<ProfileReservation>, Vec<ProfileReservation>) {
    let (mut active, mut history): (Vec<_>, Vec<_>) =
        rows.into_iter().partition(|r| r.date >= today);
    active.sort_by(|a, b| (a.date, a.time).cmp(&(b.date, b.time)));
    history.sort_by(|a, b| (b.date, b.time).cmp(&(a.date, a.time)));
    (active, history)
}

pub async fn profile(
    store: &dyn Store,
    user_id: i64,
    today: NaiveDate,
) -> Result<UserProfile, ApiError> {
    let user = store
        .get_user(user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let rows = store.reservations_with_restaurants(user_id).await?;
    let (active_reservations, reservation_history) = partition(today, rows);

    Ok(UserProfile {
        name: user.name,
        email: user.email,
        active_reservations,
        reservation_history,
    })
}
