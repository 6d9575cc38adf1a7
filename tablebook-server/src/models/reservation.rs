use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{wire_date, wire_time};

// ── Database rows ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct Reservation {
    pub reservation_id: i64,
    pub user_id: i64,
    pub restaurant_id: i64,
    #[serde(serialize_with = "wire_date::serialize")]
    #[schema(value_type = String, example = "2025/06/01")]
    pub date: NaiveDate,
    #[serde(serialize_with = "wire_time::serialize")]
    #[schema(value_type = String, example = "18:00")]
    pub time: NaiveTime,
    pub people_count: i32,
}

/// A reservation joined with the restaurant it points at.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct ProfileReservation {
    pub reservation_id: i64,
    pub user_id: i64,
    pub restaurant_id: i64,
    #[serde(serialize_with = "wire_date::serialize")]
    #[schema(value_type = String, example = "2025/06/01")]
    pub date: NaiveDate,
    #[serde(serialize_with = "wire_time::serialize")]
    #[schema(value_type = String, example = "18:00")]
    pub time: NaiveTime,
    pub people_count: i32,
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
}

/// Field values written by create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReservation {
    pub user_id: i64,
    pub restaurant_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub people_count: i32,
}

// ── API types ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReservationRequest {
    /// Ignored; the owner is always the authenticated user
    pub user_id: Option<i64>,
    pub restaurant_id: i64,
    /// `YYYY/MM/DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    pub people_count: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationCreated {
    pub message: String,
    pub reservation_id: i64,
}
