use serde::{Deserialize, Serialize};

// ── Auth types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdResponse {
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// ── Catalogue and bookings ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    pub restaurant_id: i64,
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
}

/// Dates are `YYYY/MM/DD` and times `HH:MM`, as sent by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileReservation {
    pub reservation_id: i64,
    pub user_id: i64,
    pub restaurant_id: i64,
    pub date: String,
    pub time: String,
    pub people_count: i32,
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub active_reservations: Vec<ProfileReservation>,
    pub reservation_history: Vec<ProfileReservation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub restaurant_id: i64,
    pub date: String,
    pub time: String,
    pub people_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationCreated {
    pub message: String,
    pub reservation_id: i64,
}
