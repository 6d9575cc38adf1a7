//! Storage port. Services receive a `&dyn Store` per call instead of reaching
//! for a global pool.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::reservation::{NewReservation, ProfileReservation, Reservation};
use crate::models::restaurant::{Restaurant, RestaurantRequest};
use crate::models::user::User;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// A unique constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(e.to_string())
            }
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::Conflict(db.message().to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

/// Query and command primitives over the users, restaurants and reservations
/// tables. Mutations return affected-row counts; zero means no matching row.
#[async_trait]
pub trait Store: Send + Sync {
    /// Round trip to the backing store.
    async fn ping(&self) -> Result<(), StoreError>;

    // ── Users ────────────────────────────────────────────────────────────

    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    async fn get_user(&self, id: i64) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i64, StoreError>;
    async fn update_user(
        &self,
        id: i64,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<u64, StoreError>;
    async fn delete_user(&self, id: i64) -> Result<u64, StoreError>;

    // ── Restaurants ──────────────────────────────────────────────────────

    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, StoreError>;
    async fn get_restaurant(&self, id: i64) -> Result<Option<Restaurant>, StoreError>;
    async fn create_restaurant(&self, req: &RestaurantRequest) -> Result<i64, StoreError>;
    async fn update_restaurant(&self, id: i64, req: &RestaurantRequest)
        -> Result<u64, StoreError>;
    async fn delete_restaurant(&self, id: i64) -> Result<u64, StoreError>;

    // ── Reservations ─────────────────────────────────────────────────────

    async fn list_reservations(&self) -> Result<Vec<Reservation>, StoreError>;
    async fn get_reservation(&self, id: i64) -> Result<Option<Reservation>, StoreError>;
    async fn create_reservation(&self, new: &NewReservation) -> Result<i64, StoreError>;
    /// Replaces every field of reservation `id` when it is owned by `new.user_id`.
    async fn update_reservation(&self, id: i64, new: &NewReservation)
        -> Result<u64, StoreError>;
    /// Deletes reservation `id` when it is owned by `user_id`.
    async fn delete_reservation(&self, id: i64, user_id: i64) -> Result<u64, StoreError>;
    /// A user's reservations joined with their restaurants. Reservations whose
    /// restaurant no longer exists are left out.
    async fn reservations_with_restaurants(
        &self,
        user_id: i64,
    ) -> Result<Vec<ProfileReservation>, StoreError>;
}
