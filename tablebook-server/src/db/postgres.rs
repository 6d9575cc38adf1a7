use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::{Store, StoreError};
use crate::models::reservation::{NewReservation, ProfileReservation, Reservation};
use crate::models::restaurant::{Restaurant, RestaurantRequest};
use crate::models::user::User;

const RESERVATION_COLUMNS: &str =
    "reservation_id, user_id, restaurant_id, date, time, people_count";

/// Postgres adapter. Every statement checks a connection out of the pool and
/// returns it when the statement completes.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/db/migrations").run(&self.pool).await
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT user_id, name, email, password_hash FROM users ORDER BY user_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, name, email, password_hash FROM users WHERE user_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, name, email, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING user_id",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_user(
        &self,
        id: i64,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE users SET name = $1, email = $2, password_hash = $3 WHERE user_id = $4",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_user(&self, id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, StoreError> {
        let rows = sqlx::query_as::<_, Restaurant>(
            "SELECT restaurant_id, name, location, description, image_url
             FROM restaurants ORDER BY restaurant_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_restaurant(&self, id: i64) -> Result<Option<Restaurant>, StoreError> {
        let row = sqlx::query_as::<_, Restaurant>(
            "SELECT restaurant_id, name, location, description, image_url
             FROM restaurants WHERE restaurant_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_restaurant(&self, req: &RestaurantRequest) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO restaurants (name, location, description, image_url)
             VALUES ($1, $2, $3, $4) RETURNING restaurant_id",
        )
        .bind(&req.name)
        .bind(&req.location)
        .bind(&req.description)
        .bind(&req.image_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_restaurant(
        &self,
        id: i64,
        req: &RestaurantRequest,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE restaurants SET name = $1, location = $2, description = $3, image_url = $4
             WHERE restaurant_id = $5",
        )
        .bind(&req.name)
        .bind(&req.location)
        .bind(&req.description)
        .bind(&req.image_url)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_restaurant(&self, id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM restaurants WHERE restaurant_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_reservations(&self) -> Result<Vec<Reservation>, StoreError> {
        let rows = sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations ORDER BY reservation_id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_reservation(&self, id: i64) -> Result<Option<Reservation>, StoreError> {
        let row = sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE reservation_id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_reservation(&self, new: &NewReservation) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO reservations (user_id, restaurant_id, date, time, people_count)
             VALUES ($1, $2, $3, $4, $5) RETURNING reservation_id",
        )
        .bind(new.user_id)
        .bind(new.restaurant_id)
        .bind(new.date)
        .bind(new.time)
        .bind(new.people_count)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_reservation(
        &self,
        id: i64,
        new: &NewReservation,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE reservations
             SET user_id = $1, restaurant_id = $2, date = $3, time = $4, people_count = $5
             WHERE reservation_id = $6 AND user_id = $1",
        )
        .bind(new.user_id)
        .bind(new.restaurant_id)
        .bind(new.date)
        .bind(new.time)
        .bind(new.people_count)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_reservation(&self, id: i64, user_id: i64) -> Result<u64, StoreError> {
        let result =
            sqlx::query("DELETE FROM reservations WHERE reservation_id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    async fn reservations_with_restaurants(
        &self,
        user_id: i64,
    ) -> Result<Vec<ProfileReservation>, StoreError> {
        let rows = sqlx::query_as::<_, ProfileReservation>(
            "SELECT r.reservation_id, r.user_id, r.restaurant_id, r.date, r.time, r.people_count,
                    rest.name, rest.location, rest.description, rest.image_url
             FROM reservations r
             JOIN restaurants rest ON r.restaurant_id = rest.restaurant_id
             WHERE r.user_id = $1
             ORDER BY r.date, r.time",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
