use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use super::{Store, StoreError};
use crate::models::reservation::{NewReservation, ProfileReservation, Reservation};
use crate::models::restaurant::{Restaurant, RestaurantRequest};
use crate::models::user::User;

/// In-process store for local runs (`DATABASE_URL=memory://`) and tests.
/// Ids start at 1 and are never reused, like a serial column.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<i64, User>,
    restaurants: DashMap<i64, Restaurant>,
    reservations: DashMap<i64, Reservation>,
    next_user_id: AtomicI64,
    next_restaurant_id: AtomicI64,
    next_reservation_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirrors the `UNIQUE` constraint on `users.email`.
    fn check_email_free(&self, email: &str, except: Option<i64>) -> Result<(), StoreError> {
        let taken = self
            .users
            .iter()
            .any(|user| user.email == email && Some(user.user_id) != except);
        if taken {
            return Err(StoreError::Conflict(format!("email {email} already in use")));
        }
        Ok(())
    }
}

fn next_id(counter: &AtomicI64) -> i64 {
    counter.fetch_add(1, Ordering::SeqCst) + 1
}

fn sorted_values<T: Clone>(map: &DashMap<i64, T>) -> Vec<T> {
    let mut rows: Vec<(i64, T)> = map
        .iter()
        .map(|entry| (*entry.key(), entry.value().clone()))
        .collect();
    rows.sort_by_key(|(id, _)| *id);
    rows.into_iter().map(|(_, row)| row).collect()
}

fn affected(found: bool) -> u64 {
    u64::from(found)
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(sorted_values(&self.users))
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.value().clone()))
    }

    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i64, StoreError> {
        self.check_email_free(email, None)?;
        let user_id = next_id(&self.next_user_id);
        self.users.insert(
            user_id,
            User {
                user_id,
                name: name.to_string(),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(user_id)
    }

    async fn update_user(
        &self,
        id: i64,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<u64, StoreError> {
        self.check_email_free(email, Some(id))?;
        let found = match self.users.get_mut(&id) {
            Some(mut user) => {
                user.name = name.to_string();
                user.email = email.to_string();
                user.password_hash = password_hash.to_string();
                true
            }
            None => false,
        };
        Ok(affected(found))
    }

    async fn delete_user(&self, id: i64) -> Result<u64, StoreError> {
        Ok(affected(self.users.remove(&id).is_some()))
    }

    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, StoreError> {
        Ok(sorted_values(&self.restaurants))
    }

    async fn get_restaurant(&self, id: i64) -> Result<Option<Restaurant>, StoreError> {
        Ok(self.restaurants.get(&id).map(|r| r.clone()))
    }

    async fn create_restaurant(&self, req: &RestaurantRequest) -> Result<i64, StoreError> {
        let restaurant_id = next_id(&self.next_restaurant_id);
        self.restaurants.insert(
            restaurant_id,
            Restaurant {
                restaurant_id,
                name: req.name.clone(),
                location: req.location.clone(),
                description: req.description.clone(),
                image_url: req.image_url.clone(),
            },
        );
        Ok(restaurant_id)
    }

    async fn update_restaurant(
        &self,
        id: i64,
        req: &RestaurantRequest,
    ) -> Result<u64, StoreError> {
        let found = match self.restaurants.get_mut(&id) {
            Some(mut r) => {
                r.name = req.name.clone();
                r.location = req.location.clone();
                r.description = req.description.clone();
                r.image_url = req.image_url.clone();
                true
            }
            None => false,
        };
        Ok(affected(found))
    }

    async fn delete_restaurant(&self, id: i64) -> Result<u64, StoreError> {
        Ok(affected(self.restaurants.remove(&id).is_some()))
    }

    async fn list_reservations(&self) -> Result<Vec<Reservation>, StoreError> {
        Ok(sorted_values(&self.reservations))
    }

    async fn get_reservation(&self, id: i64) -> Result<Option<Reservation>, StoreError> {
        Ok(self.reservations.get(&id).map(|r| r.clone()))
    }

    async fn create_reservation(&self, new: &NewReservation) -> Result<i64, StoreError> {
        let reservation_id = next_id(&self.next_reservation_id);
        self.reservations.insert(
            reservation_id,
            Reservation {
                reservation_id,
                user_id: new.user_id,
                restaurant_id: new.restaurant_id,
                date: new.date,
                time: new.time,
                people_count: new.people_count,
            },
        );
        Ok(reservation_id)
    }

    async fn update_reservation(
        &self,
        id: i64,
        new: &NewReservation,
    ) -> Result<u64, StoreError> {
        let found = match self.reservations.get_mut(&id) {
            Some(mut r) if r.user_id == new.user_id => {
                r.restaurant_id = new.restaurant_id;
                r.date = new.date;
                r.time = new.time;
                r.people_count = new.people_count;
                true
            }
            _ => false,
        };
        Ok(affected(found))
    }

    async fn delete_reservation(&self, id: i64, user_id: i64) -> Result<u64, StoreError> {
        let removed = self
            .reservations
            .remove_if(&id, |_, r| r.user_id == user_id)
            .is_some();
        Ok(affected(removed))
    }

    async fn reservations_with_restaurants(
        &self,
        user_id: i64,
    ) -> Result<Vec<ProfileReservation>, StoreError> {
        let mut rows: Vec<ProfileReservation> = sorted_values(&self.reservations)
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .filter_map(|r| {
                let rest = self.restaurants.get(&r.restaurant_id)?;
                Some(ProfileReservation {
                    reservation_id: r.reservation_id,
                    user_id: r.user_id,
                    restaurant_id: r.restaurant_id,
                    date: r.date,
                    time: r.time,
                    people_count: r.people_count,
                    name: rest.name.clone(),
                    location: rest.location.clone(),
                    description: rest.description.clone(),
                    image_url: rest.image_url.clone(),
                })
            })
            .collect();
        rows.sort_by_key(|r| (r.date, r.time));
        Ok(rows)
    }
}
