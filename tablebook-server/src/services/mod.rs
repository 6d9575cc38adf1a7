pub mod password;
pub mod reservations;
pub mod restaurants;
pub mod token;
pub mod users;
