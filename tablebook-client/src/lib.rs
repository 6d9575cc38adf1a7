//! Client side of the Tablebook API for the mobile app shell.
//!
//! The shell owns screens and navigation. This crate owns HTTP, the on-device
//! session, and the rule that auth failures ([`ClientError::needs_login`]) send
//! the user back to login while anything else is shown as a retryable alert.

pub mod api_client;
pub mod config;
pub mod error;
pub mod session;
pub mod types;

pub use api_client::ApiClient;
pub use error::ClientError;
pub use session::{KeyringSessionStore, MemorySessionStore, SessionStore};

/// Client wired to the default server and the platform keychain.
pub fn default_client() -> Result<ApiClient<KeyringSessionStore>, ClientError> {
    ApiClient::new(config::API_BASE_URL, KeyringSessionStore::new())
}
