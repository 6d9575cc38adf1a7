use std::time::Duration;

/// Default API base URL, including the `/auth` prefix.
/// Override at build time: TABLEBOOK_API_URL=https://example.com/auth cargo build
pub const API_BASE_URL: &str = match option_env!("TABLEBOOK_API_URL") {
    Some(url) => url,
    None => "http://localhost:5000/auth",
};

/// Requests still in flight after this long are abandoned client-side.
pub const API_TIMEOUT: Duration = Duration::from_secs(15);

/// Party sizes offered by the booking screen.
pub const MIN_PARTY: i32 = 1;
pub const MAX_PARTY: i32 = 10;

/// Secure-storage service name and entry keys.
pub const KEYRING_SERVICE: &str = "tablebook";
pub const TOKEN_KEY: &str = "auth_token";
pub const USER_ID_KEY: &str = "user_id";
