use thiserror::Error;

/// Minimum signing key length in bytes for HS256.
const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("JWT_SECRET must be at least {MIN_SECRET_LEN} bytes")]
    WeakSecret,
    #[error("{name} is not a valid number: {value}")]
    NotANumber { name: &'static str, value: String },
}

pub struct Config {
    /// Postgres URL, or `memory://` for the in-process store.
    pub database_url: String,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub listen_addr: String,
    /// Comma-separated allowed CORS origins. If empty or "*", allows all origins (dev mode).
    pub cors_origins: String,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::WeakSecret);
        }

        Ok(Self {
            database_url,
            jwt_secret,
            token_ttl_secs: parse_or(&get, "TOKEN_TTL_SECS", 3600)?,
            listen_addr: get("LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:5000".to_string()),
            cors_origins: get("CORS_ORIGINS").unwrap_or_else(|| "*".to_string()),
            db_max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 10)?,
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with("memory://")
    }
}

fn parse_or<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::NotANumber { name, value }),
        None => Ok(default),
    }
}
