//! Stateless session tokens: HS256 JWTs carrying the user id and email.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::models::user::Claims;

/// Bad signature, malformed input and expiry all collapse into this one value.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid or expired token")]
pub struct InvalidToken;

#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn issue(&self, user_id: i64, email: &str) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(user_id, email, chrono::Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `issued_at` (unix seconds).
    pub fn issue_at(
        &self,
        user_id: i64,
        email: &str,
        issued_at: i64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            id: user_id,
            email: email.to_string(),
            iat: issued_at,
            exp: issued_at + self.ttl_secs,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, InvalidToken> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| InvalidToken)
    }
}
