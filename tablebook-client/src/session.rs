//! On-device session: the bearer token plus a denormalized copy of the user id.

use std::sync::{Mutex, PoisonError};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use crate::config::{KEYRING_SERVICE, TOKEN_KEY, USER_ID_KEY};
use crate::error::ClientError;

pub trait SessionStore: Send + Sync {
    fn token(&self) -> Result<Option<String>, ClientError>;
    fn save_token(&self, token: &str) -> Result<(), ClientError>;
    fn user_id(&self) -> Result<Option<i64>, ClientError>;
    fn save_user_id(&self, user_id: i64) -> Result<(), ClientError>;
    fn clear(&self) -> Result<(), ClientError>;
}

/// Read the `exp` claim without checking the signature. Only the server can
/// vouch for a token; this just avoids sending one that has already lapsed.
pub fn token_expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("exp")?.as_i64()
}

pub fn is_token_live(token: &str, now: i64) -> bool {
    token_expiry(token).is_some_and(|exp| exp > now)
}

// ── OS secure storage ───────────────────────────────────────────────────────

/// Session kept in the platform keychain/keystore.
pub struct KeyringSessionStore {
    service: String,
}

impl KeyringSessionStore {
    pub fn new() -> Self {
        Self::with_service(KEYRING_SERVICE)
    }

    pub fn with_service(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry, ClientError> {
        keyring::Entry::new(&self.service, key)
            .map_err(|e| ClientError::Storage(format!("Keyring entry error: {}", e)))
    }

    fn read(&self, key: &str) -> Result<Option<String>, ClientError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(ClientError::Storage(format!("Failed to read {}: {}", key, e))),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.entry(key)?
            .set_password(value)
            .map_err(|e| ClientError::Storage(format!("Failed to store {}: {}", key, e)))
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(ClientError::Storage(format!("Failed to remove {}: {}", key, e))),
        }
    }
}

impl Default for KeyringSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for KeyringSessionStore {
    fn token(&self) -> Result<Option<String>, ClientError> {
        self.read(TOKEN_KEY)
    }

    fn save_token(&self, token: &str) -> Result<(), ClientError> {
        self.write(TOKEN_KEY, token)
    }

    fn user_id(&self) -> Result<Option<i64>, ClientError> {
        match self.read(USER_ID_KEY)? {
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| ClientError::Storage(format!("Stored user id is not a number: {}", raw))),
            None => Ok(None),
        }
    }

    fn save_user_id(&self, user_id: i64) -> Result<(), ClientError> {
        self.write(USER_ID_KEY, &user_id.to_string())
    }

    fn clear(&self) -> Result<(), ClientError> {
        self.remove(TOKEN_KEY)?;
        self.remove(USER_ID_KEY)
    }
}

// ── In memory ───────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<(Option<String>, Option<i64>)>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn token(&self) -> Result<Option<String>, ClientError> {
        Ok(self.inner.lock().unwrap_or_else(PoisonError::into_inner).0.clone())
    }

    fn save_token(&self, token: &str) -> Result<(), ClientError> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).0 = Some(token.to_string());
        Ok(())
    }

    fn user_id(&self) -> Result<Option<i64>, ClientError> {
        Ok(self.inner.lock().unwrap_or_else(PoisonError::into_inner).1)
    }

    fn save_user_id(&self, user_id: i64) -> Result<(), ClientError> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).1 = Some(user_id);
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = (None, None);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn unsigned_token(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"id":7,"email":"a@x.com","exp":{exp}}}"#));
    format!("{header}.{payload}.sig")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_read_from_payload() {
        assert_eq!(token_expiry(&unsigned_token(1_900_000_000)), Some(1_900_000_000));
    }

    #[test]
    fn liveness_compares_against_now() {
        let token = unsigned_token(1_000);
        assert!(is_token_live(&token, 999));
        assert!(!is_token_live(&token, 1_000));
        assert!(!is_token_live(&token, 5_000));
    }

    #[test]
    fn malformed_tokens_are_never_live() {
        assert!(!is_token_live("", 0));
        assert!(!is_token_live("abc", 0));
        assert!(!is_token_live("a.!!!.c", 0));
    }

    #[test]
    fn memory_store_saves_and_clears_both_values() {
        let store = MemorySessionStore::new();
        store.save_token("t").unwrap();
        store.save_user_id(7).unwrap();
        assert_eq!(store.token().unwrap().as_deref(), Some("t"));
        assert_eq!(store.user_id().unwrap(), Some(7));

        store.clear().unwrap();
        assert_eq!(store.token().unwrap(), None);
        assert_eq!(store.user_id().unwrap(), None);
    }

    #[test]
    #[ignore = "needs an OS credential store (keychain, credential manager or kernel keyring)"]
    fn keyring_store_persists_across_instances() {
        let service = format!("tablebook-test-{}", std::process::id());
        let writer = KeyringSessionStore::with_service(&service);
        writer.save_token("tok").unwrap();
        writer.save_user_id(42).unwrap();

        let reader = KeyringSessionStore::with_service(&service);
        assert_eq!(reader.token().unwrap().as_deref(), Some("tok"));
        assert_eq!(reader.user_id().unwrap(), Some(42));

        reader.clear().unwrap();
        assert_eq!(writer.token().unwrap(), None);
        assert_eq!(writer.user_id().unwrap(), None);
    }
}
