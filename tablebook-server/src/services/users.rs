use crate::db::{Store, StoreError};
use crate::error::ApiError;
use crate::models::user::User;
use crate::services::password;
use crate::services::token::TokenKeys;

const MIN_PASSWORD_LEN: usize = 6;

/// Trimmed name and normalized email for a user write.
struct ValidUser {
    name: String,
    email: String,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate(name: &str, email: &str, password: &str) -> Result<ValidUser, ApiError> {
    let name = name.trim();
    let email = normalize_email(email);
    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(ApiError::Validation(
            "Name, email and password are required".to_string(),
        ));
    }
    if !email.contains('@') || email.len() < 5 {
        return Err(ApiError::Validation("Invalid email".to_string()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(ValidUser {
        name: name.to_string(),
        email,
    })
}

fn email_taken() -> ApiError {
    ApiError::Validation("User with this email already exists".to_string())
}

/// A concurrent writer can claim the email between the lookup and the write;
/// the store's unique constraint then reports a conflict.
fn map_conflict(e: StoreError) -> ApiError {
    match e {
        StoreError::Conflict(_) => email_taken(),
        other => ApiError::Store(other),
    }
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    password::hash(password).map_err(|e| ApiError::Internal(format!("Failed to hash password: {e}")))
}

/// Create an account. The email must not belong to any existing user; that is
/// checked up front so a duplicate never reaches the insert.
pub async fn register(
    store: &dyn Store,
    name: &str,
    email: &str,
    password: &str,
) -> Result<i64, ApiError> {
    let valid = validate(name, email, password)?;

    if store.find_user_by_email(&valid.email).await?.is_some() {
        return Err(email_taken());
    }

    let hash = hash_password(password)?;
    let user_id = store
        .create_user(&valid.name, &valid.email, &hash)
        .await
        .map_err(map_conflict)?;
    tracing::info!("registered user {}", user_id);
    Ok(user_id)
}

/// Check credentials and issue a session token.
pub async fn login(
    store: &dyn Store,
    keys: &TokenKeys,
    email: &str,
    password: &str,
) -> Result<String, ApiError> {
    let user = store
        .find_user_by_email(&normalize_email(email))
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !password::verify(password, &user.password_hash) {
        tracing::debug!("password mismatch for user {}", user.user_id);
        return Err(ApiError::InvalidCredentials);
    }

    keys.issue(user.user_id, &user.email)
        .map_err(|e| ApiError::Internal(format!("Failed to create token: {e}")))
}

pub async fn list(store: &dyn Store) -> Result<Vec<User>, ApiError> {
    Ok(store.list_users().await?)
}

pub async fn get(store: &dyn Store, id: i64) -> Result<Option<User>, ApiError> {
    Ok(store.get_user(id).await?)
}

/// Full replace of a user's name, email and password. Returns affected rows.
pub async fn update(
    store: &dyn Store,
    id: i64,
    name: &str,
    email: &str,
    password: &str,
) -> Result<u64, ApiError> {
    let valid = validate(name, email, password)?;

    if let Some(existing) = store.find_user_by_email(&valid.email).await? {
        if existing.user_id != id {
            return Err(email_taken());
        }
    }

    let hash = hash_password(password)?;
    store
        .update_user(id, &valid.name, &valid.email, &hash)
        .await
        .map_err(map_conflict)
}

pub async fn delete(store: &dyn Store, id: i64) -> Result<u64, ApiError> {
    Ok(store.delete_user(id).await?)
}
