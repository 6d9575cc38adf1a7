use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

/// Salted Argon2id digest in PHC string form.
pub fn hash(plaintext: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)?
        .to_string())
}

/// A mismatch is a normal `false`. So is a stored digest that does not parse,
/// which is logged because it means the row is corrupt.
pub fn verify(plaintext: &str, digest: &str) -> bool {
    let parsed = match PasswordHash::new(digest) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("unparsable password hash in store: {}", e);
            return false;
        }
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_only_the_original_password() {
        let digest = hash("secret1").unwrap();
        assert!(verify("secret1", &digest));
        assert!(!verify("secret2", &digest));
    }

    #[test]
    fn digests_are_salted() {
        let a = hash("secret1").unwrap();
        let b = hash("secret1").unwrap();
        assert_ne!(a, b);
        assert!(!a.contains("secret1"));
    }

    #[test]
    fn garbage_digest_does_not_verify() {
        assert!(!verify("secret1", "secret1"));
    }
}
