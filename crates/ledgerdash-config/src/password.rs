//! Argon2 password hashes for configured users

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand_core::OsRng;

use crate::error::{ConfigError, ConfigResult};

/// Hash a password into the PHC string stored in `users[].password_hash`
pub fn hash_password(password: &str) -> ConfigResult<String> {
    if password.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "password".to_string(),
            reason: "Password must not be empty".to_string(),
        });
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ConfigError::InvalidValue {
            field: "password".to_string(),
            reason: e.to_string(),
        })
}

/// Check a password against a PHC string; cost parameters come from the string.
/// A malformed hash never matches.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Parse error for a stored hash, if any
pub(crate) fn check_hash(password_hash: &str) -> Option<String> {
    PasswordHash::new(password_hash).err().map(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // argon2id, m=8 t=1 p=1
    const S3CRET: &str =
        "$argon2id$v=19$m=8,t=1,p=1$LRM8Ya0XkfuLQlUeDI0+tg$8mwCBY/SVDOFS2DuX3hJx1DMU0O7OM+RhmN0gl/U+0Q";

    #[test]
    fn test_verify_stored_hash() {
        assert!(verify_password("s3cret", S3CRET));
        assert!(!verify_password("S3cret", S3CRET));
        assert!(!verify_password("", S3CRET));
    }

    #[test]
    fn test_plaintext_is_not_a_hash() {
        assert!(!verify_password("admin", "admin"));
        assert!(check_hash("admin").is_some());
        assert!(check_hash(S3CRET).is_none());
    }

    #[test]
    fn test_hash_password_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("correct horse"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert_ne!(hash_password("correct horse").unwrap(), hash);
    }

    #[test]
    fn test_empty_password_rejected() {
        assert!(matches!(hash_password(""), Err(ConfigError::InvalidValue { .. })));
    }
}
