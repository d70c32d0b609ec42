//! Operator passwords, stored as Argon2id PHC strings.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use illustra_core::error::CoreError;
use illustra_db::models::operator::Operator;

use crate::error::{AppError, AppResult};

/// Shortest password accepted for a new operator, in characters.
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Enforce the length rule and hash `password` for `operators.password_hash`.
pub fn hash_new_password(password: &str) -> AppResult<String> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Operator password must be at least {MIN_PASSWORD_CHARS} characters long"
        ))));
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
}

/// Whether `password` is the operator's password.
///
/// A stored hash that does not parse is an internal error, not a mismatch.
pub fn password_matches(operator: &Operator, password: &str) -> AppResult<bool> {
    let stored = PasswordHash::new(&operator.password_hash).map_err(|e| {
        AppError::InternalError(format!(
            "Stored password hash of operator {} is unreadable: {e}",
            operator.id
        ))
    })?;
    match Argon2::default().verify_password(password.as_bytes(), &stored) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::InternalError(format!(
            "Password verification error: {e}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;

    use super::*;

    fn operator_with(password_hash: String) -> Operator {
        Operator {
            id: 1,
            name: "curator".to_string(),
            password_hash,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn only_the_original_password_matches() {
        let operator = operator_with(hash_new_password("lantern-festival").unwrap());

        assert!(operator.password_hash.starts_with("$argon2id$"));
        assert!(password_matches(&operator, "lantern-festival").unwrap());
        assert!(!password_matches(&operator, "lantern-festivals").unwrap());
    }

    #[test]
    fn unreadable_stored_hash_is_an_internal_error() {
        let operator = operator_with("not-a-phc-string".to_string());

        assert_matches!(
            password_matches(&operator, "anything"),
            Err(AppError::InternalError(_))
        );
    }

    #[test]
    fn length_rule_counts_characters() {
        assert_matches!(
            hash_new_password("short"),
            Err(AppError::Core(CoreError::Validation(msg))) if msg.contains("at least 8")
        );
        // Eight characters, more than eight bytes.
        assert!(hash_new_password("éééééééé").is_ok());
        assert!(hash_new_password("ééééééé").is_err());
    }
}
