//! Password hashing and credential checks via bcrypt.

use super::AuthError;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// Shortest password accepted when creating an admin.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Hash a password with bcrypt (cost 10).
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(|e| AuthError::Internal(format!("bcrypt verify: {e}")))
}

/// Check a login attempt. A wrong password and an unparseable stored hash
/// both surface as [`AuthError::CredentialError`].
pub fn check_credentials(password: &str, hash: &str) -> Result<(), AuthError> {
    match bcrypt::verify(password, hash) {
        Ok(true) => Ok(()),
        Ok(false) | Err(_) => Err(AuthError::CredentialError),
    }
}

/// Validate and hash a new password.
pub fn hash_new_password(password: &str) -> Result<String, AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::ValidationError(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    hash_password(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn check_credentials_rejects_wrong_password_and_bad_hash() {
        let hash = hash_password("s3cret-pass").unwrap();
        assert!(check_credentials("s3cret-pass", &hash).is_ok());
        assert!(matches!(
            check_credentials("nope", &hash),
            Err(AuthError::CredentialError)
        ));
        assert!(matches!(
            check_credentials("s3cret-pass", "not-a-bcrypt-hash"),
            Err(AuthError::CredentialError)
        ));
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(matches!(
            hash_new_password("short"),
            Err(AuthError::ValidationError(_))
        ));
        assert!(hash_new_password("long-enough").is_ok());
    }
}
