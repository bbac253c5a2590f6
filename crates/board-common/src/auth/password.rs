//! Password hashing and verification
//!
//! Argon2id with a random salt per hash.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::AppError;

/// # Errors
/// Returns an error if hashing fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {e}")))
}

/// # Errors
/// Returns an error if the stored hash cannot be parsed
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid password hash format: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Runs the argon2 work on the blocking pool so request tasks aren't stalled.
#[derive(Debug, Clone, Default)]
pub struct PasswordService;

impl PasswordService {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    pub async fn hash(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(AppError::internal)?
    }

    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let (password, hash) = (password.to_owned(), hash.to_owned());
        tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(AppError::internal)?
    }

    /// # Errors
    /// Returns `AppError::InvalidCredentials` if the password doesn't match
    pub async fn verify_or_error(&self, password: &str, hash: &str) -> Result<(), AppError> {
        if self.verify(password, hash).await? {
            Ok(())
        } else {
            Err(AppError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_salted() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert_ne!(hash, hash_password("correct horse").unwrap());
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_error() {
        assert!(verify_password("anything", "not-a-hash").is_err());
    }

    #[tokio::test]
    async fn test_password_service() {
        let service = PasswordService::new();
        let hash = service.hash("correct horse").await.unwrap();

        assert!(service.verify_or_error("correct horse", &hash).await.is_ok());
        assert!(matches!(
            service.verify_or_error("wrong", &hash).await,
            Err(AppError::InvalidCredentials)
        ));
    }
}
