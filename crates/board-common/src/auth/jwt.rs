//! Bearer tokens for staff and registered users
//!
//! Only short-lived access tokens are issued; there is no refresh flow.

use board_core::Snowflake;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Username at issue time, for logs
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// # Errors
    /// Returns an error if the subject cannot be parsed as a Snowflake
    pub fn user_id(&self) -> Result<Snowflake, AppError> {
        self.sub.parse().map_err(|_| AppError::InvalidToken)
    }
}

/// Token returned by the login endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_secs: i64,
}

impl JwtService {
    #[must_use]
    pub fn new(secret: &str, expiry_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_secs,
        }
    }

    /// # Errors
    /// Returns an error if token encoding fails
    pub fn issue(&self, user_id: Snowflake, username: &str) -> Result<AccessToken, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            name: username.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.expiry_secs)).timestamp(),
        };

        let access_token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode JWT: {e}")))?;

        Ok(AccessToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.expiry_secs,
        })
    }

    /// Decode a token and check signature and expiry
    ///
    /// # Errors
    /// Returns `TokenExpired` or `InvalidToken`
    pub fn validate(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            })
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("expiry_secs", &self.expiry_secs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("test-secret-key-that-is-long-enough", 900)
    }

    #[test]
    fn test_issue_and_validate() {
        let service = service();
        let token = service.issue(Snowflake::new(12345), "admin").unwrap();

        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 900);

        let claims = service.validate(&token.access_token).unwrap();
        assert_eq!(claims.user_id().unwrap(), Snowflake::new(12345));
        assert_eq!(claims.name, "admin");
    }

    #[test]
    fn test_expired_token() {
        // Beyond the default 60s leeway
        let service = JwtService::new("test-secret-key-that-is-long-enough", -120);
        let token = service.issue(Snowflake::new(1), "old").unwrap();

        assert!(matches!(
            service.validate(&token.access_token),
            Err(AppError::TokenExpired)
        ));
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let token = JwtService::new("another-secret-entirely", 900)
            .issue(Snowflake::new(1), "mallory")
            .unwrap();

        assert!(matches!(
            service().validate(&token.access_token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_garbage_token() {
        assert!(matches!(
            service().validate("invalid.token.here"),
            Err(AppError::InvalidToken)
        ));
    }
}
