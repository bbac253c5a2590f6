//! User tokens - single-use secrets for email verification and password resets

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{EMAIL_VERIFICATION_TOKEN_TTL_MINUTES, PASSWORD_RESET_TOKEN_TTL_MINUTES};
use crate::value_objects::Snowflake;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserTokenType {
    EmailVerification,
    PasswordReset,
}

impl UserTokenType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmailVerification => "EMAIL_VERIFICATION",
            Self::PasswordReset => "PASSWORD_RESET",
        }
    }

    pub fn default_ttl(self) -> Duration {
        match self {
            Self::EmailVerification => Duration::minutes(EMAIL_VERIFICATION_TOKEN_TTL_MINUTES),
            Self::PasswordReset => Duration::minutes(PASSWORD_RESET_TOKEN_TTL_MINUTES),
        }
    }
}

impl fmt::Display for UserTokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserTokenType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EMAIL_VERIFICATION" => Ok(Self::EmailVerification),
            "PASSWORD_RESET" => Ok(Self::PasswordReset),
            other => Err(format!("unknown token type: {other}")),
        }
    }
}

/// At most one live token exists per (user, type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserToken {
    pub value: String,
    pub user_id: Snowflake,
    pub token_type: UserTokenType,
    pub issued_at: DateTime<Utc>,
    pub expiration_at: DateTime<Utc>,
}

impl UserToken {
    pub fn new(value: String, user_id: Snowflake, token_type: UserTokenType, ttl: Duration) -> Self {
        let issued_at = Utc::now();
        Self {
            value,
            user_id,
            token_type,
            issued_at,
            expiration_at: issued_at + ttl,
        }
    }

    #[inline]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration_at < now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry() {
        let token = UserToken::new(
            "abc".to_string(),
            Snowflake::new(1),
            UserTokenType::PasswordReset,
            UserTokenType::PasswordReset.default_ttl(),
        );
        assert!(!token.is_expired(Utc::now()));
        assert!(token.is_expired(Utc::now() + Duration::minutes(31)));
    }

    #[test]
    fn test_type_text() {
        assert_eq!(
            "PASSWORD_RESET".parse::<UserTokenType>(),
            Ok(UserTokenType::PasswordReset)
        );
        assert_eq!(UserTokenType::EmailVerification.to_string(), "EMAIL_VERIFICATION");
    }
}
