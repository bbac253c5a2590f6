//! Path parameter extractors
//!
//! Thread and post numbers arrive as strings and are parsed here so a malformed
//! number is a 400 with a stable error code rather than a routing rejection.

use board_core::Snowflake;
use serde::Deserialize;

use crate::response::ApiError;

fn parse_number(raw: &str, name: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ApiError::invalid_path(format!("Invalid {name} format")))
}

/// `/boards/:label/threads/:number`
#[derive(Debug, Deserialize)]
pub struct BoardThreadPath {
    pub label: String,
    pub number: String,
}

impl BoardThreadPath {
    pub fn number(&self) -> Result<i64, ApiError> {
        parse_number(&self.number, "thread number")
    }
}

/// `/boards/:label/posts/:number`
#[derive(Debug, Deserialize)]
pub struct BoardPostPath {
    pub label: String,
    pub number: String,
}

impl BoardPostPath {
    pub fn number(&self) -> Result<i64, ApiError> {
        parse_number(&self.number, "post number")
    }
}

/// `/bans/:id`
#[derive(Debug, Deserialize)]
pub struct BanPath {
    pub id: String,
}

impl BanPath {
    pub fn id(&self) -> Result<Snowflake, ApiError> {
        self.id
            .parse()
            .map_err(|_| ApiError::invalid_path("Invalid ban id format"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_must_be_positive_integers() {
        let path = |number: &str| BoardThreadPath {
            label: "fit".to_string(),
            number: number.to_string(),
        };
        assert_eq!(path("42").number().unwrap(), 42);
        assert!(path("0").number().is_err());
        assert!(path("-3").number().is_err());
        assert!(path("abc").number().is_err());
    }

    #[test]
    fn test_ban_ids_are_snowflakes() {
        let path = |id: &str| BanPath { id: id.to_string() };
        assert_eq!(path("1234567890").id().unwrap(), Snowflake::new(1_234_567_890));
        assert!(path("current-ban").id().is_err());
    }
}
