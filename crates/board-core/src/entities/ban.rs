//! Bans - IP-scoped posting restrictions issued by staff

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::value_objects::Snowflake;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BanStatus {
    /// Blocks posting until `valid_to` (or forever when unset)
    Active,
    /// Shown to the poster but never blocks
    Warning,
    Unbanned,
    Expired,
}

impl BanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Warning => "WARNING",
            Self::Unbanned => "UNBANNED",
            Self::Expired => "EXPIRED",
        }
    }
}

impl fmt::Display for BanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "WARNING" => Ok(Self::Warning),
            "UNBANNED" => Ok(Self::Unbanned),
            "EXPIRED" => Ok(Self::Expired),
            other => Err(format!("unknown ban status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ban {
    pub id: Snowflake,
    pub ip: String,
    pub status: BanStatus,
    pub reason: String,
    pub banned_by: Option<Snowflake>,
    pub valid_from: DateTime<Utc>,
    /// `None` means permanent. Warnings never carry an end.
    pub valid_to: Option<DateTime<Utc>>,
    pub unbanned_by: Option<Snowflake>,
    pub unban_reason: Option<String>,
}

impl Ban {
    pub fn new(
        id: Snowflake,
        ip: String,
        reason: String,
        warning: bool,
        valid_to: Option<DateTime<Utc>>,
        banned_by: Snowflake,
    ) -> Self {
        let status = if warning {
            BanStatus::Warning
        } else {
            BanStatus::Active
        };
        Self {
            id,
            ip,
            status,
            reason,
            banned_by: Some(banned_by),
            valid_from: Utc::now(),
            valid_to: valid_to.filter(|_| !warning),
            unbanned_by: None,
            unban_reason: None,
        }
    }

    /// Whether this ban blocks posting at `now`. An active ban whose end has passed no
    /// longer blocks even before the expiry sweep has marked it.
    pub fn blocks_posting(&self, now: DateTime<Utc>) -> bool {
        self.status == BanStatus::Active && self.valid_to.map_or(true, |end| end > now)
    }

    pub fn lift(&mut self, by: Snowflake, reason: String) {
        self.status = BanStatus::Unbanned;
        self.unbanned_by = Some(by);
        self.unban_reason = Some(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ban(warning: bool, valid_to: Option<DateTime<Utc>>) -> Ban {
        Ban::new(
            Snowflake::new(1),
            "203.0.113.7".to_string(),
            "spam".to_string(),
            warning,
            valid_to,
            Snowflake::new(2),
        )
    }

    #[test]
    fn test_active_ban_blocks_until_end() {
        let now = Utc::now();
        let temporary = ban(false, Some(now + Duration::hours(1)));
        assert!(temporary.blocks_posting(now));
        assert!(!temporary.blocks_posting(now + Duration::hours(2)));

        assert!(ban(false, None).blocks_posting(now + Duration::days(3650)));
    }

    #[test]
    fn test_warning_never_blocks() {
        let warning = ban(true, Some(Utc::now() + Duration::hours(1)));
        assert_eq!(warning.status, BanStatus::Warning);
        assert!(warning.valid_to.is_none());
        assert!(!warning.blocks_posting(Utc::now()));
    }

    #[test]
    fn test_lift() {
        let mut active = ban(false, None);
        active.lift(Snowflake::new(3), "appealed".to_string());
        assert_eq!(active.status, BanStatus::Unbanned);
        assert_eq!(active.unban_reason.as_deref(), Some("appealed"));
        assert!(!active.blocks_posting(Utc::now()));
    }

    #[test]
    fn test_status_text() {
        assert_eq!("EXPIRED".parse::<BanStatus>(), Ok(BanStatus::Expired));
        assert_eq!(BanStatus::Unbanned.to_string(), "UNBANNED");
    }
}
