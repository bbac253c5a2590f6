//! User entity and roles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::value_objects::{Authorities, Snowflake};

/// Roles are ordered: every role holds the authorities of the roles below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    User,
    Janitor,
    Moderator,
    Admin,
}

impl UserRole {
    pub fn authorities(self) -> Authorities {
        match self {
            Self::User => Authorities::empty(),
            Self::Janitor => Authorities::DELETE_POST,
            Self::Moderator => {
                Self::Janitor.authorities()
                    | Authorities::TOGGLE_STICKY_THREAD
                    | Authorities::TOGGLE_LOCK_THREAD
                    | Authorities::VIEW_IP
                    | Authorities::MANAGE_BANS
            }
            Self::Admin => {
                Self::Moderator.authorities() | Authorities::MANAGE_BOARDS | Authorities::MANAGE_USERS
            }
        }
    }

    /// Staff roles may sign their posts with a capcode
    #[inline]
    pub fn can_capcode(self) -> bool {
        self > Self::User
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Janitor => "JANITOR",
            Self::Moderator => "MODERATOR",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USER" => Ok(Self::User),
            "JANITOR" => Ok(Self::Janitor),
            "MODERATOR" => Ok(Self::Moderator),
            "ADMIN" => Ok(Self::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub enabled: bool,
    pub registration_ip: Option<String>,
    pub last_login_ip: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: Snowflake, username: String, email: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            username,
            email,
            role: UserRole::User,
            enabled: true,
            registration_ip: None,
            last_login_ip: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn authorities(&self) -> Authorities {
        self.role.authorities()
    }

    #[inline]
    pub fn has_authority(&self, authority: Authorities) -> bool {
        self.enabled && self.role.authorities().has(authority)
    }

    pub fn set_email(&mut self, email: String) {
        self.email = email;
        self.updated_at = Utc::now();
    }

    pub fn set_role(&mut self, role: UserRole) {
        self.role = role;
        self.updated_at = Utc::now();
    }

    pub fn record_login(&mut self, ip: Option<String>) {
        let now = Utc::now();
        self.last_login_ip = ip;
        self.last_login_at = Some(now);
        self.updated_at = now;
    }
}
