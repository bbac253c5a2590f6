//! User entity <-> model mapper

use board_core::entities::{User, UserRole};
use board_core::value_objects::Snowflake;

use crate::models::UserModel;

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: Snowflake::new(model.id),
            username: model.username,
            email: model.email,
            role: model.role.parse().unwrap_or(UserRole::User),
            enabled: model.enabled,
            registration_ip: model.registration_ip,
            last_login_ip: model.last_login_ip,
            last_login_at: model.last_login_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
