//! User token entity <-> model mapper

use board_core::entities::UserToken;
use board_core::error::DomainError;
use board_core::value_objects::Snowflake;

use crate::models::UserTokenModel;

impl TryFrom<UserTokenModel> for UserToken {
    type Error = DomainError;

    fn try_from(model: UserTokenModel) -> Result<Self, Self::Error> {
        Ok(UserToken {
            token_type: model.token_type.parse().map_err(DomainError::DatabaseError)?,
            value: model.value,
            user_id: Snowflake::new(model.user_id),
            issued_at: model.issued_at,
            expiration_at: model.expiration_at,
        })
    }
}
