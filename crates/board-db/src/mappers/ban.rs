//! Ban entity <-> model mapper

use board_core::entities::Ban;
use board_core::error::DomainError;
use board_core::value_objects::Snowflake;

use crate::models::BanModel;

impl TryFrom<BanModel> for Ban {
    type Error = DomainError;

    fn try_from(model: BanModel) -> Result<Self, Self::Error> {
        Ok(Ban {
            id: Snowflake::new(model.id),
            status: model.status.parse().map_err(DomainError::DatabaseError)?,
            ip: model.ip,
            reason: model.reason,
            banned_by: model.banned_by.map(Snowflake::new),
            valid_from: model.valid_from,
            valid_to: model.valid_to,
            unbanned_by: model.unbanned_by.map(Snowflake::new),
            unban_reason: model.unban_reason,
        })
    }
}
