//! Authority checks shared by the services

use board_common::AppError;
use board_core::{Authorities, User};

use super::error::{ServiceError, ServiceResult};

/// The acting user, provided they hold `authority`
pub fn require_authority(actor: Option<&User>, authority: Authorities) -> ServiceResult<&User> {
    let user = actor.ok_or(ServiceError::App(AppError::MissingAuth))?;
    if !user.enabled {
        return Err(AppError::AccountDisabled.into());
    }
    if !user.has_authority(authority) {
        return Err(ServiceError::permission_denied(authority.list().join(", ")));
    }
    Ok(user)
}

pub fn has_authority(actor: Option<&User>, authority: Authorities) -> bool {
    actor.is_some_and(|user| user.has_authority(authority))
}
