//! Ban service
//!
//! Staff holding `MANAGE_BANS` ban or warn an IP, edit the reason or end, and lift bans.
//! An IP carries at most one active ban. Ended bans are marked `EXPIRED` by a periodic
//! sweep; posting checks the end time itself, so a ban stops blocking the moment it ends.

use std::sync::Arc;
use std::time::Duration;

use board_core::{Authorities, Ban, BanRepository, BanStatus, DomainError, Snowflake, User};
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::dto::{BanResponse, CreateBanRequest, UnbanRequest, UpdateBanRequest};

use super::access::require_authority;
use super::context::ServiceContext;
use super::error::{field_error, ServiceError, ServiceResult};

pub struct BanService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> BanService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Ban or warn an IP
    #[instrument(skip(self, request, actor), fields(ip = %request.ip, warning = request.warning))]
    pub async fn create(&self, request: CreateBanRequest, actor: Option<&User>) -> ServiceResult<BanResponse> {
        let moderator = require_authority(actor, Authorities::MANAGE_BANS)?;

        let mut errors = request.validate().err().unwrap_or_default();
        if !request.warning {
            check_end(request.valid_to, Utc::now(), &mut errors);
        }
        if self.ctx.ban_repo().find_active_by_ip(&request.ip).await?.is_some() {
            errors.add(
                "ip",
                field_error("already_banned", "There is already an active ban on this IP"),
            );
        }
        if !errors.is_empty() {
            return Err(ServiceError::InvalidFields(errors));
        }

        let ban = Ban::new(
            self.ctx.generate_id(),
            request.ip,
            request.reason,
            request.warning,
            request.valid_to,
            moderator.id,
        );
        self.ctx.ban_repo().create(&ban).await?;

        info!(
            ban_id = %ban.id,
            moderator = %moderator.username,
            status = %ban.status,
            valid_to = ?ban.valid_to,
            "Ban created"
        );
        Ok(BanResponse::from(ban))
    }

    /// Every ban, newest first
    pub async fn list(&self, actor: Option<&User>) -> ServiceResult<Vec<BanResponse>> {
        require_authority(actor, Authorities::MANAGE_BANS)?;
        let bans = self.ctx.ban_repo().find_all().await?;
        Ok(bans.into_iter().map(BanResponse::from).collect())
    }

    pub async fn get(&self, id: Snowflake, actor: Option<&User>) -> ServiceResult<BanResponse> {
        require_authority(actor, Authorities::MANAGE_BANS)?;
        self.find(id).await.map(BanResponse::from)
    }

    /// The ban currently blocking `ip`, so a poster can see why they cannot post
    pub async fn current(&self, ip: &str) -> ServiceResult<BanResponse> {
        self.active_ban(ip, Utc::now())
            .await?
            .map(BanResponse::from)
            .ok_or_else(|| DomainError::BanNotFound(ip.to_string()).into())
    }

    /// Change the reason and end of a ban. Warnings never get an end.
    #[instrument(skip(self, request, actor))]
    pub async fn update(
        &self,
        id: Snowflake,
        request: UpdateBanRequest,
        actor: Option<&User>,
    ) -> ServiceResult<BanResponse> {
        let moderator = require_authority(actor, Authorities::MANAGE_BANS)?;

        let mut errors = request.validate().err().unwrap_or_default();
        let mut ban = self.find(id).await?;
        if ban.status == BanStatus::Active {
            check_end(request.valid_to, Utc::now(), &mut errors);
        }
        if !errors.is_empty() {
            return Err(ServiceError::InvalidFields(errors));
        }

        ban.reason = request.reason;
        ban.valid_to = request.valid_to.filter(|_| ban.status != BanStatus::Warning);
        self.ctx.ban_repo().update(&ban).await?;

        info!(ban_id = %ban.id, moderator = %moderator.username, "Ban updated");
        Ok(BanResponse::from(ban))
    }

    /// Lift an active ban
    #[instrument(skip(self, request, actor))]
    pub async fn unban(
        &self,
        id: Snowflake,
        request: UnbanRequest,
        actor: Option<&User>,
    ) -> ServiceResult<BanResponse> {
        let moderator = require_authority(actor, Authorities::MANAGE_BANS)?;
        request.validate()?;

        let mut ban = self.find(id).await?;
        if ban.status != BanStatus::Active {
            return Err(DomainError::BanNotActive.into());
        }
        ban.lift(moderator.id, request.reason);
        self.ctx.ban_repo().update(&ban).await?;

        info!(ban_id = %ban.id, moderator = %moderator.username, "Ban lifted");
        Ok(BanResponse::from(ban))
    }

    /// Mark every active ban that ended before `now` as expired
    pub async fn expire(&self, now: DateTime<Utc>) -> ServiceResult<u64> {
        Ok(expire(self.ctx.ban_repo(), now).await?)
    }

    /// The ban blocking `ip` at `now`, if any
    pub async fn active_ban(&self, ip: &str, now: DateTime<Utc>) -> ServiceResult<Option<Ban>> {
        let ban = self.ctx.ban_repo().find_active_by_ip(ip).await?;
        Ok(ban.filter(|ban| ban.blocks_posting(now)))
    }

    async fn find(&self, id: Snowflake) -> ServiceResult<Ban> {
        self.ctx
            .ban_repo()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::BanNotFound(id.to_string()).into())
    }
}

fn check_end(
    valid_to: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    errors: &mut validator::ValidationErrors,
) {
    if valid_to.is_some_and(|end| end <= now) {
        errors.add(
            "valid_to",
            field_error("range", "Ban end must be in the future"),
        );
    }
}

async fn expire(repo: &dyn BanRepository, now: DateTime<Utc>) -> Result<u64, DomainError> {
    let expired = repo.expire_ended(now).await?;
    if expired > 0 {
        info!(expired, "Ended bans expired");
    } else {
        debug!("No ended bans");
    }
    Ok(expired)
}

/// Background sweep marking ended bans as expired on a fixed interval
pub struct BanExpiryTask {
    repo: Arc<dyn BanRepository>,
    period: Duration,
}

impl BanExpiryTask {
    pub fn new(repo: Arc<dyn BanRepository>, period: Duration) -> Self {
        Self { repo, period }
    }

    pub fn from_context(ctx: &ServiceContext, period: Duration) -> Self {
        Self::new(ctx.ban_repo_handle(), period)
    }

    pub async fn run_once(&self) -> Result<u64, DomainError> {
        expire(self.repo.as_ref(), Utc::now()).await
    }

    /// Start sweeping. The first sweep runs immediately.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(period_secs = self.period.as_secs(), "Ban expiry task started");

            loop {
                ticker.tick().await;
                if let Err(e) = self.run_once().await {
                    warn!(error = %e, "Ban expiry failed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::Harness;
    use board_core::UserRole;

    fn ban_request(ip: &str, valid_to: Option<DateTime<Utc>>) -> CreateBanRequest {
        CreateBanRequest {
            ip: ip.to_string(),
            reason: "spam".to_string(),
            warning: false,
            valid_to,
        }
    }

    fn has_field(err: &ServiceError, field: &str) -> bool {
        err.field_errors()
            .is_some_and(|e| e.field_errors().keys().any(|k| k.to_string() == field))
    }

    fn id(response: &BanResponse) -> Snowflake {
        response.id.parse().unwrap()
    }

    #[tokio::test]
    async fn test_ban_needs_manage_bans() {
        let h = Harness::new();
        let janitor = h.user("jan", UserRole::Janitor).await;
        let service = BanService::new(&h.ctx);

        let err = service.create(ban_request("203.0.113.7", None), None).await.unwrap_err();
        assert_eq!(err.status_code(), 401);
        let err = service
            .create(ban_request("203.0.113.7", None), Some(&janitor))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(service.list(Some(&janitor)).await.unwrap_err().status_code(), 403);
    }

    #[tokio::test]
    async fn test_one_active_ban_per_ip() {
        let h = Harness::new();
        let moderator = h.user("mod", UserRole::Moderator).await;
        let service = BanService::new(&h.ctx);

        let ban = service
            .create(ban_request("203.0.113.7", None), Some(&moderator))
            .await
            .unwrap();
        assert_eq!(ban.status, BanStatus::Active);
        assert_eq!(ban.banned_by, Some(moderator.id.to_string()));

        let err = service
            .create(ban_request("203.0.113.7", None), Some(&moderator))
            .await
            .unwrap_err();
        assert!(has_field(&err, "ip"));

        assert_eq!(service.current("203.0.113.7").await.unwrap().id, ban.id);
        assert_eq!(service.current("198.51.100.1").await.unwrap_err().status_code(), 404);
    }

    #[tokio::test]
    async fn test_end_must_be_in_future() {
        let h = Harness::new();
        let moderator = h.user("mod", UserRole::Moderator).await;
        let service = BanService::new(&h.ctx);

        let past = Some(Utc::now() - chrono::Duration::minutes(1));
        let err = service
            .create(ban_request("203.0.113.7", past), Some(&moderator))
            .await
            .unwrap_err();
        assert!(has_field(&err, "valid_to"));

        // Warnings carry no end, so a past one is simply dropped
        let mut warning = ban_request("203.0.113.7", past);
        warning.warning = true;
        let warned = service.create(warning, Some(&moderator)).await.unwrap();
        assert_eq!(warned.status, BanStatus::Warning);
        assert!(warned.valid_to.is_none());
        assert!(service.current("203.0.113.7").await.is_err());
    }

    #[tokio::test]
    async fn test_update_and_unban() {
        let h = Harness::new();
        let moderator = h.user("mod", UserRole::Moderator).await;
        let service = BanService::new(&h.ctx);
        let ban = service
            .create(ban_request("203.0.113.7", None), Some(&moderator))
            .await
            .unwrap();

        let end = Utc::now() + chrono::Duration::days(3);
        let updated = service
            .update(
                id(&ban),
                UpdateBanRequest {
                    reason: "ban evasion".to_string(),
                    valid_to: Some(end),
                },
                Some(&moderator),
            )
            .await
            .unwrap();
        assert_eq!(updated.reason, "ban evasion");
        assert_eq!(updated.valid_to, Some(end));

        let unban = || UnbanRequest {
            reason: "appealed".to_string(),
        };
        let lifted = service.unban(id(&ban), unban(), Some(&moderator)).await.unwrap();
        assert_eq!(lifted.status, BanStatus::Unbanned);
        assert_eq!(lifted.unbanned_by, Some(moderator.id.to_string()));

        let err = service.unban(id(&ban), unban(), Some(&moderator)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::BanNotActive)));
        assert_eq!(err.status_code(), 409);

        // The IP can be banned again once the first ban is lifted
        assert!(service
            .create(ban_request("203.0.113.7", None), Some(&moderator))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_expiry_sweep() {
        let h = Harness::new();
        let moderator = h.user("mod", UserRole::Moderator).await;
        let repo = h.ctx.ban_repo();

        let mut ended = Ban::new(
            Snowflake::new(1),
            "203.0.113.7".to_string(),
            "spam".to_string(),
            false,
            None,
            moderator.id,
        );
        ended.valid_to = Some(Utc::now() - chrono::Duration::minutes(1));
        repo.create(&ended).await.unwrap();
        let permanent = Ban::new(
            Snowflake::new(2),
            "198.51.100.1".to_string(),
            "spam".to_string(),
            false,
            None,
            moderator.id,
        );
        repo.create(&permanent).await.unwrap();

        // An ended ban stops blocking before the sweep runs
        let service = BanService::new(&h.ctx);
        assert!(service.active_ban("203.0.113.7", Utc::now()).await.unwrap().is_none());

        let task = BanExpiryTask::from_context(&h.ctx, Duration::from_millis(10));
        assert_eq!(task.run_once().await.unwrap(), 1);
        assert_eq!(
            repo.find_by_id(ended.id).await.unwrap().unwrap().status,
            BanStatus::Expired
        );
        assert_eq!(
            repo.find_by_id(permanent.id).await.unwrap().unwrap().status,
            BanStatus::Active
        );
        assert_eq!(service.expire(Utc::now()).await.unwrap(), 0);
    }
}
