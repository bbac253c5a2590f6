//! Board service
//!
//! Board administration. Reads are public; writes need `MANAGE_BOARDS`.

use board_core::{Authorities, Board, BoardSettings, DomainError, User};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{BoardResponse, BoardSettingsRequest, CreateBoardRequest, UpdateBoardRequest};

use super::access::require_authority;
use super::context::ServiceContext;
use super::error::{field_error, ServiceError, ServiceResult};

pub struct BoardService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> BoardService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn list(&self) -> ServiceResult<Vec<BoardResponse>> {
        let boards = self.ctx.board_repo().find_all().await?;
        Ok(boards.into_iter().map(BoardResponse::from).collect())
    }

    pub async fn get(&self, label: &str) -> ServiceResult<BoardResponse> {
        self.find(label).await.map(BoardResponse::from)
    }

    #[instrument(skip(self, request, actor), fields(label = %request.label))]
    pub async fn create(
        &self,
        request: CreateBoardRequest,
        actor: Option<&User>,
    ) -> ServiceResult<BoardResponse> {
        let admin = require_authority(actor, Authorities::MANAGE_BOARDS)?;

        let mut errors = request.validate().err().unwrap_or_default();
        if !Board::is_valid_label(&request.label) && !errors.field_errors().contains_key("label") {
            errors.add(
                "label",
                field_error("label", "Label may only contain lowercase letters and digits"),
            );
        }
        if !errors.is_empty() {
            return Err(ServiceError::InvalidFields(errors));
        }

        let mut board = Board::new(self.ctx.generate_id(), request.label, request.name);
        apply_settings(&mut board.settings, request.settings);
        self.ctx.board_repo().create(&board).await?;

        info!(board_id = %board.id, admin = %admin.username, "Board created");
        Ok(BoardResponse::from(board))
    }

    /// Change the name and settings. The label never changes.
    #[instrument(skip(self, request, actor))]
    pub async fn update(
        &self,
        label: &str,
        request: UpdateBoardRequest,
        actor: Option<&User>,
    ) -> ServiceResult<BoardResponse> {
        let admin = require_authority(actor, Authorities::MANAGE_BOARDS)?;
        request.validate()?;

        let mut board = self.find(label).await?;
        if let Some(name) = request.name {
            board.name = name;
        }
        apply_settings(&mut board.settings, request.settings);
        self.ctx.board_repo().update(&board).await?;

        info!(board_id = %board.id, admin = %admin.username, "Board updated");
        Ok(BoardResponse::from(board))
    }

    /// Delete a board with all its threads
    #[instrument(skip(self, actor))]
    pub async fn delete(&self, label: &str, actor: Option<&User>) -> ServiceResult<()> {
        let admin = require_authority(actor, Authorities::MANAGE_BOARDS)?;
        let board = self.find(label).await?;

        self.ctx.board_repo().delete(board.id).await?;

        info!(board_id = %board.id, admin = %admin.username, "Board deleted");
        Ok(())
    }

    async fn find(&self, label: &str) -> ServiceResult<Board> {
        self.ctx
            .board_repo()
            .find_by_label(label)
            .await?
            .ok_or_else(|| DomainError::BoardNotFound(label.to_string()).into())
    }
}

fn apply_settings(settings: &mut BoardSettings, request: BoardSettingsRequest) {
    if let Some(categories) = request.attachment_categories {
        settings.attachment_categories = categories;
    }
    if let Some(name) = request.default_poster_name {
        settings.default_poster_name = name;
    }
    if let Some(force) = request.force_default_poster_name {
        settings.force_default_poster_name = force;
    }
    if let Some(limit) = request.bump_limit {
        settings.bump_limit = limit;
    }
    if let Some(limit) = request.thread_limit {
        settings.thread_limit = limit;
    }
    if let Some(enabled) = request.captcha_enabled {
        settings.captcha_enabled = enabled;
    }
    if let Some(enabled) = request.country_flags {
        settings.country_flags = enabled;
    }
    if let Some(enabled) = request.poster_thread_ids {
        settings.poster_thread_ids = enabled;
    }
    if let Some(nsfw) = request.nsfw {
        settings.nsfw = nsfw;
    }
}
