//! Board posting service
//!
//! Creates threads and replies. Every post goes through the same steps:
//! validate the form (collecting every violated field), check bans and the captcha,
//! process the attachment, then open one posting transaction that allocates the post
//! number, inserts the post, applies the bump decision, and evicts at most one
//! overflowing thread.
//!
//! Files are written before the transaction opens. If anything after that fails, the
//! files this request created are removed again unless a committed post already points at
//! the same content. Files of evicted or deleted posts are removed after commit under the
//! same rule.

use board_core::constants::{MAX_SUBJECT_LENGTH, THREADS_PER_PAGE};
use board_core::{
    Attachment, Authorities, Board, DomainError, Post, PostingTransaction, Snowflake, Thread,
    ThreadActivity, ThreadBumpEngine, User, UserRole,
};
use board_media::{MediaError, ProcessedAttachment};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};
use validator::{Validate, ValidationErrors};

use crate::dto::{
    AttachmentUpload, PostCreatedResponse, PostForm, PostResponse, PosterInfo, ThreadForm,
    ThreadPageResponse, ThreadResponse, ThreadSummaryResponse,
};

use super::access::{has_authority, require_authority};
use super::allocator::PostNumberAllocator;
use super::ban::BanService;
use super::context::ServiceContext;
use super::error::{field_error, ServiceError, ServiceResult};
use super::identity;

/// Everything about a new post that is known before its number is
struct Draft {
    name: String,
    tripcode: Option<String>,
    body: String,
    capcode: Option<UserRole>,
    sage: bool,
    ip: String,
    country_code: Option<String>,
    deletion_code: String,
    attachment: Option<Attachment>,
    created_at: DateTime<Utc>,
}

impl Draft {
    fn into_post(
        self,
        id: Snowflake,
        thread_id: Snowflake,
        post_number: i64,
        original_post: bool,
        board: &Board,
    ) -> Post {
        let attachment = self.attachment.map(|mut attachment| {
            attachment.attach_to(id);
            attachment
        });
        let poster_thread_id = board
            .settings
            .poster_thread_ids
            .then(|| identity::poster_thread_id(&self.ip, thread_id));

        Post {
            id,
            thread_id,
            post_number,
            name: self.name,
            tripcode: self.tripcode,
            body: self.body,
            ip: self.ip,
            country_code: self.country_code,
            country_name: None,
            capcode: self.capcode,
            deletion_code: self.deletion_code,
            sage: self.sage && !original_post,
            poster_thread_id,
            original_post,
            created_at: self.created_at,
            attachment,
        }
    }
}

/// Result of a transaction body plus the attachments it removed
type Written<T> = (T, Vec<Attachment>);

pub struct BoardPostingService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> BoardPostingService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Start a thread with its original post
    #[instrument(skip(self, form, poster, author), fields(board = %label))]
    pub async fn create_thread(
        &self,
        label: &str,
        form: ThreadForm,
        poster: &PosterInfo,
        author: Option<&User>,
    ) -> ServiceResult<PostCreatedResponse> {
        let board = self.board(label).await?;

        let mut errors = form.post.validate().err().unwrap_or_default();
        if let Some(subject) = &form.subject {
            if subject.chars().count() > MAX_SUBJECT_LENGTH {
                errors.add(
                    "subject",
                    field_error(
                        "length",
                        format!("Subject must be at most {MAX_SUBJECT_LENGTH} characters"),
                    ),
                );
            }
        }
        if form.subject().is_none() && !form.post.has_body() {
            errors.add(
                "body",
                field_error("required", "First post must have non-empty subject or non-empty body"),
            );
        }
        self.check_poster(&board, &form.post, poster, author, &mut errors).await?;

        let processed = self
            .process_attachment(&board, form.post.attachment.as_ref(), &mut errors)
            .await?;
        if !errors.is_empty() {
            self.discard(processed.as_ref()).await;
            return Err(ServiceError::InvalidFields(errors));
        }

        let subject = form.subject().map(str::to_string);
        let draft = self.draft(&board, &form.post, poster, author, processed.as_ref());

        let mut tx = match self.ctx.posting_store().begin().await {
            Ok(tx) => tx,
            Err(e) => {
                self.discard(processed.as_ref()).await;
                return Err(e.into());
            }
        };
        let written = self.write_thread(tx.as_mut(), &board, subject, draft).await;
        let thread = self.settle(tx, written, processed.as_ref()).await?;

        info!(
            board = %board.label,
            number = thread.number(),
            thread_id = %thread.id,
            "Thread created"
        );

        let op = &thread.original_post;
        Ok(PostCreatedResponse {
            board: board.label,
            thread_number: thread.number(),
            post_number: op.post_number,
            deletion_code: op.deletion_code.clone(),
            post: PostResponse::from(op),
        })
    }

    /// Append a reply to a thread
    #[instrument(skip(self, form, poster, author), fields(board = %label, thread = number))]
    pub async fn create_reply(
        &self,
        label: &str,
        number: i64,
        form: PostForm,
        poster: &PosterInfo,
        author: Option<&User>,
    ) -> ServiceResult<PostCreatedResponse> {
        let board = self.board(label).await?;

        let thread = self
            .ctx
            .thread_repo()
            .find_by_board_and_number(board.id, number)
            .await?
            .ok_or_else(|| DomainError::ThreadNotFound(number.to_string()))?;
        if thread.locked {
            return Err(DomainError::ThreadLocked.into());
        }

        let mut errors = form.validate().err().unwrap_or_default();
        if !form.has_body() && form.attachment.is_none() {
            errors.add(
                "body",
                field_error("required", "Post must have an attachment or non-empty body"),
            );
        }
        self.check_poster(&board, &form, poster, author, &mut errors).await?;

        let processed = self
            .process_attachment(&board, form.attachment.as_ref(), &mut errors)
            .await?;
        if !errors.is_empty() {
            self.discard(processed.as_ref()).await;
            return Err(ServiceError::InvalidFields(errors));
        }

        let draft = self.draft(&board, &form, poster, author, processed.as_ref());

        let mut tx = match self.ctx.posting_store().begin().await {
            Ok(tx) => tx,
            Err(e) => {
                self.discard(processed.as_ref()).await;
                return Err(e.into());
            }
        };
        let written = self.write_reply(tx.as_mut(), &board, number, draft).await;
        let post = self.settle(tx, written, processed.as_ref()).await?;

        info!(
            board = %board.label,
            thread = number,
            number = post.post_number,
            "Reply created"
        );

        Ok(PostCreatedResponse {
            board: board.label,
            thread_number: number,
            post_number: post.post_number,
            deletion_code: post.deletion_code.clone(),
            post: PostResponse::from(&post),
        })
    }

    /// Delete a post with its deletion code, or as staff holding `DELETE_POST`.
    /// Deleting an original post deletes the whole thread.
    #[instrument(skip(self, deletion_code, actor), fields(board = %label))]
    pub async fn delete_post(
        &self,
        label: &str,
        number: i64,
        deletion_code: Option<&str>,
        actor: Option<&User>,
    ) -> ServiceResult<()> {
        let board = self.board(label).await?;
        let post = self
            .ctx
            .post_repo()
            .find_by_board_and_number(board.id, number)
            .await?
            .ok_or_else(|| DomainError::PostNotFound(number.to_string()))?;

        if !has_authority(actor, Authorities::DELETE_POST) {
            match deletion_code {
                Some(code) if post.deletion_code_matches(code) => {}
                Some(_) => return Err(DomainError::InvalidDeletionCode.into()),
                None => {
                    require_authority(actor, Authorities::DELETE_POST)?;
                }
            }
        }

        let mut tx = self.ctx.posting_store().begin().await?;
        let deleted = if post.original_post {
            tx.delete_thread(post.thread_id).await
        } else {
            tx.delete_post(post.id)
                .await
                .map(|attachment| attachment.into_iter().collect())
        };
        let removed = match deleted {
            Ok(removed) => removed,
            Err(e) => {
                Self::rollback(tx).await;
                return Err(e.into());
            }
        };
        tx.commit().await?;

        info!(
            board = %board.label,
            number,
            thread_deleted = post.original_post,
            "Post deleted"
        );
        self.remove_unreferenced(&removed).await;
        Ok(())
    }

    #[instrument(skip(self, actor), fields(board = %label))]
    pub async fn set_locked(
        &self,
        label: &str,
        number: i64,
        locked: bool,
        actor: Option<&User>,
    ) -> ServiceResult<ThreadSummaryResponse> {
        let moderator = require_authority(actor, Authorities::TOGGLE_LOCK_THREAD)?;
        let (_, mut thread) = self.thread(label, number).await?;

        self.ctx.thread_repo().set_locked(thread.id, locked).await?;
        thread.set_locked(locked);

        info!(moderator = %moderator.username, number, locked, "Thread lock changed");
        Ok(ThreadSummaryResponse::from(&thread))
    }

    #[instrument(skip(self, actor), fields(board = %label))]
    pub async fn set_stickied(
        &self,
        label: &str,
        number: i64,
        stickied: bool,
        actor: Option<&User>,
    ) -> ServiceResult<ThreadSummaryResponse> {
        let moderator = require_authority(actor, Authorities::TOGGLE_STICKY_THREAD)?;
        let (_, mut thread) = self.thread(label, number).await?;

        self.ctx.thread_repo().set_stickied(thread.id, stickied).await?;
        thread.set_stickied(stickied);

        info!(moderator = %moderator.username, number, stickied, "Thread sticky changed");
        Ok(ThreadSummaryResponse::from(&thread))
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// One page of a board: stickied threads first, then most recently bumped
    pub async fn list_threads(
        &self,
        label: &str,
        page: i64,
        viewer: Option<&User>,
    ) -> ServiceResult<ThreadPageResponse> {
        if page < 0 {
            return Err(ServiceError::invalid_field(
                "page",
                "range",
                "Page must not be negative",
            ));
        }
        let board = self.board(label).await?;
        let show_ip = has_authority(viewer, Authorities::VIEW_IP);

        let threads = self
            .ctx
            .thread_repo()
            .find_by_board(board.id, page, THREADS_PER_PAGE)
            .await?;

        Ok(ThreadPageResponse {
            page,
            page_count: board.page_count(),
            threads: threads
                .iter()
                .map(|thread| summary(thread, show_ip))
                .collect(),
            board: board.label,
        })
    }

    /// A thread with every post, oldest first
    pub async fn get_thread(
        &self,
        label: &str,
        number: i64,
        viewer: Option<&User>,
    ) -> ServiceResult<ThreadResponse> {
        let (_, thread) = self.thread(label, number).await?;
        let posts = self.ctx.post_repo().find_by_thread(thread.id).await?;
        let show_ip = has_authority(viewer, Authorities::VIEW_IP);

        Ok(ThreadResponse {
            thread: summary(&thread, show_ip),
            posts: posts
                .iter()
                .map(|post| PostResponse::from(post).with_ip(post, show_ip))
                .collect(),
        })
    }

    /// Replies numbered above `since`, for clients polling an open thread
    pub async fn replies_since(
        &self,
        label: &str,
        number: i64,
        since: i64,
        viewer: Option<&User>,
    ) -> ServiceResult<Vec<PostResponse>> {
        let (_, thread) = self.thread(label, number).await?;
        let posts = self
            .ctx
            .post_repo()
            .find_replies_since(thread.id, since)
            .await?;
        let show_ip = has_authority(viewer, Authorities::VIEW_IP);

        Ok(posts
            .iter()
            .map(|post| PostResponse::from(post).with_ip(post, show_ip))
            .collect())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn board(&self, label: &str) -> ServiceResult<Board> {
        self.ctx
            .board_repo()
            .find_by_label(label)
            .await?
            .ok_or_else(|| DomainError::BoardNotFound(label.to_string()).into())
    }

    async fn thread(&self, label: &str, number: i64) -> ServiceResult<(Board, Thread)> {
        let board = self.board(label).await?;
        let thread = self
            .ctx
            .thread_repo()
            .find_by_board_and_number(board.id, number)
            .await?
            .ok_or_else(|| DomainError::ThreadNotFound(number.to_string()))?;
        Ok((board, thread))
    }

    /// Ban, capcode and captcha checks; failures join the other field errors
    async fn check_poster(
        &self,
        board: &Board,
        form: &PostForm,
        poster: &PosterInfo,
        author: Option<&User>,
        errors: &mut ValidationErrors,
    ) -> ServiceResult<()> {
        if let Some(ban) = BanService::new(self.ctx).active_ban(&poster.ip, Utc::now()).await? {
            debug!(ban_id = %ban.id, "Post from banned IP rejected");
            errors.add("ip", field_error("banned", "Your IP address is banned"));
        }

        if form.capcode && !author.is_some_and(|u| u.enabled && u.role.can_capcode()) {
            errors.add(
                "capcode",
                field_error("not_allowed", "Only staff accounts can post with a capcode"),
            );
        }

        if board.settings.captcha_enabled {
            let token = form.captcha_token.as_deref().unwrap_or_default();
            let verdict = self.ctx.captcha_verifier().verify_captcha_token(token).await;
            if !verdict.is_valid() {
                errors.add(
                    "captcha",
                    field_error("captcha_rejected", "Captcha verification failed"),
                );
            }
        }
        Ok(())
    }

    async fn process_attachment(
        &self,
        board: &Board,
        upload: Option<&AttachmentUpload>,
        errors: &mut ValidationErrors,
    ) -> ServiceResult<Option<ProcessedAttachment>> {
        let Some(upload) = upload else {
            return Ok(None);
        };

        let id = self.ctx.generate_id();
        let allowed = &board.settings.attachment_categories;
        let processor = self.ctx.attachment_processor();
        let result = match upload {
            AttachmentUpload::File {
                original_filename,
                bytes,
            } => {
                processor
                    .process_file(id, &board.label, original_filename, bytes.clone(), allowed)
                    .await
            }
            AttachmentUpload::Embed { url } => {
                processor.process_embed(id, &board.label, url, allowed).await
            }
        };

        match result {
            Ok(processed) => Ok(Some(processed)),
            Err(e) if e.is_client_error() => {
                let code = match e {
                    MediaError::CorruptFile(_) => "corrupt_file",
                    _ => "unsupported_media_type",
                };
                debug!(error = %e, "Attachment rejected");
                errors.add("attachment", field_error(code, e.to_string()));
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn draft(
        &self,
        board: &Board,
        form: &PostForm,
        poster: &PosterInfo,
        author: Option<&User>,
        processed: Option<&ProcessedAttachment>,
    ) -> Draft {
        let tripcode = form
            .password
            .as_deref()
            .filter(|secret| !secret.is_empty())
            .map(identity::tripcode);
        let country_code = if board.settings.country_flags {
            identity::country_code(poster.country_code.as_deref())
        } else {
            None
        };

        Draft {
            name: identity::poster_name(form.name.as_deref(), &board.settings),
            tripcode,
            body: identity::format_body(&form.body),
            capcode: author.filter(|_| form.capcode).map(|u| u.role),
            sage: form.sage,
            ip: poster.ip.clone(),
            country_code,
            deletion_code: identity::deletion_code(),
            attachment: processed.map(|p| p.attachment.clone()),
            created_at: Utc::now(),
        }
    }

    async fn write_thread(
        &self,
        tx: &mut dyn PostingTransaction,
        board: &Board,
        subject: Option<String>,
        draft: Draft,
    ) -> ServiceResult<Written<Thread>> {
        let number = PostNumberAllocator::allocate_in(tx, &board.label).await?;

        let thread_id = self.ctx.generate_id();
        let post = draft.into_post(self.ctx.generate_id(), thread_id, number, true, board);
        let thread = Thread::new(thread_id, board.id, subject, post);
        tx.insert_thread(&thread).await?;

        let evicted = Self::evict_overflow(tx, board, thread_id).await?;
        Ok((thread, evicted))
    }

    async fn write_reply(
        &self,
        tx: &mut dyn PostingTransaction,
        board: &Board,
        number: i64,
        draft: Draft,
    ) -> ServiceResult<Written<Post>> {
        let post_number = PostNumberAllocator::allocate_in(tx, &board.label).await?;

        // Re-read under lock: the thread may have been locked or evicted since the pre-check
        let thread = tx
            .find_thread_for_update(board.id, number)
            .await?
            .ok_or_else(|| DomainError::ThreadNotFound(number.to_string()))?;
        if thread.locked {
            return Err(DomainError::ThreadLocked.into());
        }

        let post = draft.into_post(self.ctx.generate_id(), thread.id, post_number, false, board);
        tx.insert_post(&post).await?;

        let decision = ThreadBumpEngine::on_reply(
            &thread,
            post.sage,
            thread.reply_count,
            &board.settings,
            post.created_at,
        );
        tx.update_thread_activity(
            thread.id,
            ThreadActivity {
                last_bump_at: decision.last_bump_at,
                last_reply_at: decision.last_reply_at,
            },
        )
        .await?;
        debug!(outcome = ?decision.outcome, replies = thread.reply_count + 1, "Bump decided");

        let evicted = Self::evict_overflow(tx, board, thread.id).await?;
        Ok((post, evicted))
    }

    /// Evict the oldest-bumped live thread if the board is over its limit. The thread
    /// being posted to is never chosen.
    async fn evict_overflow(
        tx: &mut dyn PostingTransaction,
        board: &Board,
        current: Snowflake,
    ) -> ServiceResult<Vec<Attachment>> {
        let live = tx.count_live_threads(board.id).await?;
        if !ThreadBumpEngine::needs_eviction(live, &board.settings) {
            return Ok(Vec::new());
        }

        let Some(victim) = tx.find_eviction_candidate(board.id, current).await? else {
            warn!(board = %board.label, live, "Board over thread limit but nothing is evictable");
            return Ok(Vec::new());
        };
        let attachments = tx.delete_thread(victim).await?;
        info!(board = %board.label, thread_id = %victim, live, "Thread evicted");
        Ok(attachments)
    }

    /// Commit on success, roll back on failure, and clean up files either way
    async fn settle<T>(
        &self,
        tx: Box<dyn PostingTransaction>,
        written: ServiceResult<Written<T>>,
        processed: Option<&ProcessedAttachment>,
    ) -> ServiceResult<T> {
        match written {
            Ok((value, removed)) => {
                if let Err(e) = tx.commit().await {
                    self.discard(processed).await;
                    return Err(e.into());
                }
                self.remove_unreferenced(&removed).await;
                Ok(value)
            }
            Err(e) => {
                Self::rollback(tx).await;
                self.discard(processed).await;
                Err(e)
            }
        }
    }

    async fn rollback(tx: Box<dyn PostingTransaction>) {
        if let Err(e) = tx.rollback().await {
            warn!(error = %e, "Posting transaction rollback failed");
        }
    }

    /// Remove files created for a post that was never committed
    async fn discard(&self, processed: Option<&ProcessedAttachment>) {
        let Some(processed) = processed else {
            return;
        };
        if processed.created_files().is_empty() {
            return;
        }

        let attachment = &processed.attachment;
        match self
            .ctx
            .attachment_repo()
            .count_by_filename(&attachment.folder, &attachment.filename)
            .await
        {
            Ok(0) => self.ctx.attachment_processor().discard(processed).await,
            Ok(_) => debug!(filename = %attachment.filename, "Content now referenced elsewhere, keeping files"),
            Err(e) => warn!(error = %e, filename = %attachment.filename, "Could not check file references, keeping files"),
        }
    }

    /// Remove files of deleted attachments that no remaining post references
    async fn remove_unreferenced(&self, attachments: &[Attachment]) {
        for attachment in attachments.iter().filter(|a| !a.is_embed()) {
            let references = self
                .ctx
                .attachment_repo()
                .count_by_filename(&attachment.folder, &attachment.filename)
                .await;
            match references {
                Ok(0) => {
                    if let Err(e) = self.ctx.attachment_processor().remove_files(attachment).await {
                        warn!(error = %e, filename = %attachment.filename, "Failed to remove attachment files");
                    }
                }
                Ok(count) => debug!(filename = %attachment.filename, count, "Files still referenced"),
                Err(e) => warn!(error = %e, filename = %attachment.filename, "Could not check file references"),
            }
        }
    }
}

fn summary(thread: &Thread, show_ip: bool) -> ThreadSummaryResponse {
    let mut summary = ThreadSummaryResponse::from(thread);
    summary.original_post = summary
        .original_post
        .with_ip(&thread.original_post, show_ip);
    summary
}
