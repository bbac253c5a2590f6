use async_trait::async_trait;
use chrono::{DateTime, Utc};

use board_core::entities::{Ban, BanStatus, Board, Post, Thread, User, UserToken, UserTokenType};
use board_core::error::DomainError;
use board_core::traits::{
    AttachmentRepository, BanRepository, BoardRepository, PostRepository, RepoResult, ThreadRepository,
    UserRepository, UserTokenRepository,
};
use board_core::value_objects::Snowflake;

use super::MemoryStore;
use crate::repositories::error::{
    board_id_not_found, board_not_found, thread_not_found, user_not_found,
};

#[async_trait]
impl BoardRepository for MemoryStore {
    async fn find_by_label(&self, label: &str) -> RepoResult<Option<Board>> {
        let state = self.state.lock().await;
        Ok(state.board_by_label(label).map(|b| state.board_view(b)))
    }

    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Board>> {
        let state = self.state.lock().await;
        Ok(state.boards.get(&id).map(|b| state.board_view(b)))
    }

    async fn find_all(&self) -> RepoResult<Vec<Board>> {
        let state = self.state.lock().await;
        let mut boards: Vec<Board> = state.boards.values().map(|b| state.board_view(b)).collect();
        boards.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(boards)
    }

    async fn create(&self, board: &Board) -> RepoResult<()> {
        let mut state = self.state.lock().await;
        if state.board_by_label(&board.label).is_some() {
            return Err(DomainError::BoardLabelExists(board.label.clone()));
        }
        state.boards.insert(board.id, board.clone());
        Ok(())
    }

    async fn update(&self, board: &Board) -> RepoResult<()> {
        let mut state = self.state.lock().await;
        let stored = state
            .boards
            .get_mut(&board.id)
            .ok_or_else(|| board_id_not_found(board.id))?;
        stored.name.clone_from(&board.name);
        stored.settings = board.settings.clone();
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let mut state = self.state.lock().await;
        if state.remove_board(id) {
            Ok(())
        } else {
            Err(board_id_not_found(id))
        }
    }

    async fn increase_post_number(&self, label: &str) -> RepoResult<i64> {
        let mut state = self.state.lock().await;
        let board = state
            .boards
            .values_mut()
            .find(|b| b.label == label)
            .ok_or_else(|| board_not_found(label))?;
        board.post_counter += 1;
        Ok(board.post_counter)
    }
}

#[async_trait]
impl ThreadRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Thread>> {
        let state = self.state.lock().await;
        Ok(state.threads.get(&id).map(|t| state.thread_view(t)))
    }

    async fn find_by_board_and_number(
        &self,
        board_id: Snowflake,
        number: i64,
    ) -> RepoResult<Option<Thread>> {
        let state = self.state.lock().await;
        Ok(state
            .thread_by_number(board_id, number)
            .map(|t| state.thread_view(t)))
    }

    async fn find_by_board(
        &self,
        board_id: Snowflake,
        page: i64,
        per_page: i64,
    ) -> RepoResult<Vec<Thread>> {
        let Some(offset) = page.max(0).checked_mul(per_page) else {
            return Ok(Vec::new());
        };

        let state = self.state.lock().await;
        let mut threads: Vec<&Thread> = state
            .threads
            .values()
            .filter(|t| t.board_id == board_id)
            .collect();
        threads.sort_by(|a, b| {
            b.stickied
                .cmp(&a.stickied)
                .then(b.last_bump_at.cmp(&a.last_bump_at))
                .then(b.id.cmp(&a.id))
        });

        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(per_page).unwrap_or(0);
        Ok(threads
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|t| state.thread_view(t))
            .collect())
    }

    async fn set_locked(&self, id: Snowflake, locked: bool) -> RepoResult<()> {
        let mut state = self.state.lock().await;
        let thread = state.threads.get_mut(&id).ok_or_else(|| thread_not_found(id))?;
        thread.set_locked(locked);
        Ok(())
    }

    async fn set_stickied(&self, id: Snowflake, stickied: bool) -> RepoResult<()> {
        let mut state = self.state.lock().await;
        let thread = state.threads.get_mut(&id).ok_or_else(|| thread_not_found(id))?;
        thread.set_stickied(stickied);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn find_by_board_and_number(
        &self,
        board_id: Snowflake,
        number: i64,
    ) -> RepoResult<Option<Post>> {
        let state = self.state.lock().await;
        Ok(state
            .posts
            .values()
            .find(|p| p.board_id == board_id && p.post.post_number == number)
            .map(|p| p.post.clone()))
    }

    async fn find_by_thread(&self, thread_id: Snowflake) -> RepoResult<Vec<Post>> {
        Ok(self.state.lock().await.posts_of_thread(thread_id))
    }

    async fn find_replies_since(&self, thread_id: Snowflake, after: i64) -> RepoResult<Vec<Post>> {
        let posts = self.state.lock().await.posts_of_thread(thread_id);
        Ok(posts
            .into_iter()
            .filter(|p| !p.original_post && p.post_number > after)
            .collect())
    }
}

#[async_trait]
impl AttachmentRepository for MemoryStore {
    async fn count_by_filename(&self, folder: &str, filename: &str) -> RepoResult<i64> {
        let state = self.state.lock().await;
        Ok(state
            .posts
            .values()
            .filter_map(|p| p.post.attachment.as_ref())
            .filter(|a| a.folder == folder && a.filename == filename)
            .count() as i64)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.get(&id).map(|(u, _)| u.clone()))
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|(u, _)| u.username == username)
            .map(|(u, _)| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|(u, _)| u.email.eq_ignore_ascii_case(email))
            .map(|(u, _)| u.clone()))
    }

    async fn find_all(&self) -> RepoResult<Vec<User>> {
        let state = self.state.lock().await;
        let mut users: Vec<User> = state.users.values().map(|(u, _)| u.clone()).collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()> {
        let mut state = self.state.lock().await;
        for (existing, _) in state.users.values() {
            if existing.username == user.username {
                return Err(DomainError::UsernameExists);
            }
            if existing.email.eq_ignore_ascii_case(&user.email) {
                return Err(DomainError::EmailExists);
            }
        }
        state
            .users
            .insert(user.id, (user.clone(), password_hash.to_string()));
        Ok(())
    }

    async fn update(&self, user: &User) -> RepoResult<()> {
        let mut state = self.state.lock().await;
        let email_taken = state
            .users
            .values()
            .any(|(u, _)| u.id != user.id && u.email.eq_ignore_ascii_case(&user.email));
        if email_taken {
            return Err(DomainError::EmailExists);
        }
        let (stored, _) = state
            .users
            .get_mut(&user.id)
            .ok_or_else(|| user_not_found(user.id))?;
        *stored = User {
            updated_at: Utc::now(),
            ..user.clone()
        };
        Ok(())
    }

    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>> {
        let state = self.state.lock().await;
        Ok(state.users.get(&id).map(|(_, hash)| hash.clone()))
    }

    async fn update_password(&self, id: Snowflake, password_hash: &str) -> RepoResult<()> {
        let mut state = self.state.lock().await;
        let (user, hash) = state.users.get_mut(&id).ok_or_else(|| user_not_found(id))?;
        *hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let mut state = self.state.lock().await;
        state.users.remove(&id).ok_or_else(|| user_not_found(id))?;
        state.tokens.retain(|t| t.user_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserTokenRepository for MemoryStore {
    async fn issue(&self, token: &UserToken) -> RepoResult<()> {
        let mut state = self.state.lock().await;
        state
            .tokens
            .retain(|t| !(t.user_id == token.user_id && t.token_type == token.token_type));
        state.tokens.push(token.clone());
        Ok(())
    }

    async fn find_by_value_and_type(
        &self,
        value: &str,
        token_type: UserTokenType,
    ) -> RepoResult<Option<UserToken>> {
        let state = self.state.lock().await;
        Ok(state
            .tokens
            .iter()
            .find(|t| t.value == value && t.token_type == token_type)
            .cloned())
    }

    async fn find_by_user_and_type(
        &self,
        user_id: Snowflake,
        token_type: UserTokenType,
    ) -> RepoResult<Option<UserToken>> {
        let state = self.state.lock().await;
        Ok(state
            .tokens
            .iter()
            .find(|t| t.user_id == user_id && t.token_type == token_type)
            .cloned())
    }

    async fn consume(
        &self,
        user_id: Snowflake,
        value: &str,
        token_type: UserTokenType,
    ) -> RepoResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.tokens.len();
        state.tokens.retain(|t| {
            !(t.user_id == user_id && t.value == value && t.token_type == token_type)
        });
        Ok(state.tokens.len() < before)
    }

    async fn delete_by_user_and_type(
        &self,
        user_id: Snowflake,
        token_type: UserTokenType,
    ) -> RepoResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.tokens.len();
        state
            .tokens
            .retain(|t| !(t.user_id == user_id && t.token_type == token_type));
        Ok((before - state.tokens.len()) as u64)
    }

    async fn delete_expired(&self, before: DateTime<Utc>) -> RepoResult<u64> {
        let mut state = self.state.lock().await;
        let count = state.tokens.len();
        state.tokens.retain(|t| !t.is_expired(before));
        Ok((count - state.tokens.len()) as u64)
    }

    async fn delete_by_user(&self, user_id: Snowflake) -> RepoResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.tokens.len();
        state.tokens.retain(|t| t.user_id != user_id);
        Ok((before - state.tokens.len()) as u64)
    }
}

#[async_trait]
impl BanRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Ban>> {
        let state = self.state.lock().await;
        Ok(state.bans.iter().find(|b| b.id == id).cloned())
    }

    async fn find_all(&self) -> RepoResult<Vec<Ban>> {
        let state = self.state.lock().await;
        let mut bans = state.bans.clone();
        bans.sort_by(|a, b| b.valid_from.cmp(&a.valid_from).then(b.id.cmp(&a.id)));
        Ok(bans)
    }

    async fn find_active_by_ip(&self, ip: &str) -> RepoResult<Option<Ban>> {
        let state = self.state.lock().await;
        Ok(state
            .bans
            .iter()
            .find(|b| b.ip == ip && b.status == BanStatus::Active)
            .cloned())
    }

    async fn create(&self, ban: &Ban) -> RepoResult<()> {
        let mut state = self.state.lock().await;
        if ban.status == BanStatus::Active
            && state
                .bans
                .iter()
                .any(|b| b.ip == ban.ip && b.status == BanStatus::Active)
        {
            return Err(DomainError::BanAlreadyActive(ban.ip.clone()));
        }
        state.bans.push(ban.clone());
        Ok(())
    }

    async fn update(&self, ban: &Ban) -> RepoResult<()> {
        let mut state = self.state.lock().await;
        let stored = state
            .bans
            .iter_mut()
            .find(|b| b.id == ban.id)
            .ok_or_else(|| DomainError::BanNotFound(ban.id.to_string()))?;
        stored.status = ban.status;
        stored.reason.clone_from(&ban.reason);
        stored.valid_to = ban.valid_to;
        stored.unbanned_by = ban.unbanned_by;
        stored.unban_reason.clone_from(&ban.unban_reason);
        Ok(())
    }

    async fn expire_ended(&self, before: DateTime<Utc>) -> RepoResult<u64> {
        let mut state = self.state.lock().await;
        let mut expired = 0;
        for ban in state
            .bans
            .iter_mut()
            .filter(|b| b.status == BanStatus::Active && b.valid_to.is_some_and(|end| end < before))
        {
            ban.status = BanStatus::Expired;
            expired += 1;
        }
        Ok(expired)
    }
}
