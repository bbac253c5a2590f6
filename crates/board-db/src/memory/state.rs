use std::collections::HashMap;

use board_core::entities::{Attachment, Ban, Board, Post, Thread, User, UserToken};
use board_core::value_objects::Snowflake;

#[derive(Debug, Clone)]
pub(super) struct StoredPost {
    pub board_id: Snowflake,
    pub post: Post,
}

#[derive(Debug, Clone, Default)]
pub(super) struct MemoryState {
    pub boards: HashMap<Snowflake, Board>,
    /// Stored without `reply_count`; see [`MemoryState::thread_view`]
    pub threads: HashMap<Snowflake, Thread>,
    pub posts: HashMap<Snowflake, StoredPost>,
    pub users: HashMap<Snowflake, (User, String)>,
    pub tokens: Vec<UserToken>,
    pub bans: Vec<Ban>,
}

impl MemoryState {
    pub fn board_by_label(&self, label: &str) -> Option<&Board> {
        self.boards.values().find(|b| b.label == label)
    }

    pub fn board_view(&self, board: &Board) -> Board {
        let mut board = board.clone();
        board.thread_count = self
            .threads
            .values()
            .filter(|t| t.board_id == board.id)
            .count() as i64;
        board
    }

    pub fn reply_count(&self, thread_id: Snowflake) -> i64 {
        self.posts
            .values()
            .filter(|p| p.post.thread_id == thread_id && !p.post.original_post)
            .count() as i64
    }

    pub fn thread_view(&self, thread: &Thread) -> Thread {
        let mut thread = thread.clone();
        thread.reply_count = self.reply_count(thread.id);
        thread
    }

    pub fn thread_by_number(&self, board_id: Snowflake, number: i64) -> Option<&Thread> {
        self.threads
            .values()
            .find(|t| t.board_id == board_id && t.number() == number)
    }

    pub fn posts_of_thread(&self, thread_id: Snowflake) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .values()
            .filter(|p| p.post.thread_id == thread_id)
            .map(|p| p.post.clone())
            .collect();
        posts.sort_by_key(|p| p.post_number);
        posts
    }

    /// Remove a thread and its posts, returning their attachments
    pub fn remove_thread(&mut self, thread_id: Snowflake) -> Option<Vec<Attachment>> {
        self.threads.remove(&thread_id)?;

        let ids: Vec<Snowflake> = self
            .posts
            .values()
            .filter(|p| p.post.thread_id == thread_id)
            .map(|p| p.post.id)
            .collect();

        Some(
            ids.into_iter()
                .filter_map(|id| self.posts.remove(&id))
                .filter_map(|p| p.post.attachment)
                .collect(),
        )
    }

    pub fn remove_board(&mut self, board_id: Snowflake) -> bool {
        if self.boards.remove(&board_id).is_none() {
            return false;
        }
        let threads: Vec<Snowflake> = self
            .threads
            .values()
            .filter(|t| t.board_id == board_id)
            .map(|t| t.id)
            .collect();
        for id in threads {
            self.remove_thread(id);
        }
        true
    }
}
