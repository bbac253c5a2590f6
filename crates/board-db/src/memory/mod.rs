//! In-memory store
//!
//! Implements every repository trait and [`PostingStore`](board_core::PostingStore) over a
//! single mutex-guarded state. An open posting transaction holds the lock until it commits
//! or is dropped, so posting operations are fully serialized. The transaction clones the
//! whole state on `begin`, which makes every post linear in the store size. Used by
//! service and router tests only.

mod posting;
mod repositories;
mod state;

use std::sync::Arc;

use tokio::sync::Mutex;

pub use posting::MemoryPostingTransaction;

use state::MemoryState;

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}
