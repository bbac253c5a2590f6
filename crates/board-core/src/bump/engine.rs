//! Thread bump engine
//!
//! Pure decision logic: given a thread, the incoming reply, and the board settings it
//! decides which timestamps move. Persistence applies the decision inside the posting
//! transaction.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entities::{BoardSettings, Thread};
use crate::value_objects::Snowflake;

/// What a reply did to its thread's position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BumpOutcome {
    /// Moved to the front of the board
    Bumped,
    /// Reply carried the sage flag
    Saged,
    /// Thread is locked; nothing changes
    Locked,
    /// Thread already has `bump_limit` replies
    BumpLimitReached,
}

/// Timestamps to store after a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BumpDecision {
    pub outcome: BumpOutcome,
    pub last_bump_at: DateTime<Utc>,
    pub last_reply_at: DateTime<Utc>,
}

impl BumpDecision {
    #[inline]
    pub fn bumped(&self) -> bool {
        self.outcome == BumpOutcome::Bumped
    }
}

/// Lifecycle state of a thread that still exists. Eviction is terminal and leaves
/// nothing behind, so it has no state here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreadState {
    Active,
    BumpLimited,
}

pub struct ThreadBumpEngine;

impl ThreadBumpEngine {
    /// Decide the effect of a reply.
    ///
    /// `reply_count` is the number of replies already in the thread, not counting the
    /// original post or the reply being added.
    pub fn on_reply(
        thread: &Thread,
        sage: bool,
        reply_count: i64,
        settings: &BoardSettings,
        now: DateTime<Utc>,
    ) -> BumpDecision {
        let unchanged_bump = thread.last_bump_at;

        if thread.locked {
            return BumpDecision {
                outcome: BumpOutcome::Locked,
                last_bump_at: unchanged_bump,
                last_reply_at: thread.last_reply_at,
            };
        }

        let outcome = if sage {
            BumpOutcome::Saged
        } else if Self::state(thread, reply_count, settings) == ThreadState::BumpLimited {
            BumpOutcome::BumpLimitReached
        } else {
            BumpOutcome::Bumped
        };

        BumpDecision {
            outcome,
            last_bump_at: if outcome == BumpOutcome::Bumped {
                now
            } else {
                unchanged_bump
            },
            last_reply_at: now,
        }
    }

    /// Stickied threads never become bump-limited
    pub fn state(thread: &Thread, reply_count: i64, settings: &BoardSettings) -> ThreadState {
        if !thread.stickied && reply_count >= i64::from(settings.bump_limit) {
            ThreadState::BumpLimited
        } else {
            ThreadState::Active
        }
    }

    /// Whether the board holds more live threads than it allows
    #[inline]
    pub fn needs_eviction(live_threads: i64, settings: &BoardSettings) -> bool {
        live_threads > i64::from(settings.thread_limit)
    }

    /// Pick the thread to evict: the oldest `last_bump_at` among threads that are
    /// neither stickied, locked, nor `exclude`; ties go to the lower id.
    pub fn select_eviction_victim<'a, I>(threads: I, exclude: Snowflake) -> Option<&'a Thread>
    where
        I: IntoIterator<Item = &'a Thread>,
    {
        threads
            .into_iter()
            .filter(|t| !t.stickied && !t.locked && t.id != exclude)
            .min_by_key(|t| (t.last_bump_at, t.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Post;
    use chrono::Duration;

    fn settings(bump_limit: i32, thread_limit: i32) -> BoardSettings {
        let mut settings = BoardSettings::new(Snowflake::new(1));
        settings.bump_limit = bump_limit;
        settings.thread_limit = thread_limit;
        settings
    }

    fn thread(id: i64, bumped_minutes_ago: i64) -> Thread {
        let created = Utc::now() - Duration::minutes(bumped_minutes_ago);
        let post = Post {
            id: Snowflake::new(id * 100),
            thread_id: Snowflake::new(id),
            post_number: id,
            name: "Anonymous".to_string(),
            tripcode: None,
            body: "op".to_string(),
            ip: "127.0.0.1".to_string(),
            country_code: None,
            country_name: None,
            capcode: None,
            deletion_code: "code".to_string(),
            sage: false,
            poster_thread_id: None,
            original_post: true,
            created_at: created,
            attachment: None,
        };
        Thread::new(Snowflake::new(id), Snowflake::new(1), None, post)
    }

    #[test]
    fn test_regular_reply_bumps() {
        let thread = thread(1, 10);
        let now = Utc::now();
        let decision = ThreadBumpEngine::on_reply(&thread, false, 0, &settings(300, 100), now);

        assert_eq!(decision.outcome, BumpOutcome::Bumped);
        assert_eq!(decision.last_bump_at, now);
        assert_eq!(decision.last_reply_at, now);
    }

    #[test]
    fn test_sage_updates_reply_time_only() {
        let thread = thread(1, 10);
        let now = Utc::now();
        let decision = ThreadBumpEngine::on_reply(&thread, true, 0, &settings(300, 100), now);

        assert_eq!(decision.outcome, BumpOutcome::Saged);
        assert_eq!(decision.last_bump_at, thread.last_bump_at);
        assert_eq!(decision.last_reply_at, now);
    }

    #[test]
    fn test_locked_thread_keeps_both_timestamps() {
        let mut thread = thread(1, 10);
        thread.set_locked(true);
        let decision = ThreadBumpEngine::on_reply(&thread, false, 0, &settings(300, 100), Utc::now());

        assert_eq!(decision.outcome, BumpOutcome::Locked);
        assert_eq!(decision.last_bump_at, thread.last_bump_at);
        assert_eq!(decision.last_reply_at, thread.last_reply_at);
    }

    #[test]
    fn test_bump_limit_freezes_bump_time() {
        let thread = thread(1, 10);
        let settings = settings(3, 100);
        let now = Utc::now();

        let below = ThreadBumpEngine::on_reply(&thread, false, 2, &settings, now);
        assert!(below.bumped());

        let at_limit = ThreadBumpEngine::on_reply(&thread, false, 3, &settings, now);
        assert_eq!(at_limit.outcome, BumpOutcome::BumpLimitReached);
        assert_eq!(at_limit.last_bump_at, thread.last_bump_at);
        assert_eq!(at_limit.last_reply_at, now);
        assert_eq!(
            ThreadBumpEngine::state(&thread, 3, &settings),
            ThreadState::BumpLimited
        );
    }

    #[test]
    fn test_stickied_thread_ignores_bump_limit() {
        let mut thread = thread(1, 10);
        thread.set_stickied(true);
        let decision = ThreadBumpEngine::on_reply(&thread, false, 500, &settings(3, 100), Utc::now());

        assert!(decision.bumped());
        assert_eq!(ThreadBumpEngine::state(&thread, 500, &settings(3, 100)), ThreadState::Active);
    }

    #[test]
    fn test_needs_eviction_only_above_limit() {
        let settings = settings(300, 2);
        assert!(!ThreadBumpEngine::needs_eviction(2, &settings));
        assert!(ThreadBumpEngine::needs_eviction(3, &settings));
    }

    #[test]
    fn test_victim_is_oldest_bumped() {
        let threads = vec![thread(1, 5), thread(2, 30), thread(3, 10)];
        let victim = ThreadBumpEngine::select_eviction_victim(&threads, Snowflake::new(99));
        assert_eq!(victim.map(|t| t.id), Some(Snowflake::new(2)));
    }

    #[test]
    fn test_victim_skips_stickied_locked_and_current() {
        let mut sticky = thread(1, 60);
        sticky.set_stickied(true);
        let mut locked = thread(2, 50);
        locked.set_locked(true);
        let current = thread(3, 40);
        let other = thread(4, 1);

        let threads = vec![sticky, locked, current, other];
        let victim = ThreadBumpEngine::select_eviction_victim(&threads, Snowflake::new(3));
        assert_eq!(victim.map(|t| t.id), Some(Snowflake::new(4)));
    }

    #[test]
    fn test_victim_tie_breaks_on_id() {
        let mut a = thread(7, 0);
        let mut b = thread(5, 0);
        let instant = Utc::now() - Duration::hours(1);
        a.last_bump_at = instant;
        b.last_bump_at = instant;

        let threads = vec![a, b];
        let victim = ThreadBumpEngine::select_eviction_victim(&threads, Snowflake::new(0));
        assert_eq!(victim.map(|t| t.id), Some(Snowflake::new(5)));
    }

    #[test]
    fn test_no_victim_when_everything_protected() {
        let mut sticky = thread(1, 60);
        sticky.set_stickied(true);
        let threads = vec![sticky];
        assert!(ThreadBumpEngine::select_eviction_victim(&threads, Snowflake::new(0)).is_none());
    }
}
