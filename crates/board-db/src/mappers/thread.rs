//! Thread model + original post -> Thread entity

use board_core::entities::{Post, Thread};
use board_core::value_objects::Snowflake;

use crate::models::ThreadModel;

pub fn assemble_thread(model: ThreadModel, original_post: Post) -> Thread {
    Thread {
        id: Snowflake::new(model.id),
        board_id: Snowflake::new(model.board_id),
        subject: model.subject,
        locked: model.locked,
        stickied: model.stickied,
        created_at: model.created_at,
        last_bump_at: model.last_bump_at,
        last_reply_at: model.last_reply_at,
        reply_count: model.reply_count,
        original_post,
    }
}
