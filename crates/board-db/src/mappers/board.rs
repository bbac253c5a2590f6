//! Board entity <-> model mapper

use board_core::entities::{AttachmentCategory, Board, BoardSettings};
use board_core::value_objects::Snowflake;

use crate::models::BoardModel;

impl From<BoardModel> for Board {
    fn from(model: BoardModel) -> Self {
        let id = Snowflake::new(model.id);
        Board {
            id,
            label: model.label,
            name: model.name,
            post_counter: model.post_counter,
            thread_count: model.thread_count,
            created_at: model.created_at,
            settings: BoardSettings {
                board_id: id,
                // Unknown names are dropped rather than failing the whole board
                attachment_categories: model
                    .attachment_categories
                    .iter()
                    .filter_map(|name| name.parse().ok())
                    .collect(),
                default_poster_name: model.default_poster_name,
                force_default_poster_name: model.force_default_poster_name,
                bump_limit: model.bump_limit,
                thread_limit: model.thread_limit,
                captcha_enabled: model.captcha_enabled,
                country_flags: model.country_flags,
                poster_thread_ids: model.poster_thread_ids,
                nsfw: model.nsfw,
            },
        }
    }
}

/// Category names as stored in `board_settings.attachment_categories`
pub fn category_names(categories: &[AttachmentCategory]) -> Vec<String> {
    categories.iter().map(|c| c.as_str().to_string()).collect()
}
