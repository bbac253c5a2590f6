//! Post entity <-> model mapper

use board_core::entities::{
    Attachment, AttachmentCategory, AttachmentMetadata, AttachmentPayload, EmbedData, Post,
};
use board_core::error::DomainError;
use board_core::value_objects::Snowflake;

use crate::models::PostModel;

impl TryFrom<PostModel> for Post {
    type Error = DomainError;

    fn try_from(mut model: PostModel) -> Result<Self, Self::Error> {
        let post_id = Snowflake::new(model.id);
        let attachment = if model.has_attachment() {
            Some(take_attachment(&mut model, post_id)?)
        } else {
            None
        };

        Ok(Post {
            id: post_id,
            thread_id: Snowflake::new(model.thread_id),
            post_number: model.post_number,
            name: model.name,
            tripcode: model.tripcode,
            body: model.body,
            ip: model.ip,
            country_code: model.country_code,
            country_name: model.country_name,
            capcode: model.capcode.and_then(|role| role.parse().ok()),
            deletion_code: model.deletion_code,
            sage: model.sage,
            poster_thread_id: model.poster_thread_id,
            original_post: model.original_post,
            created_at: model.created_at,
            attachment,
        })
    }
}

fn take_attachment(model: &mut PostModel, post_id: Snowflake) -> Result<Attachment, DomainError> {
    let id = Snowflake::new(model.attachment_id.unwrap_or_default());
    let missing = |column: &str| DomainError::DatabaseError(format!("attachment {id}: {column} is null"));

    let category: AttachmentCategory = model
        .category
        .take()
        .ok_or_else(|| missing("category"))?
        .parse()
        .map_err(DomainError::DatabaseError)?;

    let payload = if let Some(embed_url) = model.embed_url.take() {
        AttachmentPayload::Embed(EmbedData {
            attachment_id: id,
            embed_url,
            thumbnail_url: model.embed_thumbnail_url.take(),
            provider_name: model.provider_name.take().unwrap_or_default(),
            uploader_name: model.uploader_name.take(),
            title: model.embed_title.take(),
            rendered_html: model.rendered_html.take(),
        })
    } else {
        AttachmentPayload::Local(AttachmentMetadata {
            attachment_id: id,
            mime_type: model.mime_type.take().ok_or_else(|| missing("mime_type"))?,
            width: model.width.map(|v| v as u32),
            height: model.height.map(|v| v as u32),
            thumbnail_width: model.thumbnail_width.map(|v| v as u32),
            thumbnail_height: model.thumbnail_height.map(|v| v as u32),
            file_size: model.file_size.take().unwrap_or_default(),
            duration: model.duration.take(),
            checksum: model.checksum.take().ok_or_else(|| missing("checksum"))?,
        })
    };

    Ok(Attachment {
        id,
        post_id,
        category,
        folder: model.folder.take().ok_or_else(|| missing("folder"))?,
        original_filename: model.original_filename.take().unwrap_or_default(),
        filename: model.filename.take().ok_or_else(|| missing("filename"))?,
        thumbnail_filename: model.thumbnail_filename.take(),
        remote_storage_url: model.remote_storage_url.take(),
        remote_storage_thumbnail_url: model.remote_storage_thumbnail_url.take(),
        payload,
    })
}

/// Optional pixel sizes as stored in INTEGER columns
pub fn dimension(value: Option<u32>) -> Option<i32> {
    value.map(|v| v as i32)
}
