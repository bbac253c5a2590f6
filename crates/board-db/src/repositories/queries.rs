//! SQL shared by the repositories and the posting transaction

use std::collections::HashMap;

use board_core::entities::{Attachment, AttachmentPayload, Post, Thread};
use board_core::error::DomainError;
use board_core::traits::RepoResult;
use board_core::value_objects::Snowflake;
use sqlx::PgConnection;

use crate::mappers::{assemble_thread, dimension};
use crate::models::{PostModel, ThreadModel};

use super::error::{map_db_error, map_unique_violation};

pub(crate) const BOARD_SELECT: &str = r"
    SELECT b.id, b.label, b.name, b.post_counter, b.created_at,
           (SELECT COUNT(*) FROM threads t WHERE t.board_id = b.id) AS thread_count,
           s.attachment_categories, s.default_poster_name, s.force_default_poster_name,
           s.bump_limit, s.thread_limit, s.captcha_enabled, s.country_flags,
           s.poster_thread_ids, s.nsfw
    FROM boards b
    JOIN board_settings s ON s.board_id = b.id
";

pub(crate) const THREAD_SELECT: &str = r"
    SELECT t.id, t.board_id, t.subject, t.locked, t.stickied,
           t.created_at, t.last_bump_at, t.last_reply_at,
           (SELECT COUNT(*) FROM posts r WHERE r.thread_id = t.id AND NOT r.original_post) AS reply_count
    FROM threads t
";

pub(crate) const POST_SELECT: &str = r"
    SELECT p.id, p.board_id, p.thread_id, p.post_number, p.name, p.tripcode, p.body, p.ip,
           p.country_code, p.country_name, p.capcode, p.deletion_code, p.sage,
           p.poster_thread_id, p.original_post, p.created_at,
           a.id AS attachment_id, a.category, a.folder, a.original_filename, a.filename,
           a.thumbnail_filename, a.remote_storage_url, a.remote_storage_thumbnail_url,
           m.mime_type, m.width, m.height, m.thumbnail_width, m.thumbnail_height,
           m.file_size, m.duration, m.checksum,
           e.embed_url, e.thumbnail_url AS embed_thumbnail_url, e.provider_name,
           e.uploader_name, e.title AS embed_title, e.rendered_html
    FROM posts p
    LEFT JOIN attachments a ON a.post_id = p.id
    LEFT JOIN attachment_metadata m ON m.attachment_id = a.id
    LEFT JOIN embed_data e ON e.attachment_id = a.id
";

pub(crate) fn into_posts(models: Vec<PostModel>) -> RepoResult<Vec<Post>> {
    models.into_iter().map(Post::try_from).collect()
}

/// Pair thread rows with their original posts, keeping row order
pub(crate) async fn with_original_posts(
    conn: &mut PgConnection,
    models: Vec<ThreadModel>,
) -> RepoResult<Vec<Thread>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
    let sql = format!("{POST_SELECT} WHERE p.thread_id = ANY($1) AND p.original_post");
    let rows = sqlx::query_as::<_, PostModel>(&sql)
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await
        .map_err(map_db_error)?;

    let mut originals: HashMap<Snowflake, Post> = into_posts(rows)?
        .into_iter()
        .map(|post| (post.thread_id, post))
        .collect();

    models
        .into_iter()
        .map(|model| {
            let id = Snowflake::new(model.id);
            let op = originals.remove(&id).ok_or_else(|| {
                DomainError::DatabaseError(format!("thread {id} has no original post"))
            })?;
            Ok(assemble_thread(model, op))
        })
        .collect()
}

pub(crate) async fn insert_post(
    conn: &mut PgConnection,
    board_id: Snowflake,
    post: &Post,
) -> RepoResult<()> {
    sqlx::query(
        r"
        INSERT INTO posts (id, board_id, thread_id, post_number, name, tripcode, body, ip,
                           country_code, country_name, capcode, deletion_code, sage,
                           poster_thread_id, original_post, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        ",
    )
    .bind(post.id.into_inner())
    .bind(board_id.into_inner())
    .bind(post.thread_id.into_inner())
    .bind(post.post_number)
    .bind(&post.name)
    .bind(&post.tripcode)
    .bind(&post.body)
    .bind(&post.ip)
    .bind(&post.country_code)
    .bind(&post.country_name)
    .bind(post.capcode.map(|role| role.as_str()))
    .bind(&post.deletion_code)
    .bind(post.sage)
    .bind(&post.poster_thread_id)
    .bind(post.original_post)
    .bind(post.created_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        map_unique_violation(e, |_| {
            DomainError::InternalError(format!(
                "post number {} already issued on board {board_id}",
                post.post_number
            ))
        })
    })?;

    if let Some(attachment) = &post.attachment {
        insert_attachment(conn, attachment).await?;
    }

    Ok(())
}

async fn insert_attachment(conn: &mut PgConnection, attachment: &Attachment) -> RepoResult<()> {
    sqlx::query(
        r"
        INSERT INTO attachments (id, post_id, category, folder, original_filename, filename,
                                 thumbnail_filename, remote_storage_url, remote_storage_thumbnail_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ",
    )
    .bind(attachment.id.into_inner())
    .bind(attachment.post_id.into_inner())
    .bind(attachment.category.as_str())
    .bind(&attachment.folder)
    .bind(&attachment.original_filename)
    .bind(&attachment.filename)
    .bind(&attachment.thumbnail_filename)
    .bind(&attachment.remote_storage_url)
    .bind(&attachment.remote_storage_thumbnail_url)
    .execute(&mut *conn)
    .await
    .map_err(map_db_error)?;

    match &attachment.payload {
        AttachmentPayload::Local(metadata) => {
            sqlx::query(
                r"
                INSERT INTO attachment_metadata (attachment_id, mime_type, width, height,
                                                 thumbnail_width, thumbnail_height, file_size,
                                                 duration, checksum)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ",
            )
            .bind(attachment.id.into_inner())
            .bind(&metadata.mime_type)
            .bind(dimension(metadata.width))
            .bind(dimension(metadata.height))
            .bind(dimension(metadata.thumbnail_width))
            .bind(dimension(metadata.thumbnail_height))
            .bind(&metadata.file_size)
            .bind(&metadata.duration)
            .bind(&metadata.checksum)
            .execute(&mut *conn)
            .await
            .map_err(map_db_error)?;
        }
        AttachmentPayload::Embed(embed) => {
            sqlx::query(
                r"
                INSERT INTO embed_data (attachment_id, embed_url, thumbnail_url, provider_name,
                                        uploader_name, title, rendered_html)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ",
            )
            .bind(attachment.id.into_inner())
            .bind(&embed.embed_url)
            .bind(&embed.thumbnail_url)
            .bind(&embed.provider_name)
            .bind(&embed.uploader_name)
            .bind(&embed.title)
            .bind(&embed.rendered_html)
            .execute(&mut *conn)
            .await
            .map_err(map_db_error)?;
        }
    }

    Ok(())
}

/// Attachments of every post matching `filter` (a WHERE clause on `p`, `$1` bound to `id`)
pub(crate) async fn attachments_where(
    conn: &mut PgConnection,
    filter: &str,
    id: Snowflake,
) -> RepoResult<Vec<Attachment>> {
    let sql = format!("{POST_SELECT} WHERE {filter} AND a.id IS NOT NULL");
    let rows = sqlx::query_as::<_, PostModel>(&sql)
        .bind(id.into_inner())
        .fetch_all(&mut *conn)
        .await
        .map_err(map_db_error)?;

    Ok(into_posts(rows)?
        .into_iter()
        .filter_map(|post| post.attachment)
        .collect())
}
