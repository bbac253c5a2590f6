//! Turns uploads and links into [`Attachment`]s
//!
//! Files are identified by content: the category is sniffed from the bytes, the stored name
//! is the SHA-256 of the content, and thumbnails are written next to it under `thumbs/`.
//! Every write records whether this call created the file, so a failed post can remove
//! exactly what it added and nothing another post still uses.

use std::sync::Arc;

use board_core::entities::{
    thumbnail_path, Attachment, AttachmentCategory, AttachmentMetadata, AttachmentPayload,
    EmbedData,
};
use board_core::{FileStorage, Snowflake};
use bytes::Bytes;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};

use crate::embed::{parse_embed_url, provider_name, EmbedResolver};
use crate::error::{MediaError, MediaResult};
use crate::format::{format_duration, human_size};
use crate::probe::{parse_mp4, wav_duration_secs, Mp4Info};
use crate::sniff::{declared_category, sniff, Sniffed};
use crate::thumbnail::{render_image, render_poster, thumbnail_size, RenderedThumbnail};

const MAX_ORIGINAL_FILENAME_LENGTH: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorConfig {
    pub max_file_size: u64,
    pub thumbnail_max_width: u32,
    pub thumbnail_max_height: u32,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
            thumbnail_max_width: board_core::constants::THUMBNAIL_MAX_WIDTH,
            thumbnail_max_height: board_core::constants::THUMBNAIL_MAX_HEIGHT,
        }
    }
}

/// A processed attachment plus the storage paths this call created
#[derive(Debug, Clone)]
pub struct ProcessedAttachment {
    pub attachment: Attachment,
    created: Vec<String>,
}

impl ProcessedAttachment {
    pub fn created_files(&self) -> &[String] {
        &self.created
    }
}

#[derive(Default)]
struct Analysis {
    width: Option<u32>,
    height: Option<u32>,
    duration_secs: Option<u64>,
    thumbnail: Option<RenderedThumbnail>,
}

pub struct AttachmentProcessor {
    storage: Arc<dyn FileStorage>,
    embeds: Arc<dyn EmbedResolver>,
    config: ProcessorConfig,
}

impl AttachmentProcessor {
    pub fn new(
        storage: Arc<dyn FileStorage>,
        embeds: Arc<dyn EmbedResolver>,
        config: ProcessorConfig,
    ) -> Self {
        Self {
            storage,
            embeds,
            config,
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Validate, analyze, and store an uploaded file
    #[instrument(skip(self, data, allowed), fields(len = data.len()))]
    pub async fn process_file(
        &self,
        id: Snowflake,
        folder: &str,
        original_filename: &str,
        data: Bytes,
        allowed: &[AttachmentCategory],
    ) -> MediaResult<ProcessedAttachment> {
        if data.is_empty() {
            return Err(MediaError::corrupt("file is empty"));
        }
        if data.len() as u64 > self.config.max_file_size {
            return Err(MediaError::unsupported(format!(
                "file is larger than {}",
                human_size(self.config.max_file_size)
            )));
        }

        let sniffed = sniff(&data).ok_or_else(|| MediaError::unsupported("unrecognized file type"))?;
        if let Some(declared) = declared_category(original_filename) {
            if declared != sniffed.category {
                return Err(MediaError::corrupt(format!(
                    "{original_filename} does not contain {} data",
                    declared.as_str().to_lowercase()
                )));
            }
        }
        if !allowed.contains(&sniffed.category) {
            return Err(MediaError::unsupported(format!(
                "{} files are not allowed on this board",
                sniffed.category.as_str().to_lowercase()
            )));
        }

        let checksum = format!("{:x}", Sha256::digest(&data));
        let analysis = self.analyze(&sniffed, data.clone()).await?;

        let filename = format!("{checksum}.{}", sniffed.extension);
        let mut created = Vec::new();
        let stored = self
            .store_files(folder, &filename, &checksum, &data, &analysis, &mut created)
            .await;
        let thumbnail_filename = match stored {
            Ok(name) => name,
            Err(e) => {
                self.remove_paths(&created).await;
                return Err(e);
            }
        };

        debug!(category = %sniffed.category, %filename, created = created.len(), "Attachment processed");

        Ok(ProcessedAttachment {
            attachment: Attachment {
                id,
                post_id: Snowflake::default(),
                category: sniffed.category,
                folder: folder.to_string(),
                original_filename: clean_original_filename(original_filename),
                filename,
                thumbnail_filename,
                remote_storage_url: None,
                remote_storage_thumbnail_url: None,
                payload: AttachmentPayload::Local(AttachmentMetadata {
                    attachment_id: id,
                    mime_type: sniffed.mime_type.to_string(),
                    width: analysis.width,
                    height: analysis.height,
                    thumbnail_width: analysis.thumbnail.as_ref().map(|t| t.size.width),
                    thumbnail_height: analysis.thumbnail.as_ref().map(|t| t.size.height),
                    file_size: human_size(data.len() as u64),
                    duration: analysis.duration_secs.map(format_duration),
                    checksum,
                }),
            },
            created,
        })
    }

    /// Build an embed attachment for a link. Preview lookup failures are not errors.
    #[instrument(skip(self, allowed))]
    pub async fn process_embed(
        &self,
        id: Snowflake,
        folder: &str,
        raw_url: &str,
        allowed: &[AttachmentCategory],
    ) -> MediaResult<ProcessedAttachment> {
        if !allowed.contains(&AttachmentCategory::Embed) {
            return Err(MediaError::unsupported("embeds are not allowed on this board"));
        }
        let url = parse_embed_url(raw_url)?;

        let preview = self.embeds.resolve(&url).await.unwrap_or_default();
        let provider = if preview.provider_name.is_empty() {
            provider_name(&url)
        } else {
            preview.provider_name
        };

        Ok(ProcessedAttachment {
            attachment: Attachment {
                id,
                post_id: Snowflake::default(),
                category: AttachmentCategory::Embed,
                folder: folder.to_string(),
                original_filename: url.to_string(),
                filename: url.to_string(),
                thumbnail_filename: None,
                remote_storage_url: None,
                remote_storage_thumbnail_url: None,
                payload: AttachmentPayload::Embed(EmbedData {
                    attachment_id: id,
                    embed_url: url.to_string(),
                    thumbnail_url: preview.thumbnail_url,
                    provider_name: provider,
                    uploader_name: preview.uploader_name,
                    title: preview.title,
                    rendered_html: preview.html,
                }),
            },
            created: Vec::new(),
        })
    }

    /// Remove the files a processed attachment created, after a later step failed
    pub async fn discard(&self, processed: &ProcessedAttachment) {
        self.remove_paths(&processed.created).await;
    }

    /// Remove an attachment's file and thumbnail. The caller checks that no other post
    /// still references the same content.
    pub async fn remove_files(&self, attachment: &Attachment) -> MediaResult<()> {
        let paths = attachment
            .file_path()
            .into_iter()
            .chain(attachment.thumbnail_path());
        for path in paths {
            self.storage.delete(&path).await?;
        }
        Ok(())
    }

    async fn analyze(&self, sniffed: &Sniffed, data: Bytes) -> MediaResult<Analysis> {
        let max_w = self.config.thumbnail_max_width;
        let max_h = self.config.thumbnail_max_height;

        match sniffed.category {
            AttachmentCategory::Image => {
                let Some(format) = sniffed.image_format else {
                    return Ok(Analysis::default());
                };
                // Decoding and resizing are CPU-bound
                tokio::task::spawn_blocking(move || {
                    let image = image::load_from_memory_with_format(&data, format)
                        .map_err(|e| MediaError::corrupt(format!("cannot decode image: {e}")))?;
                    let size = thumbnail_size(image.width(), image.height(), max_w, max_h);
                    Ok(Analysis {
                        width: Some(image.width()),
                        height: Some(image.height()),
                        duration_secs: None,
                        thumbnail: Some(render_image(&image, format, size)?),
                    })
                })
                .await
                .map_err(|e| MediaError::StorageFailure(format!("image task failed: {e}")))?
            }
            AttachmentCategory::Video => {
                let mime_type = sniffed.mime_type;
                tokio::task::spawn_blocking(move || analyze_video(&data, mime_type, max_w, max_h))
                    .await
                    .map_err(|e| MediaError::StorageFailure(format!("video task failed: {e}")))?
            }
            AttachmentCategory::Audio => {
                let duration_secs = match sniffed.mime_type {
                    "audio/wav" => wav_duration_secs(&data),
                    "audio/mp4" => parse_mp4(&data).duration_secs,
                    _ => None,
                };
                Ok(Analysis {
                    duration_secs,
                    ..Analysis::default()
                })
            }
            _ => Ok(Analysis::default()),
        }
    }

    /// Store the file and its thumbnail, returning the thumbnail filename
    async fn store_files(
        &self,
        folder: &str,
        filename: &str,
        checksum: &str,
        data: &[u8],
        analysis: &Analysis,
        created: &mut Vec<String>,
    ) -> MediaResult<Option<String>> {
        self.store_once(&format!("{folder}/{filename}"), data, created)
            .await?;

        let Some(thumbnail) = &analysis.thumbnail else {
            return Ok(None);
        };
        let thumbnail_filename = format!("{checksum}.{}", thumbnail.extension);
        self.store_once(
            &thumbnail_path(folder, &thumbnail_filename),
            &thumbnail.bytes,
            created,
        )
        .await?;

        Ok(Some(thumbnail_filename))
    }

    /// Content-addressed paths never change content, so an existing file is left alone
    async fn store_once(&self, path: &str, data: &[u8], created: &mut Vec<String>) -> MediaResult<()> {
        if self.storage.exists(path).await? {
            debug!(%path, "Content already stored");
            return Ok(());
        }
        self.storage.write(path, data).await?;
        created.push(path.to_string());
        Ok(())
    }

    async fn remove_paths(&self, paths: &[String]) {
        for path in paths {
            if let Err(e) = self.storage.delete(path).await {
                warn!(%path, error = %e, "Failed to remove attachment file");
            }
        }
    }
}

/// Last path component of the client filename, bounded in length
fn clean_original_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    let base = if base.is_empty() { "file" } else { base };
    base.chars().take(MAX_ORIGINAL_FILENAME_LENGTH).collect()
}

/// First frame from FFmpeg when it can decode the file, else a placeholder poster sized
/// from the container headers
fn analyze_video(data: &[u8], mime_type: &str, max_w: u32, max_h: u32) -> MediaResult<Analysis> {
    let info = match mime_type {
        "video/mp4" | "video/quicktime" => parse_mp4(data),
        _ => Mp4Info::default(),
    };

    #[cfg(feature = "video")]
    {
        match crate::video::first_frame(data) {
            Ok(decoded) => {
                let (width, height) = (decoded.frame.width(), decoded.frame.height());
                let size = thumbnail_size(width, height, max_w, max_h);
                return Ok(Analysis {
                    width: Some(width),
                    height: Some(height),
                    duration_secs: decoded.duration_secs.or(info.duration_secs),
                    thumbnail: Some(render_image(&decoded.frame, image::ImageFormat::Png, size)?),
                });
            }
            Err(e) => debug!(error = %e, "Video not decodable, using placeholder poster"),
        }
    }

    Ok(Analysis {
        width: info.width,
        height: info.height,
        duration_secs: info.duration_secs,
        thumbnail: Some(render_poster(info.width, info.height, max_w, max_h)?),
    })
}
