//! Attachment entity - a post's single file or remote embed

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::THUMBNAIL_FOLDER;
use crate::value_objects::Snowflake;

/// Closed set of attachment kinds a board can allow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttachmentCategory {
    Image,
    Video,
    Audio,
    Text,
    Pdf,
    Embed,
}

impl AttachmentCategory {
    pub const ALL: [AttachmentCategory; 6] = [
        Self::Image,
        Self::Video,
        Self::Audio,
        Self::Text,
        Self::Pdf,
        Self::Embed,
    ];

    /// Only visual media get a generated thumbnail
    #[inline]
    pub fn has_thumbnail(self) -> bool {
        matches!(self, Self::Image | Self::Video)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "IMAGE",
            Self::Video => "VIDEO",
            Self::Audio => "AUDIO",
            Self::Text => "TEXT",
            Self::Pdf => "PDF",
            Self::Embed => "EMBED",
        }
    }
}

impl fmt::Display for AttachmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttachmentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown attachment category: {s}"))
    }
}

/// Metadata extracted from a locally stored file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentMetadata {
    pub attachment_id: Snowflake,
    pub mime_type: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub thumbnail_width: Option<u32>,
    pub thumbnail_height: Option<u32>,
    /// Human readable size, e.g. `2.5 MB`
    pub file_size: String,
    /// `MM:SS` or `H:MM:SS` for timed media
    pub duration: Option<String>,
    /// SHA-256 of the file bytes, hex encoded
    pub checksum: String,
}

/// Provider metadata for a remote resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedData {
    pub attachment_id: Snowflake,
    pub embed_url: String,
    pub thumbnail_url: Option<String>,
    pub provider_name: String,
    pub uploader_name: Option<String>,
    pub title: Option<String>,
    pub rendered_html: Option<String>,
}

/// Exactly one of the two sub-records describes an attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentPayload {
    Local(AttachmentMetadata),
    Embed(EmbedData),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub id: Snowflake,
    pub post_id: Snowflake,
    pub category: AttachmentCategory,
    /// Per-board content root
    pub folder: String,
    pub original_filename: String,
    pub filename: String,
    pub thumbnail_filename: Option<String>,
    pub remote_storage_url: Option<String>,
    pub remote_storage_thumbnail_url: Option<String>,
    pub payload: AttachmentPayload,
}

impl Attachment {
    #[inline]
    pub fn is_embed(&self) -> bool {
        matches!(self.payload, AttachmentPayload::Embed(_))
    }

    pub fn metadata(&self) -> Option<&AttachmentMetadata> {
        match &self.payload {
            AttachmentPayload::Local(metadata) => Some(metadata),
            AttachmentPayload::Embed(_) => None,
        }
    }

    pub fn embed(&self) -> Option<&EmbedData> {
        match &self.payload {
            AttachmentPayload::Embed(embed) => Some(embed),
            AttachmentPayload::Local(_) => None,
        }
    }

    /// Storage path of the file itself; embeds have none
    pub fn file_path(&self) -> Option<String> {
        if self.is_embed() {
            return None;
        }
        Some(format!("{}/{}", self.folder, self.filename))
    }

    pub fn thumbnail_path(&self) -> Option<String> {
        self.thumbnail_filename
            .as_ref()
            .map(|name| thumbnail_path(&self.folder, name))
    }

    /// Bind the attachment to its owning post and sync the sub-record back-reference.
    pub fn attach_to(&mut self, post_id: Snowflake) {
        self.post_id = post_id;
        let id = self.id;
        match &mut self.payload {
            AttachmentPayload::Local(metadata) => metadata.attachment_id = id,
            AttachmentPayload::Embed(embed) => embed.attachment_id = id,
        }
    }
}

/// Location of a thumbnail inside a board folder
pub fn thumbnail_path(folder: &str, filename: &str) -> String {
    format!("{folder}/{THUMBNAIL_FOLDER}/{filename}")
}
