//! # board-media
//!
//! Attachment processing for posts.
//!
//! - [`AttachmentProcessor`]: content sniffing, checksums, dimensions and durations,
//!   thumbnails, and storage writes with cleanup of files created by a failed post
//! - with the `video` feature, first-frame video thumbnails decoded by FFmpeg; without it
//!   videos get a placeholder poster
//! - [`FileStorage`](board_core::FileStorage) implementations for the local filesystem and
//!   for tests
//! - [`OEmbedResolver`]: link previews for YouTube, Vimeo, and SoundCloud

pub mod embed;
pub mod error;
pub mod format;
mod probe;
pub mod processor;
pub mod sniff;
pub mod storage;
pub mod thumbnail;
#[cfg(feature = "video")]
pub mod video;

pub use embed::{EmbedPreview, EmbedResolver, OEmbedResolver, Provider};
pub use error::{MediaError, MediaResult};
pub use processor::{AttachmentProcessor, ProcessedAttachment, ProcessorConfig};
pub use storage::{LocalFileStorage, MemoryFileStorage};
