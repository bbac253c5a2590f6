//! Content sniffing
//!
//! The category of an upload comes from its bytes. The declared filename is only used to
//! catch uploads whose content contradicts their extension.

use board_core::entities::AttachmentCategory;
use image::ImageFormat;

/// What the leading bytes of an upload say it is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sniffed {
    pub category: AttachmentCategory,
    pub mime_type: &'static str,
    /// Canonical extension for the stored file
    pub extension: &'static str,
    /// Set for images, which are then fully decoded
    pub image_format: Option<ImageFormat>,
}

impl Sniffed {
    const fn new(category: AttachmentCategory, mime_type: &'static str, extension: &'static str) -> Self {
        Self {
            category,
            mime_type,
            extension,
            image_format: None,
        }
    }
}

pub fn sniff(data: &[u8]) -> Option<Sniffed> {
    if let Ok(format) = image::guess_format(data) {
        return Some(Sniffed {
            category: AttachmentCategory::Image,
            mime_type: format.to_mime_type(),
            extension: format.extensions_str().first().copied().unwrap_or("img"),
            image_format: Some(format),
        });
    }

    use AttachmentCategory::{Audio, Pdf, Text, Video};

    let sniffed = if data.starts_with(b"%PDF-") {
        Sniffed::new(Pdf, "application/pdf", "pdf")
    } else if data.len() >= 12 && &data[4..8] == b"ftyp" {
        match &data[8..12] {
            b"M4A " | b"M4B " => Sniffed::new(Audio, "audio/mp4", "m4a"),
            b"qt  " => Sniffed::new(Video, "video/quicktime", "mov"),
            _ => Sniffed::new(Video, "video/mp4", "mp4"),
        }
    } else if data.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        Sniffed::new(Video, "video/webm", "webm")
    } else if data.starts_with(b"ID3") || is_mpeg_frame_sync(data) {
        Sniffed::new(Audio, "audio/mpeg", "mp3")
    } else if data.starts_with(b"OggS") {
        Sniffed::new(Audio, "audio/ogg", "ogg")
    } else if data.starts_with(b"fLaC") {
        Sniffed::new(Audio, "audio/flac", "flac")
    } else if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WAVE" {
        Sniffed::new(Audio, "audio/wav", "wav")
    } else if !data.contains(&0) && std::str::from_utf8(data).is_ok() {
        Sniffed::new(Text, "text/plain", "txt")
    } else {
        return None;
    };

    Some(sniffed)
}

fn is_mpeg_frame_sync(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] & 0xE0 == 0xE0
}

/// Category implied by the declared filename, if its extension maps to one
pub fn declared_category(filename: &str) -> Option<AttachmentCategory> {
    let mime = mime_guess::from_path(filename).first()?;
    match (mime.type_().as_str(), mime.subtype().as_str()) {
        ("image", _) => Some(AttachmentCategory::Image),
        ("video", _) => Some(AttachmentCategory::Video),
        ("audio", _) => Some(AttachmentCategory::Audio),
        ("application", "pdf") => Some(AttachmentCategory::Pdf),
        _ => None,
    }
}
