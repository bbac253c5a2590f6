//! Thumbnail sizing and rendering

use std::io::Cursor;

use image::{imageops::FilterType, DynamicImage, ImageFormat, Rgb, RgbImage};

use crate::error::{MediaError, MediaResult};

/// Poster frames for videos of unknown size use a 16:9 box
const FALLBACK_ASPECT: (u32, u32) = (16, 9);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailSize {
    pub width: u32,
    pub height: u32,
}

/// Scale `(width, height)` to fit inside the maximum box.
///
/// Sources within the box keep their size. Larger ones are scaled by
/// `min(max_w / w, max_h / h)`, rounded up, plus one pixel.
pub fn thumbnail_size(width: u32, height: u32, max_width: u32, max_height: u32) -> ThumbnailSize {
    if width <= max_width && height <= max_height {
        return ThumbnailSize { width, height };
    }

    let factor = f64::min(
        f64::from(max_width) / f64::from(width),
        f64::from(max_height) / f64::from(height),
    );
    ThumbnailSize {
        width: (f64::from(width) * factor).ceil() as u32 + 1,
        height: (f64::from(height) * factor).ceil() as u32 + 1,
    }
}

/// Encoded thumbnail bytes with their extension
#[derive(Debug, Clone)]
pub struct RenderedThumbnail {
    pub size: ThumbnailSize,
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

/// Output format follows the source: JPEG stays JPEG, PNG and GIF keep theirs, the rest
/// become PNG.
fn output_format(source: ImageFormat) -> (ImageFormat, &'static str) {
    match source {
        ImageFormat::Jpeg => (ImageFormat::Jpeg, "jpg"),
        ImageFormat::Gif => (ImageFormat::Gif, "gif"),
        _ => (ImageFormat::Png, "png"),
    }
}

fn encode(image: &DynamicImage, format: ImageFormat) -> MediaResult<Vec<u8>> {
    let image = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
        ImageFormat::Gif => DynamicImage::ImageRgba8(image.to_rgba8()),
        _ => image.clone(),
    };

    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, format)
        .map_err(|e| MediaError::StorageFailure(format!("thumbnail encoding failed: {e}")))?;
    Ok(out.into_inner())
}

pub fn render_image(
    image: &DynamicImage,
    source: ImageFormat,
    size: ThumbnailSize,
) -> MediaResult<RenderedThumbnail> {
    let (format, extension) = output_format(source);
    let resized = image.resize_exact(size.width, size.height, FilterType::Triangle);

    Ok(RenderedThumbnail {
        size,
        extension,
        bytes: encode(&resized, format)?,
    })
}

/// Dark frame with a centered play triangle, for videos
pub fn render_poster(
    width: Option<u32>,
    height: Option<u32>,
    max_width: u32,
    max_height: u32,
) -> MediaResult<RenderedThumbnail> {
    let (w, h) = match (width, height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => (
            max_width,
            (max_width * FALLBACK_ASPECT.1 / FALLBACK_ASPECT.0).max(1),
        ),
    };
    let size = thumbnail_size(w, h, max_width, max_height);

    let mut frame = RgbImage::from_pixel(size.width, size.height, Rgb([24, 24, 24]));
    let glyph = Rgb([230, 230, 230]);
    let (cx, cy) = (size.width as i64 / 2, size.height as i64 / 2);
    let half = (i64::from(size.width.min(size.height)) / 6).max(2);

    for (x, y, pixel) in frame.enumerate_pixels_mut() {
        let (dx, dy) = (x as i64 - (cx - half / 2), y as i64 - cy);
        // Right-pointing triangle: narrows as dx grows
        if dx >= 0 && dx <= half && dy.abs() <= (half - dx) {
            *pixel = glyph;
        }
    }

    Ok(RenderedThumbnail {
        size,
        extension: "png",
        bytes: encode(&DynamicImage::ImageRgb8(frame), ImageFormat::Png)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_source_keeps_size() {
        assert_eq!(
            thumbnail_size(200, 100, 250, 250),
            ThumbnailSize { width: 200, height: 100 }
        );
        assert_eq!(
            thumbnail_size(250, 250, 250, 250),
            ThumbnailSize { width: 250, height: 250 }
        );
    }

    #[test]
    fn test_large_source_scales_with_extra_pixel() {
        // factor = 250/1000
        assert_eq!(
            thumbnail_size(1000, 500, 250, 250),
            ThumbnailSize { width: 251, height: 126 }
        );
        // factor = 250/600, 400 * 0.41666 = 166.67 -> 167 + 1
        assert_eq!(
            thumbnail_size(400, 600, 250, 250),
            ThumbnailSize { width: 168, height: 251 }
        );
    }

    #[test]
    fn test_render_jpeg_thumbnail() {
        let image = DynamicImage::new_rgb8(1000, 500);
        let thumb = render_image(&image, ImageFormat::Jpeg, thumbnail_size(1000, 500, 250, 250))
            .unwrap();

        assert_eq!(thumb.extension, "jpg");
        let decoded = image::load_from_memory(&thumb.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (251, 126));
    }

    #[test]
    fn test_poster_frame_without_dimensions() {
        let poster = render_poster(None, None, 250, 250).unwrap();
        assert_eq!(poster.extension, "png");
        assert_eq!(poster.size, ThumbnailSize { width: 250, height: 140 });
        assert_eq!(
            image::guess_format(&poster.bytes).unwrap(),
            ImageFormat::Png
        );
    }
}
