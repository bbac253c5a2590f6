//! Video decoding through FFmpeg
//!
//! FFmpeg opens inputs by path, so the upload is spooled to a temporary file that is
//! removed when decoding ends.

use std::io::Write;

use ffmpeg::format::Pixel;
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{Context as Scaler, Flags};
use ffmpeg::util::frame::video::Video;
use ffmpeg_next as ffmpeg;
use image::{DynamicImage, RgbImage};

use crate::error::{MediaError, MediaResult};

/// Container durations are reported in microseconds
const DURATION_UNITS_PER_SEC: i64 = 1_000_000;

#[derive(Debug)]
pub struct DecodedVideo {
    pub frame: DynamicImage,
    pub duration_secs: Option<u64>,
}

fn decode_error(e: ffmpeg::Error) -> MediaError {
    MediaError::corrupt(format!("cannot decode video: {e}"))
}

fn spool_error(e: std::io::Error) -> MediaError {
    MediaError::StorageFailure(format!("cannot spool video: {e}"))
}

/// Decode the first frame of the best video stream and read the container duration.
/// Blocking; call from `spawn_blocking`.
pub fn first_frame(data: &[u8]) -> MediaResult<DecodedVideo> {
    ffmpeg::init().map_err(|e| MediaError::StorageFailure(format!("ffmpeg init failed: {e}")))?;

    let mut spool = tempfile::NamedTempFile::new().map_err(spool_error)?;
    spool.write_all(data).map_err(spool_error)?;
    spool.flush().map_err(spool_error)?;

    let mut input = ffmpeg::format::input(&spool.path()).map_err(decode_error)?;
    let duration_secs = match input.duration() {
        d if d > 0 => Some((d / DURATION_UNITS_PER_SEC) as u64),
        _ => None,
    };

    let (stream_index, mut decoder) = {
        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or_else(|| MediaError::corrupt("file has no video stream"))?;
        let context = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
            .map_err(decode_error)?;
        (stream.index(), context.decoder().video().map_err(decode_error)?)
    };

    let mut packet = ffmpeg::Packet::empty();
    let mut decoded = Video::empty();
    loop {
        match packet.read(&mut input) {
            Ok(()) => {}
            Err(ffmpeg::Error::Eof) => break,
            Err(e) => return Err(decode_error(e)),
        }
        if packet.stream() != stream_index {
            continue;
        }
        decoder.send_packet(&packet).map_err(decode_error)?;
        if decoder.receive_frame(&mut decoded).is_ok() {
            return Ok(DecodedVideo {
                frame: to_rgb(&decoded)?,
                duration_secs,
            });
        }
    }

    // Decoders with frame delay only emit after draining
    decoder.send_eof().map_err(decode_error)?;
    decoder.receive_frame(&mut decoded).map_err(decode_error)?;
    Ok(DecodedVideo {
        frame: to_rgb(&decoded)?,
        duration_secs,
    })
}

fn to_rgb(frame: &Video) -> MediaResult<DynamicImage> {
    let (width, height) = (frame.width(), frame.height());
    let mut scaler = Scaler::get(
        frame.format(),
        width,
        height,
        Pixel::RGB24,
        width,
        height,
        Flags::BILINEAR,
    )
    .map_err(decode_error)?;
    let mut rgb = Video::empty();
    scaler.run(frame, &mut rgb).map_err(decode_error)?;

    // Rows are padded to the stride
    let row = width as usize * 3;
    let mut pixels = Vec::with_capacity(row * height as usize);
    for line in rgb.data(0).chunks(rgb.stride(0)).take(height as usize) {
        let line = line
            .get(..row)
            .ok_or_else(|| MediaError::corrupt("video frame is shorter than its width"))?;
        pixels.extend_from_slice(line);
    }

    RgbImage::from_raw(width, height, pixels)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| MediaError::corrupt("video frame is shorter than its height"))
}
