//! Container parsing for video and audio metadata

mod mp4;
mod wav;

pub use mp4::{parse_mp4, Mp4Info};
pub use wav::wav_duration_secs;

#[cfg(test)]
pub(crate) use mp4::tests::sample_mp4;
#[cfg(test)]
pub(crate) use wav::tests::sample_wav;
