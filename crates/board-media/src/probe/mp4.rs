//! Minimal ISO base media (MP4/MOV) box walker
//!
//! Reads the movie duration from `mvhd` and the display size of the first visual track
//! from `tkhd`. Nothing else is decoded.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mp4Info {
    pub duration_secs: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

const CONTAINERS: [&[u8; 4]; 3] = [b"moov", b"trak", b"edts"];

pub fn parse_mp4(data: &[u8]) -> Mp4Info {
    let mut info = Mp4Info::default();
    walk(data, &mut info);
    info
}

fn walk(mut data: &[u8], info: &mut Mp4Info) {
    while data.len() >= 8 {
        let size = u32_be(data, 0).unwrap_or(0) as u64;
        let kind = &data[4..8];

        let (header, size) = match size {
            0 => (8, data.len() as u64),
            1 => match u64_be(data, 8) {
                Some(large) => (16, large),
                None => return,
            },
            n => (8, n),
        };

        let Ok(size) = usize::try_from(size) else {
            return;
        };
        if size < header || size > data.len() {
            return;
        }

        let body = &data[header..size];
        if CONTAINERS.iter().any(|c| c.as_slice() == kind) {
            walk(body, info);
        } else if kind == b"mvhd" {
            info.duration_secs = info.duration_secs.or_else(|| mvhd_duration(body));
        } else if kind == b"tkhd" && info.width.is_none() {
            if let Some((w, h)) = tkhd_size(body) {
                info.width = Some(w);
                info.height = Some(h);
            }
        }

        data = &data[size..];
    }
}

fn mvhd_duration(body: &[u8]) -> Option<u64> {
    let version = *body.first()?;
    let (timescale, duration) = if version == 1 {
        (u32_be(body, 20)?, u64_be(body, 24)?)
    } else {
        (u32_be(body, 12)?, u64::from(u32_be(body, 16)?))
    };

    if timescale == 0 {
        return None;
    }
    Some(duration / u64::from(timescale))
}

/// Width/height are 16.16 fixed point; audio tracks carry zeros and are skipped
fn tkhd_size(body: &[u8]) -> Option<(u32, u32)> {
    let version = *body.first()?;
    let offset = if version == 1 { 88 } else { 76 };
    let width = u32_be(body, offset)? >> 16;
    let height = u32_be(body, offset + 4)? >> 16;

    (width > 0 && height > 0).then_some((width, height))
}

fn u32_be(data: &[u8], at: usize) -> Option<u32> {
    let bytes = data.get(at..at + 4)?;
    Some(u32::from_be_bytes(bytes.try_into().ok()?))
}

fn u64_be(data: &[u8], at: usize) -> Option<u64> {
    let bytes = data.get(at..at + 8)?;
    Some(u64::from_be_bytes(bytes.try_into().ok()?))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn boxed(kind: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut out = ((body.len() + 8) as u32).to_be_bytes().to_vec();
        out.extend_from_slice(kind);
        out.extend_from_slice(body);
        out
    }

    /// A tiny `ftyp` + `moov` file with one visual track
    pub(crate) fn sample_mp4(duration_secs: u32, width: u32, height: u32) -> Vec<u8> {
        let mut mvhd = vec![0u8; 100];
        mvhd[12..16].copy_from_slice(&1000u32.to_be_bytes());
        mvhd[16..20].copy_from_slice(&(duration_secs * 1000).to_be_bytes());

        let mut tkhd = vec![0u8; 84];
        tkhd[76..80].copy_from_slice(&(width << 16).to_be_bytes());
        tkhd[80..84].copy_from_slice(&(height << 16).to_be_bytes());

        let trak = boxed(b"trak", &boxed(b"tkhd", &tkhd));
        let mut moov_body = boxed(b"mvhd", &mvhd);
        moov_body.extend(trak);

        let mut file = boxed(b"ftyp", b"isom\0\0\0\0isom");
        file.extend(boxed(b"moov", &moov_body));
        file
    }

    #[test]
    fn test_parse_duration_and_size() {
        let info = parse_mp4(&sample_mp4(95, 1280, 720));
        assert_eq!(info.duration_secs, Some(95));
        assert_eq!(info.width, Some(1280));
        assert_eq!(info.height, Some(720));
    }

    #[test]
    fn test_truncated_file_yields_nothing() {
        let file = sample_mp4(95, 1280, 720);
        let info = parse_mp4(&file[..40]);
        assert_eq!(info, Mp4Info::default());
    }

    #[test]
    fn test_audio_track_has_no_size() {
        assert_eq!(tkhd_size(&[0u8; 84]), None);
    }
}
