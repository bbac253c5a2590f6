//! WAV duration from the RIFF `fmt ` and `data` chunks

pub fn wav_duration_secs(data: &[u8]) -> Option<u64> {
    if data.len() < 12 || &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
        return None;
    }

    let mut byte_rate = None;
    let mut data_len = None;
    let mut pos = 12;

    while pos + 8 <= data.len() {
        let id = &data[pos..pos + 4];
        let len = u32::from_le_bytes(data[pos + 4..pos + 8].try_into().ok()?) as usize;
        let body = pos + 8;

        if id == b"fmt " {
            let rate = data.get(body + 8..body + 12)?;
            byte_rate = Some(u32::from_le_bytes(rate.try_into().ok()?));
        } else if id == b"data" {
            // Streams written before the length is known leave it at zero or past the end
            data_len = Some(len.min(data.len().saturating_sub(body)));
        }

        if byte_rate.is_some() && data_len.is_some() {
            break;
        }
        // Chunks are word-aligned
        pos = body.checked_add(len)?.checked_add(len % 2)?;
    }

    match (byte_rate?, data_len?) {
        (0, _) => None,
        (rate, len) => Some(len as u64 / u64::from(rate)),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 8 kHz mono 8-bit PCM of the given length
    pub(crate) fn sample_wav(seconds: u32) -> Vec<u8> {
        let rate = 8000u32;
        let samples = (rate * seconds) as usize;

        let mut fmt = Vec::new();
        fmt.extend_from_slice(&1u16.to_le_bytes()); // PCM
        fmt.extend_from_slice(&1u16.to_le_bytes()); // channels
        fmt.extend_from_slice(&rate.to_le_bytes());
        fmt.extend_from_slice(&rate.to_le_bytes()); // byte rate
        fmt.extend_from_slice(&1u16.to_le_bytes()); // block align
        fmt.extend_from_slice(&8u16.to_le_bytes()); // bits per sample

        let mut out = b"RIFF".to_vec();
        out.extend_from_slice(&((4 + 8 + fmt.len() + 8 + samples) as u32).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&(fmt.len() as u32).to_le_bytes());
        out.extend_from_slice(&fmt);
        out.extend_from_slice(b"data");
        out.extend_from_slice(&(samples as u32).to_le_bytes());
        out.extend(std::iter::repeat(128u8).take(samples));
        out
    }

    #[test]
    fn test_wav_duration() {
        assert_eq!(wav_duration_secs(&sample_wav(3)), Some(3));
    }

    #[test]
    fn test_not_a_wav() {
        assert_eq!(wav_duration_secs(b"RIFF\0\0\0\0AVI LIST"), None);
    }
}
