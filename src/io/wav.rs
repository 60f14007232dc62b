//! RIFF/WAVE codec: 16/24-bit PCM and 32-bit float.

use crate::core::types::{AudioSignal, Sample};
use crate::error::RepetError;

/// WAV audio format codes.
const WAV_FORMAT_PCM: u16 = 1;
const WAV_FORMAT_IEEE_FLOAT: u16 = 3;

/// Decodes a WAV file from a byte slice.
///
/// Accepts 16-bit and 24-bit PCM plus 32-bit IEEE float; the source
/// sample width is recorded on the signal so it can be encoded back at
/// the same depth.
pub fn read_wav(data: &[u8]) -> Result<AudioSignal, RepetError> {
    let mut cursor = 0;

    // RIFF header
    if data.len() < 44 {
        return Err(RepetError::Decode("WAV file too short".to_string()));
    }

    let riff = &data[0..4];
    if riff != b"RIFF" {
        return Err(RepetError::Decode("missing RIFF header".to_string()));
    }
    cursor += 4;

    let _file_size = read_u32_le(data, cursor);
    cursor += 4;

    let wave = &data[cursor..cursor + 4];
    if wave != b"WAVE" {
        return Err(RepetError::Decode("missing WAVE identifier".to_string()));
    }
    cursor += 4;

    // Find fmt and data chunks
    let mut format_code: u16 = 0;
    let mut num_channels: u16 = 0;
    let mut sample_rate: u32 = 0;
    let mut bits_per_sample: u16 = 0;
    let mut audio_data: &[u8] = &[];
    let mut found_data = false;

    while cursor + 8 <= data.len() {
        let chunk_id = &data[cursor..cursor + 4];
        cursor += 4;
        let chunk_size = read_u32_le(data, cursor) as usize;
        cursor += 4;

        if chunk_id == b"fmt " {
            if cursor + 16 > data.len() {
                return Err(RepetError::Decode("fmt chunk too short".to_string()));
            }
            format_code = read_u16_le(data, cursor);
            num_channels = read_u16_le(data, cursor + 2);
            sample_rate = read_u32_le(data, cursor + 4);
            // skip byte rate (4 bytes) and block align (2 bytes)
            bits_per_sample = read_u16_le(data, cursor + 14);
        } else if chunk_id == b"data" {
            found_data = true;
            if cursor + chunk_size > data.len() {
                // Use whatever data is available
                audio_data = &data[cursor..];
            } else {
                audio_data = &data[cursor..cursor + chunk_size];
            }
        }

        cursor += chunk_size;
        // WAV chunks are word-aligned
        if chunk_size % 2 != 0 {
            cursor += 1;
        }
    }

    if sample_rate == 0 {
        return Err(RepetError::Decode("no fmt chunk found".to_string()));
    }
    if num_channels == 0 {
        return Err(RepetError::Decode("zero channel count".to_string()));
    }
    if !found_data {
        return Err(RepetError::Decode("no data chunk found".to_string()));
    }

    // Convert audio data to f32 samples
    let samples: Vec<Sample> = match (format_code, bits_per_sample) {
        (WAV_FORMAT_PCM, 16) => {
            let num_samples = audio_data.len() / 2;
            let mut result = Vec::with_capacity(num_samples);
            for i in 0..num_samples {
                let raw = read_i16_le(audio_data, i * 2);
                result.push(raw as f32 / 32768.0);
            }
            result
        }
        (WAV_FORMAT_PCM, 24) => {
            let num_samples = audio_data.len() / 3;
            let mut result = Vec::with_capacity(num_samples);
            for i in 0..num_samples {
                let offset = i * 3;
                let raw = (audio_data[offset] as i32)
                    | ((audio_data[offset + 1] as i32) << 8)
                    | ((audio_data[offset + 2] as i32) << 16);
                // Sign extend
                let raw = if raw & 0x800000 != 0 {
                    raw | !0xFFFFFF
                } else {
                    raw
                };
                result.push(raw as f32 / 8388608.0);
            }
            result
        }
        (WAV_FORMAT_IEEE_FLOAT, 32) => {
            let num_samples = audio_data.len() / 4;
            let mut result = Vec::with_capacity(num_samples);
            for i in 0..num_samples {
                let bytes = [
                    audio_data[i * 4],
                    audio_data[i * 4 + 1],
                    audio_data[i * 4 + 2],
                    audio_data[i * 4 + 3],
                ];
                result.push(f32::from_le_bytes(bytes));
            }
            result
        }
        (fmt, bits) => {
            return Err(RepetError::Decode(format!(
                "unsupported WAV format: code={}, bits={}",
                fmt, bits
            )))
        }
    };

    AudioSignal::new(samples, num_channels, sample_rate, bits_per_sample)
}

/// Encodes a signal as WAV bytes at its recorded bit depth.
pub fn write_wav(signal: &AudioSignal) -> Result<Vec<u8>, RepetError> {
    let (format_code, bits_per_sample) = match signal.bit_depth {
        16 => (WAV_FORMAT_PCM, 16u16),
        24 => (WAV_FORMAT_PCM, 24u16),
        32 => (WAV_FORMAT_IEEE_FLOAT, 32u16),
        depth => {
            return Err(RepetError::Encode(format!(
                "unsupported WAV bit depth: {}",
                depth
            )))
        }
    };

    let num_channels = signal.channels;
    let bytes_per_sample = (bits_per_sample / 8) as u32;
    let byte_rate = signal.sample_rate * num_channels as u32 * bytes_per_sample;
    let block_align = num_channels * (bits_per_sample / 8);
    let data_size = (signal.data.len() as u32) * bytes_per_sample;
    let file_size = 36 + data_size;

    let mut out = Vec::with_capacity(file_size as usize + 8);

    // RIFF header
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&file_size.to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    out.extend_from_slice(&format_code.to_le_bytes());
    out.extend_from_slice(&num_channels.to_le_bytes());
    out.extend_from_slice(&signal.sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());

    match bits_per_sample {
        16 => {
            for &sample in &signal.data {
                let clamped = sample.clamp(-1.0, 1.0);
                let raw = (clamped * 32767.0) as i16;
                out.extend_from_slice(&raw.to_le_bytes());
            }
        }
        24 => {
            for &sample in &signal.data {
                let clamped = sample.clamp(-1.0, 1.0);
                let raw = (clamped * 8388607.0) as i32;
                let bytes = raw.to_le_bytes();
                out.extend_from_slice(&bytes[0..3]);
            }
        }
        _ => {
            for &sample in &signal.data {
                out.extend_from_slice(&sample.to_le_bytes());
            }
        }
    }

    Ok(out)
}

#[inline]
fn read_u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

#[inline]
fn read_u32_le(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

#[inline]
fn read_i16_le(data: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([data[offset], data[offset + 1]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_roundtrip_16bit() {
        let original =
            AudioSignal::new(vec![0.0, 0.5, -0.5, 0.99, -1.0], 1, 44100, 16).unwrap();
        let wav_data = write_wav(&original).unwrap();
        let decoded = read_wav(&wav_data).unwrap();
        assert_eq!(decoded.sample_rate, 44100);
        assert_eq!(decoded.channels, 1);
        assert_eq!(decoded.bit_depth, 16);
        assert_eq!(decoded.data.len(), 5);
        // 16-bit has quantization error
        for i in 0..5 {
            assert!(
                (decoded.data[i] - original.data[i]).abs() < 0.001,
                "sample {}: {} vs {}",
                i,
                decoded.data[i],
                original.data[i]
            );
        }
    }

    #[test]
    fn test_wav_roundtrip_24bit() {
        let original =
            AudioSignal::new(vec![0.1, -0.2, 0.3, -0.4], 2, 48000, 24).unwrap();
        let wav_data = write_wav(&original).unwrap();
        let decoded = read_wav(&wav_data).unwrap();
        assert_eq!(decoded.bit_depth, 24);
        assert_eq!(decoded.channels, 2);
        for i in 0..4 {
            assert!(
                (decoded.data[i] - original.data[i]).abs() < 1e-5,
                "sample {}: {} vs {}",
                i,
                decoded.data[i],
                original.data[i]
            );
        }
    }

    #[test]
    fn test_wav_roundtrip_float() {
        let original =
            AudioSignal::new(vec![0.1, -0.2, 0.3, -0.4, 0.5, -0.6], 2, 48000, 32).unwrap();
        let wav_data = write_wav(&original).unwrap();
        let decoded = read_wav(&wav_data).unwrap();
        assert_eq!(decoded.sample_rate, 48000);
        assert_eq!(decoded.bit_depth, 32);
        for i in 0..6 {
            assert!(
                (decoded.data[i] - original.data[i]).abs() < 1e-6,
                "sample {}: {} vs {}",
                i,
                decoded.data[i],
                original.data[i]
            );
        }
    }

    #[test]
    fn test_wav_invalid_data() {
        assert!(read_wav(&[]).is_err());
        assert!(read_wav(b"NOT_RIFF_HEADER_AT_ALL______________________").is_err());
    }

    #[test]
    fn test_wav_missing_data_chunk() {
        // RIFF header and fmt chunk followed by a LIST chunk, no data
        let full = write_wav(&AudioSignal::new(vec![0.0; 4], 1, 8000, 16).unwrap()).unwrap();
        let mut wav = full[..36].to_vec();
        wav.extend_from_slice(b"LIST");
        wav.extend_from_slice(&12u32.to_le_bytes());
        wav.extend_from_slice(&[0u8; 12]);
        let err = read_wav(&wav).unwrap_err();
        assert!(matches!(err, RepetError::Decode(ref msg) if msg.contains("data")));
    }

    #[test]
    fn test_wav_unsupported_format_code() {
        // Valid header but ADPCM format code (2)
        let mut wav = write_wav(&AudioSignal::new(vec![0.0; 4], 1, 8000, 16).unwrap()).unwrap();
        wav[20] = 2;
        let err = read_wav(&wav).unwrap_err();
        assert!(matches!(err, RepetError::Decode(_)));
    }
}
