//! MP3 codec: symphonia for decoding, LAME for encoding.

use crate::core::types::{AudioSignal, Sample};
use crate::error::RepetError;
use mp3lame_encoder::{Bitrate, Builder, FlushNoGap, InterleavedPcm, MonoPcm, Quality};
use std::io::Cursor;
use std::mem::MaybeUninit;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Bit depth recorded on signals decoded from MP3, which has no native
/// integer sample width.
const MP3_DECODED_BIT_DEPTH: u16 = 16;

/// Decodes an MP3 file from a byte slice.
pub fn read_mp3(data: &[u8]) -> Result<AudioSignal, RepetError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(data.to_vec())), Default::default());
    let mut hint = Hint::new();
    hint.with_extension("mp3");

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| RepetError::Decode(format!("failed to probe MP3 stream: {}", e)))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| RepetError::Decode("no audio track found".to_string()))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| RepetError::Decode("MP3 stream reports no sample rate".to_string()))?;
    let channels = codec_params
        .channels
        .map(|c| c.count())
        .ok_or_else(|| RepetError::Decode("MP3 stream reports no channel layout".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| RepetError::Decode(format!("failed to create MP3 decoder: {}", e)))?;

    let mut samples: Vec<Sample> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        match format.next_packet() {
            Ok(packet) => {
                if packet.track_id() != track_id {
                    continue;
                }
                match decoder.decode(&packet) {
                    Ok(decoded) => {
                        if sample_buf.is_none() {
                            let spec = *decoded.spec();
                            sample_buf =
                                Some(SampleBuffer::new(decoded.capacity() as u64, spec));
                        }
                        if let Some(buf) = sample_buf.as_mut() {
                            buf.copy_interleaved_ref(decoded);
                            samples.extend_from_slice(buf.samples());
                        }
                    }
                    // Corrupt frames are skipped, matching player behavior
                    Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
                    Err(e) => {
                        return Err(RepetError::Decode(format!("MP3 decode error: {}", e)));
                    }
                }
            }
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(RepetError::Decode(format!("MP3 packet read error: {}", e)));
            }
        }
    }

    AudioSignal::new(samples, channels as u16, sample_rate, MP3_DECODED_BIT_DEPTH)
}

/// Encodes a signal as MP3 bytes (320 kbps CBR).
///
/// MP3 supports mono and stereo only; other channel counts are an
/// encode error.
pub fn write_mp3(signal: &AudioSignal) -> Result<Vec<u8>, RepetError> {
    if signal.channels > 2 {
        return Err(RepetError::Encode(format!(
            "MP3 supports at most 2 channels, got {}",
            signal.channels
        )));
    }

    let mut builder =
        Builder::new().ok_or_else(|| RepetError::Encode("failed to create MP3 encoder".to_string()))?;
    builder
        .set_sample_rate(signal.sample_rate)
        .map_err(|e| RepetError::Encode(format!("invalid MP3 sample rate: {:?}", e)))?;
    builder
        .set_num_channels(signal.channels as u8)
        .map_err(|e| RepetError::Encode(format!("invalid MP3 channel count: {:?}", e)))?;
    builder
        .set_brate(Bitrate::Kbps320)
        .map_err(|e| RepetError::Encode(format!("failed to set MP3 bitrate: {:?}", e)))?;
    builder
        .set_quality(Quality::Best)
        .map_err(|e| RepetError::Encode(format!("failed to set MP3 quality: {:?}", e)))?;
    let mut encoder = builder
        .build()
        .map_err(|e| RepetError::Encode(format!("failed to build MP3 encoder: {:?}", e)))?;

    let interleaved: Vec<i16> = signal
        .data
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
        .collect();

    // LAME worst case: 1.25 * samples + 7200 bytes
    let max_output_size = (interleaved.len() as f64 * 1.25) as usize + 7200;
    let mut mp3_buffer: Vec<MaybeUninit<u8>> = vec![MaybeUninit::uninit(); max_output_size];

    let encoded_size = if signal.channels == 1 {
        encoder.encode(MonoPcm(&interleaved), &mut mp3_buffer)
    } else {
        encoder.encode(InterleavedPcm(&interleaved), &mut mp3_buffer)
    }
    .map_err(|e| RepetError::Encode(format!("MP3 encoding failed: {:?}", e)))?;

    let flush_size = encoder
        .flush::<FlushNoGap>(&mut mp3_buffer[encoded_size..])
        .map_err(|e| RepetError::Encode(format!("MP3 flush failed: {:?}", e)))?;

    // The encoder initialized exactly this prefix
    let mp3_data: Vec<u8> = mp3_buffer[..encoded_size + flush_size]
        .iter()
        .map(|b| unsafe { b.assume_init() })
        .collect();

    Ok(mp3_data)
}
