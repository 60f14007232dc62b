//! File format dispatch and output path handling.

use crate::core::types::{AudioSignal, Separation};
use crate::error::RepetError;
use crate::io::mp3::{read_mp3, write_mp3};
use crate::io::wav::{read_wav, write_wav};
use std::path::{Path, PathBuf};

/// Supported audio container formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
}

impl AudioFormat {
    /// Determines the format from a path's extension.
    ///
    /// The match is case-sensitive: only the exact extensions `wav` and
    /// `mp3` are accepted, so `track.WAV` is an unsupported format.
    pub fn from_path(path: &Path) -> Result<Self, RepetError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("wav") => Ok(AudioFormat::Wav),
            Some("mp3") => Ok(AudioFormat::Mp3),
            _ => Err(RepetError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Decodes a file of this format into a signal.
    pub fn decode_file(&self, path: &Path) -> Result<AudioSignal, RepetError> {
        let data = std::fs::read(path)?;
        match self {
            AudioFormat::Wav => read_wav(&data),
            AudioFormat::Mp3 => read_mp3(&data),
        }
    }

    /// Encodes a signal to bytes in this format.
    pub fn encode(&self, signal: &AudioSignal) -> Result<Vec<u8>, RepetError> {
        match self {
            AudioFormat::Wav => write_wav(signal),
            AudioFormat::Mp3 => write_mp3(signal),
        }
    }
}

/// Derives the two output paths for an input file: `name_1.ext` for the
/// background and `name_2.ext` for the foreground, next to the input.
pub fn output_paths(input: &Path) -> Result<(PathBuf, PathBuf), RepetError> {
    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| RepetError::UnsupportedFormat(input.display().to_string()))?;
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| RepetError::UnsupportedFormat(input.display().to_string()))?;

    let background = input.with_file_name(format!("{}_1.{}", stem, extension));
    let foreground = input.with_file_name(format!("{}_2.{}", stem, extension));
    Ok((background, foreground))
}

/// Writes both halves of a separation next to the input file, in the
/// input's format.
///
/// Both outputs are encoded before anything touches the disk, so an
/// encode failure leaves no partial results. If the second file fails to
/// write, the first is removed again.
pub fn write_separation(input: &Path, separation: &Separation) -> Result<(), RepetError> {
    let format = AudioFormat::from_path(input)?;
    let (background_path, foreground_path) = output_paths(input)?;

    let background_bytes = format.encode(&separation.background)?;
    let foreground_bytes = format.encode(&separation.foreground)?;

    std::fs::write(&background_path, background_bytes)?;
    if let Err(e) = std::fs::write(&foreground_path, foreground_bytes) {
        let _ = std::fs::remove_file(&background_path);
        return Err(e.into());
    }
    Ok(())
}
