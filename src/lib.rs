//! Pure Rust separation of repeating musical background from
//! non-repeating foreground.
//!
//! `repet` splits a mixture into two parts: the repeating accompaniment
//! (drum loops, chord patterns) and everything that does not repeat
//! (typically the voice). It estimates the repeating period from a beat
//! spectrum, models the repeating spectrogram with per-position medians,
//! and carves the background out with a binary time-frequency mask. The
//! foreground is the exact time-domain residual, so the two outputs
//! always sum back to the input.
//!
//! # Quick Start
//!
//! ```
//! use repet::{AudioSignal, SeparationParams};
//!
//! // 2 seconds of 440 Hz sine at 8 kHz
//! let samples: Vec<f32> = (0..16000)
//!     .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 8000.0).sin())
//!     .collect();
//! let signal = AudioSignal::new(samples, 1, 8000, 16).unwrap();
//!
//! let result = repet::separate(&signal, &SeparationParams::default()).unwrap();
//! assert_eq!(result.background.num_frames(), signal.num_frames());
//! // background + foreground == input
//! ```
//!
//! # Files
//!
//! [`separate_file`] reads a `.wav` or `.mp3` mixture and writes
//! `name_1.ext` (background) and `name_2.ext` (foreground) next to it.

pub mod analysis;
pub mod core;
pub mod error;
pub mod io;
pub mod separation;

pub use analysis::artifact::AnalysisArtifact;
pub use core::types::{AudioSignal, Sample, Separation, SeparationParams};
pub use core::window::WindowType;
pub use error::RepetError;
pub use io::format::AudioFormat;

use std::path::Path;

/// Separates a mixture signal into repeating background and
/// non-repeating foreground.
///
/// One repeating period is estimated from the channel-averaged power
/// spectrogram and shared by all channels. See [`SeparationParams`] for
/// the tunable knobs.
///
/// # Errors
///
/// Returns [`RepetError::InvalidInput`] if the parameters are invalid or
/// the signal contains NaN or infinite samples.
///
/// # Example
///
/// ```
/// use repet::{AudioSignal, SeparationParams};
///
/// let samples: Vec<f32> = (0..16000)
///     .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 8000.0).sin())
///     .collect();
/// let signal = AudioSignal::new(samples, 1, 8000, 16).unwrap();
/// let result = repet::separate(&signal, &SeparationParams::default()).unwrap();
/// for i in 0..signal.data.len() {
///     let sum = result.background.data[i] + result.foreground.data[i];
///     assert!((sum - signal.data[i]).abs() < 1e-4);
/// }
/// ```
pub fn separate(
    signal: &AudioSignal,
    params: &SeparationParams,
) -> Result<Separation, RepetError> {
    separation::pipeline::separate(signal, params)
}

/// Runs the analysis stages only, reporting the spectral layout, beat
/// spectrum, and selected repeating period without synthesizing audio.
///
/// The artifact can be serialized to JSON with
/// [`analysis::artifact::write_analysis_json`].
///
/// # Errors
///
/// Returns [`RepetError::InvalidInput`] for invalid parameters,
/// non-finite samples, or an empty signal.
pub fn analyze(
    signal: &AudioSignal,
    params: &SeparationParams,
) -> Result<AnalysisArtifact, RepetError> {
    separation::pipeline::analyze(signal, params)
}

/// Separates an audio file and writes both outputs next to it.
///
/// The format is chosen by the input's extension (`.wav` or `.mp3`,
/// case-sensitive); the outputs use the same format. For an input
/// `mix.wav` this writes `mix_1.wav` (background) and `mix_2.wav`
/// (foreground). Returns the separation so callers can inspect it.
///
/// # Errors
///
/// Returns [`RepetError::UnsupportedFormat`] for an unrecognized
/// extension, [`RepetError::Decode`] / [`RepetError::Encode`] for codec
/// failures, and [`RepetError::Io`] for filesystem failures.
pub fn separate_file(
    input_path: &Path,
    params: &SeparationParams,
) -> Result<Separation, RepetError> {
    let format = AudioFormat::from_path(input_path)?;
    let signal = format.decode_file(input_path)?;
    let result = separate(&signal, params)?;
    io::format::write_separation(input_path, &result)?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time assertions that key public types are Send + Sync,
    // so separations can run on worker threads.
    const _: () = {
        fn assert_send_sync<T: Send + Sync>() {}
        fn check() {
            assert_send_sync::<AudioSignal>();
            assert_send_sync::<SeparationParams>();
            assert_send_sync::<Separation>();
            assert_send_sync::<AnalysisArtifact>();
            assert_send_sync::<RepetError>();
        }
        let _ = check;
    };

    fn tone(freq: f32, sample_rate: u32, num_samples: usize) -> Vec<f32> {
        (0..num_samples)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_separate_reexport_matches_pipeline() {
        let signal = AudioSignal::new(tone(440.0, 8192, 8192), 1, 8192, 16).unwrap();
        let result = separate(&signal, &SeparationParams::default()).unwrap();
        assert_eq!(result.background.num_frames(), signal.num_frames());
    }

    #[test]
    fn test_separate_file_wav_roundtrip() {
        let sample_rate = 8192;
        let signal =
            AudioSignal::new(tone(440.0, sample_rate, 16384), 1, sample_rate, 16).unwrap();
        let dir = std::env::temp_dir();
        let in_path = dir.join("repet_lib_test_mix.wav");
        std::fs::write(&in_path, io::wav::write_wav(&signal).unwrap()).unwrap();

        let result = separate_file(&in_path, &SeparationParams::default()).unwrap();
        assert_eq!(result.background.sample_rate, sample_rate);

        let bg_path = dir.join("repet_lib_test_mix_1.wav");
        let fg_path = dir.join("repet_lib_test_mix_2.wav");
        let bg = io::wav::read_wav(&std::fs::read(&bg_path).unwrap()).unwrap();
        let fg = io::wav::read_wav(&std::fs::read(&fg_path).unwrap()).unwrap();
        assert_eq!(bg.num_frames(), signal.num_frames());
        assert_eq!(fg.num_frames(), signal.num_frames());

        let _ = std::fs::remove_file(&in_path);
        let _ = std::fs::remove_file(&bg_path);
        let _ = std::fs::remove_file(&fg_path);
    }

    #[test]
    fn test_separate_file_rejects_unknown_extension() {
        let err = separate_file(Path::new("mix.flac"), &SeparationParams::default()).unwrap_err();
        assert!(matches!(err, RepetError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_separate_file_missing_input() {
        let err = separate_file(
            Path::new("/nonexistent/path/mix.wav"),
            &SeparationParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RepetError::Io(_)));
    }
}
