//! The separation pipeline: analysis, masking, and resynthesis.

use crate::analysis::artifact::AnalysisArtifact;
use crate::analysis::beat_spectrum::beat_spectrum;
use crate::analysis::period::find_repeating_period;
use crate::core::stft::Stft;
use crate::core::types::{AudioSignal, Sample, Separation, SeparationParams};
use crate::error::RepetError;
use crate::separation::mask::{apply_mask, force_low_bins, mirror_mask, repeating_mask};
use crate::separation::model::repeating_pattern;
use rustfft::num_complex::Complex;

/// Per-channel spectral state kept between analysis and masking.
struct ChannelSpectra {
    frames: Vec<Vec<Complex<f32>>>,
    magnitude: Vec<Vec<f32>>,
}

/// Separates a mixture into repeating background and non-repeating
/// foreground.
///
/// One repeating period is estimated from the channel-averaged power
/// spectrogram and shared by every channel, so the stereo image of the
/// background stays coherent. The foreground is the time-domain residual
/// `input - background`, which makes the two outputs sum exactly back to
/// the input.
///
/// # Errors
/// Returns `RepetError::InvalidInput` for invalid parameters or
/// non-finite samples.
pub fn separate(signal: &AudioSignal, params: &SeparationParams) -> Result<Separation, RepetError> {
    params.validate()?;
    check_finite(signal)?;

    if signal.is_empty() {
        return Ok(Separation {
            background: signal.silence_like(),
            foreground: signal.clone(),
        });
    }

    let stft = build_stft(signal, params)?;
    let (spectra, power) = transform_channels(signal, &stft);
    if power.is_empty() {
        return Ok(Separation {
            background: signal.silence_like(),
            foreground: signal.clone(),
        });
    }

    let period_frames = choose_period(signal, params, &stft, &power).period_frames;
    let cutoff_bins = high_pass_bins(params, &stft, signal.sample_rate);
    let num_samples = signal.num_frames();

    let mut background_channels = Vec::with_capacity(spectra.len());
    let mut foreground_channels = Vec::with_capacity(spectra.len());
    for (channel, spectrum) in spectra.iter().enumerate() {
        let model = repeating_pattern(&spectrum.magnitude, period_frames);
        let mut mask = repeating_mask(&spectrum.magnitude, &model, params.tolerance);
        force_low_bins(&mut mask, cutoff_bins);
        let full_mask = mirror_mask(&mask, stft.window_size());
        let masked = apply_mask(&spectrum.frames, &full_mask);

        let mut background = stft.inverse(&masked);
        background.truncate(num_samples);
        background.resize(num_samples, 0.0);

        let input = signal.channel_data(channel as u16);
        let foreground: Vec<Sample> = input
            .iter()
            .zip(background.iter())
            .map(|(&mixture, &bg)| mixture - bg)
            .collect();

        background_channels.push(background);
        foreground_channels.push(foreground);
    }

    Ok(Separation {
        background: AudioSignal::from_channels(
            &background_channels,
            signal.sample_rate,
            signal.bit_depth,
        )?,
        foreground: AudioSignal::from_channels(
            &foreground_channels,
            signal.sample_rate,
            signal.bit_depth,
        )?,
    })
}

/// Runs the analysis stages only and reports what separation would use:
/// spectral layout, beat spectrum, and the selected repeating period.
///
/// # Errors
/// Returns `RepetError::InvalidInput` for invalid parameters, non-finite
/// samples, or a signal too short to produce any analysis frame.
pub fn analyze(
    signal: &AudioSignal,
    params: &SeparationParams,
) -> Result<AnalysisArtifact, RepetError> {
    params.validate()?;
    check_finite(signal)?;
    if signal.is_empty() {
        return Err(RepetError::InvalidInput(
            "cannot analyze an empty signal".to_string(),
        ));
    }

    let stft = build_stft(signal, params)?;
    let (_, power) = transform_channels(signal, &stft);
    let choice = choose_period(signal, params, &stft, &power);

    Ok(AnalysisArtifact {
        sample_rate: signal.sample_rate,
        window_size: stft.window_size(),
        hop_size: stft.hop_size(),
        period_frames: choice.period_frames,
        period_secs: choice.period_frames as f64 * stft.hop_size() as f64
            / signal.sample_rate as f64,
        beat_spectrum: choice.beat,
    })
}

struct PeriodChoice {
    period_frames: usize,
    beat: Vec<f32>,
}

/// Builds the transform with the effective window and 50% overlap.
fn build_stft(signal: &AudioSignal, params: &SeparationParams) -> Result<Stft, RepetError> {
    let window_size = params.effective_window_size(signal.sample_rate);
    Stft::new(window_size, window_size / 2, params.window_type)
}

/// Forward-transforms every channel and averages their power spectra.
fn transform_channels(signal: &AudioSignal, stft: &Stft) -> (Vec<ChannelSpectra>, Vec<Vec<f32>>) {
    let num_channels = signal.channels as usize;
    let mut spectra = Vec::with_capacity(num_channels);
    for channel in 0..num_channels {
        let samples = signal.channel_data(channel as u16);
        let frames = stft.forward(&samples);
        let magnitude = stft.magnitude(&frames);
        spectra.push(ChannelSpectra { frames, magnitude });
    }

    let num_frames = spectra[0].magnitude.len();
    let num_bins = stft.num_bins();
    let inv_channels = 1.0 / num_channels as f32;
    let mut power = vec![vec![0.0f32; num_bins]; num_frames];
    for spectrum in &spectra {
        for (power_row, mag_row) in power.iter_mut().zip(spectrum.magnitude.iter()) {
            for (p, &m) in power_row.iter_mut().zip(mag_row.iter()) {
                *p += m * m * inv_channels;
            }
        }
    }
    (spectra, power)
}

/// Selects the repeating period in frames, honoring a fixed period when
/// one was requested. The candidate range is capped at a third of the
/// signal so at least three repetitions support the estimate.
fn choose_period(
    signal: &AudioSignal,
    params: &SeparationParams,
    stft: &Stft,
    power: &[Vec<f32>],
) -> PeriodChoice {
    let num_frames = power.len();
    let max_lag_bound = num_frames.saturating_sub(1).max(1);

    if let Some(secs) = params.period_secs {
        return PeriodChoice {
            period_frames: secs_to_frames(secs, signal.sample_rate, stft.hop_size())
                .clamp(1, max_lag_bound),
            beat: Vec::new(),
        };
    }

    let beat = beat_spectrum(power);
    let max_secs = params.max_period_secs.min(signal.duration_secs() / 3.0);
    let min_lag = secs_to_frames(params.min_period_secs, signal.sample_rate, stft.hop_size());
    let max_lag = secs_to_frames(max_secs, signal.sample_rate, stft.hop_size());
    let default_lag = secs_to_frames(
        params.default_period_secs,
        signal.sample_rate,
        stft.hop_size(),
    );

    PeriodChoice {
        period_frames: find_repeating_period(&beat, min_lag, max_lag, default_lag),
        beat,
    }
}

/// Converts a duration in seconds to a frame count at the given hop.
fn secs_to_frames(secs: f64, sample_rate: u32, hop_size: usize) -> usize {
    let frames = (secs * sample_rate as f64 / hop_size as f64).ceil();
    if frames < 1.0 {
        1
    } else {
        frames as usize
    }
}

/// Number of low bins forced into the background, from the cutoff in Hz.
fn high_pass_bins(params: &SeparationParams, stft: &Stft, sample_rate: u32) -> usize {
    if params.high_pass_cutoff_hz <= 0.0 {
        return 0;
    }
    let bins = (params.high_pass_cutoff_hz as f64 * (stft.window_size() as f64 - 1.0)
        / sample_rate as f64)
        .ceil() as usize;
    bins.min(stft.num_bins())
}

/// Rejects signals containing NaN or infinite samples.
fn check_finite(signal: &AudioSignal) -> Result<(), RepetError> {
    if signal.data.iter().all(|s| s.is_finite()) {
        Ok(())
    } else {
        Err(RepetError::InvalidInput(
            "signal contains non-finite samples".to_string(),
        ))
    }
}
