//! Beat spectrum: a periodicity curve over frame lags.
//!
//! Each frequency bin's frame-wise power sequence is autocorrelated via
//! FFT, each lag is divided by the number of overlapping terms so short
//! overlaps are not penalized, and the curves are averaged across bins.
//! The result is normalized so lag 0 equals 1, making the curve
//! comparable across signals of different loudness.

use crate::core::fft::{COMPLEX_ZERO, NORMALIZE_EPSILON};
use rustfft::{num_complex::Complex, FftPlanner};

/// Computes the beat spectrum of a frames-major power spectrogram.
///
/// `power` holds one row per frame, each row a half-spectrum of squared
/// magnitudes. Returns one value per frame lag, with `result[0] == 1.0`
/// for any non-silent input. A spectrogram of all zeros yields an
/// all-zeros curve; an empty spectrogram yields an empty curve.
pub fn beat_spectrum(power: &[Vec<f32>]) -> Vec<f32> {
    let num_frames = power.len();
    if num_frames == 0 {
        return Vec::new();
    }
    let num_bins = power[0].len();
    if num_bins == 0 {
        return vec![0.0; num_frames];
    }

    // Zero-padded FFT autocorrelation: linear, not circular
    let fft_len = (2 * num_frames).next_power_of_two();
    let mut planner = FftPlanner::new();
    let forward = planner.plan_fft_forward(fft_len);
    let inverse = planner.plan_fft_inverse(fft_len);

    let mut acf_sum = vec![0.0f64; num_frames];
    let mut buf = vec![COMPLEX_ZERO; fft_len];

    for bin in 0..num_bins {
        for slot in buf.iter_mut() {
            *slot = COMPLEX_ZERO;
        }
        for (frame_idx, frame) in power.iter().enumerate() {
            buf[frame_idx] = Complex::new(frame[bin], 0.0);
        }
        forward.process(&mut buf);
        for value in buf.iter_mut() {
            *value = Complex::new(value.norm_sqr(), 0.0);
        }
        inverse.process(&mut buf);

        let scale = 1.0 / fft_len as f64;
        for lag in 0..num_frames {
            // Unbiased: lag k has only (m - k) overlapping products
            let overlap = (num_frames - lag) as f64;
            acf_sum[lag] += buf[lag].re as f64 * scale / overlap;
        }
    }

    let inv_bins = 1.0 / num_bins as f64;
    let mut curve: Vec<f32> = acf_sum.iter().map(|&v| (v * inv_bins) as f32).collect();

    let lag_zero = curve[0];
    if lag_zero.abs() <= NORMALIZE_EPSILON {
        curve.iter_mut().for_each(|v| *v = 0.0);
    } else {
        // Boundary frames let the per-lag estimate nudge past the lag-0
        // value on some inputs; cap so lag 0 stays the maximum.
        curve.iter_mut().for_each(|v| *v = (*v / lag_zero).min(1.0));
    }
    curve
}
