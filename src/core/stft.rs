//! Short-time Fourier transform pair used by the separation pipeline.
//!
//! The forward transform zero-pads the signal so every frame is full
//! length; the inverse transform reconstructs by windowed overlap-add,
//! dividing each sample by the accumulated squared-window sum. With an
//! unmodified spectrogram and a window that is nonzero at its endpoints
//! (Hamming, the default) the roundtrip is exact to within floating-point
//! tolerance once the caller truncates to the original sample count.

use crate::core::fft::{COMPLEX_ZERO, WINDOW_SUM_EPSILON};
use crate::core::window::{generate_window, WindowType};
use crate::error::RepetError;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Forward/inverse windowed Fourier transform with fixed window and hop.
pub struct Stft {
    window_size: usize,
    hop_size: usize,
    window: Vec<f32>,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
}

impl Stft {
    /// Create a transform for the given window length and overlap.
    ///
    /// # Errors
    /// Returns `RepetError::InvalidInput` if the window size is not a power
    /// of two or the overlap does not leave a positive hop.
    pub fn new(
        window_size: usize,
        overlap: usize,
        window_type: WindowType,
    ) -> Result<Self, RepetError> {
        if window_size < 2 || !window_size.is_power_of_two() {
            return Err(RepetError::InvalidInput(format!(
                "window size must be a power of two >= 2, got {}",
                window_size
            )));
        }
        if overlap >= window_size {
            return Err(RepetError::InvalidInput(format!(
                "overlap {} must be smaller than window size {}",
                overlap, window_size
            )));
        }
        let mut planner = FftPlanner::new();
        Ok(Self {
            window_size,
            hop_size: window_size - overlap,
            window: generate_window(window_type, window_size),
            forward: planner.plan_fft_forward(window_size),
            inverse: planner.plan_fft_inverse(window_size),
        })
    }

    /// Window length N in samples.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Hop between consecutive frames in samples.
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Number of non-redundant frequency bins (N/2 + 1).
    pub fn num_bins(&self) -> usize {
        self.window_size / 2 + 1
    }

    /// Number of analysis frames for a signal of `len` samples.
    pub fn num_frames(&self, len: usize) -> usize {
        len.div_ceil(self.hop_size)
    }

    /// Forward transform: frames-major complex spectrogram, full N bins
    /// per frame. The signal is zero-padded so the last frame is full
    /// length and every input sample is covered by at least one frame.
    pub fn forward(&self, samples: &[f32]) -> Vec<Vec<Complex<f32>>> {
        let num_frames = self.num_frames(samples.len());
        let mut frames = Vec::with_capacity(num_frames);
        let mut buf = vec![COMPLEX_ZERO; self.window_size];

        for frame_idx in 0..num_frames {
            let pos = frame_idx * self.hop_size;
            let frame_len = self.window_size.min(samples.len() - pos);
            for i in 0..self.window_size {
                buf[i] = if i < frame_len {
                    Complex::new(samples[pos + i] * self.window[i], 0.0)
                } else {
                    COMPLEX_ZERO
                };
            }
            self.forward.process(&mut buf);
            frames.push(buf.clone());
        }
        frames
    }

    /// Half-spectrum magnitudes (N/2 + 1 bins) of a complex spectrogram.
    pub fn magnitude(&self, frames: &[Vec<Complex<f32>>]) -> Vec<Vec<f32>> {
        let num_bins = self.num_bins();
        frames
            .iter()
            .map(|frame| frame[..num_bins].iter().map(|c| c.norm()).collect())
            .collect()
    }

    /// Inverse transform via windowed overlap-add.
    ///
    /// Output length is `(m - 1) * hop + N`, which may exceed the original
    /// signal; callers truncate to the original sample count.
    pub fn inverse(&self, frames: &[Vec<Complex<f32>>]) -> Vec<f32> {
        if frames.is_empty() {
            return Vec::new();
        }
        let output_len = (frames.len() - 1) * self.hop_size + self.window_size;
        let norm = 1.0 / self.window_size as f32;
        let mut output = vec![0.0f32; output_len];
        let mut window_sum = vec![0.0f32; output_len];
        let mut buf = vec![COMPLEX_ZERO; self.window_size];

        for (frame_idx, frame) in frames.iter().enumerate() {
            let pos = frame_idx * self.hop_size;
            buf.copy_from_slice(frame);
            self.inverse.process(&mut buf);
            for i in 0..self.window_size {
                output[pos + i] += buf[i].re * norm * self.window[i];
                window_sum[pos + i] += self.window[i] * self.window[i];
            }
        }

        for (sample, &ws) in output.iter_mut().zip(window_sum.iter()) {
            *sample /= ws.max(WINDOW_SUM_EPSILON);
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine_wave(freq: f32, sample_rate: u32, num_samples: usize) -> Vec<f32> {
        (0..num_samples)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_stft_rejects_bad_config() {
        assert!(Stft::new(1000, 500, WindowType::Hamming).is_err());
        assert!(Stft::new(1024, 1024, WindowType::Hamming).is_err());
        assert!(Stft::new(0, 0, WindowType::Hamming).is_err());
    }

    #[test]
    fn test_frame_count_and_shape() {
        let stft = Stft::new(512, 256, WindowType::Hamming).unwrap();
        assert_eq!(stft.hop_size(), 256);
        assert_eq!(stft.num_bins(), 257);
        assert_eq!(stft.num_frames(0), 0);
        assert_eq!(stft.num_frames(256), 1);
        assert_eq!(stft.num_frames(257), 2);

        let signal = sine_wave(440.0, 8000, 2000);
        let frames = stft.forward(&signal);
        assert_eq!(frames.len(), stft.num_frames(2000));
        assert!(frames.iter().all(|f| f.len() == 512));
    }

    #[test]
    fn test_roundtrip_reconstruction() {
        let stft = Stft::new(512, 256, WindowType::Hamming).unwrap();
        let signal = sine_wave(440.0, 8000, 4000);
        let frames = stft.forward(&signal);
        let mut rebuilt = stft.inverse(&frames);
        rebuilt.truncate(signal.len());

        let err: f32 = signal
            .iter()
            .zip(rebuilt.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f32>()
            .sqrt();
        let norm: f32 = signal.iter().map(|s| s * s).sum::<f32>().sqrt();
        assert!(
            err < norm * 1e-5,
            "roundtrip error {} too large vs norm {}",
            err,
            norm
        );
    }

    #[test]
    fn test_magnitude_peak_at_tone_bin() {
        let sample_rate = 8000;
        let stft = Stft::new(512, 256, WindowType::Hamming).unwrap();
        // 1000 Hz lands on bin 64 at 8 kHz with a 512-point window
        let signal = sine_wave(1000.0, sample_rate, 4096);
        let mags = stft.magnitude(&stft.forward(&signal));

        // Check an interior frame (edges are partially windowed)
        let frame = &mags[mags.len() / 2];
        let peak_bin = frame
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        let expected = (1000.0 * 512.0 / sample_rate as f32).round() as usize;
        assert!(
            peak_bin.abs_diff(expected) <= 1,
            "peak bin {} not near expected {}",
            peak_bin,
            expected
        );
    }

    #[test]
    fn test_inverse_empty() {
        let stft = Stft::new(512, 256, WindowType::Hamming).unwrap();
        assert!(stft.inverse(&[]).is_empty());
        assert!(stft.forward(&[]).is_empty());
    }
}
