use crate::core::window::WindowType;
use crate::error::RepetError;

/// A single audio sample (32-bit float, range -1.0 to 1.0).
pub type Sample = f32;

/// Supported PCM bit depths for encoded output.
const SUPPORTED_BIT_DEPTHS: [u16; 3] = [16, 24, 32];

/// Multi-channel audio in interleaved format, immutable once loaded.
///
/// For mono audio, samples are stored sequentially: `[s0, s1, s2, ...]`
/// For stereo audio, samples are interleaved: `[L0, R0, L1, R1, ...]`
/// The bit depth records the container's sample width so that encoded
/// output matches the input (24-bit in, 24-bit out).
#[derive(Debug, Clone)]
pub struct AudioSignal {
    /// Raw interleaved sample data.
    pub data: Vec<Sample>,
    /// Number of channels (1 = mono, 2 = stereo, ...).
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Source bit depth (16 or 24-bit PCM, 32-bit float).
    pub bit_depth: u16,
}

impl AudioSignal {
    /// Create a new audio signal.
    ///
    /// # Errors
    /// Returns `RepetError::InvalidInput` if channels is 0, the sample rate
    /// is 0, or the bit depth is not 16, 24, or 32.
    pub fn new(
        data: Vec<Sample>,
        channels: u16,
        sample_rate: u32,
        bit_depth: u16,
    ) -> Result<Self, RepetError> {
        if channels == 0 {
            return Err(RepetError::InvalidInput(
                "channel count must be at least 1".to_string(),
            ));
        }
        if sample_rate == 0 {
            return Err(RepetError::InvalidInput(
                "sample rate must be greater than 0".to_string(),
            ));
        }
        if !SUPPORTED_BIT_DEPTHS.contains(&bit_depth) {
            return Err(RepetError::InvalidInput(format!(
                "unsupported bit depth: {} (expected 16, 24, or 32)",
                bit_depth
            )));
        }
        Ok(Self {
            data,
            channels,
            sample_rate,
            bit_depth,
        })
    }

    /// Number of frames in the signal (total samples / channels).
    pub fn num_frames(&self) -> usize {
        self.data.len() / self.channels as usize
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.num_frames() as f64 / self.sample_rate as f64
    }

    /// Returns true if the signal contains no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get a single channel's data as a new vector.
    pub fn channel_data(&self, channel: u16) -> Vec<Sample> {
        if channel >= self.channels {
            return Vec::new();
        }
        let ch = channel as usize;
        let num_ch = self.channels as usize;
        self.data
            .iter()
            .skip(ch)
            .step_by(num_ch)
            .copied()
            .collect()
    }

    /// Create an `AudioSignal` from separate channel vectors.
    ///
    /// # Errors
    /// Returns an error if channels have different lengths or the
    /// channel count, sample rate, or bit depth is invalid.
    pub fn from_channels(
        channels_data: &[Vec<Sample>],
        sample_rate: u32,
        bit_depth: u16,
    ) -> Result<Self, RepetError> {
        if channels_data.is_empty() {
            return Err(RepetError::InvalidInput(
                "channel count must be at least 1".to_string(),
            ));
        }
        let num_frames = channels_data[0].len();
        for ch in channels_data {
            if ch.len() != num_frames {
                return Err(RepetError::InvalidInput(
                    "all channels must have the same number of samples".to_string(),
                ));
            }
        }
        let num_channels = channels_data.len() as u16;
        let mut data = Vec::with_capacity(num_frames * channels_data.len());
        for i in 0..num_frames {
            for ch in channels_data {
                data.push(ch[i]);
            }
        }
        AudioSignal::new(data, num_channels, sample_rate, bit_depth)
    }

    /// Create a silent signal with the same shape, rate, and depth as `self`.
    pub fn silence_like(&self) -> Self {
        Self {
            data: vec![0.0; self.data.len()],
            channels: self.channels,
            sample_rate: self.sample_rate,
            bit_depth: self.bit_depth,
        }
    }
}

/// The two output signals of a separation run.
#[derive(Debug, Clone)]
pub struct Separation {
    /// Repeating background (accompaniment) estimate.
    pub background: AudioSignal,
    /// Non-repeating foreground residual (input minus background).
    pub foreground: AudioSignal,
}

/// Parameters controlling the separation, passed explicitly to every stage.
///
/// Immutable after construction; the pipeline never reads ambient state.
#[derive(Debug, Clone)]
pub struct SeparationParams {
    /// STFT window length in samples (power of two). `None` derives the
    /// next power of two covering 40 ms at the signal's sample rate.
    pub window_size: Option<usize>,
    /// Analysis/synthesis window shape (default: Hamming).
    pub window_type: WindowType,
    /// Mask tolerance `t`: a bin is repeating when `V - 2*V1 <= t`.
    /// Larger values classify more bins as repeating (default: 0.0).
    pub tolerance: f32,
    /// Minimum candidate repeating period in seconds (default: 0.8).
    pub min_period_secs: f64,
    /// Maximum candidate repeating period in seconds (default: 8.0; also
    /// capped at a third of the signal duration).
    pub max_period_secs: f64,
    /// Period used when no lag in range is prominent enough (default: 2.5).
    pub default_period_secs: f64,
    /// Fixed repeating period in seconds; skips beat-spectrum estimation.
    pub period_secs: Option<f64>,
    /// Cutoff frequency in Hz below which bins are forced into the
    /// background (foreground high-pass). 0 disables (default: 0).
    pub high_pass_cutoff_hz: f32,
}

impl Default for SeparationParams {
    fn default() -> Self {
        Self {
            window_size: None,
            window_type: WindowType::Hamming,
            tolerance: 0.0,
            min_period_secs: 0.8,
            max_period_secs: 8.0,
            default_period_secs: 2.5,
            period_secs: None,
            high_pass_cutoff_hz: 0.0,
        }
    }
}

impl SeparationParams {
    /// Create parameters with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the STFT window size (must be a power of two).
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = Some(window_size);
        self
    }

    /// Set the window shape.
    pub fn with_window_type(mut self, window_type: WindowType) -> Self {
        self.window_type = window_type;
        self
    }

    /// Set the mask tolerance.
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the candidate period range in seconds.
    pub fn with_period_range_secs(mut self, min_secs: f64, max_secs: f64) -> Self {
        self.min_period_secs = min_secs;
        self.max_period_secs = max_secs;
        self
    }

    /// Fix the repeating period in seconds, skipping estimation.
    pub fn with_period_secs(mut self, period_secs: f64) -> Self {
        self.period_secs = Some(period_secs);
        self
    }

    /// Set the foreground high-pass cutoff in Hz (0 disables).
    pub fn with_high_pass_cutoff(mut self, cutoff_hz: f32) -> Self {
        self.high_pass_cutoff_hz = cutoff_hz;
        self
    }

    /// Effective window length for the given sample rate.
    ///
    /// Defaults to the next power of two covering 40 ms of audio, so a
    /// 44.1 kHz signal analyzes with 2048-sample windows.
    pub fn effective_window_size(&self, sample_rate: u32) -> usize {
        match self.window_size {
            Some(ws) => ws,
            None => {
                let min_len = (0.04 * sample_rate as f64).ceil() as usize;
                min_len.next_power_of_two()
            }
        }
    }

    /// Validate all parameters.
    pub fn validate(&self) -> Result<(), RepetError> {
        if let Some(ws) = self.window_size {
            if ws < 2 || !ws.is_power_of_two() {
                return Err(RepetError::InvalidInput(format!(
                    "window size must be a power of two >= 2, got {}",
                    ws
                )));
            }
        }
        // Infinite tolerances are meaningful (all-ones / all-zeros mask).
        if self.tolerance.is_nan() {
            return Err(RepetError::InvalidInput(
                "tolerance must not be NaN".to_string(),
            ));
        }
        if self.min_period_secs <= 0.0 || !self.min_period_secs.is_finite() {
            return Err(RepetError::InvalidInput(format!(
                "minimum period must be positive, got {}",
                self.min_period_secs
            )));
        }
        if self.max_period_secs < self.min_period_secs {
            return Err(RepetError::InvalidInput(format!(
                "maximum period {} is below minimum period {}",
                self.max_period_secs, self.min_period_secs
            )));
        }
        if let Some(p) = self.period_secs {
            if p <= 0.0 || !p.is_finite() {
                return Err(RepetError::InvalidInput(format!(
                    "fixed period must be positive, got {}",
                    p
                )));
            }
        }
        if self.high_pass_cutoff_hz < 0.0 || !self.high_pass_cutoff_hz.is_finite() {
            return Err(RepetError::InvalidInput(format!(
                "high-pass cutoff must be non-negative, got {}",
                self.high_pass_cutoff_hz
            )));
        }
        Ok(())
    }
}
