//! Reconstruction fidelity: the transform and the all-pass separation
//! must give the input back.

use repet::core::stft::Stft;
use repet::core::window::WindowType;
use repet::{separate, AudioSignal, SeparationParams};
use std::f32::consts::PI;

fn sine_wave(freq: f32, sample_rate: u32, num_samples: usize, amp: f32) -> Vec<f32> {
    (0..num_samples)
        .map(|i| amp * (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
        .collect()
}

fn relative_error(original: &[f32], rebuilt: &[f32]) -> f32 {
    let err: f32 = original
        .iter()
        .zip(rebuilt.iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum::<f32>()
        .sqrt();
    let norm: f32 = original.iter().map(|s| s * s).sum::<f32>().sqrt();
    if norm == 0.0 {
        err
    } else {
        err / norm
    }
}

#[test]
fn test_stft_roundtrip_multiple_window_sizes() {
    let signal = sine_wave(440.0, 8000, 6000, 0.8);
    for window_size in [256usize, 512, 1024, 2048] {
        let stft = Stft::new(window_size, window_size / 2, WindowType::Hamming).unwrap();
        let mut rebuilt = stft.inverse(&stft.forward(&signal));
        rebuilt.truncate(signal.len());
        let err = relative_error(&signal, &rebuilt);
        assert!(
            err < 1e-5,
            "window {}: relative error {} too large",
            window_size,
            err
        );
    }
}

#[test]
fn test_stft_roundtrip_awkward_lengths() {
    // Lengths that do not divide evenly into hops
    let stft = Stft::new(512, 256, WindowType::Hamming).unwrap();
    for len in [257usize, 511, 513, 1000, 4097] {
        let signal = sine_wave(523.25, 8000, len, 0.5);
        let mut rebuilt = stft.inverse(&stft.forward(&signal));
        rebuilt.truncate(len);
        assert_eq!(rebuilt.len(), len);
        let err = relative_error(&signal, &rebuilt);
        assert!(err < 1e-5, "length {}: relative error {}", len, err);
    }
}

#[test]
fn test_stft_roundtrip_noise_like_signal() {
    // Deterministic pseudo-random samples, no periodic structure
    let mut state = 0x12345678u32;
    let signal: Vec<f32> = (0..5000)
        .map(|_| {
            state = state.wrapping_mul(1664525).wrapping_add(1013904223);
            (state >> 8) as f32 / (1 << 24) as f32 - 0.5
        })
        .collect();

    let stft = Stft::new(1024, 512, WindowType::Hamming).unwrap();
    let mut rebuilt = stft.inverse(&stft.forward(&signal));
    rebuilt.truncate(signal.len());
    let err = relative_error(&signal, &rebuilt);
    assert!(err < 1e-5, "relative error {}", err);
}

#[test]
fn test_all_pass_separation_recovers_input() {
    // +inf tolerance makes the mask all-ones, so the background is the
    // full reconstruction and must match the input sample for sample.
    let sample_rate = 8192;
    let signal =
        AudioSignal::new(sine_wave(440.0, sample_rate, 16384, 0.7), 1, sample_rate, 16).unwrap();
    let params = SeparationParams::default().with_tolerance(f32::INFINITY);
    let result = separate(&signal, &params).unwrap();

    let err = relative_error(&signal.data, &result.background.data);
    assert!(err < 1e-5, "all-pass background error {}", err);
    let fg_peak = result
        .foreground
        .data
        .iter()
        .map(|s| s.abs())
        .fold(0.0f32, f32::max);
    assert!(fg_peak < 1e-5, "foreground peak {}", fg_peak);
}

#[test]
fn test_residual_identity_holds_for_any_tolerance() {
    let sample_rate = 8192;
    let signal =
        AudioSignal::new(sine_wave(330.0, sample_rate, 12288, 0.6), 1, sample_rate, 16).unwrap();
    for tolerance in [-1.0f32, 0.0, 0.5, 10.0] {
        let params = SeparationParams::default().with_tolerance(tolerance);
        let result = separate(&signal, &params).unwrap();
        for i in 0..signal.data.len() {
            let sum = result.background.data[i] + result.foreground.data[i];
            assert!(
                (sum - signal.data[i]).abs() < 1e-5,
                "tolerance {}: sum mismatch at sample {}",
                tolerance,
                i
            );
        }
    }
}
