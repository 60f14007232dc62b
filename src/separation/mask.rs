//! Binary time-frequency masks and their application.

use rustfft::num_complex::Complex;

/// Builds the binary repeating mask from a magnitude spectrogram and its
/// repeating-pattern model.
///
/// A bin belongs to the background when `V - 2*V1 <= tolerance`, where
/// `V` is the observed magnitude and `V1` the model. With the default
/// tolerance of 0 this keeps bins whose non-repeating excess is at most
/// as large as the repeating part. A tolerance of `-inf` yields an
/// all-zeros mask, `+inf` an all-ones mask.
pub fn repeating_mask(magnitude: &[Vec<f32>], model: &[Vec<f32>], tolerance: f32) -> Vec<Vec<f32>> {
    magnitude
        .iter()
        .zip(model.iter())
        .map(|(v_row, m_row)| {
            v_row
                .iter()
                .zip(m_row.iter())
                .map(|(&v, &m)| if v - 2.0 * m <= tolerance { 1.0 } else { 0.0 })
                .collect()
        })
        .collect()
}

/// Forces bins below `cutoff_bins` into the background by setting their
/// mask values to 1. Bin 0 (DC) is left untouched.
pub fn force_low_bins(mask: &mut [Vec<f32>], cutoff_bins: usize) {
    for row in mask.iter_mut() {
        let end = cutoff_bins.min(row.len());
        for value in row.iter_mut().take(end).skip(1) {
            *value = 1.0;
        }
    }
}

/// Expands a half-spectrum mask to all `window_size` bins by mirroring
/// across the Nyquist bin, matching the conjugate symmetry of a real
/// signal's spectrum.
pub fn mirror_mask(half: &[Vec<f32>], window_size: usize) -> Vec<Vec<f32>> {
    let half_bins = window_size / 2 + 1;
    half.iter()
        .map(|row| {
            debug_assert_eq!(row.len(), half_bins);
            let mut full = Vec::with_capacity(window_size);
            full.extend_from_slice(row);
            for bin in (1..window_size / 2).rev() {
                full.push(row[bin]);
            }
            full
        })
        .collect()
}

/// Multiplies a complex spectrogram by a full-spectrum mask, bin by bin.
pub fn apply_mask(frames: &[Vec<Complex<f32>>], mask: &[Vec<f32>]) -> Vec<Vec<Complex<f32>>> {
    frames
        .iter()
        .zip(mask.iter())
        .map(|(frame, mask_row)| {
            frame
                .iter()
                .zip(mask_row.iter())
                .map(|(&c, &m)| c * m)
                .collect()
        })
        .collect()
}
