//! Repeating-pattern model built by per-position medians.

/// Builds the repeating-background magnitude model for one channel.
///
/// The spectrogram is cut into segments of `period` frames. For every
/// position within the period and every bin, the model value is the
/// median across segments; the last segment may be shorter than the
/// period, in which case positions past its end simply contribute fewer
/// values. The median uses the usual convention of averaging the two
/// middle values for even counts. Each model value is finally clamped to
/// the observed magnitude, since the repeating background cannot exceed
/// the mixture.
///
/// `magnitude` is frames-major with half-spectrum rows. The result has
/// the same shape. A zero `period` is treated as 1.
pub fn repeating_pattern(magnitude: &[Vec<f32>], period: usize) -> Vec<Vec<f32>> {
    let num_frames = magnitude.len();
    if num_frames == 0 {
        return Vec::new();
    }
    let num_bins = magnitude[0].len();
    let period = period.max(1);

    // Median per (position-in-period, bin), then tile and clamp.
    let positions = period.min(num_frames);
    let mut medians = vec![vec![0.0f32; num_bins]; positions];
    let mut scratch: Vec<f32> = Vec::with_capacity(num_frames.div_ceil(period));

    for (pos, row) in medians.iter_mut().enumerate() {
        for (bin, out) in row.iter_mut().enumerate() {
            scratch.clear();
            let mut frame = pos;
            while frame < num_frames {
                scratch.push(magnitude[frame][bin]);
                frame += period;
            }
            *out = median_in_place(&mut scratch);
        }
    }

    magnitude
        .iter()
        .enumerate()
        .map(|(frame, row)| {
            let model_row = &medians[frame % period];
            row.iter()
                .zip(model_row.iter())
                .map(|(&observed, &model)| model.min(observed))
                .collect()
        })
        .collect()
}

/// Median of a non-empty slice; sorts it as a side effect.
fn median_in_place(values: &mut [f32]) -> f32 {
    debug_assert!(!values.is_empty());
    values.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}
