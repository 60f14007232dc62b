//! Repeating-period selection from a beat spectrum.

/// Picks the repeating period, in frames, from a beat spectrum.
///
/// Searches `[min_lag, max_lag]` for the strongest lag. When the search
/// range is empty (signal too short) or the winning lag does not stand
/// out above the range's mean level, falls back to `default_lag` so a
/// period is always produced. The returned period is at least 1 and at
/// most `beat.len() - 1` frames.
pub fn find_repeating_period(
    beat: &[f32],
    min_lag: usize,
    max_lag: usize,
    default_lag: usize,
) -> usize {
    let num_lags = beat.len();
    if num_lags < 2 {
        return 1;
    }
    let clamp = |lag: usize| lag.clamp(1, num_lags - 1);

    let lo = clamp(min_lag);
    let hi = clamp(max_lag);
    if lo > hi {
        return clamp(default_lag);
    }

    let range = &beat[lo..=hi];
    let mut best_lag = lo;
    let mut best_value = range[0];
    let mut sum = 0.0f64;
    for (offset, &value) in range.iter().enumerate() {
        sum += value as f64;
        if value > best_value {
            best_value = value;
            best_lag = lo + offset;
        }
    }
    let mean = (sum / range.len() as f64) as f32;

    // A repeating structure shows as a peak above the range's baseline;
    // a flat or noisy curve does not, so trust the default instead.
    if best_value <= mean {
        return clamp(default_lag);
    }
    best_lag
}
