use super::frame::SpectrumFrame;

/// Source bin sampled by display bin `i` of `width`, for `n` source bins.
///
/// Positions are warped by `x^gamma` so that low frequencies get more
/// display bins than high ones.
pub fn source_index(i: usize, width: usize, n: usize, gamma: f32) -> usize {
    if n <= 1 || width == 0 {
        return 0;
    }
    let x = (i as f32 + 0.5) / width as f32;
    let warped = x.powf(gamma);
    let idx = (warped * (n - 1) as f32).round();
    (idx.max(0.0) as usize).min(n - 1)
}

/// Map the frame's N bins onto `raw.len()` display bins, normalized to 0.0-1.0.
pub fn resample(frame: &SpectrumFrame<'_>, gamma: f32, min_db: f32, max_db: f32, raw: &mut [f32]) {
    let n = frame.bins.len();
    let width = raw.len();
    if n == 0 {
        raw.fill(0.0);
        return;
    }
    for (i, out) in raw.iter_mut().enumerate() {
        let src = source_index(i, width, n, gamma);
        *out = frame.bins.level(src, min_db, max_db);
    }
}
