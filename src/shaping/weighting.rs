//! Frequency-dependent gain shaping.
//!
//! Each weighting generation is a fixed recipe of multiplicative terms. The
//! per-bin product only depends on the config, the display width and the
//! sample rate, so it is folded into a gain table once and reused per frame.

use super::params::{ShapingConfig, WeightingMode};

/// Sub shelf is at full strength below this frequency...
pub const SUB_SHELF_FULL_HZ: f32 = 120.0;
/// ...and gone above this one.
pub const SUB_SHELF_END_HZ: f32 = 220.0;

/// High rolloff starts here and reaches full depth at Nyquist.
pub const ROLLOFF_START_HZ: f32 = 2000.0;

/// Exponent of the low-to-high tilt interpolation.
pub const TILT_CURVE: f32 = 0.6;

#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Centre frequency of the content display bin `i` shows. Follows the
/// resampler's `x^gamma` warp so the EQ lands on the bins it names.
pub fn bin_hz(i: usize, width: usize, gamma: f32, nyquist: f32) -> f32 {
    if width == 0 {
        return 0.0;
    }
    let x = (i as f32 + 0.5) / width as f32;
    x.powf(gamma) * nyquist
}

/// Gaussian bell in octaves around `kickHz`.
pub fn kick_db(config: &ShapingConfig, hz: f32) -> f32 {
    let octaves = (hz.max(1.0) / config.kick_hz.max(1.0)).log2();
    let z = octaves / config.kick_width_oct.max(0.01);
    config.kick_boost_db * (-0.5 * z * z).exp()
}

pub fn sub_shelf_db(config: &ShapingConfig, hz: f32) -> f32 {
    config.sub_shelf_db * (1.0 - smoothstep(SUB_SHELF_FULL_HZ, SUB_SHELF_END_HZ, hz))
}

pub fn bass_shelf_db(config: &ShapingConfig, hz: f32) -> f32 {
    let end = config.bass_freq_hz + config.bass_width_hz;
    config.bass_gain_db * (1.0 - smoothstep(config.bass_freq_hz, end, hz))
}

/// Log-frequency ramp from 0 dB at `ROLLOFF_START_HZ` to `hiRolloffDb` at Nyquist.
pub fn hi_rolloff_db(config: &ShapingConfig, hz: f32, nyquist: f32) -> f32 {
    if nyquist <= ROLLOFF_START_HZ || hz <= ROLLOFF_START_HZ {
        return 0.0;
    }
    let t = (hz / ROLLOFF_START_HZ).log2() / (nyquist / ROLLOFF_START_HZ).log2();
    config.hi_rolloff_db * t.clamp(0.0, 1.0)
}

/// Linear low-to-high multiplier; `t` is the bin's position in 0.0-1.0.
pub fn tilt(config: &ShapingConfig, t: f32) -> f32 {
    config.tilt_lo + (config.tilt_hi - config.tilt_lo) * t.clamp(0.0, 1.0).powf(TILT_CURVE)
}

/// Linear gain of one bin under the config's weighting mode.
pub fn bin_gain(config: &ShapingConfig, i: usize, width: usize, nyquist: f32) -> f32 {
    let hz = bin_hz(i, width, config.weighting_mode.warp_gamma(), nyquist);
    let t = if width > 1 { i as f32 / (width - 1) as f32 } else { 0.0 };
    let eq_db = match config.weighting_mode {
        WeightingMode::Ae => kick_db(config, hz) + sub_shelf_db(config, hz),
        WeightingMode::Fv2 => {
            kick_db(config, hz) + bass_shelf_db(config, hz) + hi_rolloff_db(config, hz, nyquist)
        }
    };
    db_to_gain(eq_db) * tilt(config, t)
}

pub fn build_gains(config: &ShapingConfig, width: usize, sample_rate: f32) -> Vec<f32> {
    let nyquist = sample_rate * 0.5;
    (0..width).map(|i| bin_gain(config, i, width, nyquist)).collect()
}

/// Apply the gain table and display threshold in place. Returns the frame peak.
pub fn apply(values: &mut [f32], gains: &[f32], threshold: f32) -> f32 {
    let mut peak = 0.0f32;
    for (v, &g) in values.iter_mut().zip(gains) {
        *v = (*v * g - threshold).max(0.0);
        peak = peak.max(*v);
    }
    peak
}
