use super::envelope::ema_step;
use super::params::ShapingConfig;

/// Frame peaks at or below this are treated as silence (unity gain).
pub const PEAK_EPSILON: f32 = 1e-4;

/// Gain that would bring `frame_peak` to the target, within the gain bounds.
pub fn desired_gain(frame_peak: f32, config: &ShapingConfig) -> f32 {
    let desired = if frame_peak.is_finite() && frame_peak > PEAK_EPSILON {
        config.target_peak / frame_peak
    } else {
        1.0
    };
    desired.clamp(config.min_gain, config.max_gain)
}

/// Move the held gain toward `desired`, rising at `agcAttack` and falling at
/// `agcRelease`. The result always lies within `[minGain, maxGain]`, even
/// right after the bounds change.
pub fn step(gain: f32, desired: f32, config: &ShapingConfig) -> f32 {
    let gain = if gain.is_finite() { gain } else { 1.0 };
    ema_step(gain, desired, config.agc_attack, config.agc_release)
        .clamp(config.min_gain, config.max_gain)
}

/// Scale by the gain and clamp to 0.0-1.0, in place.
pub fn level(values: &mut [f32], gain: f32) {
    for v in values.iter_mut() {
        *v = (*v * gain).clamp(0.0, 1.0);
    }
}
