use super::params::SpatialKernel;

/// Asymmetric one-pole step: `attack` when `target` is above `current`, `release` otherwise.
#[inline]
pub fn ema_step(current: f32, target: f32, attack: f32, release: f32) -> f32 {
    let rate = if target > current { attack } else { release };
    current + (target - current) * rate.clamp(0.0, 1.0)
}

/// Advance the per-bin temporal envelope toward this frame's levels.
pub fn follow(envelope: &mut [f32], raw: &[f32], attack: f32, release: f32) {
    for (env, &target) in envelope.iter_mut().zip(raw) {
        *env = ema_step(*env, target, attack, release);
    }
}

/// Remove the noise floor, rescale to 0.0-1.0 and apply the peak curve.
pub fn emphasize(envelope: &[f32], noise_floor: f32, peak_curve: f32, shaped: &mut [f32]) {
    let headroom = (1.0 - noise_floor).max(f32::EPSILON);
    for (out, &env) in shaped.iter_mut().zip(envelope) {
        let floored = ((env - noise_floor) / headroom).clamp(0.0, 1.0);
        *out = floored.powf(peak_curve);
    }
}

/// 3-tap smoothing across neighbouring bins. Edge bins reuse themselves
/// in place of the missing neighbour.
pub fn smooth(shaped: &[f32], kernel: SpatialKernel, spatial: &mut [f32]) {
    let [wl, wc, wr] = kernel.weights();
    let n = shaped.len();
    for (i, out) in spatial.iter_mut().enumerate().take(n) {
        let left = shaped[i.saturating_sub(1)];
        let right = shaped[(i + 1).min(n - 1)];
        *out = wl * left + wc * shaped[i] + wr * right;
    }
}
