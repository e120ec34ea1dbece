use super::envelope::ema_step;
use super::params::ShapingConfig;

pub const HISTOGRAM_BUCKETS: usize = 64;

/// Fraction of bins (from the bottom of the spectrum) that use the low-region floor rates.
pub const LOW_REGION_FRACTION: f32 = 0.2;

/// Global baseline for this frame: the lower edge of the histogram bucket in
/// which the running count reaches `percentile` of all bins.
pub fn percentile_baseline(
    values: &[f32],
    percentile: f32,
    histogram: &mut [u16; HISTOGRAM_BUCKETS],
) -> f32 {
    histogram.fill(0);
    for &v in values {
        let v = if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        let bucket = ((v * HISTOGRAM_BUCKETS as f32) as usize).min(HISTOGRAM_BUCKETS - 1);
        histogram[bucket] = histogram[bucket].saturating_add(1);
    }

    let total: u32 = histogram.iter().map(|&c| c as u32).sum();
    if total == 0 {
        return 0.0;
    }
    let target = ((percentile * values.len() as f32).ceil() as u32).clamp(1, total);

    let mut running = 0u32;
    let mut bucket = HISTOGRAM_BUCKETS - 1;
    for (i, &count) in histogram.iter().enumerate() {
        running += count as u32;
        if running >= target {
            bucket = i;
            break;
        }
    }
    bucket as f32 / HISTOGRAM_BUCKETS as f32
}

#[inline]
fn is_low_region(i: usize, width: usize) -> bool {
    (i as f32) < LOW_REGION_FRACTION * width as f32
}

/// Slow per-bin floor that creeps up under sustained energy and drops quickly.
pub fn track_floor(spatial: &[f32], floor: &mut [f32], config: &ShapingConfig) {
    let width = spatial.len();
    for (i, (f, &level)) in floor.iter_mut().zip(spatial).enumerate() {
        *f = if is_low_region(i, width) {
            ema_step(*f, level, config.floor_atk_low, config.floor_rel_low)
        } else {
            ema_step(*f, level, config.floor_atk_hi, config.floor_rel_hi)
        };
    }
}

/// Subtract a region-dependent share of the floor, leaving the transient part.
pub fn remove_floor(spatial: &[f32], floor: &[f32], config: &ShapingConfig, transient: &mut [f32]) {
    let width = spatial.len();
    for (i, (out, (&level, &f))) in transient.iter_mut().zip(spatial.iter().zip(floor)).enumerate() {
        let strength = if is_low_region(i, width) {
            config.floor_strength_low
        } else {
            config.floor_strength_hi
        };
        *out = (level - f * strength).max(0.0);
    }
}

/// Subtract the global baseline in place.
pub fn debias(transient: &mut [f32], offset: f32) {
    for v in transient.iter_mut() {
        *v = (*v - offset).max(0.0);
    }
}
