/// Beats accepted within this many frames of the previous one are ignored.
pub const BEAT_GATE_FRAMES: u32 = 6;

/// Boost weight at the top of the spectrum (the bottom gets 1.0).
pub const HIGH_BIN_WEIGHT: f32 = 0.4;

/// Beat accent level carried between frames.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Accent {
    level: f32,
    gate: u32,
}

impl Accent {
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Decay the held level by `release`, then fire a new accent of `boost`
    /// if a beat arrived and the gate is open. Returns the level for this frame.
    pub fn advance(&mut self, beat: bool, enabled: bool, boost: f32, release: f32) -> f32 {
        if !enabled {
            *self = Accent::default();
            return 0.0;
        }

        self.level *= 1.0 - release.clamp(0.0, 1.0);
        if self.level < 1e-4 {
            self.level = 0.0;
        }

        if beat && self.gate == 0 {
            self.level = boost.max(0.0);
            self.gate = BEAT_GATE_FRAMES;
        } else {
            self.gate = self.gate.saturating_sub(1);
        }
        self.level
    }
}

/// Add the accent over the whole spectrum, weighted toward the low end.
pub fn apply(values: &mut [f32], level: f32) {
    if level <= 0.0 {
        return;
    }
    let last = values.len().saturating_sub(1).max(1) as f32;
    for (i, v) in values.iter_mut().enumerate() {
        let t = i as f32 / last;
        let weight = 1.0 + (HIGH_BIN_WEIGHT - 1.0) * t;
        *v = (*v + level * weight).clamp(0.0, 1.0);
    }
}

/// Map 0.0-1.0 levels onto the 0-255 output texture.
pub fn quantize(values: &[f32], output: &mut [u8]) {
    for (out, &v) in output.iter_mut().zip(values) {
        let v = if v.is_finite() { v } else { 0.0 };
        *out = (v * 255.0).round().clamp(0.0, 255.0) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beat_fires_then_decays() {
        let mut accent = Accent::default();
        assert_eq!(accent.advance(true, true, 0.5, 0.5), 0.5);
        assert_eq!(accent.advance(false, true, 0.5, 0.5), 0.25);
        assert_eq!(accent.advance(false, true, 0.5, 0.5), 0.125);
    }

    #[test]
    fn gate_blocks_rapid_retriggers() {
        let mut accent = Accent::default();
        accent.advance(true, true, 1.0, 0.5);
        // Inside the gate: the beat is ignored and the level keeps decaying
        assert_eq!(accent.advance(true, true, 1.0, 0.5), 0.5);
        for _ in 0..BEAT_GATE_FRAMES {
            accent.advance(false, true, 1.0, 0.5);
        }
        assert_eq!(accent.advance(true, true, 1.0, 0.5), 1.0);
    }

    #[test]
    fn disabled_accent_is_silent() {
        let mut accent = Accent::default();
        accent.advance(true, true, 1.0, 0.1);
        assert_eq!(accent.advance(true, false, 1.0, 0.1), 0.0);
        assert_eq!(accent.level(), 0.0);
    }

    #[test]
    fn apply_weights_low_bins_more() {
        let mut values = [0.0f32; 5];
        apply(&mut values, 0.5);
        assert!((values[0] - 0.5).abs() < 1e-6);
        assert!((values[4] - 0.5 * HIGH_BIN_WEIGHT).abs() < 1e-6);
        assert!(values.windows(2).all(|w| w[0] >= w[1]));

        let mut loud = [0.9f32];
        apply(&mut loud, 2.0);
        assert_eq!(loud[0], 1.0);
    }

    #[test]
    fn quantize_rounds_and_clamps() {
        let values = [0.0f32, 1.0, 0.5, 2.0, -1.0, f32::NAN];
        let mut out = [7u8; 6];
        quantize(&values, &mut out);
        assert_eq!(out, [0, 255, 128, 255, 0, 0]);
    }
}
