use serde::{Deserialize, Serialize};

/// Which weighting generation shapes the spectrum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightingMode {
    /// Kick bell + sub shelf + tilt.
    #[default]
    Ae,
    /// Kick bell + bass shelf + high rolloff + tilt.
    Fv2,
}

impl WeightingMode {
    /// Exponent of the resampler's perceptual warp.
    pub fn warp_gamma(self) -> f32 {
        match self {
            WeightingMode::Ae => 1.25,
            WeightingMode::Fv2 => 1.15,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WeightingMode::Ae => "ae",
            WeightingMode::Fv2 => "fv2",
        }
    }
}

/// 3-tap spatial smoothing kernel applied across neighbouring bins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpatialKernel {
    #[default]
    Wide,
    Narrow,
}

impl SpatialKernel {
    /// (left, centre, right) weights, summing to 1.
    pub fn weights(self) -> [f32; 3] {
        match self {
            SpatialKernel::Wide => [0.3, 0.4, 0.3],
            SpatialKernel::Narrow => [0.15, 0.7, 0.15],
        }
    }
}

/// Tunable shaping parameters. Serialized as a flat camelCase map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShapingConfig {
    pub weighting_mode: WeightingMode,
    pub spatial_kernel: SpatialKernel,
    pub use_bin_floor: bool,
    pub beat_boost_enabled: bool,

    /// Analyser-side magnitude smoothing (consumed by the FFT source)
    pub analyser_smoothing: f32,

    pub kick_hz: f32,
    pub kick_width_oct: f32,
    pub kick_boost_db: f32,
    pub sub_shelf_db: f32,
    pub tilt_lo: f32,
    pub tilt_hi: f32,

    pub floor_atk_low: f32,
    pub floor_rel_low: f32,
    pub floor_atk_hi: f32,
    pub floor_rel_hi: f32,
    pub floor_strength_low: f32,
    pub floor_strength_hi: f32,

    pub bass_freq_hz: f32,
    pub bass_width_hz: f32,
    pub bass_gain_db: f32,
    pub hi_rolloff_db: f32,

    pub beat_boost: f32,

    pub attack: f32,
    pub release: f32,
    pub noise_floor: f32,
    pub peak_curve: f32,
    pub min_db: f32,
    pub max_db: f32,

    pub baseline_percentile: f32,
    pub baseline_strength: f32,
    pub display_threshold: f32,

    pub target_peak: f32,
    pub min_gain: f32,
    pub max_gain: f32,
    pub agc_attack: f32,
    pub agc_release: f32,
}

impl Default for ShapingConfig {
    fn default() -> Self {
        Self::for_mode(WeightingMode::Ae)
    }
}

impl ShapingConfig {
    /// Defaults of each weighting generation.
    pub fn for_mode(mode: WeightingMode) -> Self {
        match mode {
            WeightingMode::Ae => Self {
                weighting_mode: WeightingMode::Ae,
                spatial_kernel: SpatialKernel::Wide,
                use_bin_floor: true,
                beat_boost_enabled: true,
                analyser_smoothing: 0.8,
                kick_hz: 60.0,
                kick_width_oct: 0.65,
                kick_boost_db: 6.0,
                sub_shelf_db: 4.0,
                tilt_lo: 0.9,
                tilt_hi: 1.4,
                floor_atk_low: 0.02,
                floor_rel_low: 0.3,
                floor_atk_hi: 0.04,
                floor_rel_hi: 0.4,
                floor_strength_low: 0.6,
                floor_strength_hi: 0.8,
                bass_freq_hz: 80.0,
                bass_width_hz: 20.0,
                bass_gain_db: 6.0,
                hi_rolloff_db: -6.0,
                beat_boost: 0.35,
                attack: 0.6,
                release: 0.15,
                noise_floor: 0.04,
                peak_curve: 1.4,
                min_db: -90.0,
                max_db: -25.0,
                baseline_percentile: 0.2,
                baseline_strength: 0.6,
                display_threshold: 0.01,
                target_peak: 0.9,
                min_gain: 0.5,
                max_gain: 3.0,
                agc_attack: 0.05,
                agc_release: 0.3,
            },
            WeightingMode::Fv2 => Self {
                weighting_mode: WeightingMode::Fv2,
                spatial_kernel: SpatialKernel::Narrow,
                attack: 0.5,
                release: 0.12,
                peak_curve: 1.6,
                min_db: -100.0,
                max_db: -30.0,
                kick_boost_db: 4.0,
                bass_gain_db: 8.0,
                tilt_lo: 1.0,
                tilt_hi: 1.3,
                baseline_percentile: 0.25,
                ..Self::for_mode(WeightingMode::Ae)
            },
        }
    }

    /// Mutable views of every numeric field, in `PARAM_RANGES` order.
    fn numeric_fields_mut(&mut self) -> [&mut f32; NUMERIC_PARAMS] {
        [
            &mut self.analyser_smoothing,
            &mut self.kick_hz,
            &mut self.kick_width_oct,
            &mut self.kick_boost_db,
            &mut self.sub_shelf_db,
            &mut self.tilt_lo,
            &mut self.tilt_hi,
            &mut self.floor_atk_low,
            &mut self.floor_rel_low,
            &mut self.floor_atk_hi,
            &mut self.floor_rel_hi,
            &mut self.floor_strength_low,
            &mut self.floor_strength_hi,
            &mut self.bass_freq_hz,
            &mut self.bass_width_hz,
            &mut self.bass_gain_db,
            &mut self.hi_rolloff_db,
            &mut self.beat_boost,
            &mut self.attack,
            &mut self.release,
            &mut self.noise_floor,
            &mut self.peak_curve,
            &mut self.min_db,
            &mut self.max_db,
            &mut self.baseline_percentile,
            &mut self.baseline_strength,
            &mut self.display_threshold,
            &mut self.target_peak,
            &mut self.min_gain,
            &mut self.max_gain,
            &mut self.agc_attack,
            &mut self.agc_release,
        ]
    }

    /// Clamp every field into its documented range.
    ///
    /// Non-finite values fall back to the mode default. `maxDb` is kept at
    /// least `MIN_DB_SPAN` above `minDb` and `maxGain` never drops below
    /// `minGain`. Returns one entry per field that changed.
    pub fn clamp(&mut self) -> Vec<Adjustment> {
        let mut defaults = Self::for_mode(self.weighting_mode);
        let fallback = defaults.numeric_fields_mut().map(|v| *v);

        let mut adjustments = Vec::new();
        for ((range, field), default) in PARAM_RANGES
            .iter()
            .zip(self.numeric_fields_mut())
            .zip(fallback)
        {
            let from = *field;
            let to = if from.is_finite() {
                from.clamp(range.min, range.max)
            } else {
                default
            };
            // NaN never compares equal, so it is always reported
            if to != from {
                *field = to;
                adjustments.push(Adjustment { key: range.key, from, to });
            }
        }

        if self.max_db - self.min_db < MIN_DB_SPAN {
            let from = self.max_db;
            self.max_db = self.min_db + MIN_DB_SPAN;
            adjustments.push(Adjustment { key: "maxDb", from, to: self.max_db });
        }
        if self.max_gain < self.min_gain {
            let from = self.max_gain;
            self.max_gain = self.min_gain;
            adjustments.push(Adjustment { key: "maxGain", from, to: self.max_gain });
        }

        adjustments
    }

    /// Field-by-field equality on the raw bit patterns, so a NaN field still
    /// matches itself.
    pub fn same_bits(&self, other: &Self) -> bool {
        self.weighting_mode == other.weighting_mode
            && self.spatial_kernel == other.spatial_kernel
            && self.use_bin_floor == other.use_bin_floor
            && self.beat_boost_enabled == other.beat_boost_enabled
            && self
                .numeric_values()
                .iter()
                .zip(other.numeric_values())
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }

    fn numeric_values(&self) -> [f32; NUMERIC_PARAMS] {
        self.clone().numeric_fields_mut().map(|v| *v)
    }

    /// Clamped copy, discarding the adjustment report.
    pub fn sanitized(&self) -> Self {
        let mut copy = self.clone();
        copy.clamp();
        copy
    }
}

/// Smallest accepted gap between `minDb` and `maxDb`.
pub const MIN_DB_SPAN: f32 = 1.0;

pub const NUMERIC_PARAMS: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamRange {
    pub key: &'static str,
    pub min: f32,
    pub max: f32,
}

const fn range(key: &'static str, min: f32, max: f32) -> ParamRange {
    ParamRange { key, min, max }
}

/// Valid range of every numeric preset field.
pub const PARAM_RANGES: [ParamRange; NUMERIC_PARAMS] = [
    range("analyserSmoothing", 0.0, 1.0),
    range("kickHz", 20.0, 200.0),
    range("kickWidthOct", 0.1, 2.0),
    range("kickBoostDb", -12.0, 24.0),
    range("subShelfDb", -12.0, 24.0),
    range("tiltLo", 0.1, 3.0),
    range("tiltHi", 0.1, 2.5),
    range("floorAtkLow", 0.0, 1.0),
    range("floorRelLow", 0.0, 1.0),
    range("floorAtkHi", 0.0, 1.0),
    range("floorRelHi", 0.0, 1.0),
    range("floorStrengthLow", 0.0, 1.5),
    range("floorStrengthHi", 0.0, 1.5),
    range("bassFreqHz", 20.0, 140.0),
    range("bassWidthHz", 1.0, 50.0),
    range("bassGainDb", -6.0, 30.0),
    range("hiRolloffDb", -24.0, 0.0),
    range("beatBoost", 0.0, 2.0),
    range("attack", 0.01, 1.0),
    range("release", 0.01, 1.0),
    range("noiseFloor", 0.0, 0.2),
    range("peakCurve", 0.5, 4.0),
    range("minDb", -120.0, -10.0),
    range("maxDb", -60.0, 0.0),
    range("baselinePercentile", 0.01, 0.5),
    range("baselineStrength", 0.0, 1.0),
    range("displayThreshold", 0.0, 0.05),
    range("targetPeak", 0.1, 1.5),
    range("minGain", 0.05, 3.0),
    range("maxGain", 0.1, 5.0),
    range("agcAttack", 0.0, 1.0),
    range("agcRelease", 0.0, 1.0),
];

/// A field that `ShapingConfig::clamp` changed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Adjustment {
    pub key: &'static str,
    pub from: f32,
    pub to: f32,
}
