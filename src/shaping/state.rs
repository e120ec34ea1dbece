use super::accent::{self, Accent};
use super::agc;
use super::baseline::{self, HISTOGRAM_BUCKETS};
use super::envelope;
use super::frame::SpectrumFrame;
use super::params::ShapingConfig;
use super::resample;
use super::weighting;

/// Whether the pipeline advances on `shape` calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No audio: the last output is held and nothing advances.
    Idle,
    /// Audio present: every stage runs once per call.
    Active,
}

/// Config as last seen, its clamped form, and everything derived from it.
struct Tuning {
    source: ShapingConfig,
    config: ShapingConfig,
    sample_rate: f32,
    gains: Vec<f32>,
}

impl Tuning {
    fn new(source: &ShapingConfig, width: usize, sample_rate: f32) -> Self {
        let mut config = source.clone();
        for adj in config.clamp() {
            log::warn!("Shaping config {} clamped: {} -> {}", adj.key, adj.from, adj.to);
        }
        let gains = weighting::build_gains(&config, width, sample_rate);
        Self {
            source: source.clone(),
            config,
            sample_rate,
            gains,
        }
    }

    fn is_current(&self, source: &ShapingConfig, sample_rate: f32) -> bool {
        self.sample_rate == sample_rate && self.source.same_bits(source)
    }
}

/// Per-instance pipeline memory. Width is fixed at construction.
pub struct ShapingState {
    phase: Phase,
    envelope: Vec<f32>,
    spatial: Vec<f32>,
    bin_floor: Vec<f32>,
    histogram: [u16; HISTOGRAM_BUCKETS],
    agc_gain: f32,
    accent: Accent,
    output: Vec<u8>,
    // Per-frame scratch, kept to avoid allocating on the frame path
    raw: Vec<f32>,
    work: Vec<f32>,
    tuning: Tuning,
}

impl ShapingState {
    /// Zeroed state for `width` display bins, starting Idle. A width of 0 is
    /// bumped to 1.
    pub fn new(width: usize) -> Self {
        let width = width.max(1);
        Self {
            phase: Phase::Idle,
            envelope: vec![0.0; width],
            spatial: vec![0.0; width],
            bin_floor: vec![0.0; width],
            histogram: [0; HISTOGRAM_BUCKETS],
            agc_gain: 1.0,
            accent: Accent::default(),
            output: vec![0; width],
            raw: vec![0.0; width],
            work: vec![0.0; width],
            tuning: Tuning::new(&ShapingConfig::default(), width, 48000.0),
        }
    }

    pub fn width(&self) -> usize {
        self.output.len()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Playback started or input connected.
    pub fn activate(&mut self) {
        if self.phase != Phase::Active {
            log::debug!("Shaping pipeline active ({} bins)", self.width());
            self.phase = Phase::Active;
        }
    }

    /// Paused, stopped or disconnected. The last output stays visible.
    pub fn deactivate(&mut self) {
        if self.phase != Phase::Idle {
            log::debug!("Shaping pipeline idle");
            self.phase = Phase::Idle;
        }
    }

    pub fn envelope(&self) -> &[f32] {
        &self.envelope
    }

    pub fn spatial(&self) -> &[f32] {
        &self.spatial
    }

    pub fn bin_floor(&self) -> &[f32] {
        &self.bin_floor
    }

    pub fn histogram(&self) -> &[u16; HISTOGRAM_BUCKETS] {
        &self.histogram
    }

    pub fn agc_gain(&self) -> f32 {
        self.agc_gain
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Advance the pipeline by one frame and return the display bins.
    ///
    /// Idle state returns the held output untouched. A frame without bins or
    /// with an invalid sample rate counts as losing the source: the state
    /// goes Idle and the held output is returned.
    pub fn shape(&mut self, frame: &SpectrumFrame<'_>, config: &ShapingConfig, beat: bool) -> &[u8] {
        if self.phase == Phase::Idle {
            return &self.output;
        }
        if !frame.is_usable() {
            log::warn!(
                "Spectrum source lost ({} bins, sample rate {}); holding last output",
                frame.bins.len(),
                frame.sample_rate
            );
            self.deactivate();
            return &self.output;
        }

        if !self.tuning.is_current(config, frame.sample_rate) {
            self.tuning = Tuning::new(config, self.width(), frame.sample_rate);
        }
        let cfg = &self.tuning.config;

        // 1. Resampler
        resample::resample(
            frame,
            cfg.weighting_mode.warp_gamma(),
            cfg.min_db,
            cfg.max_db,
            &mut self.raw,
        );

        // 2. Envelope shaper
        envelope::follow(&mut self.envelope, &self.raw, cfg.attack, cfg.release);
        envelope::emphasize(&self.envelope, cfg.noise_floor, cfg.peak_curve, &mut self.work);
        envelope::smooth(&self.work, cfg.spatial_kernel, &mut self.spatial);

        // 3. Baseline estimator
        let baseline = baseline::percentile_baseline(
            &self.spatial,
            cfg.baseline_percentile,
            &mut self.histogram,
        );
        if cfg.use_bin_floor {
            baseline::track_floor(&self.spatial, &mut self.bin_floor, cfg);
            baseline::remove_floor(&self.spatial, &self.bin_floor, cfg, &mut self.work);
        } else {
            self.work.copy_from_slice(&self.spatial);
        }
        baseline::debias(&mut self.work, baseline * cfg.baseline_strength);

        // 4. Weighting
        let frame_peak = weighting::apply(&mut self.work, &self.tuning.gains, cfg.display_threshold);

        // 5. AGC
        let desired = agc::desired_gain(frame_peak, cfg);
        self.agc_gain = agc::step(self.agc_gain, desired, cfg);
        agc::level(&mut self.work, self.agc_gain);

        // 6. Accent & quantizer
        let level = self
            .accent
            .advance(beat, cfg.beat_boost_enabled, cfg.beat_boost, cfg.release);
        accent::apply(&mut self.work, level);
        accent::quantize(&self.work, &mut self.output);

        &self.output
    }
}
