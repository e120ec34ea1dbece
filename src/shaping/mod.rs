//! Spectrum shaping: raw FFT magnitudes in, a stable 0-255 display texture out.
//!
//! The pipeline runs six stages per frame, strictly forward:
//! resample, envelope, baseline, weighting, AGC, accent + quantize.
//! All memory between frames lives in [`ShapingState`].

pub mod accent;
pub mod agc;
pub mod baseline;
pub mod envelope;
pub mod frame;
pub mod inbox;
pub mod params;
pub mod preset;
pub mod resample;
pub mod state;
pub mod weighting;

pub use frame::{SpectrumBins, SpectrumFrame};
pub use inbox::{config_channel, ConfigInbox, ConfigSender};
pub use params::{ShapingConfig, SpatialKernel, WeightingMode};
pub use preset::{Preset, PresetError};
pub use state::{Phase, ShapingState};

/// Advance `state` by one frame. See [`ShapingState::shape`].
pub fn shape<'s>(
    frame: &SpectrumFrame<'_>,
    config: &ShapingConfig,
    state: &'s mut ShapingState,
    beat_this_frame: bool,
) -> &'s [u8] {
    state.shape(frame, config, beat_this_frame)
}
