//! Demo FFT source: decode a file and turn it into per-frame dB spectra with beat flags.

pub mod analysis;
pub mod decode;
pub mod features;
