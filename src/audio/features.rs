use crate::shaping::SpectrumFrame;

/// One analyser snapshot, as an FFT source would hand it over per frame.
#[derive(Clone, Debug)]
pub struct SpectrumSnapshot {
    /// Time in seconds
    pub time: f32,
    /// Smoothed magnitudes in dB (FFT_SIZE/2 bins, 0..Nyquist)
    pub decibels: Vec<f32>,
    /// Positive spectral flux against the previous snapshot
    pub flux: f32,
    /// Did the beat detector fire on this frame?
    pub is_beat: bool,
}

impl SpectrumSnapshot {
    pub fn as_frame(&self, sample_rate: u32) -> SpectrumFrame<'_> {
        SpectrumFrame::decibels(&self.decibels, sample_rate as f32)
    }
}

/// A whole track turned into per-frame spectra.
#[derive(Clone, Debug)]
pub struct AnalyzedTrack {
    pub sample_rate: u32,
    pub frames: Vec<SpectrumSnapshot>,
}

impl AnalyzedTrack {
    pub fn beat_count(&self) -> usize {
        self.frames.iter().filter(|f| f.is_beat).count()
    }
}
