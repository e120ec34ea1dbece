/// Magnitudes as handed over by the FFT source, in increasing frequency order.
#[derive(Clone, Copy, Debug)]
pub enum SpectrumBins<'a> {
    /// Float magnitudes in decibels
    Decibels(&'a [f32]),
    /// Float magnitudes already normalized to 0.0-1.0
    Normalized(&'a [f32]),
    /// Byte magnitudes, 0-255 mapping to 0.0-1.0
    Bytes(&'a [u8]),
}

impl SpectrumBins<'_> {
    pub fn len(&self) -> usize {
        match self {
            SpectrumBins::Decibels(b) | SpectrumBins::Normalized(b) => b.len(),
            SpectrumBins::Bytes(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Level of bin `idx` in 0.0-1.0. Decibels are mapped through the
    /// `[min_db, max_db]` window; non-finite values read as silence.
    pub fn level(&self, idx: usize, min_db: f32, max_db: f32) -> f32 {
        let level = match self {
            SpectrumBins::Decibels(b) => {
                let span = (max_db - min_db).max(f32::EPSILON);
                (b[idx] - min_db) / span
            }
            SpectrumBins::Normalized(b) => b[idx],
            SpectrumBins::Bytes(b) => b[idx] as f32 / 255.0,
        };
        if level.is_finite() {
            level.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// One frame of FFT output. Borrowed from the caller for the duration of a call.
#[derive(Clone, Copy, Debug)]
pub struct SpectrumFrame<'a> {
    pub bins: SpectrumBins<'a>,
    pub sample_rate: f32,
}

impl<'a> SpectrumFrame<'a> {
    pub fn decibels(bins: &'a [f32], sample_rate: f32) -> Self {
        Self { bins: SpectrumBins::Decibels(bins), sample_rate }
    }

    pub fn normalized(bins: &'a [f32], sample_rate: f32) -> Self {
        Self { bins: SpectrumBins::Normalized(bins), sample_rate }
    }

    pub fn bytes(bins: &'a [u8], sample_rate: f32) -> Self {
        Self { bins: SpectrumBins::Bytes(bins), sample_rate }
    }

    pub fn is_float_db(&self) -> bool {
        matches!(self.bins, SpectrumBins::Decibels(_))
    }

    pub fn nyquist(&self) -> f32 {
        self.sample_rate * 0.5
    }

    /// False when the source has gone away: no bins or a bogus sample rate.
    pub fn is_usable(&self) -> bool {
        !self.bins.is_empty() && self.sample_rate.is_finite() && self.sample_rate > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decibels_map_through_window() {
        let db = [-90.0, -57.5, -25.0, 0.0, -200.0];
        let bins = SpectrumBins::Decibels(&db);
        assert_eq!(bins.level(0, -90.0, -25.0), 0.0);
        assert!((bins.level(1, -90.0, -25.0) - 0.5).abs() < 1e-6);
        assert_eq!(bins.level(2, -90.0, -25.0), 1.0);
        assert_eq!(bins.level(3, -90.0, -25.0), 1.0);
        assert_eq!(bins.level(4, -90.0, -25.0), 0.0);
    }

    #[test]
    fn non_finite_reads_as_silence() {
        let db = [f32::NEG_INFINITY, f32::NAN, f32::INFINITY];
        let bins = SpectrumBins::Decibels(&db);
        for i in 0..3 {
            assert_eq!(bins.level(i, -90.0, -25.0), 0.0);
        }
    }

    #[test]
    fn degenerate_window_does_not_divide_by_zero() {
        let db = [-30.0];
        let level = SpectrumBins::Decibels(&db).level(0, -30.0, -30.0);
        assert!(level.is_finite());
    }

    #[test]
    fn bytes_normalize() {
        let bytes = [0u8, 255, 51];
        let frame = SpectrumFrame::bytes(&bytes, 44100.0);
        assert!(!frame.is_float_db());
        assert_eq!(frame.bins.level(1, -90.0, -25.0), 1.0);
        assert!((frame.bins.level(2, -90.0, -25.0) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn usability() {
        let bins = [0.5f32; 4];
        assert!(SpectrumFrame::normalized(&bins, 48000.0).is_usable());
        assert!(!SpectrumFrame::normalized(&bins, 0.0).is_usable());
        assert!(!SpectrumFrame::normalized(&bins, f32::NAN).is_usable());
        assert!(!SpectrumFrame::normalized(&[], 48000.0).is_usable());
    }
}
