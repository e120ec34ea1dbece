use anyhow::Result;
use rayon::prelude::*;
use rustfft::{num_complex::Complex, FftPlanner};

use super::decode::AudioData;
use super::features::{AnalyzedTrack, SpectrumSnapshot};

pub const FFT_SIZE: usize = 2048;

/// Floor for dB conversion so silence stays finite.
const MIN_MAGNITUDE: f32 = 1e-12;

/// Minimum gap between two detected beats, in seconds.
const MIN_BEAT_GAP: f32 = 0.1;

pub fn analyze(audio: &AudioData, fps: u32, analyser_smoothing: f32) -> Result<AnalyzedTrack> {
    if fps == 0 {
        anyhow::bail!("fps must be positive");
    }
    let samples = &audio.samples;
    let sr = audio.sample_rate;
    let duration = samples.len() as f32 / sr as f32;
    let total_frames = (duration * fps as f32).ceil() as usize;

    log::info!("Pass 1: Per-frame FFT ({} frames)...", total_frames);
    let magnitudes = pass1_magnitudes(samples, sr, fps, total_frames);

    log::info!(
        "Pass 2: Analyser smoothing & beats (smoothing={:.2})...",
        analyser_smoothing
    );
    let mut frames = pass2_snapshots(&magnitudes, fps, analyser_smoothing);

    let flux: Vec<(f32, f32)> = frames.iter().map(|f| (f.time, f.flux)).collect();
    let beat_times = detect_beats(&flux);
    for &bt in &beat_times {
        let idx = (bt * fps as f32).round() as usize;
        if let Some(frame) = frames.get_mut(idx) {
            frame.is_beat = true;
        }
    }

    log::info!(
        "Analysis: {} frames, {} bins, beats={}",
        frames.len(),
        FFT_SIZE / 2,
        beat_times.len()
    );

    Ok(AnalyzedTrack {
        sample_rate: sr,
        frames,
    })
}

/// Linear magnitudes per video frame, windowed around the frame's centre.
/// Scaled by 1/FFT_SIZE, the analyser-node convention.
fn pass1_magnitudes(samples: &[f32], sample_rate: u32, fps: u32, total_frames: usize) -> Vec<Vec<f32>> {
    let samples_per_frame = sample_rate as f32 / fps as f32;
    let hann = hann_window(FFT_SIZE);
    let fft = FftPlanner::<f32>::new().plan_fft_forward(FFT_SIZE);
    let half = FFT_SIZE / 2;
    let scale = 1.0 / FFT_SIZE as f32;

    (0..total_frames)
        .into_par_iter()
        .map(|frame_idx| {
            let center = (frame_idx as f32 * samples_per_frame) as usize;
            let start = center.saturating_sub(FFT_SIZE / 2).min(samples.len());
            let end = (start + FFT_SIZE).min(samples.len());

            let mut buffer: Vec<Complex<f32>> = vec![Complex::new(0.0, 0.0); FFT_SIZE];
            for i in 0..(end - start) {
                buffer[i] = Complex::new(samples[start + i] * hann[i], 0.0);
            }
            fft.process(&mut buffer);

            buffer[..half].iter().map(|c| c.norm() * scale).collect()
        })
        .collect()
}

/// Blend each frame with the previous one (`s * prev + (1 - s) * cur`) in the
/// linear domain, then convert to dB. Flux is taken on the unsmoothed data so
/// the beat detector keeps its transients.
fn pass2_snapshots(magnitudes: &[Vec<f32>], fps: u32, smoothing: f32) -> Vec<SpectrumSnapshot> {
    let s = smoothing.clamp(0.0, 1.0);
    let mut smoothed: Vec<f32> = Vec::new();
    let mut snapshots = Vec::with_capacity(magnitudes.len());

    for (i, current) in magnitudes.iter().enumerate() {
        if smoothed.len() != current.len() {
            smoothed = current.clone();
        } else {
            for (prev, &cur) in smoothed.iter_mut().zip(current) {
                *prev = s * *prev + (1.0 - s) * cur;
            }
        }

        let flux = match i.checked_sub(1).map(|p| &magnitudes[p]) {
            Some(prev) => spectral_flux(current, prev),
            None => 0.0,
        };

        snapshots.push(SpectrumSnapshot {
            time: i as f32 / fps as f32,
            decibels: smoothed.iter().map(|&m| to_decibels(m)).collect(),
            flux,
            is_beat: false,
        });
    }

    snapshots
}

#[inline]
pub fn to_decibels(magnitude: f32) -> f32 {
    20.0 * magnitude.max(MIN_MAGNITUDE).log10()
}

fn spectral_flux(current: &[f32], previous: &[f32]) -> f32 {
    current
        .iter()
        .zip(previous)
        .map(|(cur, prev)| (cur - prev).max(0.0))
        .sum()
}

/// Local-mean adaptive threshold over the flux curve; returns beat times.
fn detect_beats(flux_values: &[(f32, f32)]) -> Vec<f32> {
    if flux_values.is_empty() {
        return Vec::new();
    }

    let window = 20;
    let mut beat_times = Vec::new();

    for i in 0..flux_values.len() {
        let start = i.saturating_sub(window);
        let end = (i + window + 1).min(flux_values.len());
        let local_mean: f32 =
            flux_values[start..end].iter().map(|(_, f)| f).sum::<f32>() / (end - start) as f32;

        let threshold = local_mean * 1.5 + 0.01;

        if flux_values[i].1 > threshold {
            let is_peak = (i == 0 || flux_values[i].1 >= flux_values[i - 1].1)
                && (i == flux_values.len() - 1 || flux_values[i].1 >= flux_values[i + 1].1);

            let far_enough = beat_times
                .last()
                .map_or(true, |&last: &f32| flux_values[i].0 - last > MIN_BEAT_GAP);

            if is_peak && far_enough {
                beat_times.push(flux_values[i].0);
            }
        }
    }

    beat_times
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(hz: f32, sample_rate: u32, seconds: f32) -> AudioData {
        let n = (sample_rate as f32 * seconds) as usize;
        AudioData {
            samples: (0..n)
                .map(|i| (2.0 * std::f32::consts::PI * hz * i as f32 / sample_rate as f32).sin() * 0.5)
                .collect(),
            sample_rate,
        }
    }

    #[test]
    fn tone_peaks_in_its_bin() {
        let audio = tone(1000.0, 48000, 0.5);
        let track = analyze(&audio, 30, 0.0).unwrap();
        assert_eq!(track.frames.len(), 15);
        let frame = &track.frames[7];
        assert_eq!(frame.decibels.len(), FFT_SIZE / 2);
        let (peak_bin, _) = frame
            .decibels
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap();
        let expected = (1000.0 / (48000.0 / FFT_SIZE as f32)).round() as usize;
        assert!(peak_bin.abs_diff(expected) <= 1);
        assert!(frame.decibels.iter().all(|d| d.is_finite()));
    }

    #[test]
    fn silence_is_finite_and_low() {
        let audio = AudioData { samples: vec![0.0; 48000], sample_rate: 48000 };
        let track = analyze(&audio, 60, 0.8).unwrap();
        assert!(track.frames.iter().all(|f| f.decibels.iter().all(|&d| d.is_finite() && d < -200.0)));
        assert_eq!(track.beat_count(), 0);
    }

    #[test]
    fn smoothing_lags_an_onset() {
        let mut audio = AudioData { samples: vec![0.0; 24000], sample_rate: 48000 };
        audio.samples.extend(tone(440.0, 48000, 0.5).samples);
        let raw = analyze(&audio, 30, 0.0).unwrap();
        let smooth = analyze(&audio, 30, 0.9).unwrap();
        let bin = (440.0 / (48000.0 / FFT_SIZE as f32)).round() as usize;
        // Well after the onset the unsmoothed analyser is already loud
        let idx = 20;
        assert!(raw.frames[idx].decibels[bin] > smooth.frames[idx].decibels[bin]);
    }

    #[test]
    fn detects_periodic_flux_spikes() {
        let flux: Vec<(f32, f32)> = (0..120)
            .map(|i| (i as f32 / 30.0, if i % 15 == 0 { 5.0 } else { 0.1 }))
            .collect();
        let beats = detect_beats(&flux);
        assert_eq!(beats.len(), 8);
        assert!(beats.windows(2).all(|w| (w[1] - w[0] - 0.5).abs() < 1e-4));
    }

    #[test]
    fn beats_respect_minimum_gap() {
        let flux: Vec<(f32, f32)> = (0..60)
            .map(|i| (i as f32 / 60.0, if i % 2 == 0 { 3.0 } else { 0.0 }))
            .collect();
        let beats = detect_beats(&flux);
        assert!(beats.windows(2).all(|w| w[1] - w[0] > MIN_BEAT_GAP));
    }

    #[test]
    fn clicks_mark_beats_on_their_frames() {
        let sample_rate = 48000;
        let fps = 30;
        let mut audio = AudioData { samples: vec![0.0; 2 * sample_rate as usize], sample_rate };
        let burst = tone(1000.0, sample_rate, 0.03).samples;
        let onsets = [0.25f32, 0.75, 1.25, 1.75];
        for &onset in &onsets {
            let start = (onset * sample_rate as f32) as usize;
            audio.samples[start..start + burst.len()].copy_from_slice(&burst);
        }

        let track = analyze(&audio, fps, 0.0).unwrap();
        assert!(track.beat_count() >= 3, "beats {}", track.beat_count());
        for frame in track.frames.iter().filter(|f| f.is_beat) {
            let nearest = onsets
                .iter()
                .map(|&t| (frame.time - t).abs())
                .fold(f32::MAX, f32::min);
            assert!(nearest <= 2.0 / fps as f32, "beat at {}", frame.time);
        }
    }

    #[test]
    fn rejects_zero_fps() {
        let audio = AudioData { samples: vec![0.0; 10], sample_rate: 48000 };
        assert!(analyze(&audio, 0, 0.5).is_err());
    }
}
