//! Dominant pitch estimation for the studio readout.
//!
//! Runs an FFT over the most recent samples and reports the strongest
//! frequency in the singing range, along with the nearest solfège note.

use rustfft::{num_complex::Complex, FftPlanner};

use crate::curriculum::content::{Note, NOTES};

/// Number of samples analysed per estimate.
pub const WINDOW_SIZE: usize = 4096;

const MIN_FREQUENCY_HZ: f32 = 80.0;
const MAX_FREQUENCY_HZ: f32 = 1100.0;

/// RMS level below which the input is treated as silence.
const NOISE_GATE_RMS: f32 = 0.01;

/// Estimated pitch of the captured voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchReading {
    pub frequency_hz: f32,
    pub note: &'static Note,
    /// Deviation from `note` in cents, negative when flat.
    pub cents: f32,
}

/// Stateful pitch detector with a reusable FFT planner.
pub struct PitchDetector {
    fft_planner: FftPlanner<f32>,
}

impl PitchDetector {
    pub fn new() -> Self {
        Self {
            fft_planner: FftPlanner::new(),
        }
    }

    /// Estimates the pitch of the latest [`WINDOW_SIZE`] samples.
    ///
    /// Returns `None` for silence or when nothing rises out of the voice range.
    pub fn detect(&mut self, samples: &[i16], sample_rate: u32) -> Option<PitchReading> {
        let frequency_hz = dominant_frequency(samples, sample_rate, &mut self.fft_planner)?;
        let (note, cents) = nearest_note(frequency_hz);
        Some(PitchReading {
            frequency_hz,
            note,
            cents,
        })
    }
}

impl Default for PitchDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Finds the strongest frequency between 80 and 1100 Hz.
pub fn dominant_frequency(
    samples: &[i16],
    sample_rate: u32,
    fft_planner: &mut FftPlanner<f32>,
) -> Option<f32> {
    if samples.is_empty() || sample_rate == 0 {
        return None;
    }

    let sample_count = samples.len().min(WINDOW_SIZE);
    let recent_samples = &samples[samples.len() - sample_count..];

    let rms = (recent_samples
        .iter()
        .map(|&s| {
            let v = s as f32 / 32768.0;
            v * v
        })
        .sum::<f32>()
        / sample_count as f32)
        .sqrt();
    if rms < NOISE_GATE_RMS {
        return None;
    }

    // Hann window to reduce spectral leakage
    let mut buffer: Vec<Complex<f32>> = recent_samples
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let window = 0.5
                * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / sample_count as f32).cos());
            Complex::new(s as f32 * window / 32768.0, 0.0)
        })
        .collect();
    buffer.resize(WINDOW_SIZE, Complex::new(0.0, 0.0));

    let fft = fft_planner.plan_fft_forward(WINDOW_SIZE);
    fft.process(&mut buffer);

    let resolution = sample_rate as f32 / WINDOW_SIZE as f32;
    let min_bin = ((MIN_FREQUENCY_HZ / resolution).ceil() as usize).max(1);
    let max_bin = ((MAX_FREQUENCY_HZ / resolution) as usize).min(WINDOW_SIZE / 2 - 1);
    if min_bin >= max_bin {
        return None;
    }

    let (peak_bin, _) = (min_bin..=max_bin)
        .map(|bin| (bin, buffer[bin].norm()))
        .max_by(|a, b| a.1.total_cmp(&b.1))?;

    // Parabolic interpolation between neighbouring bins
    let left = buffer[peak_bin - 1].norm();
    let centre = buffer[peak_bin].norm();
    let right = buffer[peak_bin + 1].norm();
    let denominator = left - 2.0 * centre + right;
    let offset = if denominator.abs() > f32::EPSILON {
        (0.5 * (left - right) / denominator).clamp(-0.5, 0.5)
    } else {
        0.0
    };

    Some((peak_bin as f32 + offset) * resolution)
}

/// Maps a frequency to the closest note of the solfège table.
///
/// Octaves outside the table fold onto it, so a bass singing C3 still reads
/// as `DO`.
pub fn nearest_note(frequency_hz: f32) -> (&'static Note, f32) {
    let mut best = (&NOTES[0], f32::MAX);
    for note in NOTES.iter() {
        let raw = 1200.0 * (frequency_hz / note.frequency_hz).log2();
        let folded = raw - 1200.0 * (raw / 1200.0).round();
        if folded.abs() < best.1.abs() {
            best = (note, folded);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(frequency: f32, sample_rate: u32, len: usize, amplitude: f32) -> Vec<i16> {
        (0..len)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                ((2.0 * std::f32::consts::PI * frequency * t).sin() * amplitude * 32767.0) as i16
            })
            .collect()
    }

    #[test]
    fn test_detects_concert_a() {
        let mut detector = PitchDetector::new();
        let reading = detector.detect(&sine(440.0, 16000, 8000, 0.5), 16000).unwrap();
        assert!((reading.frequency_hz - 440.0).abs() < 4.0);
        assert_eq!(reading.note.name, "LA");
        assert!(reading.cents.abs() < 20.0);
    }

    #[test]
    fn test_silence_has_no_pitch() {
        let mut detector = PitchDetector::new();
        assert!(detector.detect(&[0; 4096], 16000).is_none());
        assert!(detector.detect(&sine(440.0, 16000, 4096, 0.001), 16000).is_none());
        assert!(detector.detect(&[], 16000).is_none());
    }

    #[test]
    fn test_nearest_note_folds_octaves() {
        let (note, cents) = nearest_note(130.81);
        assert_eq!(note.name, "DO");
        assert!(cents.abs() < 1.0);

        let (note, cents) = nearest_note(392.0);
        assert_eq!(note.name, "SOL");
        assert!(cents.abs() < 0.1);
    }

    #[test]
    fn test_nearest_note_reports_flat_and_sharp() {
        let (note, cents) = nearest_note(435.0);
        assert_eq!(note.name, "LA");
        assert!(cents < -10.0);

        let (_, cents) = nearest_note(445.0);
        assert!(cents > 10.0);
    }
}
