//! Sine tone synthesis and the best-effort tone emitter.
//!
//! A tone is a single sine oscillator shaped by an exponential gain ramp, the
//! same curve a Web Audio `exponentialRampToValueAtTime` produces. Notes use a
//! one second fade to an inaudible floor; metronome clicks use a much shorter
//! envelope at a fixed pitch.

use std::f32::consts::TAU;
use std::sync::Arc;
use std::time::Duration;

use super::host::AudioHost;

/// Frequency of a metronome click in Hz.
pub const CLICK_FREQUENCY_HZ: f32 = 880.0;

/// Exponential gain ramp from `peak` down to `floor` over `duration`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub peak: f32,
    pub floor: f32,
    pub duration: Duration,
}

impl Envelope {
    /// One second fade used for solfège notes and voice samples.
    pub const NOTE: Envelope = Envelope {
        peak: 1.0,
        floor: 0.0001,
        duration: Duration::from_secs(1),
    };

    /// Fast 100 ms decay used for metronome clicks.
    pub const CLICK: Envelope = Envelope {
        peak: 1.0,
        floor: 0.001,
        duration: Duration::from_millis(100),
    };

    /// Gain at `t` seconds after the tone started.
    ///
    /// Follows `peak * (floor / peak) ^ (t / duration)` and holds `floor` once
    /// the ramp has finished.
    pub fn gain_at(&self, t: f32) -> f32 {
        let length = self.duration.as_secs_f32();
        if t <= 0.0 {
            return self.peak;
        }
        if t >= length {
            return self.floor;
        }
        self.peak * (self.floor / self.peak).powf(t / length)
    }

    /// Scales peak and floor together so the ramp shape is preserved.
    pub fn scaled(self, gain: f32) -> Envelope {
        let gain = gain.clamp(0.0, 1.0).max(f32::EPSILON);
        Envelope {
            peak: self.peak * gain,
            floor: self.floor * gain,
            duration: self.duration,
        }
    }
}

/// A single synthesized sine note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub envelope: Envelope,
}

impl Tone {
    pub fn note(frequency_hz: f32) -> Self {
        Self {
            frequency_hz,
            envelope: Envelope::NOTE,
        }
    }

    pub fn click() -> Self {
        Self {
            frequency_hz: CLICK_FREQUENCY_HZ,
            envelope: Envelope::CLICK,
        }
    }

    /// How long the oscillator runs before it is stopped.
    pub fn duration(&self) -> Duration {
        self.envelope.duration
    }

    fn with_gain(mut self, gain: f32) -> Self {
        self.envelope = self.envelope.scaled(gain);
        self
    }
}

/// Sample generator for one tone at a fixed output rate.
///
/// Yields mono samples in `[-1.0, 1.0]` and ends once the envelope has run its
/// course, which is when the oscillator is considered stopped.
pub struct ToneVoice {
    tone: Tone,
    sample_rate: f32,
    index: u64,
    total: u64,
    phase: f32,
}

impl ToneVoice {
    pub fn new(tone: Tone, sample_rate: u32) -> Self {
        let total = (tone.duration().as_secs_f64() * sample_rate as f64).round() as u64;
        Self {
            tone,
            sample_rate: sample_rate as f32,
            index: 0,
            total,
            phase: 0.0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.total
    }

    pub fn next_sample(&mut self) -> Option<f32> {
        if self.is_finished() {
            return None;
        }
        let t = self.index as f32 / self.sample_rate;
        let sample = self.phase.sin() * self.tone.envelope.gain_at(t);

        self.phase += TAU * self.tone.frequency_hz / self.sample_rate;
        if self.phase >= TAU {
            self.phase -= TAU;
        }
        self.index += 1;
        Some(sample)
    }
}

impl Iterator for ToneVoice {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        self.next_sample()
    }
}

/// Fire-and-forget tone playback.
///
/// Every call opens its own short-lived graph through the injected host, so
/// rapid repeated presses overlap instead of queueing. Nothing here ever fails
/// the caller: a missing output device or a broken stream is only logged.
#[derive(Clone)]
pub struct ToneEmitter {
    host: Arc<dyn AudioHost>,
    gain: f32,
}

impl ToneEmitter {
    pub fn new(host: Arc<dyn AudioHost>, gain: f32) -> Self {
        Self {
            host,
            gain: gain.clamp(0.0, 1.0),
        }
    }

    /// Plays a one second note at `frequency_hz`.
    pub fn play(&self, frequency_hz: f32) {
        if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
            tracing::warn!("Ignoring tone request with invalid frequency {}", frequency_hz);
            return;
        }
        self.emit(Tone::note(frequency_hz));
    }

    /// Plays a single metronome click.
    pub fn click(&self) {
        self.emit(Tone::click());
    }

    fn emit(&self, tone: Tone) {
        let Some(context) = self.host.create_tone_context() else {
            tracing::debug!("No audio output available, skipping {:.2}Hz tone", tone.frequency_hz);
            return;
        };

        if let Err(e) = context.start(tone.with_gain(self.gain)) {
            tracing::debug!("Tone playback failed: {}", e);
        }
    }
}
