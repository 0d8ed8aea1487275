//! Audio interaction: tone playback, metronome and microphone recording.
//!
//! Everything platform-specific sits behind [`AudioHost`]; [`CpalHost`] is the
//! real implementation and tests substitute an in-memory host.

pub mod cpal_host;
pub mod devices;
pub mod error;
pub mod host;
pub mod metronome;
pub mod pitch;
pub mod recording;
pub mod tone;

#[cfg(test)]
pub mod stub;

pub use cpal_host::CpalHost;
pub use error::AudioError;
pub use host::{AudioHost, PlaybackHandle};
pub use metronome::{MetronomeScheduler, MetronomeState, Tempo};
pub use pitch::{PitchDetector, PitchReading};
pub use recording::{Clip, RecordingPhase, RecordingSession};
pub use tone::ToneEmitter;
