//! Platform capability seam for audio output and microphone capture.
//!
//! The audio module never talks to a sound backend directly. It asks an
//! [`AudioHost`] for short-lived tone graphs, microphone streams and playable
//! clip handles, so tests and headless environments can supply their own host.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use super::error::AudioError;
use super::tone::Tone;

/// Receives captured mono PCM chunks in arrival order.
pub type ChunkSink = Box<dyn FnMut(Vec<i16>) + Send>;

/// Pending microphone acquisition.
pub type MicrophoneRequest =
    Pin<Box<dyn Future<Output = Result<Box<dyn MediaStream>, AudioError>> + Send>>;

/// Access to the host platform's audio capabilities.
pub trait AudioHost: Send + Sync {
    /// Opens a tone graph on the output device, or `None` when there is no
    /// output capability at all.
    fn create_tone_context(&self) -> Option<Box<dyn ToneContext>>;

    /// Requests exclusive access to the microphone.
    fn request_microphone(&self) -> MicrophoneRequest;

    /// Registers encoded clip bytes and returns a handle that can be played.
    fn create_playable_handle(&self, wav_bytes: &[u8]) -> Result<PlaybackHandle, AudioError>;

    /// Releases a handle returned by [`AudioHost::create_playable_handle`].
    fn revoke(&self, handle: PlaybackHandle);
}

/// A single-use oscillator → gain graph.
pub trait ToneContext: Send {
    /// Starts the tone immediately. The graph stops and releases itself once
    /// the envelope has finished.
    fn start(self: Box<Self>, tone: Tone) -> Result<(), AudioError>;
}

/// An open microphone stream.
///
/// Dropping the stream must release the device just like [`MediaStream::stop_tracks`].
pub trait MediaStream: Send {
    /// Sample rate of the delivered chunks.
    fn sample_rate(&self) -> u32;

    /// Begins delivering mono chunks to `sink`.
    fn deliver_to(&mut self, sink: ChunkSink) -> Result<(), AudioError>;

    /// Stops every track and frees the hardware device. Idempotent.
    fn stop_tracks(&mut self);
}

/// Handle to a finalized clip that a player can open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackHandle {
    pub id: u64,
    pub path: PathBuf,
}
