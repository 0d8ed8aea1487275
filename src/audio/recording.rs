//! Microphone recording session.
//!
//! A session moves through `Idle → Recording → Stopped(clip)` and owns at
//! most one capture stream at a time. Stopping releases the hardware device
//! before the clip is finalized; starting again discards the previous clip
//! and revokes its playback handle first.

use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use hound::{SampleFormat, WavSpec, WavWriter};

use super::error::AudioError;
use super::host::{AudioHost, MediaStream, PlaybackHandle};

/// Finalized mono 16-bit capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clip {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl Clip {
    /// Joins captured chunks in arrival order.
    pub fn from_chunks(chunks: Vec<Vec<i16>>, sample_rate: u32) -> Self {
        let total = chunks.iter().map(Vec::len).sum();
        let mut samples = Vec::with_capacity(total);
        for chunk in chunks {
            samples.extend(chunk);
        }
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }

    fn wav_spec(&self) -> WavSpec {
        WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        }
    }

    /// Encodes the clip as an in-memory PCM WAV file.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>, AudioError> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, self.wav_spec())?;
            for &sample in &self.samples {
                writer.write_sample(sample)?;
            }
            writer.finalize()?;
        }
        Ok(cursor.into_inner())
    }

    /// Writes the clip to `path` as a PCM WAV file.
    pub fn save_wav(&self, path: &Path) -> Result<(), AudioError> {
        let mut writer = WavWriter::create(path, self.wav_spec())?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        tracing::debug!("Clip written to {}", path.display());
        Ok(())
    }
}

/// Buffers chunks from one microphone stream.
pub struct Recorder {
    stream: Box<dyn MediaStream>,
    chunks: Arc<Mutex<Vec<Vec<i16>>>>,
}

impl Recorder {
    pub fn new(stream: Box<dyn MediaStream>) -> Self {
        Self {
            stream,
            chunks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Starts buffering chunks as the stream delivers them.
    pub fn start(&mut self) -> Result<(), AudioError> {
        let chunks = Arc::clone(&self.chunks);
        self.stream.deliver_to(Box::new(move |chunk| {
            lock(&chunks).push(chunk);
        }))
    }

    pub fn sample_rate(&self) -> u32 {
        self.stream.sample_rate()
    }

    /// Returns up to `max` of the most recently captured samples.
    pub fn recent_samples(&self, max: usize) -> Vec<i16> {
        let chunks = lock(&self.chunks);
        let mut tail: Vec<i16> = Vec::with_capacity(max);
        for chunk in chunks.iter().rev() {
            let remaining = max - tail.len();
            if remaining == 0 {
                break;
            }
            let start = chunk.len().saturating_sub(remaining);
            tail.splice(0..0, chunk[start..].iter().copied());
        }
        tail
    }

    /// Stops every track and joins the buffered chunks into a clip.
    pub fn finish(mut self) -> Clip {
        self.stream.stop_tracks();
        let chunks = std::mem::take(&mut *lock(&self.chunks));
        Clip::from_chunks(chunks, self.stream.sample_rate())
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.stream.stop_tracks();
    }
}

/// A finalized clip together with its playable handle.
#[derive(Debug)]
pub struct ClipHandle {
    pub clip: Clip,
    pub url: PlaybackHandle,
}

/// Observable phase of a [`RecordingSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingPhase {
    Idle,
    Recording,
    Stopped,
}

enum RecordingState {
    Idle,
    Recording(Recorder),
    Stopped(ClipHandle),
}

/// Record/playback flow over the injected [`AudioHost`].
pub struct RecordingSession {
    host: Arc<dyn AudioHost>,
    state: RecordingState,
}

impl RecordingSession {
    pub fn new(host: Arc<dyn AudioHost>) -> Self {
        Self {
            host,
            state: RecordingState::Idle,
        }
    }

    pub fn phase(&self) -> RecordingPhase {
        match self.state {
            RecordingState::Idle => RecordingPhase::Idle,
            RecordingState::Recording(_) => RecordingPhase::Recording,
            RecordingState::Stopped(_) => RecordingPhase::Stopped,
        }
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, RecordingState::Recording(_))
    }

    /// The most recent finished clip, if any.
    pub fn clip(&self) -> Option<&ClipHandle> {
        match &self.state {
            RecordingState::Stopped(handle) => Some(handle),
            _ => None,
        }
    }

    /// Live view of the capture for meters: recent samples and their rate.
    pub fn live_samples(&self, max: usize) -> Option<(Vec<i16>, u32)> {
        match &self.state {
            RecordingState::Recording(recorder) => {
                Some((recorder.recent_samples(max), recorder.sample_rate()))
            }
            _ => None,
        }
    }

    /// Acquires the microphone and begins capturing.
    ///
    /// Does nothing when a recording is already running. On failure the session
    /// is left idle with no stream open, so the caller may retry.
    pub async fn start(&mut self) -> Result<(), AudioError> {
        if self.is_recording() {
            tracing::debug!("Recording already in progress, ignoring start");
            return Ok(());
        }

        self.discard_clip();

        let stream = match self.host.request_microphone().await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!("Microphone acquisition failed: {}", e);
                return Err(e);
            }
        };

        let mut recorder = Recorder::new(stream);
        recorder.start()?;
        tracing::info!("Recording started at {}Hz", recorder.sample_rate());
        self.state = RecordingState::Recording(recorder);
        Ok(())
    }

    /// Stops capturing and finalizes the clip.
    ///
    /// # Errors
    /// - [`AudioError::NotRecording`] when no recording is running
    /// - if the clip cannot be encoded or registered for playback
    pub fn stop(&mut self) -> Result<&ClipHandle, AudioError> {
        let recorder = match std::mem::replace(&mut self.state, RecordingState::Idle) {
            RecordingState::Recording(recorder) => recorder,
            other => {
                self.state = other;
                return Err(AudioError::NotRecording);
            }
        };

        let clip = recorder.finish();
        tracing::info!(
            "Recording stopped: {:.2}s ({} samples at {}Hz)",
            clip.duration().as_secs_f32(),
            clip.samples().len(),
            clip.sample_rate()
        );

        let bytes = clip.to_wav_bytes()?;
        let url = self.host.create_playable_handle(&bytes)?;
        self.state = RecordingState::Stopped(ClipHandle { clip, url });

        match &self.state {
            RecordingState::Stopped(handle) => Ok(handle),
            _ => unreachable!("state was just set to Stopped"),
        }
    }

    /// Releases the stream and any clip, returning to idle.
    pub fn discard(&mut self) {
        match std::mem::replace(&mut self.state, RecordingState::Idle) {
            RecordingState::Recording(recorder) => {
                drop(recorder);
                tracing::debug!("Recording discarded");
            }
            RecordingState::Stopped(handle) => {
                self.host.revoke(handle.url);
            }
            RecordingState::Idle => {}
        }
    }

    fn discard_clip(&mut self) {
        if matches!(self.state, RecordingState::Stopped(_)) {
            tracing::debug!("Discarding previous clip");
            self.discard();
        }
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        self.discard();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
