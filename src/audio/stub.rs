//! In-memory [`AudioHost`] for tests.
//!
//! Records every tone start, microphone request and handle revocation so
//! tests can assert on resource usage without a sound card.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::error::AudioError;
use super::host::{AudioHost, ChunkSink, MediaStream, MicrophoneRequest, PlaybackHandle, ToneContext};
use super::tone::Tone;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubMicrophone {
    Granted,
    Denied,
    Absent,
}

#[derive(Default)]
struct Ledger {
    tones: Mutex<Vec<Tone>>,
    events: Mutex<Vec<String>>,
    revoked: Mutex<Vec<PlaybackHandle>>,
    microphone_requests: AtomicUsize,
    open_streams: AtomicUsize,
    next_handle: AtomicU64,
}

impl Ledger {
    fn event(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }
}

pub struct StubHost {
    output: bool,
    failing_output: bool,
    microphone: Mutex<StubMicrophone>,
    chunks: Vec<Vec<i16>>,
    ledger: Arc<Ledger>,
}

impl StubHost {
    pub const SAMPLE_RATE: u32 = 16000;

    pub fn new() -> Self {
        Self {
            output: true,
            failing_output: false,
            microphone: Mutex::new(StubMicrophone::Granted),
            chunks: vec![vec![0; 160], vec![1; 160]],
            ledger: Arc::new(Ledger::default()),
        }
    }

    pub fn without_output() -> Self {
        Self {
            output: false,
            ..Self::new()
        }
    }

    pub fn with_failing_output(mut self) -> Self {
        self.failing_output = true;
        self
    }

    pub fn with_chunks(mut self, chunks: Vec<Vec<i16>>) -> Self {
        self.chunks = chunks;
        self
    }

    pub fn set_microphone(&self, microphone: StubMicrophone) {
        *self.microphone.lock().unwrap() = microphone;
    }

    pub fn tones(&self) -> Vec<Tone> {
        self.ledger.tones.lock().unwrap().clone()
    }

    pub fn tones_started(&self) -> usize {
        self.ledger.tones.lock().unwrap().len()
    }

    pub fn events(&self) -> Vec<String> {
        self.ledger.events.lock().unwrap().clone()
    }

    pub fn microphone_requests(&self) -> usize {
        self.ledger.microphone_requests.load(Ordering::SeqCst)
    }

    pub fn open_streams(&self) -> usize {
        self.ledger.open_streams.load(Ordering::SeqCst)
    }

    pub fn handles_created(&self) -> usize {
        self.ledger.next_handle.load(Ordering::SeqCst) as usize
    }

    pub fn revoked(&self) -> Vec<PlaybackHandle> {
        self.ledger.revoked.lock().unwrap().clone()
    }

    pub fn revoked_count(&self) -> usize {
        self.ledger.revoked.lock().unwrap().len()
    }
}

impl AudioHost for StubHost {
    fn create_tone_context(&self) -> Option<Box<dyn ToneContext>> {
        if !self.output {
            return None;
        }
        Some(Box::new(StubToneContext {
            failing: self.failing_output,
            ledger: Arc::clone(&self.ledger),
        }))
    }

    fn request_microphone(&self) -> MicrophoneRequest {
        self.ledger.microphone_requests.fetch_add(1, Ordering::SeqCst);
        self.ledger.event("request");

        let microphone = *self.microphone.lock().unwrap();
        let chunks = self.chunks.clone();
        let ledger = Arc::clone(&self.ledger);

        Box::pin(async move {
            match microphone {
                StubMicrophone::Denied => Err(AudioError::PermissionDenied("stub denied".into())),
                StubMicrophone::Absent => Err(AudioError::DeviceAbsent("stub has no input".into())),
                StubMicrophone::Granted => {
                    ledger.open_streams.fetch_add(1, Ordering::SeqCst);
                    Ok(Box::new(StubStream {
                        chunks,
                        stopped: AtomicBool::new(false),
                        ledger,
                    }) as Box<dyn MediaStream>)
                }
            }
        })
    }

    fn create_playable_handle(&self, wav_bytes: &[u8]) -> Result<PlaybackHandle, AudioError> {
        assert!(!wav_bytes.is_empty());
        let id = self.ledger.next_handle.fetch_add(1, Ordering::SeqCst) + 1;
        self.ledger.event(format!("handle:{id}"));
        Ok(PlaybackHandle {
            id,
            path: format!("stub-clip-{id}.wav").into(),
        })
    }

    fn revoke(&self, handle: PlaybackHandle) {
        self.ledger.event(format!("revoke:{}", handle.id));
        self.ledger.revoked.lock().unwrap().push(handle);
    }
}

struct StubToneContext {
    failing: bool,
    ledger: Arc<Ledger>,
}

impl ToneContext for StubToneContext {
    fn start(self: Box<Self>, tone: Tone) -> Result<(), AudioError> {
        if self.failing {
            return Err(AudioError::AudioUnavailable);
        }
        self.ledger.tones.lock().unwrap().push(tone);
        Ok(())
    }
}

struct StubStream {
    chunks: Vec<Vec<i16>>,
    stopped: AtomicBool,
    ledger: Arc<Ledger>,
}

impl MediaStream for StubStream {
    fn sample_rate(&self) -> u32 {
        StubHost::SAMPLE_RATE
    }

    fn deliver_to(&mut self, mut sink: ChunkSink) -> Result<(), AudioError> {
        for chunk in self.chunks.drain(..) {
            sink(chunk);
        }
        Ok(())
    }

    fn stop_tracks(&mut self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            self.ledger.open_streams.fetch_sub(1, Ordering::SeqCst);
            self.ledger.event("stop-tracks");
        }
    }
}

impl Drop for StubStream {
    fn drop(&mut self) {
        self.stop_tracks();
    }
}
