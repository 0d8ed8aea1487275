//! [`AudioHost`] backed by the system sound server through cpal.
//!
//! cpal streams cannot move between threads, so every stream lives on the
//! thread that built it: each tone gets a short-lived playback thread, and a
//! microphone stream is owned by a capture worker that is driven over a
//! channel until its tracks are stopped.

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample, StreamConfig};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex, MutexGuard, OnceLock};
use std::thread;
use std::time::Duration;
use tokio::sync::oneshot;

use super::devices::{find_device, quiet_alsa, Direction};
use super::error::AudioError;
use super::host::{AudioHost, ChunkSink, MediaStream, MicrophoneRequest, PlaybackHandle, ToneContext};
use super::tone::{Tone, ToneVoice};

/// Extra time a tone stream stays open after its envelope, so the last
/// buffer drains before the stream is dropped.
const TONE_TAIL: Duration = Duration::from_millis(50);

/// Stream parameters of the output device.
#[derive(Debug, Clone)]
struct OutputFormat {
    config: StreamConfig,
    sample_format: SampleFormat,
}

/// Output device format, resolved on first use and reused for every tone.
///
/// The probe walks the ALSA device list, so it must not run per click.
#[derive(Debug, Default)]
struct OutputCache {
    slot: OnceLock<Option<OutputFormat>>,
}

impl OutputCache {
    fn resolve(
        &self,
        probe: impl FnOnce() -> Result<OutputFormat, AudioError>,
    ) -> Option<OutputFormat> {
        self.slot
            .get_or_init(|| match probe() {
                Ok(format) => {
                    tracing::debug!(
                        "Audio output: {} channel(s) at {}Hz ({})",
                        format.config.channels,
                        format.config.sample_rate.0,
                        format.sample_format
                    );
                    Some(format)
                }
                Err(e) => {
                    tracing::debug!("Audio output unavailable: {}", e);
                    None
                }
            })
            .clone()
    }
}

/// Production host using the default cpal backend.
pub struct CpalHost {
    output_device: String,
    input_device: String,
    requested_sample_rate: u32,
    clip_dir: PathBuf,
    next_handle: AtomicU64,
    output: OutputCache,
}

impl CpalHost {
    /// # Arguments
    /// * `output_device` - "default", a numeric index, or a device name
    /// * `input_device` - same forms as `output_device`, used for recording
    /// * `requested_sample_rate` - preferred capture rate; the device rate wins
    pub fn new(output_device: String, input_device: String, requested_sample_rate: u32) -> Self {
        Self {
            output_device,
            input_device,
            requested_sample_rate,
            clip_dir: std::env::temp_dir(),
            next_handle: AtomicU64::new(1),
            output: OutputCache::default(),
        }
    }

    fn probe_output(&self) -> Result<OutputFormat, AudioError> {
        let supported = quiet_alsa(|| {
            let host = cpal::default_host();
            let device = find_device(&host, Direction::Output, &self.output_device)?;
            device
                .default_output_config()
                .map_err(|e| AudioError::DeviceAbsent(e.to_string()))
        })?;
        Ok(OutputFormat {
            config: supported.config(),
            sample_format: supported.sample_format(),
        })
    }

    /// Resolves the output format now so the first tone does not pay for it.
    pub fn prime_output(&self) -> bool {
        self.output.resolve(|| self.probe_output()).is_some()
    }

    fn clip_path(&self, id: u64) -> PathBuf {
        self.clip_dir
            .join(format!("mahir-clip-{}-{}.wav", std::process::id(), id))
    }
}

impl AudioHost for CpalHost {
    fn create_tone_context(&self) -> Option<Box<dyn ToneContext>> {
        let format = self.output.resolve(|| self.probe_output())?;
        Some(Box::new(CpalToneContext {
            device_spec: self.output_device.clone(),
            config: format.config,
            sample_format: format.sample_format,
        }))
    }

    fn request_microphone(&self) -> MicrophoneRequest {
        let device_spec = self.input_device.clone();
        let requested_rate = self.requested_sample_rate;
        let (ready_tx, ready_rx) = oneshot::channel();
        let (control_tx, control_rx) = mpsc::channel();

        let spawned = thread::Builder::new()
            .name("mahir-capture".to_string())
            .spawn(move || capture_worker(&device_spec, requested_rate, ready_tx, control_rx));

        Box::pin(async move {
            let worker = match spawned {
                Ok(worker) => worker,
                Err(e) => return Err(AudioError::Io(e)),
            };
            match ready_rx.await {
                Ok(Ok(sample_rate)) => Ok(Box::new(CpalMicrophone {
                    sample_rate,
                    control: control_tx,
                    worker: Some(worker),
                }) as Box<dyn MediaStream>),
                Ok(Err(e)) => {
                    let _ = worker.join();
                    Err(e)
                }
                Err(_) => {
                    let _ = worker.join();
                    Err(AudioError::DeviceAbsent("capture worker exited".to_string()))
                }
            }
        })
    }

    fn create_playable_handle(&self, wav_bytes: &[u8]) -> Result<PlaybackHandle, AudioError> {
        let id = self.next_handle.fetch_add(1, Ordering::Relaxed);
        let path = self.clip_path(id);
        std::fs::write(&path, wav_bytes)?;
        tracing::debug!("Clip #{} available at {}", id, path.display());
        Ok(PlaybackHandle { id, path })
    }

    fn revoke(&self, handle: PlaybackHandle) {
        if let Err(e) = std::fs::remove_file(&handle.path) {
            tracing::debug!("Failed to remove clip {}: {}", handle.path.display(), e);
        } else {
            tracing::debug!("Clip #{} revoked", handle.id);
        }
    }
}

/// Output device parameters captured when the tone was requested. The device
/// itself is opened on the tone thread.
struct CpalToneContext {
    device_spec: String,
    config: StreamConfig,
    sample_format: SampleFormat,
}

impl ToneContext for CpalToneContext {
    fn start(self: Box<Self>, tone: Tone) -> Result<(), AudioError> {
        thread::Builder::new()
            .name("mahir-tone".to_string())
            .spawn(move || {
                if let Err(e) = self.play_blocking(tone) {
                    tracing::debug!("Tone at {:.2}Hz not played: {}", tone.frequency_hz, e);
                }
            })?;
        Ok(())
    }
}

impl CpalToneContext {
    fn play_blocking(&self, tone: Tone) -> Result<(), AudioError> {
        let device = quiet_alsa(|| find_device(&cpal::default_host(), Direction::Output, &self.device_spec))?;

        let stream = match self.sample_format {
            SampleFormat::F32 => build_tone_stream::<f32>(&device, &self.config, tone),
            SampleFormat::I16 => build_tone_stream::<i16>(&device, &self.config, tone),
            SampleFormat::U16 => build_tone_stream::<u16>(&device, &self.config, tone),
            SampleFormat::I32 => build_tone_stream::<i32>(&device, &self.config, tone),
            other => {
                return Err(AudioError::DeviceAbsent(format!(
                    "unsupported output sample format {other}"
                )))
            }
        }
        .map_err(|_| AudioError::AudioUnavailable)?;

        stream.play().map_err(|_| AudioError::AudioUnavailable)?;
        thread::sleep(tone.duration() + TONE_TAIL);
        drop(stream);
        Ok(())
    }
}

fn build_tone_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    tone: Tone,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let mut voice = ToneVoice::new(tone, config.sample_rate.0);

    device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            for frame in data.chunks_mut(channels) {
                let value = T::from_sample(voice.next_sample().unwrap_or(0.0));
                for sample in frame {
                    *sample = value;
                }
            }
        },
        |err| tracing::warn!("Tone stream error: {}", err),
        None,
    )
}

enum CaptureControl {
    Deliver(ChunkSink),
    Stop,
}

type SharedSink = Arc<Mutex<Option<ChunkSink>>>;

/// Microphone stream owned by a capture worker thread.
struct CpalMicrophone {
    sample_rate: u32,
    control: mpsc::Sender<CaptureControl>,
    worker: Option<thread::JoinHandle<()>>,
}

impl MediaStream for CpalMicrophone {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn deliver_to(&mut self, sink: ChunkSink) -> Result<(), AudioError> {
        self.control
            .send(CaptureControl::Deliver(sink))
            .map_err(|_| AudioError::DeviceAbsent("microphone stream already closed".to_string()))
    }

    fn stop_tracks(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = self.control.send(CaptureControl::Stop);
            if worker.join().is_err() {
                tracing::warn!("Capture worker panicked while stopping");
            }
        }
    }
}

impl Drop for CpalMicrophone {
    fn drop(&mut self) {
        self.stop_tracks();
    }
}

/// Opens the microphone, reports the outcome, then keeps the stream alive
/// until told to stop or until its owner goes away.
fn capture_worker(
    device_spec: &str,
    requested_rate: u32,
    ready: oneshot::Sender<Result<u32, AudioError>>,
    control: mpsc::Receiver<CaptureControl>,
) {
    let sink: SharedSink = Arc::new(Mutex::new(None));

    let stream = match open_capture_stream(device_spec, requested_rate, Arc::clone(&sink)) {
        Ok((stream, sample_rate)) => {
            if ready.send(Ok(sample_rate)).is_err() {
                tracing::debug!("Microphone request abandoned, releasing device");
                return;
            }
            stream
        }
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    while let Ok(message) = control.recv() {
        match message {
            CaptureControl::Deliver(new_sink) => *lock(&sink) = Some(new_sink),
            CaptureControl::Stop => break,
        }
    }

    drop(stream);
    tracing::debug!("Microphone released");
}

fn open_capture_stream(
    device_spec: &str,
    requested_rate: u32,
    sink: SharedSink,
) -> Result<(cpal::Stream, u32), AudioError> {
    let device = quiet_alsa(|| find_device(&cpal::default_host(), Direction::Input, device_spec))?;

    let device_name = device
        .name()
        .unwrap_or_else(|_| "Unknown device".to_string());
    tracing::info!("Recording device: {}", device_name);

    let supported = device.default_input_config().map_err(|e| match e {
        cpal::DefaultStreamConfigError::DeviceNotAvailable
        | cpal::DefaultStreamConfigError::StreamTypeNotSupported => {
            AudioError::DeviceAbsent(e.to_string())
        }
        other => AudioError::PermissionDenied(other.to_string()),
    })?;

    let sample_rate = supported.sample_rate().0;
    let channels = supported.channels() as usize;
    if sample_rate != requested_rate {
        tracing::warn!(
            "Requested sample rate {}Hz but device uses {}Hz. Recording at device rate.",
            requested_rate,
            sample_rate
        );
    }
    tracing::debug!("Device configuration: {}Hz, {} channels", sample_rate, channels);

    let config = supported.config();
    let stream = match supported.sample_format() {
        SampleFormat::I16 => build_capture_stream::<i16>(&device, &config, sink),
        SampleFormat::F32 => build_capture_stream::<f32>(&device, &config, sink),
        SampleFormat::U16 => build_capture_stream::<u16>(&device, &config, sink),
        SampleFormat::I32 => build_capture_stream::<i32>(&device, &config, sink),
        other => {
            return Err(AudioError::DeviceAbsent(format!(
                "unsupported input sample format {other}"
            )))
        }
    }
    .map_err(|e| match e {
        cpal::BuildStreamError::DeviceNotAvailable => AudioError::DeviceAbsent(e.to_string()),
        other => AudioError::PermissionDenied(other.to_string()),
    })?;

    stream
        .play()
        .map_err(|e| AudioError::PermissionDenied(e.to_string()))?;
    tracing::debug!("Audio stream started");

    Ok((stream, sample_rate))
}

fn build_capture_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    sink: SharedSink,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample,
    i16: FromSample<T>,
{
    let channels = config.channels as usize;

    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let mut sink = lock(&sink);
            if let Some(deliver) = sink.as_mut() {
                let pcm: Vec<i16> = data.iter().map(|s| s.to_sample::<i16>()).collect();
                deliver(downmix_to_mono(&pcm, channels));
            }
        },
        |err| tracing::error!("Audio stream error: {}", err),
        None,
    )
}

/// Averages interleaved channels into one mono channel.
pub fn downmix_to_mono(data: &[i16], channels: usize) -> Vec<i16> {
    match channels {
        0 | 1 => data.to_vec(),
        _ => data
            .chunks_exact(channels)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / channels as i32) as i16
            })
            .collect(),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
