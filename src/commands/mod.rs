//! Command handlers for mahir.
//!
//! # Commands
//! - `lesson`: the full-screen ten-step walkthrough (default)
//! - `play` / `range`: solfège notes and voice-class reference tones
//! - `metronome`: clicks at a fixed tempo until stopped
//! - `record`: captures the microphone into a WAV file
//! - `quiz`: the final quiz as interactive prompts
//! - `certificate`: issues a certificate file
//! - `config`, `list_devices`, `logs`: housekeeping

pub mod certificate;
pub mod config;
pub mod lesson;
pub mod list_devices;
pub mod logs;
pub mod metronome;
pub mod play;
pub mod quiz;
pub mod record;

pub use certificate::handle_certificate;
pub use config::handle_config;
pub use lesson::handle_lesson;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use metronome::handle_metronome;
pub use play::{handle_play, handle_range};
pub use quiz::handle_quiz;
pub use record::handle_record;

use std::sync::Arc;

use tokio::sync::{mpsc, Notify};

use crate::audio::{AudioHost, CpalHost};
use crate::config::{AudioConfig, MahirConfig};

/// Loads `mahir.toml`, turning parse failures into a readable error.
///
/// # Errors
/// - If the file cannot be read or is malformed
pub(crate) fn load_config() -> anyhow::Result<MahirConfig> {
    MahirConfig::load().map_err(|err| {
        tracing::error!("Failed to load configuration: {err}");
        anyhow::anyhow!(
            "Configuration error: {err}\n\nPlease check your ~/.config/mahir/mahir.toml file and try again."
        )
    })
}

/// Builds the cpal-backed host for the configured devices.
pub(crate) fn audio_host(audio: &AudioConfig) -> Arc<dyn AudioHost> {
    Arc::new(cpal_host(audio))
}

/// Like [`audio_host`], but resolves the output device up front for commands
/// that play tones.
pub(crate) fn tone_host(audio: &AudioConfig) -> Arc<dyn AudioHost> {
    let host = cpal_host(audio);
    if !host.prime_output() {
        tracing::warn!("No usable audio output; tones and clicks will be silent");
    }
    Arc::new(host)
}

fn cpal_host(audio: &AudioConfig) -> CpalHost {
    tracing::info!(
        "Audio configuration: output={}, input={}, sample_rate={}Hz, tone_gain={}",
        audio.output_device,
        audio.input_device,
        audio.sample_rate,
        audio.tone_gain
    );
    CpalHost::new(
        audio.output_device.clone(),
        audio.input_device.clone(),
        audio.sample_rate,
    )
}

/// Yields once per line read from stdin; closes quietly at end of input.
///
/// The reader is a detached thread rather than a blocking tokio task, so an
/// unanswered read never holds up runtime shutdown.
pub(crate) fn enter_pressed() -> mpsc::UnboundedReceiver<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    let spawned = std::thread::Builder::new()
        .name("mahir-stdin".to_string())
        .spawn(move || {
            let mut line = String::new();
            while let Ok(read) = std::io::stdin().read_line(&mut line) {
                if read == 0 || tx.send(()).is_err() {
                    break;
                }
                line.clear();
            }
        });
    if let Err(e) = spawned {
        tracing::warn!("Could not watch stdin: {}", e);
    }
    rx
}

/// Installs a Ctrl-C handler that notifies instead of killing the process.
///
/// # Errors
/// - If a handler is already installed
pub(crate) fn interrupt_notifier() -> anyhow::Result<Arc<Notify>> {
    let notify = Arc::new(Notify::new());
    let handler_notify = notify.clone();
    ctrlc::set_handler(move || handler_notify.notify_one())
        .map_err(|e| anyhow::anyhow!("Failed to install Ctrl-C handler: {e}"))?;
    Ok(notify)
}
