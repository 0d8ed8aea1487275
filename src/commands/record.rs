//! Records the microphone into a WAV file.
//!
//! Recording stops on Enter or on SIGUSR1, so it can be driven from a
//! keybinding or script; Ctrl-C cancels without saving.

use anyhow::anyhow;
use console::{style, Term};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::audio::pitch::WINDOW_SIZE;
use crate::audio::{PitchDetector, RecordingSession};
use crate::launcher;

/// Status line refresh rate.
const REFRESH: Duration = Duration::from_millis(100);

/// Default output name, e.g. `mahir-recording-20261018-142501.wav`.
fn default_output() -> PathBuf {
    PathBuf::from(format!(
        "mahir-recording-{}.wav",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    ))
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Records until stopped, then writes the clip to `output`.
///
/// # Errors
/// - If the microphone cannot be opened
/// - If the clip cannot be encoded or written
pub async fn handle_record(output: Option<PathBuf>, play: bool) -> anyhow::Result<()> {
    tracing::info!("=== mahir Recorder Started ===");

    let config = super::load_config()?;
    let host = super::audio_host(&config.audio);
    let mut session = RecordingSession::new(host);

    let stop_signal = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, stop_signal.clone())
        .map_err(|e| anyhow!("Failed to register signal handler: {e}"))?;
    let interrupted = super::interrupt_notifier()?;

    let term = Term::stderr();
    term.write_line(&format!("{}", style("Requesting microphone...").dim()))?;
    session
        .start()
        .await
        .map_err(|e| anyhow!("{}", e.user_message()))?;
    term.clear_last_lines(1)?;
    term.write_line(&format!(
        "{} {}",
        style("●").red(),
        style("Recording. Press Enter to stop, Ctrl-C to cancel.").bold()
    ))?;

    let mut enter = super::enter_pressed();
    let mut ticker = tokio::time::interval(REFRESH);
    let mut detector = PitchDetector::new();
    let started = Instant::now();
    let mut frame_count = 0u64;

    loop {
        tokio::select! {
            Some(()) = enter.recv() => {
                tracing::debug!("Enter pressed: finishing recording");
                break;
            }
            _ = interrupted.notified() => {
                tracing::info!("Recording cancelled");
                session.discard();
                term.clear_line()?;
                term.write_line("Recording cancelled.")?;
                return Ok(());
            }
            _ = ticker.tick() => {
                if stop_signal.load(Ordering::Relaxed) {
                    tracing::info!("Received SIGUSR1: finishing recording via external trigger");
                    break;
                }

                frame_count += 1;
                if frame_count.is_multiple_of(50) {
                    tracing::debug!("Recording: {:.1}s recorded", started.elapsed().as_secs_f32());
                }

                let pitch = session
                    .live_samples(WINDOW_SIZE)
                    .and_then(|(samples, rate)| detector.detect(&samples, rate))
                    .map(|reading| format!("{:>7.1}Hz {} {:+.0}¢", reading.frequency_hz, reading.note.name, reading.cents))
                    .unwrap_or_default();
                term.clear_line()?;
                term.write_str(&format!("{}  {}", format_elapsed(started.elapsed()), pitch))?;
            }
        }
    }

    term.clear_line()?;
    let handle = session.stop()?;
    if handle.clip.is_empty() {
        return Err(anyhow!("No audio was captured. Check your input device with 'mahir list-devices'."));
    }

    let output = output.unwrap_or_else(default_output);
    handle.clip.save_wav(&output)?;
    tracing::info!("Recording saved to {}", output.display());
    term.write_line(&format!(
        "Saved {:.1}s to {}",
        handle.clip.duration().as_secs_f32(),
        style(output.display()).bold()
    ))?;

    if play {
        launcher::play_file(&output)?;
    }

    tracing::info!("=== mahir Recorder Exited Successfully ===");
    Ok(())
}
