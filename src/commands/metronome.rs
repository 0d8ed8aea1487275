//! Stand-alone metronome.

use console::style;
use std::future;
use std::sync::Arc;
use std::time::Duration;

use crate::audio::{MetronomeScheduler, Tempo, ToneEmitter};

/// Clicks at `tempo` (or the configured tempo) until Enter, Ctrl-C, or
/// `duration_secs` elapses.
///
/// # Errors
/// - If the tempo is outside 60-180 BPM
/// - If no audio output device is available
pub async fn handle_metronome(tempo: Option<u16>, duration_secs: Option<u64>) -> anyhow::Result<()> {
    let config = super::load_config()?;
    let tempo = match tempo {
        Some(bpm) => Tempo::new(bpm)?,
        None => config.metronome.tempo(),
    };

    let host = super::tone_host(&config.audio);
    if host.create_tone_context().is_none() {
        return Err(anyhow::anyhow!(
            "No audio output device available. Run 'mahir list-devices' to check your setup."
        ));
    }

    let interrupted = super::interrupt_notifier()?;
    let mut enter = super::enter_pressed();

    let tone = ToneEmitter::new(host, config.audio.tone_gain);
    let mut metronome = MetronomeScheduler::new(Arc::new(tone), tempo);
    metronome.start();
    tracing::info!("Metronome started at {}", tempo);

    let until = match duration_secs {
        Some(secs) => format!("for {secs}s, "),
        None => String::new(),
    };
    println!(
        "{} {} {}",
        style("♩").cyan(),
        style(tempo).bold(),
        style(format!("({until}press Enter or Ctrl-C to stop)")).dim()
    );

    let elapsed = async {
        match duration_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => future::pending().await,
        }
    };

    tokio::select! {
        Some(()) = enter.recv() => tracing::debug!("Enter pressed: stopping metronome"),
        _ = interrupted.notified() => tracing::debug!("Ctrl-C: stopping metronome"),
        _ = elapsed => tracing::debug!("Metronome duration elapsed"),
    }

    metronome.stop();
    tracing::info!("Metronome stopped");
    Ok(())
}
