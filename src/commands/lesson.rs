//! The full-screen lesson.

use anyhow::anyhow;
use std::time::Instant;

use crate::curriculum::Step;
use crate::launcher;
use crate::lesson::{Lesson, LessonEffect};
use crate::ui::{show_error_screen, LessonTui};

/// Runs the ten-step lesson, optionally starting at step `start` (1-10).
///
/// # Errors
/// - If the step number is out of range
/// - If the configuration is malformed (shown full screen first)
/// - If the terminal cannot be driven
pub async fn handle_lesson(start: Option<usize>) -> anyhow::Result<()> {
    tracing::info!("=== mahir Lesson Started ===");

    let start = match start {
        Some(number) => Step::from_number(number)
            .ok_or_else(|| anyhow!("Step must be between 1 and {}", Step::ALL.len()))?,
        None => Step::default(),
    };

    let config = match super::load_config() {
        Ok(config) => config,
        Err(err) => {
            show_error_screen(&err.to_string())?;
            return Err(err);
        }
    };

    let host = super::tone_host(&config.audio);
    let mut lesson = Lesson::new(
        host,
        config.audio.tone_gain,
        config.metronome.tempo(),
        config.certificate.output_dir(),
    )
    .with_step(start);

    let mut tui = LessonTui::new().map_err(|e| anyhow!("Failed to initialize UI: {e}"))?;

    while !lesson.is_finished() {
        lesson.tick();
        tui.render(&lesson, Instant::now())
            .map_err(|e| anyhow!("Render failed: {e}"))?;

        let Some(command) = tui.handle_input(&lesson)? else {
            continue;
        };

        let awaited = lesson.awaits_device(&command);
        lesson.prepare(&command);
        tui.render(&lesson, Instant::now())
            .map_err(|e| anyhow!("Render failed: {e}"))?;

        let effect = lesson.apply(command, Instant::now()).await;
        if awaited {
            tui.discard_pending_input()?;
        }
        if let Some(effect) = effect {
            run_effect(effect);
        }
    }

    // Stops the metronome and releases the microphone before the terminal is restored.
    drop(lesson);
    tui.cleanup().map_err(|e| anyhow!("Cleanup failed: {e}"))?;

    tracing::info!("=== mahir Lesson Exited Successfully ===");
    Ok(())
}

fn run_effect(effect: LessonEffect) {
    match effect {
        LessonEffect::OpenUrl(url) => {
            if let Err(e) = launcher::open_url(&url) {
                tracing::warn!("{}", e);
            }
        }
        LessonEffect::PlayFile(path) => launcher::play_file_detached(&path),
    }
}
