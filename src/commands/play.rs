//! Plays solfège notes and voice-class reference tones from the command line.

use anyhow::anyhow;
use console::style;
use std::sync::Arc;
use std::time::Duration;

use crate::audio::tone::Tone;
use crate::audio::{AudioHost, ToneEmitter};
use crate::curriculum::content::{find_note, NOTES};
use crate::curriculum::VoiceClass;

/// Time between consecutive notes; each note still rings for its full envelope.
const NOTE_SPACING: Duration = Duration::from_millis(700);

/// Something to sound: a display label and a frequency.
#[derive(Debug, Clone, PartialEq)]
struct Target {
    label: String,
    frequency_hz: f32,
}

/// Turns one argument into tones: a note name, `scale`, or a frequency in Hz.
fn parse_target(arg: &str) -> anyhow::Result<Vec<Target>> {
    let arg = arg.trim();
    if arg.eq_ignore_ascii_case("scale") {
        return Ok(NOTES
            .iter()
            .map(|note| Target {
                label: note.name.to_string(),
                frequency_hz: note.frequency_hz,
            })
            .collect());
    }

    if let Some(note) = find_note(arg) {
        return Ok(vec![Target {
            label: note.name.to_string(),
            frequency_hz: note.frequency_hz,
        }]);
    }

    let hz = arg.trim_end_matches("hz").trim_end_matches("Hz");
    match hz.parse::<f32>() {
        Ok(frequency_hz) if frequency_hz.is_finite() && frequency_hz > 0.0 => Ok(vec![Target {
            label: format!("{frequency_hz}Hz"),
            frequency_hz,
        }]),
        _ => Err(anyhow!(
            "Unknown note '{arg}'. Use do re mi fa sol la si, 'scale', or a frequency like 440"
        )),
    }
}

/// Plays the given notes one after another.
///
/// # Errors
/// - If an argument is neither a note, `scale`, nor a positive frequency
/// - If no audio output device is available
pub async fn handle_play(notes: Vec<String>) -> anyhow::Result<()> {
    let mut targets = Vec::new();
    for arg in &notes {
        targets.extend(parse_target(arg)?);
    }
    if targets.is_empty() {
        targets = parse_target("scale")?;
    }

    let config = super::load_config()?;
    let host = super::tone_host(&config.audio);
    play_targets(host, config.audio.tone_gain, &targets).await
}

/// Plays the reference tone of one voice class, or of all four.
///
/// # Errors
/// - If no audio output device is available
pub async fn handle_range(voice: Option<VoiceClass>) -> anyhow::Result<()> {
    let classes = match voice {
        Some(class) => vec![class],
        None => VoiceClass::ALL.to_vec(),
    };

    let targets: Vec<Target> = classes
        .iter()
        .map(|class| {
            let profile = class.profile();
            Target {
                label: format!(
                    "{:<8} {} ({}, {})",
                    profile.name, profile.sample.label, profile.register, profile.range
                ),
                frequency_hz: profile.sample.frequency_hz,
            }
        })
        .collect();

    let config = super::load_config()?;
    let host = super::tone_host(&config.audio);
    play_targets(host, config.audio.tone_gain, &targets).await
}

async fn play_targets(host: Arc<dyn AudioHost>, gain: f32, targets: &[Target]) -> anyhow::Result<()> {
    if host.create_tone_context().is_none() {
        return Err(anyhow!(
            "No audio output device available. Run 'mahir list-devices' to check your setup."
        ));
    }

    let tone = ToneEmitter::new(host, gain);
    for (index, target) in targets.iter().enumerate() {
        println!(
            "{} {} {}",
            style("♪").cyan(),
            style(&target.label).bold(),
            style(format!("{:.2}Hz", target.frequency_hz)).dim()
        );
        tone.play(target.frequency_hz);

        let wait = if index + 1 == targets.len() {
            Tone::note(target.frequency_hz).duration()
        } else {
            NOTE_SPACING
        };
        tokio::time::sleep(wait).await;
    }

    // Let the last tone's stream drain.
    tokio::time::sleep(Duration::from_millis(100)).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::stub::StubHost;

    #[test]
    fn test_parse_note_names() {
        let targets = parse_target("Sol").unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].frequency_hz, 392.00);

        // The first DO is the lower octave
        assert_eq!(parse_target("do").unwrap()[0].frequency_hz, 261.63);
    }

    #[test]
    fn test_parse_scale_and_frequencies() {
        assert_eq!(parse_target("scale").unwrap().len(), NOTES.len());
        assert_eq!(parse_target("440").unwrap()[0].frequency_hz, 440.0);
        assert_eq!(parse_target("220hz").unwrap()[0].frequency_hz, 220.0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_target("ti").is_err());
        assert!(parse_target("0").is_err());
        assert!(parse_target("-440").is_err());
        assert!(parse_target("NaN").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_targets_sounds_each_note() {
        let host = Arc::new(StubHost::new());
        let targets = parse_target("scale").unwrap();

        play_targets(host.clone(), 0.5, &targets).await.unwrap();
        assert_eq!(host.tones_started(), NOTES.len());
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_targets_without_output_fails() {
        let host = Arc::new(StubHost::without_output());
        let targets = parse_target("la").unwrap();

        assert!(play_targets(host.clone(), 0.5, &targets).await.is_err());
        assert_eq!(host.tones_started(), 0);
    }
}
