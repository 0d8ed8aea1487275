//! Command-line parsing and command routing.

use anyhow::anyhow;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use std::process;

use crate::commands;
use crate::config::config_path;
use crate::curriculum::VoiceClass;
use crate::logging;

/// Creates or migrates `mahir.toml` before any command reads it.
fn check_and_run_setup() -> anyhow::Result<()> {
    let config_path =
        config_path().map_err(|e| anyhow!("Could not determine config location: {e}"))?;

    crate::setup::ensure_config(&config_path).map_err(|e| {
        tracing::error!("Setup failed: {e}");
        anyhow!("Setup failed: {e}")
    })
}

/// A terminal vocal coach: guided lessons, tone generator, metronome and recorder
#[derive(Parser)]
#[command(name = "mahir")]
#[command(version)]
#[command(about = "Mahir Bernyanyi: a terminal vocal coach")]
#[command(long_about = "Mahir Bernyanyi: a terminal vocal coach.\n\nA ten-step course in essential vocal technique with a solfège tone generator,\na metronome, a recorder with live pitch readout, a quiz and a certificate.\n\nDEFAULT COMMAND:\n    If no command is specified, 'lesson' is used.\n\nEXAMPLES:\n    # Start the lesson, or jump to the practice studio\n    $ mahir\n    $ mahir lesson --step 7\n\n    # Play a scale, or a few notes\n    $ mahir play scale\n    $ mahir play do mi sol 440\n\n    # Click at 90 BPM for one minute\n    $ mahir metronome -t 90 -d 60\n\n    # Record and listen back\n    $ mahir record -o take1.wav --play")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/mahir/mahir.toml\n    Logs:               ~/.local/state/mahir/mahir.log.*"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full-screen lesson (default)
    ///
    /// Ten steps from vocal theory to certificate. Use ←/→ to move between
    /// steps; each step shows its keys at the bottom of the screen.
    #[command(visible_alias = "l")]
    Lesson {
        /// Step to start at (1-10)
        #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u8).range(1..=10))]
        step: Option<u8>,
    },

    /// Play solfège notes
    ///
    /// Accepts note names (do re mi fa sol la si), 'scale' for the full
    /// octave, or frequencies in Hz. Plays the scale when no note is given.
    ///
    /// Examples:
    ///   mahir play scale
    ///   mahir play do re mi
    ///   mahir play 440 523.25
    #[command(visible_alias = "p")]
    Play {
        /// Notes to play in order
        #[arg(value_name = "NOTE")]
        notes: Vec<String>,
    },

    /// Play the reference tone of a voice classification
    ///
    /// Plays all four (soprano, alto, tenor, bass) when none is given.
    Range {
        #[arg(value_enum)]
        voice: Option<VoiceClass>,
    },

    /// Click a metronome until Enter or Ctrl-C
    #[command(visible_alias = "m")]
    Metronome {
        /// Tempo in BPM (60-180); defaults to the configured tempo
        #[arg(short, long, value_name = "BPM")]
        tempo: Option<u16>,

        /// Stop after this many seconds
        #[arg(short, long, value_name = "SECS")]
        duration: Option<u64>,
    },

    /// Record the microphone into a WAV file
    ///
    /// Press Enter (or send SIGUSR1) to stop and save, Ctrl-C to cancel.
    #[command(visible_alias = "r")]
    Record {
        /// Output file (default: mahir-recording-<timestamp>.wav)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Play the recording back after saving
        #[arg(long)]
        play: bool,
    },

    /// Take the final quiz with interactive prompts
    #[command(visible_alias = "q")]
    Quiz,

    /// Issue a certificate of completion
    Certificate {
        /// Name on the certificate (prompted when omitted)
        #[arg(short, long)]
        name: Option<String>,

        /// Quiz score to print on the certificate (0-100)
        #[arg(short, long)]
        score: Option<u32>,
    },

    /// Open configuration file in your preferred editor
    ///
    /// Uses $EDITOR or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// List audio output and input devices
    ///
    /// Shows device IDs and names for output_device/input_device in mahir.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries
    Logs,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   mahir completions bash > mahir.bash
    ///   mahir completions zsh > _mahir
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Parses arguments and runs the selected command.
///
/// # Errors
/// - If logging or setup fails
/// - If the command fails
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Commands that need neither logging nor config
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "mahir", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            return exit_on_error(commands::handle_list_devices());
        }
        Some(Commands::Logs) => {
            return exit_on_error(commands::handle_logs());
        }
        _ => {}
    }

    logging::init_logging()?;
    check_and_run_setup()?;

    let result = match cli.command {
        None => commands::handle_lesson(None).await,
        Some(Commands::Lesson { step }) => commands::handle_lesson(step.map(usize::from)).await,
        Some(Commands::Play { notes }) => commands::handle_play(notes).await,
        Some(Commands::Range { voice }) => commands::handle_range(voice).await,
        Some(Commands::Metronome { tempo, duration }) => {
            commands::handle_metronome(tempo, duration).await
        }
        Some(Commands::Record { output, play }) => commands::handle_record(output, play).await,
        Some(Commands::Quiz) => commands::handle_quiz(),
        Some(Commands::Certificate { name, score }) => commands::handle_certificate(name, score),
        Some(Commands::Config) => commands::handle_config(),
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    };

    if let Err(e) = &result {
        // cliclack has already printed its own cancellation message
        let message = e.to_string();
        if message.contains("cancelled") || message.contains("interrupted") {
            process::exit(0);
        }
        tracing::error!("{e}");
    }
    result
}

fn exit_on_error(result: anyhow::Result<()>) -> anyhow::Result<()> {
    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_lesson() {
        let cli = Cli::try_parse_from(["mahir"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_lesson_step_range() {
        assert!(Cli::try_parse_from(["mahir", "lesson", "--step", "7"]).is_ok());
        assert!(Cli::try_parse_from(["mahir", "lesson", "--step", "11"]).is_err());
        assert!(Cli::try_parse_from(["mahir", "lesson", "--step", "0"]).is_err());
    }

    #[test]
    fn test_subcommand_arguments() {
        let cli = Cli::try_parse_from(["mahir", "play", "do", "mi", "sol"]).unwrap();
        match cli.command {
            Some(Commands::Play { notes }) => assert_eq!(notes, ["do", "mi", "sol"]),
            _ => panic!("expected play"),
        }

        let cli = Cli::try_parse_from(["mahir", "range", "tenor"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Range { voice: Some(VoiceClass::Tenor) })
        ));

        let cli = Cli::try_parse_from(["mahir", "metronome", "-t", "90", "-d", "30"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Metronome { tempo: Some(90), duration: Some(30) })
        ));

        let cli = Cli::try_parse_from(["mahir", "record", "-o", "take.wav", "--play"]).unwrap();
        match cli.command {
            Some(Commands::Record { output, play }) => {
                assert_eq!(output, Some(PathBuf::from("take.wav")));
                assert!(play);
            }
            _ => panic!("expected record"),
        }
    }
}
