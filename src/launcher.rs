//! Hands URLs and audio files to the desktop's own applications.
//!
//! Warm-up and gallery videos open in the browser; recorded clips are played
//! by the first terminal audio player found on PATH.

use anyhow::anyhow;
use std::path::Path;
use std::process::{Command, Stdio};

/// A command-line audio player and the flags that make it play one file and exit.
struct Player {
    program: &'static str,
    args: &'static [&'static str],
}

#[cfg(target_os = "macos")]
const PLAYERS: &[Player] = &[Player { program: "afplay", args: &[] }];

#[cfg(not(target_os = "macos"))]
const PLAYERS: &[Player] = &[
    Player { program: "paplay", args: &[] },
    Player { program: "aplay", args: &["-q"] },
    Player { program: "ffplay", args: &["-nodisp", "-autoexit", "-loglevel", "quiet"] },
    Player { program: "mpv", args: &["--no-video", "--really-quiet"] },
    Player { program: "vlc", args: &["--intf", "dummy", "--play-and-exit"] },
];

#[cfg(target_os = "macos")]
const URL_OPENER: &str = "open";

#[cfg(not(target_os = "macos"))]
const URL_OPENER: &str = "xdg-open";

/// Opens `url` in the default browser without waiting for it.
///
/// # Errors
/// - If the system opener cannot be started
pub fn open_url(url: &str) -> anyhow::Result<()> {
    tracing::info!("Opening {} with {}", url, URL_OPENER);

    let mut child = Command::new(URL_OPENER)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| anyhow!("Failed to open {url}: {e}. Open it manually in your browser."))?;

    // Reap the opener so it does not linger as a zombie.
    std::thread::spawn(move || {
        let _ = child.wait();
    });
    Ok(())
}

/// Plays an audio file and blocks until the player exits.
///
/// # Errors
/// - If the file does not exist
/// - If no supported player is installed
/// - If the player cannot be started or waited on
pub fn play_file(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        return Err(anyhow!("Audio file not found: {}", path.display()));
    }

    let player = PLAYERS
        .iter()
        .find(|player| is_on_path(player.program))
        .ok_or_else(|| anyhow!("No audio player found. Install {}", player_names()))?;

    tracing::info!("Playing {} with {}", path.display(), player.program);

    let status = Command::new(player.program)
        .args(player.args)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| anyhow!("Failed to start {}: {e}", player.program))?
        .wait()
        .map_err(|e| anyhow!("Audio player error: {e}"))?;

    if !status.success() {
        tracing::warn!("{} exited with {}", player.program, status);
    }
    Ok(())
}

/// Plays an audio file on a background thread, logging any failure.
pub fn play_file_detached(path: &Path) {
    let path = path.to_path_buf();
    let spawned = std::thread::Builder::new()
        .name("mahir-playback".to_string())
        .spawn(move || {
            if let Err(e) = play_file(&path) {
                tracing::warn!("Playback failed: {}", e);
            }
        });
    if let Err(e) = spawned {
        tracing::warn!("Could not start playback thread: {}", e);
    }
}

/// Checks whether a program is available in PATH.
pub fn is_on_path(program: &str) -> bool {
    Command::new("which")
        .arg(program)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

fn player_names() -> String {
    PLAYERS
        .iter()
        .map(|player| player.program)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_file_rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = play_file(&dir.path().join("missing.wav")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_player_names_lists_every_player() {
        let names = player_names();
        for player in PLAYERS {
            assert!(names.contains(player.program));
        }
    }
}
