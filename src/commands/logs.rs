//! Display recent log entries.

use anyhow::anyhow;
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::{self, LOG_FILE_PREFIX};

const DEFAULT_LINES: usize = 50;

/// Prints the last [`DEFAULT_LINES`] lines of the newest log file.
///
/// # Errors
/// - If the log directory cannot be determined
/// - If the log file cannot be read
pub fn handle_logs() -> anyhow::Result<()> {
    let log_dir = logging::log_dir()?;

    let Some(log_file) = find_latest_log(&log_dir)? else {
        println!("No log files found in: {}", log_dir.display());
        println!("Run 'mahir' or another command to generate logs.");
        return Ok(());
    };

    let content =
        fs::read_to_string(&log_file).map_err(|e| anyhow!("Failed to read log file: {e}"))?;

    if content.is_empty() {
        println!("Log file is empty: {}", log_file.display());
        return Ok(());
    }

    let lines: Vec<&str> = content.lines().collect();
    let tail = tail_lines(&lines, DEFAULT_LINES);

    println!();
    if tail.len() < lines.len() {
        println!("Showing last {} of {} lines:", tail.len(), lines.len());
    } else {
        println!("Showing all {} lines:", lines.len());
    }
    println!("Full log file at: {}", log_file.display());
    println!();

    for line in tail {
        println!("{line}");
    }

    Ok(())
}

fn tail_lines<'a>(lines: &'a [&'a str], count: usize) -> &'a [&'a str] {
    &lines[lines.len().saturating_sub(count)..]
}

/// Finds the most recently modified mahir log file.
fn find_latest_log(log_dir: &Path) -> anyhow::Result<Option<PathBuf>> {
    let entries =
        fs::read_dir(log_dir).map_err(|e| anyhow!("Failed to read log directory: {e}"))?;

    let latest = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX))
        })
        .filter_map(|path| {
            let modified = fs::metadata(&path).ok()?.modified().ok()?;
            Some((path, modified))
        })
        .max_by_key(|(_, modified)| *modified)
        .map(|(path, _)| path);

    Ok(latest)
}
