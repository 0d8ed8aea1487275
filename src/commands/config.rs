//! Opens the mahir configuration file in the user's editor.

use std::process::Command;

use crate::config::config_path;
use crate::launcher::is_on_path;

/// Opens `mahir.toml` in `$EDITOR`, falling back to nano and then vi.
///
/// # Errors
/// - If the config path cannot be determined
/// - If no editor can be found or it exits with an error
pub fn handle_config() -> anyhow::Result<()> {
    let config_path = config_path()
        .map_err(|e| anyhow::anyhow!("Failed to locate config directory: {e}"))?;

    tracing::info!("Opening config file: {}", config_path.display());

    let editor = find_editor()?;
    tracing::debug!("Using editor: {}", editor);

    let status = Command::new(&editor)
        .arg(&config_path)
        .status()
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to open editor '{editor}': {e}. Make sure the editor is installed and accessible."
            )
        })?;

    if !status.success() {
        return Err(anyhow::anyhow!(
            "Editor exited with error code: {}",
            status.code().unwrap_or(-1)
        ));
    }

    tracing::info!("Config file edited");
    Ok(())
}

/// Picks `$EDITOR`, else the first of nano and vi found on PATH.
fn find_editor() -> anyhow::Result<String> {
    if let Ok(editor) = std::env::var("EDITOR") {
        if !editor.trim().is_empty() {
            return Ok(editor);
        }
    }

    ["nano", "vi"]
        .into_iter()
        .find(|editor| is_on_path(editor))
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("No editor found. Please set the $EDITOR environment variable."))
}
