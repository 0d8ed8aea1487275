//! First-run setup and config migration.
//!
//! Writes the default configuration when none exists and keeps the recorded
//! config version in step with the binary.

pub mod version;

use std::path::Path;

use version::{check_setup_needed, update_config_version, SetupStatus, CURRENT_VERSION};

/// Embedded default configuration template.
const DEFAULT_CONFIG: &str = include_str!("../../environments/mahir.toml");

/// Creates or migrates the config file at `config_path` as needed.
///
/// # Errors
/// Returns an error if the config file cannot be read or written.
pub fn ensure_config(config_path: &Path) -> anyhow::Result<()> {
    match check_setup_needed(config_path, CURRENT_VERSION)? {
        SetupStatus::Missing => {
            write_default_config(config_path)?;
            tracing::info!("Default configuration written to {}", config_path.display());
        }
        SetupStatus::Outdated(old_version) => {
            update_config_version(config_path, CURRENT_VERSION)?;
            tracing::info!(
                "Configuration migrated from version {} to {}",
                old_version,
                CURRENT_VERSION
            );
        }
        SetupStatus::Current => {
            tracing::debug!("Config version up to date ({})", CURRENT_VERSION);
        }
    }
    Ok(())
}

/// Writes the default template with a version line on top.
fn write_default_config(config_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let config_with_version = format!(r#"config_version = "{}""#, CURRENT_VERSION);
    std::fs::write(config_path, format!("{}\n{}", config_with_version, DEFAULT_CONFIG))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MahirConfig;

    #[test]
    fn test_ensure_config_creates_then_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("mahir.toml");

        ensure_config(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with(&format!("config_version = \"{CURRENT_VERSION}\"")));
        assert!(MahirConfig::from_toml(&written).is_ok());

        std::fs::write(&path, format!("{written}\n# edited")).unwrap();
        ensure_config(&path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().ends_with("# edited"));
    }
}
