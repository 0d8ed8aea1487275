//! Config version tracking.
//!
//! The first line of `mahir.toml` records the version of mahir that wrote it.
//! When the binary is newer, setup refreshes that line.

use anyhow::anyhow;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

/// Current application version from Cargo.toml
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Represents a semantic version (major.minor.patch)
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
struct SemanticVersion {
    major: u32,
    minor: u32,
    patch: u32,
}

impl SemanticVersion {
    /// Parse a version string like "0.1.0" into a SemanticVersion
    fn parse(version_str: &str) -> anyhow::Result<Self> {
        let parts: Vec<&str> = version_str.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(anyhow!(
                "Invalid version format: '{}'. Expected 'major.minor.patch'",
                version_str
            ));
        }

        let component = |label: &str, raw: &str| {
            raw.parse::<u32>()
                .map_err(|_| anyhow!("Invalid {label} version: '{raw}'"))
        };

        Ok(SemanticVersion {
            major: component("major", parts[0])?,
            minor: component("minor", parts[1])?,
            patch: component("patch", parts[2])?,
        })
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// What setup has to do for a config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupStatus {
    /// No config file yet; write the default template.
    Missing,
    /// Written by an older (or unknown) version; refresh the version line.
    Outdated(String),
    Current,
}

/// Extracts the version from a `config_version = "X.Y.Z"` first line.
fn parse_version_line(first_line: &str) -> anyhow::Result<Option<String>> {
    let regex = Regex::new(r#"^\s*config_version\s*=\s*"([^"]+)""#)?;
    Ok(regex.captures(first_line).map(|caps| caps[1].to_string()))
}

/// Compares the config file's recorded version with `current`.
pub fn check_setup_needed(config_path: &Path, current: &str) -> anyhow::Result<SetupStatus> {
    if !config_path.exists() {
        return Ok(SetupStatus::Missing);
    }

    let content = std::fs::read_to_string(config_path)?;
    let Some(config_version) = parse_version_line(content.lines().next().unwrap_or(""))? else {
        return Ok(SetupStatus::Outdated("unknown (unversioned config)".to_string()));
    };

    let config_parsed = SemanticVersion::parse(&config_version)?;
    let current_parsed = SemanticVersion::parse(current)?;

    match config_parsed.cmp(&current_parsed) {
        Ordering::Less => Ok(SetupStatus::Outdated(config_version)),
        Ordering::Equal => Ok(SetupStatus::Current),
        Ordering::Greater => {
            tracing::warn!(
                "Config version {} is newer than app version {}",
                config_version,
                current
            );
            Ok(SetupStatus::Current)
        }
    }
}

/// Writes `current` as the config_version on the first line, keeping the rest.
pub fn update_config_version(config_path: &Path, current: &str) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(config_path)?;

    let lines: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().starts_with("config_version"))
        .collect();

    let version_line = format!(r#"config_version = "{}""#, current);
    let new_content = if lines.is_empty() {
        version_line
    } else {
        format!("{}\n{}", version_line, lines.join("\n"))
    };

    std::fs::write(config_path, new_content)?;
    Ok(())
}
