//! Configuration file management for mahir.
//!
//! Configuration lives in `~/.config/mahir/mahir.toml`. Every section has
//! defaults, so a partial file is valid.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::audio::Tempo;

/// Audio device and level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Playback device: "default", a numeric index from `mahir list-devices`, or a device name
    #[serde(default = "default_device")]
    pub output_device: String,
    /// Recording device, same forms as `output_device`
    #[serde(default = "default_device")]
    pub input_device: String,
    /// Preferred recording sample rate in Hz (the device rate is used if it differs)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Peak gain for notes and clicks, 0.0 - 1.0
    #[serde(default = "default_tone_gain")]
    pub tone_gain: f32,
}

fn default_device() -> String {
    "default".to_string()
}

fn default_sample_rate() -> u32 {
    16000
}

fn default_tone_gain() -> f32 {
    1.0
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            output_device: default_device(),
            input_device: default_device(),
            sample_rate: default_sample_rate(),
            tone_gain: default_tone_gain(),
        }
    }
}

/// Metronome settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetronomeConfig {
    /// Initial tempo in BPM (60-180)
    #[serde(default = "default_tempo")]
    pub tempo: u16,
}

fn default_tempo() -> u16 {
    Tempo::DEFAULT.bpm()
}

impl Default for MetronomeConfig {
    fn default() -> Self {
        Self {
            tempo: default_tempo(),
        }
    }
}

impl MetronomeConfig {
    /// Configured tempo pulled into the supported range.
    pub fn tempo(&self) -> Tempo {
        Tempo::clamped(self.tempo as i32)
    }
}

/// Certificate output settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificateConfig {
    /// Directory for saved certificates; empty means the documents directory
    #[serde(default)]
    pub output_dir: String,
}

impl CertificateConfig {
    /// Resolves the output directory, falling back to documents, then home.
    pub fn output_dir(&self) -> PathBuf {
        let configured = self.output_dir.trim();
        if !configured.is_empty() {
            return match configured.strip_prefix("~/") {
                Some(rest) => dirs::home_dir().map_or_else(|| PathBuf::from(configured), |h| h.join(rest)),
                None => PathBuf::from(configured),
            };
        }
        dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MahirConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub metronome: MetronomeConfig,
    #[serde(default)]
    pub certificate: CertificateConfig,
}

impl MahirConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file cannot be read
    /// - If the TOML is malformed
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = config_path()?;
        if !config_path.exists() {
            tracing::debug!("No config file at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        let config_content = fs::read_to_string(&config_path)?;
        Self::from_toml(&config_content)
    }

    /// Parses configuration text.
    pub fn from_toml(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: MahirConfig = toml::from_str(content)?;
        Ok(config)
    }
}

/// Path to the config file, creating its directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn config_path() -> Result<PathBuf, std::io::Error> {
    let home = dirs::home_dir().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "Could not find home directory")
    })?;
    let config_dir = home.join(".config").join("mahir");
    fs::create_dir_all(&config_dir)?;
    Ok(config_dir.join("mahir.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = MahirConfig::from_toml("").unwrap();
        assert_eq!(config, MahirConfig::default());
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.metronome.tempo().bpm(), 120);
    }

    #[test]
    fn test_partial_sections_and_version_line() {
        let config = MahirConfig::from_toml(
            r#"config_version = "0.1.0"

[audio]
input_device = "USB Mic"

[metronome]
tempo = 300
"#,
        )
        .unwrap();
        assert_eq!(config.audio.input_device, "USB Mic");
        assert_eq!(config.audio.output_device, "default");
        assert_eq!(config.metronome.tempo().bpm(), 180);
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        assert!(MahirConfig::from_toml("[audio\nsample_rate = ").is_err());
        assert!(MahirConfig::from_toml("[audio]\nsample_rate = \"fast\"").is_err());
    }

    #[test]
    fn test_default_template_parses() {
        let template = include_str!("../../environments/mahir.toml");
        let config = MahirConfig::from_toml(template).unwrap();
        assert_eq!(config, MahirConfig::default());
    }

    #[test]
    fn test_certificate_dir_override() {
        let config = CertificateConfig {
            output_dir: "/tmp/certs".to_string(),
        };
        assert_eq!(config.output_dir(), PathBuf::from("/tmp/certs"));
    }
}
