//! Configuration management for mahir.
//!
//! Loads the TOML configuration in the user's config directory.

pub mod file;

pub use file::{config_path, AudioConfig, CertificateConfig, MahirConfig, MetronomeConfig};
