//! Graduation certificate rendering.

use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};

const WIDTH: usize = 64;

/// Certificate of completion for one student.
#[derive(Debug, Clone, PartialEq)]
pub struct Certificate {
    name: String,
    score: Option<u32>,
    issued_on: NaiveDate,
}

impl Certificate {
    /// Creates a certificate dated today.
    ///
    /// # Errors
    /// - If `name` is empty after trimming
    pub fn new(name: &str, score: Option<u32>) -> Result<Self> {
        Self::issued_on(name, score, Local::now().date_naive())
    }

    pub fn issued_on(name: &str, score: Option<u32>, date: NaiveDate) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(anyhow!("A name is required to issue the certificate"));
        }
        Ok(Self {
            name: name.to_string(),
            score,
            issued_on: date,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Issue date in long form, e.g. "18 October 2026".
    pub fn date_label(&self) -> String {
        self.issued_on.format("%-d %B %Y").to_string()
    }

    /// Renders the framed plain-text certificate.
    pub fn render(&self) -> String {
        let mut lines = vec![
            String::new(),
            "CERTIFICATE OF COMPLETION".to_string(),
            "Officially issued through Mahir Bernyanyi".to_string(),
            String::new(),
            "Proudly presented to".to_string(),
            String::new(),
            self.name.to_uppercase(),
            String::new(),
            "for dedication in completing the full curriculum".to_string(),
            "Essential Vocal Technique, covering diaphragmatic".to_string(),
            "breathing, precise articulation and pitch control.".to_string(),
            String::new(),
        ];
        if let Some(score) = self.score {
            lines.push(format!("Final quiz score: {score}/100"));
            lines.push(String::new());
        }
        lines.push(format!("Vocal Coach, Head Instructor      {}", self.date_label()));
        lines.push(String::new());

        let border = format!("+{}+", "=".repeat(WIDTH));
        let mut out = String::new();
        out.push_str(&border);
        out.push('\n');
        for line in lines {
            out.push_str(&format!("|{:^width$}|\n", line, width = WIDTH));
        }
        out.push_str(&border);
        out.push('\n');
        out
    }

    /// File name derived from the student's name.
    pub fn file_name(&self) -> String {
        let slug: String = self
            .name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect::<String>()
            .split('-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");
        format!("mahir-certificate-{slug}.txt")
    }

    /// Writes the certificate into `dir`, creating it if needed.
    ///
    /// # Errors
    /// - If the directory cannot be created or the file cannot be written
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .map_err(|e| anyhow!("Failed to create {}: {e}", dir.display()))?;
        let path = dir.join(self.file_name());
        std::fs::write(&path, self.render())
            .map_err(|e| anyhow!("Failed to write certificate: {e}"))?;
        tracing::info!("Certificate saved: {}", path.display());
        Ok(path)
    }
}
