//! Issues a certificate of completion as a text file.

use cliclack::{input, intro, outro};
use console::style;

use crate::certificate::Certificate;

/// Prompts for the student's name, renders the certificate and saves it.
///
/// # Errors
/// - If the score is above 100
/// - If the prompt is cancelled
/// - If the file cannot be written
pub fn handle_certificate(name: Option<String>, score: Option<u32>) -> anyhow::Result<()> {
    if score.is_some_and(|score| score > 100) {
        return Err(anyhow::anyhow!("Score must be between 0 and 100"));
    }

    let config = super::load_config()?;
    ctrlc::set_handler(move || {}).map_err(|e| anyhow::anyhow!("Failed to install Ctrl-C handler: {e}"))?;

    intro(style(" certificate ").on_white().black())?;
    issue(name, score, &config.certificate.output_dir())?;
    Ok(())
}

/// Shared by `certificate` and the end of `quiz`.
pub(crate) fn issue(
    name: Option<String>,
    score: Option<u32>,
    dir: &std::path::Path,
) -> anyhow::Result<()> {
    let name = match name {
        Some(name) => name,
        None => input("Your full name, as it should appear on the certificate:")
            .placeholder("e.g. Budi Setiawan")
            .validate(|value: &String| {
                if value.trim().is_empty() {
                    Err("A name is required")
                } else {
                    Ok(())
                }
            })
            .interact()
            .map_err(|e| anyhow::anyhow!("Name input cancelled: {e}"))?,
    };

    let certificate = Certificate::new(&name, score)?;
    let path = certificate.save(dir)?;
    tracing::info!("Certificate for {} saved to {}", certificate.name(), path.display());

    println!("{}", certificate.render());
    outro(format!("Certificate saved to {}", style(path.display()).bold()))?;
    Ok(())
}
