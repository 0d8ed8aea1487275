//! The final quiz as a sequence of interactive prompts.

use cliclack::{confirm, intro, log, outro, select};
use console::style;

use crate::quiz::QuizState;

/// Asks every question, shows the score and offers a certificate.
///
/// # Errors
/// - If a prompt is cancelled
/// - If the certificate cannot be saved
pub fn handle_quiz() -> anyhow::Result<()> {
    tracing::info!("=== mahir Quiz ===");

    let config = super::load_config()?;
    ctrlc::set_handler(move || {}).map_err(|e| anyhow::anyhow!("Failed to install Ctrl-C handler: {e}"))?;

    intro(style(" quiz ").on_white().black())?;

    let mut quiz = QuizState::default();
    while let Some(question) = quiz.current_question() {
        let prompt = format!(
            "{} {}",
            style(format!("{}/{}", quiz.current_index() + 1, quiz.len())).dim(),
            question.prompt
        );
        let mut select_prompt = select(prompt);
        for (index, answer) in question.answers.iter().enumerate() {
            select_prompt = select_prompt.item(index, answer, "");
        }
        let selected: usize = select_prompt
            .interact()
            .map_err(|e| anyhow::anyhow!("Quiz cancelled: {e}"))?;

        if let Some(outcome) = quiz.answer(selected) {
            if outcome.is_correct() {
                log::success("Correct!")?;
            } else {
                log::error(format!(
                    "Not quite. The answer is: {}",
                    question.answers[outcome.correct]
                ))?;
            }
        }
        quiz.next();
    }

    let score = quiz.display_score();
    tracing::info!("Quiz finished with score {}", score);
    log::info(format!(
        "Your score: {} ({} of {} correct)",
        style(score).bold(),
        quiz.correct_answers(),
        quiz.len()
    ))?;

    let wants_certificate = confirm("Claim your certificate now?")
        .initial_value(true)
        .interact()
        .map_err(|e| anyhow::anyhow!("Prompt cancelled: {e}"))?;

    if wants_certificate {
        super::certificate::issue(None, Some(score), &config.certificate.output_dir())?;
    } else {
        outro("Run 'mahir certificate' whenever you are ready.")?;
    }
    Ok(())
}
