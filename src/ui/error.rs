//! Full-screen error display.
//!
//! Used when the lesson cannot start, e.g. a malformed `mahir.toml`.

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Paragraph, Wrap},
};
use std::io::{self, Stdout};
use std::time::Duration;

const ERROR_BG: Color = Color::Rgb(160, 20, 20);
const ERROR_FG: Color = Color::Rgb(255, 255, 255);

/// Red screen with a centered message, dismissed by any key.
pub struct ErrorScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    cleaned_up: bool,
}

impl ErrorScreen {
    /// Enters raw mode and the alternate screen.
    ///
    /// # Errors
    /// - If the terminal cannot be initialized
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            cleaned_up: false,
        })
    }

    /// Shows `message` until a key is pressed.
    ///
    /// # Errors
    /// - If terminal rendering or input polling fails
    pub fn show_error(&mut self, message: &str) -> anyhow::Result<()> {
        loop {
            self.terminal.draw(|frame| {
                let area = frame.area();
                frame.render_widget(Block::default().style(Style::default().bg(ERROR_BG)), area);

                let lines: Vec<Line> = message
                    .lines()
                    .map(Line::from)
                    .chain([Line::from(""), Line::from("Press any key to exit.")])
                    .collect();
                let text_height = (lines.len() as u16).min(area.height);

                let text_area = Rect {
                    x: area.x + area.width / 10,
                    y: area.y + area.height.saturating_sub(text_height) / 2,
                    width: area.width * 8 / 10,
                    height: area.height.saturating_sub(area.height.saturating_sub(text_height) / 2),
                };

                let paragraph = Paragraph::new(lines)
                    .style(Style::default().fg(ERROR_FG).bg(ERROR_BG))
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true });
                frame.render_widget(paragraph, text_area);
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Restores the terminal.
    ///
    /// # Errors
    /// - If terminal mode cannot be restored
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        if self.cleaned_up {
            return Ok(());
        }
        self.cleaned_up = true;

        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for ErrorScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Shows `message` on an [`ErrorScreen`] and restores the terminal afterwards.
///
/// # Errors
/// - If the terminal cannot be driven
pub fn show_error_screen(message: &str) -> anyhow::Result<()> {
    let mut screen = ErrorScreen::new()?;
    screen.show_error(message)?;
    screen.cleanup()
}
