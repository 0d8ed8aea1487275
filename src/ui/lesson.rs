//! Full-screen terminal UI for the lesson.
//!
//! Draws one curriculum step at a time from a [`Lesson`] snapshot and turns
//! key presses into [`LessonCommand`]s. All state lives in the lesson; this
//! type only owns the terminal.

use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, Padding, Paragraph, Wrap},
};

use crate::audio::{MetronomeState, RecordingPhase};
use crate::curriculum::content::{
    ARTISTS, BREATHING_STAGES, POSTURE_CHECKLIST, STANCES, THEORY_PILLARS, VOICE_PROFILES,
};
use crate::curriculum::{Step, VoiceClass, Vowel, NOTES};
use crate::lesson::{BannerKind, Lesson, LessonCommand};

const BG: Color = Color::Rgb(0, 0, 0);
const FG: Color = Color::Rgb(255, 255, 255);
const ACCENT: Color = Color::Rgb(185, 207, 212);
const HELP_FG: Color = Color::Rgb(100, 100, 100);
const HIGHLIGHT_BG: Color = Color::Rgb(20, 20, 20);

/// How long input polling blocks per frame.
const FRAME: Duration = Duration::from_millis(50);

/// Terminal front end for a [`Lesson`].
pub struct LessonTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    cleaned_up: bool,
}

impl LessonTui {
    /// Enters raw mode and the alternate screen.
    ///
    /// # Errors
    /// - If the terminal cannot be initialized
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            cleaned_up: false,
        })
    }

    /// Waits up to one frame for a key and maps it for the current step.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self, lesson: &Lesson) -> anyhow::Result<Option<LessonCommand>> {
        if event::poll(FRAME)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(None);
                }
                return Ok(map_key(lesson.step(), KeyMode::of(lesson), key));
            }
        }
        Ok(None)
    }

    /// Drops every queued terminal event.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn discard_pending_input(&mut self) -> anyhow::Result<()> {
        let mut discarded = 0usize;
        while event::poll(Duration::ZERO)? {
            event::read()?;
            discarded += 1;
        }
        if discarded > 0 {
            tracing::debug!("Discarded {} event(s) queued while waiting on audio", discarded);
        }
        Ok(())
    }

    /// Draws the current step.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render(&mut self, lesson: &Lesson, now: Instant) -> anyhow::Result<()> {
        self.terminal.draw(|frame| {
            let area = frame.area();

            let padding_block = Block::default()
                .padding(Padding::uniform(1))
                .style(Style::default().bg(BG).fg(FG));
            frame.render_widget(&padding_block, area);
            let inner = padding_block.inner(area);

            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(1),
                    Constraint::Length(1),
                    Constraint::Length(1),
                ])
                .split(inner);

            render_header(frame, layout[0], lesson.step());

            let body = layout[1];
            match lesson.step() {
                Step::Welcome => render_welcome(frame, body, lesson),
                Step::Theory => render_theory(frame, body),
                Step::Breathing => render_breathing(frame, body, lesson, now),
                Step::Articulation => render_articulation(frame, body, lesson.vowel()),
                Step::Range => render_range(frame, body),
                Step::WarmUp => render_warmup(frame, body),
                Step::Studio => render_studio(frame, body, lesson),
                Step::Gallery => render_gallery(frame, body),
                Step::Quiz => render_quiz(frame, body, lesson),
                Step::Certificate => render_certificate(frame, body, lesson),
            }

            if let Some(banner) = lesson.banner() {
                let style = match banner.kind {
                    BannerKind::Info => Style::default().fg(ACCENT),
                    BannerKind::Success => Style::default().fg(Color::Green),
                    BannerKind::Error => Style::default().fg(FG).bg(Color::Red),
                };
                frame.render_widget(
                    Paragraph::new(format!(" {} ", banner.message)).style(style),
                    layout[2],
                );
            }

            frame.render_widget(
                Paragraph::new(help_text(lesson.step(), lesson.is_entering_name()))
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(HELP_FG)),
                layout[3],
            );
        })?;
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

impl Drop for LessonTui {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Maps a key press to a command for `step`.
///
/// While a name is being typed, printable keys go to the name field and only
/// Enter, Esc, Shift-Tab and Ctrl-C keep their lesson meaning.
/// Lesson state that changes what a key means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMode {
    Normal,
    /// The certificate name field has focus; printable keys are text.
    EnteringName,
    /// Every quiz question is answered; `r` starts over.
    QuizFinished,
}

impl KeyMode {
    pub fn of(lesson: &Lesson) -> Self {
        if lesson.is_entering_name() {
            Self::EnteringName
        } else if lesson.quiz().is_finished() {
            Self::QuizFinished
        } else {
            Self::Normal
        }
    }
}

pub fn map_key(step: Step, mode: KeyMode, key: KeyEvent) -> Option<LessonCommand> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(LessonCommand::Quit);
    }

    match key.code {
        KeyCode::Esc => return Some(LessonCommand::Quit),
        KeyCode::Tab => return Some(LessonCommand::Next),
        KeyCode::BackTab => return Some(LessonCommand::Previous),
        _ => {}
    }

    if mode == KeyMode::EnteringName {
        return Some(match key.code {
            KeyCode::Enter => LessonCommand::SubmitName,
            _ => LessonCommand::NameInput(key),
        });
    }

    match key.code {
        KeyCode::Char('q') => return Some(LessonCommand::Quit),
        KeyCode::Right | KeyCode::Char('n') => return Some(LessonCommand::Next),
        KeyCode::Left => return Some(LessonCommand::Previous),
        _ => {}
    }

    let digit = match key.code {
        KeyCode::Char(c) => c.to_digit(10).map(|d| d as usize),
        _ => None,
    };

    match step {
        Step::Welcome => match key.code {
            KeyCode::Enter => Some(LessonCommand::Next),
            KeyCode::Char('a') => Some(LessonCommand::ToggleAbout),
            KeyCode::Char('h') | KeyCode::Char('?') => Some(LessonCommand::ToggleHelp),
            _ => None,
        },
        Step::Breathing => match key.code {
            KeyCode::Char(' ') => Some(LessonCommand::ToggleBreathing),
            KeyCode::Enter => Some(LessonCommand::Next),
            _ => None,
        },
        Step::Articulation => match key.code {
            KeyCode::Char(c) => Vowel::from_char(c).map(LessonCommand::SelectVowel),
            KeyCode::Enter => Some(LessonCommand::Next),
            _ => None,
        },
        Step::Range => match key.code {
            KeyCode::Char('s') => Some(LessonCommand::PlayVoice(VoiceClass::Soprano)),
            KeyCode::Char('a') => Some(LessonCommand::PlayVoice(VoiceClass::Alto)),
            KeyCode::Char('t') => Some(LessonCommand::PlayVoice(VoiceClass::Tenor)),
            KeyCode::Char('b') => Some(LessonCommand::PlayVoice(VoiceClass::Bass)),
            KeyCode::Enter => Some(LessonCommand::Next),
            _ => digit
                .filter(|d| (1..=NOTES.len()).contains(d))
                .map(|d| LessonCommand::PlayNote(d - 1)),
        },
        Step::WarmUp => match key.code {
            KeyCode::Char('o') => Some(LessonCommand::OpenWarmUp),
            KeyCode::Enter => Some(LessonCommand::Next),
            _ => None,
        },
        Step::Studio => match key.code {
            KeyCode::Char('m') | KeyCode::Char(' ') => Some(LessonCommand::ToggleMetronome),
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => Some(LessonCommand::TempoUp),
            KeyCode::Char('-') | KeyCode::Down => Some(LessonCommand::TempoDown),
            KeyCode::Char('r') => Some(LessonCommand::ToggleRecording),
            KeyCode::Char('p') => Some(LessonCommand::PlayClip),
            KeyCode::Enter => Some(LessonCommand::Next),
            _ => None,
        },
        Step::Gallery => match key.code {
            KeyCode::Enter => Some(LessonCommand::Next),
            _ => digit
                .filter(|d| (1..=ARTISTS.len()).contains(d))
                .map(|d| LessonCommand::OpenArtist(d - 1)),
        },
        Step::Quiz => match key.code {
            KeyCode::Enter => Some(LessonCommand::QuizNext),
            KeyCode::Char('r') if mode == KeyMode::QuizFinished => Some(LessonCommand::ResetQuiz),
            _ => digit
                .filter(|d| (1..=4).contains(d))
                .map(|d| LessonCommand::Answer(d - 1)),
        },
        Step::Certificate => match key.code {
            KeyCode::Char('s') => Some(LessonCommand::SaveCertificate),
            KeyCode::Char('e') => Some(LessonCommand::EditName),
            _ => None,
        },
        Step::Theory => match key.code {
            KeyCode::Enter => Some(LessonCommand::Next),
            _ => None,
        },
    }
}

fn help_text(step: Step, entering_name: bool) -> &'static str {
    if entering_name {
        return "type your name, enter issue, shift-tab back, esc quit";
    }
    match step {
        Step::Welcome => "enter start, a about, h help, q quit",
        Step::Theory => "←/→ navigate, q quit",
        Step::Breathing => "space start/stop drill, ←/→ navigate, q quit",
        Step::Articulation => "a i u e o select vowel, ←/→ navigate, q quit",
        Step::Range => "1-8 play note, s/a/t/b voice sample, ←/→ navigate, q quit",
        Step::WarmUp => "o open video, ←/→ navigate, q quit",
        Step::Studio => "m metronome, +/- tempo, r record, p play clip, ←/→ navigate, q quit",
        Step::Gallery => "1-4 open performance, ←/→ navigate, q quit",
        Step::Quiz => "1-4 answer, enter next, r restart when done, ←/→ navigate, q quit",
        Step::Certificate => "s save to file, e edit name, ← back, q quit",
    }
}

fn section(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(HELP_FG))
        .padding(Padding::horizontal(1))
}

fn paragraph<'a>(lines: Vec<Line<'a>>) -> Paragraph<'a> {
    Paragraph::new(lines).wrap(Wrap { trim: true })
}

fn bold(text: impl Into<String>) -> Span<'static> {
    Span::styled(text.into(), Style::default().add_modifier(Modifier::BOLD))
}

fn render_header(frame: &mut Frame, area: Rect, step: Step) {
    let progress = if step.is_last() {
        format!("  step {}/{} (final)", step.number(), Step::ALL.len())
    } else {
        format!("  step {}/{}", step.number(), Step::ALL.len())
    };
    let lines = vec![
        Line::from(vec![
            Span::styled("MAHIR BERNYANYI", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
            Span::styled(progress, Style::default().fg(HELP_FG)),
        ]),
        Line::from(Span::styled(step.module_label(), Style::default().fg(HELP_FG))),
        Line::from(bold(step.title())),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_welcome(frame: &mut Frame, area: Rect, lesson: &Lesson) {
    let mut lines = vec![
        Line::from(""),
        Line::from(bold("Sing better, step by step.")),
        Line::from(""),
        Line::from("A guided course in essential vocal technique: theory, breathing,"),
        Line::from("articulation, ear training and a practice studio with metronome"),
        Line::from("and recorder. Finish the quiz to earn your certificate."),
        Line::from(""),
    ];

    if lesson.show_about() {
        lines.push(Line::from(bold("About")));
        lines.push(Line::from(
            "Mahir Bernyanyi is a self-paced vocal coach. Every step builds on the previous \
             one, so work through them in order.",
        ));
    } else if lesson.show_help() {
        lines.push(Line::from(bold("Help")));
        lines.push(Line::from("Use ←/→ (or tab/shift-tab) to move between steps."));
        lines.push(Line::from("Each step lists its own keys at the bottom of the screen."));
        lines.push(Line::from("Audio needs an output device; recording needs a microphone."));
    } else {
        lines.push(Line::from(Span::styled(
            "Press enter to begin.",
            Style::default().fg(ACCENT),
        )));
    }

    frame.render_widget(paragraph(lines).alignment(Alignment::Center), area);
}

fn render_theory(frame: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::from(
            "Singing is controlled speech: breath from the lungs sets the vocal folds \
             vibrating, and the spaces of the throat, mouth and nose shape the sound.",
        ),
        Line::from(""),
    ];
    for (index, pillar) in THEORY_PILLARS.iter().enumerate() {
        lines.push(Line::from(vec![bold(format!("{}. {}  ", index + 1, pillar.title))]));
        lines.push(Line::from(format!("   {}", pillar.detail)));
    }
    frame.render_widget(paragraph(lines).block(section("How the voice works")), area);
}

fn render_breathing(frame: &mut Frame, area: Rect, lesson: &Lesson, now: Instant) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let mut posture = Vec::new();
    for item in POSTURE_CHECKLIST.iter().chain(STANCES.iter()) {
        posture.push(Line::from(vec![Span::raw("✓ "), bold(item.title)]));
        posture.push(Line::from(format!("  {}", item.detail)));
    }
    posture.push(Line::from(""));
    for (index, stage) in BREATHING_STAGES.iter().enumerate() {
        posture.push(Line::from(format!("{}. {}", index + 1, stage)));
    }
    frame.render_widget(paragraph(posture).block(section("Posture")), columns[0]);

    let drill_block = section("Breathing drill");
    let drill_area = drill_block.inner(columns[1]);
    frame.render_widget(drill_block, columns[1]);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Length(3), Constraint::Min(0)])
        .split(drill_area);

    match lesson.breathing().state(now) {
        Some(state) => {
            let text = vec![
                Line::from(bold(format!("{:?}", state.phase).to_uppercase())),
                Line::from(state.phase.instruction()),
                Line::from(Span::styled(
                    format!("cycles completed: {}", state.cycles_completed),
                    Style::default().fg(HELP_FG),
                )),
            ];
            frame.render_widget(paragraph(text), rows[0]);
            let gauge = Gauge::default()
                .block(Block::default().title("abdomen"))
                .gauge_style(Style::default().fg(ACCENT).bg(HIGHLIGHT_BG))
                .ratio(f64::from(state.expansion.clamp(0.0, 1.0)));
            frame.render_widget(gauge, rows[1]);
        }
        None => {
            frame.render_widget(
                paragraph(vec![
                    Line::from("Inhale 4s, hold 2s, exhale 6s."),
                    Line::from(Span::styled("Press space to start.", Style::default().fg(ACCENT))),
                ]),
                rows[0],
            );
        }
    }
}

fn render_articulation(frame: &mut Frame, area: Rect, active: Vowel) {
    let block = section("Vowels");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(8), Constraint::Min(0)])
        .split(inner);

    let tabs: Vec<Span> = Vowel::ALL
        .iter()
        .map(|vowel| {
            let label = format!(" {} ", vowel.letter());
            if *vowel == active {
                Span::styled(label, Style::default().fg(BG).bg(ACCENT).add_modifier(Modifier::BOLD))
            } else {
                Span::raw(label)
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(tabs)), rows[0]);

    let (width, height) = active.mouth_shape();
    let mouth = Rect {
        x: rows[1].x + rows[1].width.saturating_sub(width) / 2,
        y: rows[1].y + rows[1].height.saturating_sub(height) / 2,
        width: width.min(rows[1].width),
        height: height.min(rows[1].height),
    };
    frame.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_type(ratatui::widgets::BorderType::Rounded)
            .border_style(Style::default().fg(Color::Red)),
        mouth,
    );

    frame.render_widget(
        paragraph(vec![Line::from(active.description())]).alignment(Alignment::Center),
        rows[2],
    );
}

fn render_range(frame: &mut Frame, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(0)])
        .split(area);

    let voices: Vec<Line> = VOICE_PROFILES
        .iter()
        .map(|profile| {
            let key = match profile.class {
                VoiceClass::Soprano => 's',
                VoiceClass::Alto => 'a',
                VoiceClass::Tenor => 't',
                VoiceClass::Bass => 'b',
            };
            Line::from(vec![
                Span::styled(format!("[{key}] "), Style::default().fg(ACCENT)),
                bold(format!("{:<8}", profile.name)),
                Span::raw(format!(
                    "{:<14} {:<8} {:<20} sample {}",
                    profile.register, profile.range, profile.character, profile.sample.label
                )),
            ])
        })
        .collect();
    frame.render_widget(paragraph(voices).block(section("Voice types")), rows[0]);

    let keys: Vec<Span> = NOTES
        .iter()
        .enumerate()
        .flat_map(|(index, note)| {
            [
                Span::styled(format!("[{}]", index + 1), Style::default().fg(ACCENT)),
                Span::raw(format!(" {:<4}", note.name)),
            ]
        })
        .collect();
    let lines = vec![
        Line::from(keys),
        Line::from(""),
        Line::from("Listen to each note, then sing it back on an open vowel."),
    ];
    frame.render_widget(paragraph(lines).block(section("Solfège keyboard")), rows[1]);
}

fn render_warmup(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from("Warm up for five to ten minutes before any serious practice."),
        Line::from(""),
        Line::from("• Lip trills and humming to wake up the breath support."),
        Line::from("• Sirens from low to high to stretch the range gently."),
        Line::from("• Short scales on each vowel to settle the articulation."),
        Line::from(""),
        Line::from(Span::styled(
            "Press o to open the guided warm-up video in your browser.",
            Style::default().fg(ACCENT),
        )),
    ];
    frame.render_widget(paragraph(lines).block(section("Warm-up")), area);
}

fn render_studio(frame: &mut Frame, area: Rect, lesson: &Lesson) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let metronome = lesson.metronome();
    let (state_label, state_style) = match metronome.state() {
        MetronomeState::Running(_) => ("RUNNING", Style::default().fg(Color::Green)),
        MetronomeState::Stopped => ("STOPPED", Style::default().fg(HELP_FG)),
    };
    let metronome_lines = vec![
        Line::from(bold(metronome.tempo().to_string())),
        Line::from(Span::styled(state_label, state_style)),
        Line::from(""),
        Line::from("Keep your phrasing on the beat while you sing."),
    ];
    frame.render_widget(
        paragraph(metronome_lines)
            .alignment(Alignment::Center)
            .block(section("Metronome")),
        columns[0],
    );

    let mut recorder_lines = match lesson.recording_phase() {
        RecordingPhase::Idle => vec![Line::from("Press r to start recording.")],
        RecordingPhase::Recording => vec![Line::from(Span::styled(
            "● RECORDING",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))],
        RecordingPhase::Stopped => vec![Line::from(format!(
            "Clip ready ({:.1}s). Press p to listen, r to record again.",
            lesson.clip_seconds().unwrap_or_default()
        ))],
    };
    if lesson.recording_phase() == RecordingPhase::Recording {
        recorder_lines.push(Line::from(""));
        recorder_lines.push(match lesson.pitch() {
            Some(reading) => Line::from(vec![
                bold(format!("{:>7.1} Hz  ", reading.frequency_hz)),
                Span::raw(format!("{} {:+.0}¢", reading.note.name, reading.cents)),
            ]),
            None => Line::from(Span::styled("listening...", Style::default().fg(HELP_FG))),
        });
    }
    frame.render_widget(
        paragraph(recorder_lines)
            .alignment(Alignment::Center)
            .block(section("Recorder")),
        columns[1],
    );
}

fn render_gallery(frame: &mut Frame, area: Rect) {
    let mut lines = Vec::new();
    for (index, artist) in ARTISTS.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("[{}] ", index + 1), Style::default().fg(ACCENT)),
            bold(artist.name),
            Span::styled(format!("  {}", artist.technique), Style::default().fg(HELP_FG)),
        ]));
        lines.push(Line::from(format!("    {}", artist.description)));
        lines.push(Line::from(""));
    }
    frame.render_widget(paragraph(lines).block(section("Isolated vocals")), area);
}

fn render_quiz(frame: &mut Frame, area: Rect, lesson: &Lesson) {
    let quiz = lesson.quiz();

    let Some(question) = quiz.current_question() else {
        let lines = vec![
            Line::from(""),
            Line::from(bold(format!("Your score: {}", quiz.display_score()))),
            Line::from(format!("{} of {} correct", quiz.correct_answers(), quiz.len())),
            Line::from(""),
            Line::from(Span::styled(
                "Press enter to claim your certificate or r to try again.",
                Style::default().fg(ACCENT),
            )),
        ];
        frame.render_widget(
            paragraph(lines).alignment(Alignment::Center).block(section("Result")),
            area,
        );
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!("Question {} of {}", quiz.current_index() + 1, quiz.len()),
            Style::default().fg(HELP_FG),
        )),
        Line::from(bold(question.prompt)),
        Line::from(""),
    ];
    for (index, answer) in question.answers.iter().enumerate() {
        let style = match quiz.selected() {
            Some(_) if index == question.correct => Style::default().fg(Color::Green),
            Some(selected) if selected == index => Style::default().fg(Color::Red),
            _ => Style::default(),
        };
        lines.push(Line::from(Span::styled(format!("[{}] {}", index + 1, answer), style)));
    }
    if let Some(outcome) = lesson.last_answer() {
        lines.push(Line::from(""));
        lines.push(if outcome.is_correct() {
            Line::from(Span::styled("Correct!", Style::default().fg(Color::Green)))
        } else {
            Line::from(Span::styled(
                format!("Not quite. The answer is {}.", outcome.correct + 1),
                Style::default().fg(Color::Red),
            ))
        });
        lines.push(Line::from(Span::styled(
            "Press enter to continue.",
            Style::default().fg(ACCENT),
        )));
    }
    frame.render_widget(paragraph(lines).block(section("Quiz")), area);
}

fn render_certificate(frame: &mut Frame, area: Rect, lesson: &Lesson) {
    if let Some(certificate) = lesson.certificate() {
        let text = certificate.render();
        frame.render_widget(
            Paragraph::new(text).alignment(Alignment::Center).style(Style::default().fg(FG)),
            area,
        );
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    frame.render_widget(
        paragraph(vec![
            Line::from(bold("One more step!")),
            Line::from("Enter your full name as it should appear on the certificate."),
        ]),
        rows[0],
    );

    let input = lesson.name_input();
    let input_block = Block::default().title("Full name").borders(Borders::ALL);
    let input_inner = input_block.inner(rows[1]);
    frame.render_widget(input_block, rows[1]);
    frame.render_widget(Paragraph::new(input.value()), input_inner);
    frame.set_cursor_position(Position::new(
        input_inner.x + input.visual_cursor() as u16,
        input_inner.y,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_global_keys() {
        for step in Step::ALL {
            assert_eq!(map_key(step, KeyMode::Normal, press(KeyCode::Esc)), Some(LessonCommand::Quit));
            assert_eq!(map_key(step, KeyMode::Normal, press(KeyCode::Tab)), Some(LessonCommand::Next));
            assert_eq!(map_key(step, KeyMode::Normal, press(KeyCode::Left)), Some(LessonCommand::Previous));
        }
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(Step::Certificate, KeyMode::EnteringName, ctrl_c), Some(LessonCommand::Quit));
    }

    #[test]
    fn test_step_specific_keys() {
        assert_eq!(
            map_key(Step::Welcome, KeyMode::Normal, press(KeyCode::Char('a'))),
            Some(LessonCommand::ToggleAbout)
        );
        assert_eq!(
            map_key(Step::Range, KeyMode::Normal, press(KeyCode::Char('a'))),
            Some(LessonCommand::PlayVoice(VoiceClass::Alto))
        );
        assert_eq!(
            map_key(Step::Articulation, KeyMode::Normal, press(KeyCode::Char('u'))),
            Some(LessonCommand::SelectVowel(Vowel::U))
        );
        assert_eq!(
            map_key(Step::Range, KeyMode::Normal, press(KeyCode::Char('8'))),
            Some(LessonCommand::PlayNote(7))
        );
        assert_eq!(map_key(Step::Range, KeyMode::Normal, press(KeyCode::Char('9'))), None);
        assert_eq!(
            map_key(Step::Studio, KeyMode::Normal, press(KeyCode::Char('+'))),
            Some(LessonCommand::TempoUp)
        );
        assert_eq!(
            map_key(Step::Studio, KeyMode::Normal, press(KeyCode::Char('r'))),
            Some(LessonCommand::ToggleRecording)
        );
        assert_eq!(
            map_key(Step::Gallery, KeyMode::Normal, press(KeyCode::Char('4'))),
            Some(LessonCommand::OpenArtist(3))
        );
        assert_eq!(map_key(Step::Gallery, KeyMode::Normal, press(KeyCode::Char('5'))), None);
        assert_eq!(
            map_key(Step::Quiz, KeyMode::Normal, press(KeyCode::Char('2'))),
            Some(LessonCommand::Answer(1))
        );
        assert_eq!(
            map_key(Step::Quiz, KeyMode::Normal, press(KeyCode::Enter)),
            Some(LessonCommand::QuizNext)
        );
    }

    #[test]
    fn test_name_entry_captures_letters() {
        let q = press(KeyCode::Char('q'));
        assert_eq!(
            map_key(Step::Certificate, KeyMode::EnteringName, q),
            Some(LessonCommand::NameInput(q))
        );

        let left = press(KeyCode::Left);
        assert_eq!(
            map_key(Step::Certificate, KeyMode::EnteringName, left),
            Some(LessonCommand::NameInput(left))
        );

        assert_eq!(
            map_key(Step::Certificate, KeyMode::EnteringName, press(KeyCode::Enter)),
            Some(LessonCommand::SubmitName)
        );
        assert_eq!(
            map_key(Step::Certificate, KeyMode::EnteringName, press(KeyCode::BackTab)),
            Some(LessonCommand::Previous)
        );
    }

    #[test]
    fn test_quiz_restart_only_after_last_question() {
        let r = press(KeyCode::Char('r'));
        assert_eq!(map_key(Step::Quiz, KeyMode::Normal, r), None);
        assert_eq!(
            map_key(Step::Quiz, KeyMode::QuizFinished, r),
            Some(LessonCommand::ResetQuiz)
        );
        assert_eq!(
            map_key(Step::Studio, KeyMode::QuizFinished, r),
            Some(LessonCommand::ToggleRecording)
        );
    }

    #[test]
    fn test_every_step_has_help() {
        for step in Step::ALL {
            assert!(!help_text(step, false).is_empty());
        }
    }
}
