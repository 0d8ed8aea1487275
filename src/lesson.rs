//! Lesson state and the actions a learner can take in it.
//!
//! [`Lesson`] holds everything the ten-step walkthrough needs (current step,
//! drill state, quiz progress, the audio tools) without touching the terminal.
//! The UI maps key presses to [`LessonCommand`]s and draws from the state;
//! anything that leaves the process (browser, audio player) comes back as a
//! [`LessonEffect`] for the caller to run.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{Event, KeyEvent};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

use crate::audio::pitch::WINDOW_SIZE;
use crate::audio::{
    AudioHost, MetronomeScheduler, PitchDetector, PitchReading, RecordingPhase, RecordingSession,
    Tempo, ToneEmitter,
};
use crate::certificate::Certificate;
use crate::curriculum::content::{youtube_url, ARTISTS, WARMUP_VIDEO_ID};
use crate::curriculum::{BreathingDrill, Step, VoiceClass, Vowel, NOTES};
use crate::quiz::{AnswerOutcome, QuizState};

/// Tempo change per key press in the studio.
pub const TEMPO_STEP: u16 = 5;

/// Something the learner asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LessonCommand {
    Quit,
    Next,
    Previous,
    ToggleAbout,
    ToggleHelp,
    ToggleBreathing,
    SelectVowel(Vowel),
    PlayNote(usize),
    PlayVoice(VoiceClass),
    OpenWarmUp,
    ToggleMetronome,
    TempoUp,
    TempoDown,
    ToggleRecording,
    PlayClip,
    OpenArtist(usize),
    Answer(usize),
    /// Next question, or on to the certificate once the quiz is over.
    QuizNext,
    ResetQuiz,
    NameInput(KeyEvent),
    SubmitName,
    EditName,
    SaveCertificate,
}

/// Work the lesson hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LessonEffect {
    OpenUrl(String),
    PlayFile(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Info,
    Success,
    Error,
}

/// One-line status message shown above the footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

impl Banner {
    fn info(message: impl Into<String>) -> Self {
        Self { kind: BannerKind::Info, message: message.into() }
    }

    fn success(message: impl Into<String>) -> Self {
        Self { kind: BannerKind::Success, message: message.into() }
    }

    fn error(message: impl Into<String>) -> Self {
        Self { kind: BannerKind::Error, message: message.into() }
    }
}

/// The whole walkthrough state.
pub struct Lesson {
    step: Step,
    show_about: bool,
    show_help: bool,
    breathing: BreathingDrill,
    vowel: Vowel,
    tone: ToneEmitter,
    metronome: MetronomeScheduler,
    recording: RecordingSession,
    pitch_detector: PitchDetector,
    pitch: Option<PitchReading>,
    quiz: QuizState,
    last_answer: Option<AnswerOutcome>,
    name_input: Input,
    certificate: Option<Certificate>,
    certificate_dir: PathBuf,
    banner: Option<Banner>,
    finished: bool,
}

impl Lesson {
    /// Builds a lesson over `host`. Must be called inside a tokio runtime,
    /// since the metronome spawns its ticker there.
    pub fn new(
        host: Arc<dyn AudioHost>,
        tone_gain: f32,
        tempo: Tempo,
        certificate_dir: PathBuf,
    ) -> Self {
        let tone = ToneEmitter::new(host.clone(), tone_gain);
        let metronome = MetronomeScheduler::new(Arc::new(tone.clone()), tempo);
        Self {
            step: Step::default(),
            show_about: false,
            show_help: false,
            breathing: BreathingDrill::default(),
            vowel: Vowel::default(),
            tone,
            metronome,
            recording: RecordingSession::new(host),
            pitch_detector: PitchDetector::new(),
            pitch: None,
            quiz: QuizState::default(),
            last_answer: None,
            name_input: Input::default(),
            certificate: None,
            certificate_dir,
            banner: None,
            finished: false,
        }
    }

    /// Jumps straight to `step`.
    pub fn with_step(mut self, step: Step) -> Self {
        self.step = step;
        self
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn show_about(&self) -> bool {
        self.show_about
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn breathing(&self) -> &BreathingDrill {
        &self.breathing
    }

    pub fn vowel(&self) -> Vowel {
        self.vowel
    }

    pub fn metronome(&self) -> &MetronomeScheduler {
        &self.metronome
    }

    pub fn recording_phase(&self) -> RecordingPhase {
        self.recording.phase()
    }

    /// Length of the finished clip in seconds.
    pub fn clip_seconds(&self) -> Option<f32> {
        self.recording
            .clip()
            .map(|handle| handle.clip.duration().as_secs_f32())
    }

    pub fn pitch(&self) -> Option<PitchReading> {
        self.pitch
    }

    pub fn quiz(&self) -> &QuizState {
        &self.quiz
    }

    pub fn last_answer(&self) -> Option<AnswerOutcome> {
        self.last_answer
    }

    pub fn name_input(&self) -> &Input {
        &self.name_input
    }

    /// True while the certificate step is waiting for a name.
    pub fn is_entering_name(&self) -> bool {
        self.step == Step::Certificate && self.certificate.is_none()
    }

    pub fn certificate(&self) -> Option<&Certificate> {
        self.certificate.as_ref()
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    /// Shows feedback for `command` before it runs.
    ///
    /// Starting a recording waits on the microphone; the caller draws once
    /// after this so the learner sees that the request is pending.
    pub fn prepare(&mut self, command: &LessonCommand) {
        if self.awaits_device(command) {
            self.banner = Some(Banner::info("Requesting microphone..."));
        }
    }

    /// True when applying `command` waits on device acquisition. Keys pressed
    /// during that wait must be discarded, not replayed afterwards.
    pub fn awaits_device(&self, command: &LessonCommand) -> bool {
        *command == LessonCommand::ToggleRecording && !self.recording.is_recording()
    }

    /// Refreshes time-driven state: the live pitch readout.
    pub fn tick(&mut self) {
        self.pitch = self
            .recording
            .live_samples(WINDOW_SIZE)
            .and_then(|(samples, rate)| self.pitch_detector.detect(&samples, rate));
    }

    /// Applies one command. Audio failures become banners; nothing here ends
    /// the lesson except [`LessonCommand::Quit`].
    pub async fn apply(&mut self, command: LessonCommand, now: Instant) -> Option<LessonEffect> {
        tracing::debug!("Lesson command {:?} on step {}", command, self.step.number());

        match command {
            LessonCommand::Quit => {
                self.finished = true;
            }
            LessonCommand::Next => self.go_to(self.step.next()),
            LessonCommand::Previous => self.go_to(self.step.previous()),
            LessonCommand::ToggleAbout => {
                self.show_about = !self.show_about;
                self.show_help = false;
            }
            LessonCommand::ToggleHelp => {
                self.show_help = !self.show_help;
                self.show_about = false;
            }
            LessonCommand::ToggleBreathing => self.breathing.toggle(now),
            LessonCommand::SelectVowel(vowel) => self.vowel = vowel,
            LessonCommand::PlayNote(index) => {
                if let Some(note) = NOTES.get(index) {
                    self.tone.play(note.frequency_hz);
                }
            }
            LessonCommand::PlayVoice(class) => self.tone.play(class.sample().frequency_hz),
            LessonCommand::OpenWarmUp => {
                return Some(LessonEffect::OpenUrl(youtube_url(WARMUP_VIDEO_ID)));
            }
            LessonCommand::ToggleMetronome => self.metronome.toggle(),
            LessonCommand::TempoUp => {
                let tempo = self.metronome.tempo().faster(TEMPO_STEP);
                self.metronome.set_tempo(tempo);
            }
            LessonCommand::TempoDown => {
                let tempo = self.metronome.tempo().slower(TEMPO_STEP);
                self.metronome.set_tempo(tempo);
            }
            LessonCommand::ToggleRecording => self.toggle_recording().await,
            LessonCommand::PlayClip => match self.recording.clip() {
                Some(handle) => return Some(LessonEffect::PlayFile(handle.url.path.clone())),
                None => self.banner = Some(Banner::info("Record something first.")),
            },
            LessonCommand::OpenArtist(index) => {
                if let Some(artist) = ARTISTS.get(index) {
                    return Some(LessonEffect::OpenUrl(artist.video_url()));
                }
            }
            LessonCommand::Answer(index) => {
                if let Some(outcome) = self.quiz.answer(index) {
                    self.last_answer = Some(outcome);
                }
            }
            LessonCommand::QuizNext => {
                if self.quiz.is_finished() {
                    self.go_to(Step::Certificate);
                } else {
                    self.quiz.next();
                    if !self.quiz.answered_current() {
                        self.last_answer = None;
                    }
                }
            }
            LessonCommand::ResetQuiz if self.quiz.is_finished() => {
                self.quiz.reset();
                self.last_answer = None;
            }
            LessonCommand::ResetQuiz => {}
            LessonCommand::NameInput(key) => {
                if self.is_entering_name() {
                    self.name_input.handle_event(&Event::Key(key));
                }
            }
            LessonCommand::SubmitName => self.submit_name(),
            LessonCommand::EditName => {
                self.certificate = None;
                self.banner = None;
            }
            LessonCommand::SaveCertificate => self.save_certificate(),
        }
        None
    }

    fn go_to(&mut self, step: Step) {
        if step == self.step {
            return;
        }
        if self.breathing.is_active() {
            self.breathing.stop();
        }
        self.step = step;
        self.banner = None;
    }

    async fn toggle_recording(&mut self) {
        if self.recording.is_recording() {
            self.banner = match self.recording.stop() {
                Ok(handle) => Some(Banner::success(format!(
                    "Recorded {:.1}s. Press p to listen.",
                    handle.clip.duration().as_secs_f32()
                ))),
                Err(e) => {
                    tracing::error!("Failed to finish recording: {}", e);
                    Some(Banner::error(format!("Could not save the recording: {e}")))
                }
            };
            self.pitch = None;
            return;
        }

        self.banner = match self.recording.start().await {
            Ok(()) => Some(Banner::info("Recording... press r to stop.")),
            Err(e) => {
                if e.is_retryable() {
                    tracing::warn!("Microphone unavailable: {}", e);
                } else {
                    tracing::error!("Failed to start recording: {}", e);
                }
                Some(Banner::error(e.user_message()))
            }
        };
    }

    fn submit_name(&mut self) {
        if !self.is_entering_name() {
            return;
        }
        let score = self.quiz.is_finished().then(|| self.quiz.display_score());
        match Certificate::new(self.name_input.value(), score) {
            Ok(certificate) => {
                tracing::info!("Certificate issued to {}", certificate.name());
                self.certificate = Some(certificate);
                self.banner = None;
            }
            Err(e) => self.banner = Some(Banner::error(e.to_string())),
        }
    }

    fn save_certificate(&mut self) {
        let Some(certificate) = &self.certificate else {
            return;
        };
        self.banner = match certificate.save(&self.certificate_dir) {
            Ok(path) => Some(Banner::success(format!("Saved to {}", path.display()))),
            Err(e) => {
                tracing::error!("Failed to save certificate: {}", e);
                Some(Banner::error(format!("Could not save the certificate: {e}")))
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::stub::{StubHost, StubMicrophone};
    use crate::audio::MetronomeState;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn lesson_with(host: &Arc<StubHost>, dir: PathBuf) -> Lesson {
        Lesson::new(host.clone(), 0.5, Tempo::DEFAULT, dir)
    }

    async fn run(lesson: &mut Lesson, commands: &[LessonCommand]) {
        for command in commands {
            lesson.apply(command.clone(), Instant::now()).await;
        }
    }

    fn key(c: char) -> LessonCommand {
        LessonCommand::NameInput(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[tokio::test]
    async fn test_navigation_clamps_and_quit() {
        let host = Arc::new(StubHost::new());
        let mut lesson = lesson_with(&host, std::env::temp_dir());

        run(&mut lesson, &[LessonCommand::Previous]).await;
        assert_eq!(lesson.step(), Step::Welcome);

        for _ in 0..20 {
            run(&mut lesson, &[LessonCommand::Next]).await;
        }
        assert_eq!(lesson.step(), Step::Certificate);

        run(&mut lesson, &[LessonCommand::Quit]).await;
        assert!(lesson.is_finished());
    }

    #[tokio::test]
    async fn test_about_and_help_are_exclusive() {
        let host = Arc::new(StubHost::new());
        let mut lesson = lesson_with(&host, std::env::temp_dir());

        run(&mut lesson, &[LessonCommand::ToggleAbout]).await;
        assert!(lesson.show_about());
        run(&mut lesson, &[LessonCommand::ToggleHelp]).await;
        assert!(lesson.show_help());
        assert!(!lesson.show_about());
    }

    #[tokio::test]
    async fn test_leaving_breathing_step_stops_drill() {
        let host = Arc::new(StubHost::new());
        let mut lesson = lesson_with(&host, std::env::temp_dir()).with_step(Step::Breathing);

        run(&mut lesson, &[LessonCommand::ToggleBreathing]).await;
        assert!(lesson.breathing().is_active());
        run(&mut lesson, &[LessonCommand::Next]).await;
        assert!(!lesson.breathing().is_active());
    }

    #[tokio::test]
    async fn test_notes_and_voices_play_tones() {
        let host = Arc::new(StubHost::new());
        let mut lesson = lesson_with(&host, std::env::temp_dir()).with_step(Step::Range);

        run(
            &mut lesson,
            &[
                LessonCommand::PlayNote(5),
                LessonCommand::PlayVoice(VoiceClass::Bass),
                LessonCommand::PlayNote(99),
            ],
        )
        .await;

        let tones = host.tones();
        assert_eq!(tones.len(), 2);
        assert_eq!(tones[0].frequency_hz, 440.0);
        assert_eq!(tones[1].frequency_hz, 130.81);
    }

    #[tokio::test]
    async fn test_links_come_back_as_effects() {
        let host = Arc::new(StubHost::new());
        let mut lesson = lesson_with(&host, std::env::temp_dir());

        let effect = lesson.apply(LessonCommand::OpenWarmUp, Instant::now()).await;
        assert_eq!(
            effect,
            Some(LessonEffect::OpenUrl(
                "https://www.youtube.com/watch?v=va8PnY-vy3c".to_string()
            ))
        );

        let effect = lesson.apply(LessonCommand::OpenArtist(0), Instant::now()).await;
        assert_eq!(effect, Some(LessonEffect::OpenUrl(ARTISTS[0].video_url())));
        assert_eq!(lesson.apply(LessonCommand::OpenArtist(4), Instant::now()).await, None);
    }

    #[tokio::test]
    async fn test_tempo_keys_clamp() {
        let host = Arc::new(StubHost::new());
        let mut lesson = lesson_with(&host, std::env::temp_dir()).with_step(Step::Studio);

        for _ in 0..30 {
            run(&mut lesson, &[LessonCommand::TempoUp]).await;
        }
        assert_eq!(lesson.metronome().tempo().bpm(), Tempo::MAX);

        for _ in 0..30 {
            run(&mut lesson, &[LessonCommand::TempoDown]).await;
        }
        assert_eq!(lesson.metronome().tempo().bpm(), Tempo::MIN);

        run(&mut lesson, &[LessonCommand::ToggleMetronome]).await;
        assert_eq!(
            lesson.metronome().state(),
            MetronomeState::Running(Tempo::new(Tempo::MIN).unwrap())
        );
    }

    #[tokio::test]
    async fn test_recording_round_trip_through_lesson() {
        let host = Arc::new(StubHost::new().with_chunks(vec![vec![0; 1600], vec![0; 1600]]));
        let mut lesson = lesson_with(&host, std::env::temp_dir()).with_step(Step::Studio);

        lesson.prepare(&LessonCommand::ToggleRecording);
        assert_eq!(lesson.banner().unwrap().message, "Requesting microphone...");

        run(&mut lesson, &[LessonCommand::ToggleRecording]).await;
        assert_eq!(lesson.recording_phase(), RecordingPhase::Recording);

        run(&mut lesson, &[LessonCommand::ToggleRecording]).await;
        assert_eq!(lesson.recording_phase(), RecordingPhase::Stopped);
        assert_eq!(lesson.banner().unwrap().kind, BannerKind::Success);
        assert!((lesson.clip_seconds().unwrap() - 0.2).abs() < 1e-3);

        let effect = lesson.apply(LessonCommand::PlayClip, Instant::now()).await;
        assert!(matches!(effect, Some(LessonEffect::PlayFile(_))));
    }

    #[tokio::test]
    async fn test_only_starting_a_recording_awaits_the_microphone() {
        let host = Arc::new(StubHost::new());
        let mut lesson = lesson_with(&host, std::env::temp_dir()).with_step(Step::Studio);

        assert!(lesson.awaits_device(&LessonCommand::ToggleRecording));
        assert!(!lesson.awaits_device(&LessonCommand::ToggleMetronome));
        assert!(!lesson.awaits_device(&LessonCommand::PlayNote(0)));

        run(&mut lesson, &[LessonCommand::ToggleRecording]).await;
        assert_eq!(lesson.recording_phase(), RecordingPhase::Recording);

        // A repeat press queued during acquisition would stop the take at once.
        assert!(!lesson.awaits_device(&LessonCommand::ToggleRecording));
        lesson.prepare(&LessonCommand::ToggleRecording);
        assert_ne!(lesson.banner().unwrap().message, "Requesting microphone...");
        assert_eq!(host.microphone_requests(), 1);
    }

    #[tokio::test]
    async fn test_default_config_plays_full_ramp() {
        let template = include_str!("../environments/mahir.toml");
        let config = crate::config::MahirConfig::from_toml(template).unwrap();
        let host = Arc::new(StubHost::new());
        let mut lesson = Lesson::new(
            host.clone(),
            config.audio.tone_gain,
            config.metronome.tempo(),
            std::env::temp_dir(),
        )
        .with_step(Step::Range);

        run(&mut lesson, &[LessonCommand::PlayNote(5)]).await;
        ToneEmitter::new(host.clone(), config.audio.tone_gain).click();

        let tones = host.tones();
        assert_eq!(tones.len(), 2);
        assert!((tones[0].envelope.peak - 1.0).abs() < 1e-6);
        assert_eq!(tones[0].envelope.floor, 0.0001);
        assert_eq!(tones[1].envelope.floor, 0.001);
    }

    #[tokio::test]
    async fn test_denied_microphone_shows_banner_and_lesson_continues() {
        let host = Arc::new(StubHost::new());
        host.set_microphone(StubMicrophone::Denied);
        let mut lesson = lesson_with(&host, std::env::temp_dir()).with_step(Step::Studio);

        run(&mut lesson, &[LessonCommand::ToggleRecording]).await;
        assert_eq!(lesson.recording_phase(), RecordingPhase::Idle);
        let banner = lesson.banner().unwrap();
        assert_eq!(banner.kind, BannerKind::Error);
        assert!(banner.message.contains("Microphone is not active"));
        assert_eq!(host.open_streams(), 0);

        run(&mut lesson, &[LessonCommand::Next, LessonCommand::Next]).await;
        assert_eq!(lesson.step(), Step::Quiz);
        assert!(lesson.banner().is_none());
    }

    #[tokio::test]
    async fn test_play_clip_without_recording() {
        let host = Arc::new(StubHost::new());
        let mut lesson = lesson_with(&host, std::env::temp_dir());

        assert_eq!(lesson.apply(LessonCommand::PlayClip, Instant::now()).await, None);
        assert_eq!(lesson.banner().unwrap().kind, BannerKind::Info);
    }

    #[tokio::test]
    async fn test_quiz_flow_leads_to_certificate_with_score() {
        let host = Arc::new(StubHost::new());
        let dir = tempfile::tempdir().unwrap();
        let mut lesson = lesson_with(&host, dir.path().to_path_buf()).with_step(Step::Quiz);

        for _ in 0..lesson.quiz().len() {
            let correct = lesson.quiz().current_question().unwrap().correct;
            run(&mut lesson, &[LessonCommand::Answer(correct), LessonCommand::Answer(0)]).await;
            assert!(lesson.last_answer().unwrap().is_correct());
            run(&mut lesson, &[LessonCommand::QuizNext]).await;
        }
        assert!(lesson.quiz().is_finished());
        assert_eq!(lesson.quiz().display_score(), 100);

        run(&mut lesson, &[LessonCommand::QuizNext]).await;
        assert_eq!(lesson.step(), Step::Certificate);
        assert!(lesson.is_entering_name());

        run(&mut lesson, &[LessonCommand::SubmitName]).await;
        assert!(lesson.certificate().is_none());
        assert_eq!(lesson.banner().unwrap().kind, BannerKind::Error);

        run(&mut lesson, &[key('A'), key('n'), key('i'), LessonCommand::SubmitName]).await;
        let certificate = lesson.certificate().unwrap();
        assert_eq!(certificate.name(), "Ani");
        assert!(certificate.render().contains("100"));

        run(&mut lesson, &[LessonCommand::SaveCertificate]).await;
        assert_eq!(lesson.banner().unwrap().kind, BannerKind::Success);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

        run(&mut lesson, &[LessonCommand::EditName]).await;
        assert!(lesson.is_entering_name());
        assert_eq!(lesson.name_input().value(), "Ani");
    }

    #[tokio::test]
    async fn test_quiz_reset_waits_for_the_final_score() {
        let host = Arc::new(StubHost::new());
        let mut lesson = lesson_with(&host, std::env::temp_dir()).with_step(Step::Quiz);

        let correct = lesson.quiz().current_question().unwrap().correct;
        run(&mut lesson, &[LessonCommand::Answer(correct), LessonCommand::ResetQuiz]).await;
        assert!(lesson.last_answer().is_some());
        assert_eq!(lesson.quiz().display_score(), 20);

        while !lesson.quiz().is_finished() {
            let correct = lesson.quiz().current_question().unwrap().correct;
            run(&mut lesson, &[LessonCommand::Answer(correct), LessonCommand::QuizNext]).await;
        }
        run(&mut lesson, &[LessonCommand::ResetQuiz]).await;
        assert!(!lesson.quiz().is_finished());
        assert_eq!(lesson.quiz().display_score(), 0);
        assert!(lesson.last_answer().is_none());
    }

    #[tokio::test]
    async fn test_name_keys_ignored_outside_certificate() {
        let host = Arc::new(StubHost::new());
        let mut lesson = lesson_with(&host, std::env::temp_dir());

        run(&mut lesson, &[key('x')]).await;
        assert_eq!(lesson.name_input().value(), "");
    }

    #[tokio::test]
    async fn test_dropping_lesson_releases_clip() {
        let host = Arc::new(StubHost::new().with_chunks(vec![vec![1; 160]]));
        let mut lesson = lesson_with(&host, std::env::temp_dir());

        run(&mut lesson, &[LessonCommand::ToggleRecording, LessonCommand::ToggleRecording]).await;
        assert_eq!(host.handles_created(), 1);

        drop(lesson);
        assert_eq!(host.revoked_count(), 1);
        assert_eq!(host.open_streams(), 0);
    }
}
