//! Final quiz: question bank and scoring.
//!
//! Every correct answer is worth `100 / N` points, so a perfect run scores 100.

/// A multiple-choice question.
#[derive(Debug)]
pub struct Question {
    pub prompt: &'static str,
    pub answers: [&'static str; 4],
    pub correct: usize,
}

pub static QUESTIONS: [Question; 5] = [
    Question {
        prompt: "Which breathing technique best supports vocal power and steady control?",
        answers: [
            "Chest breathing",
            "Abdominal/diaphragmatic breathing",
            "Shoulder breathing",
            "Nose breathing",
        ],
        correct: 1,
    },
    Question {
        prompt: "What does 'articulation' mean in singing?",
        answers: [
            "The tempo of the song",
            "Precise pronunciation of words and lyrics",
            "How high or low a note is",
            "How loud or soft the voice is",
        ],
        correct: 1,
    },
    Question {
        prompt: "The span from the lowest to the highest note a singer can reach is called...",
        answers: ["Vocal Range", "Vocal Pitch", "Vocal Timbre", "Vocal Dynamics"],
        correct: 0,
    },
    Question {
        prompt: "Wavering the pitch at the end of a phrase to add beauty is called...",
        answers: ["Belting", "Falsetto", "Vibrato", "Chest Voice"],
        correct: 2,
    },
    Question {
        prompt: "Head voice is usually used to reach notes that are...",
        answers: ["Very low", "Very high", "Hoarse", "Whispered"],
        correct: 1,
    },
];

/// Result of answering the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub selected: usize,
    pub correct: usize,
}

impl AnswerOutcome {
    pub fn is_correct(&self) -> bool {
        self.selected == self.correct
    }
}

/// Progress through a question bank.
#[derive(Debug, Clone)]
pub struct QuizState {
    questions: &'static [Question],
    current: usize,
    correct_answers: usize,
    score: f64,
    selected: Option<usize>,
    finished: bool,
}

impl QuizState {
    pub fn new(questions: &'static [Question]) -> Self {
        Self {
            questions,
            current: 0,
            correct_answers: 0,
            score: 0.0,
            selected: None,
            finished: false,
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&'static Question> {
        if self.finished {
            None
        } else {
            self.questions.get(self.current)
        }
    }

    /// Whether the current question has already been answered.
    pub fn answered_current(&self) -> bool {
        self.selected.is_some()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn correct_answers(&self) -> usize {
        self.correct_answers
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// Answers the current question.
    ///
    /// Returns `None` once the question is answered, the quiz is over, or the
    /// index does not name an answer; repeated presses never add points twice.
    pub fn answer(&mut self, selected: usize) -> Option<AnswerOutcome> {
        if self.answered_current() {
            return None;
        }
        let question = self.current_question()?;
        if selected >= question.answers.len() {
            return None;
        }

        self.selected = Some(selected);
        let outcome = AnswerOutcome {
            selected,
            correct: question.correct,
        };
        if outcome.is_correct() {
            self.correct_answers += 1;
            // Derived from the count so a perfect run lands on exactly 100
            self.score = self.correct_answers as f64 * 100.0 / self.questions.len() as f64;
        }
        Some(outcome)
    }

    /// Moves to the next question, finishing after the last one.
    ///
    /// Does nothing until the current question has been answered.
    pub fn next(&mut self) {
        if self.finished || !self.answered_current() {
            return;
        }
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.selected = None;
        } else {
            self.finished = true;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.questions);
    }

    /// Score rounded for display.
    pub fn display_score(&self) -> u32 {
        self.score.round() as u32
    }
}

impl Default for QuizState {
    fn default() -> Self {
        Self::new(&QUESTIONS)
    }
}
