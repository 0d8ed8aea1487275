//! The ten-step vocal curriculum.
//!
//! Steps are visited in a fixed order; navigation clamps at both ends.

pub mod breathing;
pub mod content;

pub use breathing::{BreathPhase, BreathingDrill};
pub use content::{Vowel, VoiceClass, NOTES};

/// A step of the lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Step {
    #[default]
    Welcome,
    Theory,
    Breathing,
    Articulation,
    Range,
    WarmUp,
    Studio,
    Gallery,
    Quiz,
    Certificate,
}

impl Step {
    pub const ALL: [Step; 10] = [
        Self::Welcome,
        Self::Theory,
        Self::Breathing,
        Self::Articulation,
        Self::Range,
        Self::WarmUp,
        Self::Studio,
        Self::Gallery,
        Self::Quiz,
        Self::Certificate,
    ];

    /// One-based position in the curriculum.
    pub fn number(self) -> usize {
        Self::ALL
            .iter()
            .position(|step| *step == self)
            .map_or(1, |index| index + 1)
    }

    /// Looks up a step by its one-based number.
    pub fn from_number(number: usize) -> Option<Self> {
        number.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn next(self) -> Self {
        Self::from_number(self.number() + 1).unwrap_or(self)
    }

    pub fn previous(self) -> Self {
        Self::from_number(self.number() - 1).unwrap_or(self)
    }

    pub fn is_last(self) -> bool {
        self.number() == Self::ALL.len()
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Welcome => "Welcome",
            Self::Theory => "What Is Singing?",
            Self::Breathing => "Posture & Breathing",
            Self::Articulation => "Vocal Articulation",
            Self::Range => "Voice Range & Pitch",
            Self::WarmUp => "Warm-up Routine",
            Self::Studio => "Practice Studio",
            Self::Gallery => "Inspiration Gallery",
            Self::Quiz => "Final Quiz",
            Self::Certificate => "Certificate",
        }
    }

    /// Short module heading shown above the title.
    pub fn module_label(self) -> &'static str {
        match self {
            Self::Welcome => "Introduction",
            Self::Theory => "Module 1: Vocal Basics",
            Self::Breathing => "Module 2: Physical Foundation",
            Self::Articulation => "Module 3: Articulation",
            Self::Range => "Module 4: Ear Training",
            Self::WarmUp => "Module 5: Warm-up",
            Self::Studio => "Module 6: Practice",
            Self::Gallery => "Module 7: Inspiration",
            Self::Quiz => "Evaluation",
            Self::Certificate => "Graduation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_steps_numbered_in_order() {
        assert_eq!(Step::ALL.len(), 10);
        for (i, step) in Step::ALL.iter().enumerate() {
            assert_eq!(step.number(), i + 1);
            assert_eq!(Step::from_number(i + 1), Some(*step));
        }
        assert_eq!(Step::from_number(0), None);
        assert_eq!(Step::from_number(11), None);
    }

    #[test]
    fn test_navigation_clamps_at_ends() {
        assert_eq!(Step::Welcome.previous(), Step::Welcome);
        assert_eq!(Step::Welcome.next(), Step::Theory);
        assert_eq!(Step::Certificate.next(), Step::Certificate);
        assert_eq!(Step::Certificate.previous(), Step::Quiz);
        assert!(Step::Certificate.is_last());
    }
}
