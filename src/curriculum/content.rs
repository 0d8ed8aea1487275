//! Static lesson content: notes, voice classes, vowels, breathing and the
//! inspiration gallery.

/// A solfège note. Names repeat across octaves.
#[derive(Debug, PartialEq)]
pub struct Note {
    pub name: &'static str,
    pub frequency_hz: f32,
}

/// The C-major scale from middle C to the C above.
pub static NOTES: [Note; 8] = [
    Note { name: "DO", frequency_hz: 261.63 },
    Note { name: "RE", frequency_hz: 293.66 },
    Note { name: "MI", frequency_hz: 329.63 },
    Note { name: "FA", frequency_hz: 349.23 },
    Note { name: "SOL", frequency_hz: 392.0 },
    Note { name: "LA", frequency_hz: 440.0 },
    Note { name: "SI", frequency_hz: 493.88 },
    Note { name: "DO", frequency_hz: 523.25 },
];

/// Finds the first note with the given name, ignoring case.
pub fn find_note(name: &str) -> Option<&'static Note> {
    NOTES.iter().find(|note| note.name.eq_ignore_ascii_case(name))
}

/// One of the four voice classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum VoiceClass {
    Soprano,
    Alto,
    Tenor,
    Bass,
}

/// Reference pitch for a voice classification.
#[derive(Debug, PartialEq)]
pub struct VoiceSample {
    pub frequency_hz: f32,
    pub label: &'static str,
}

/// Descriptive card for a voice classification.
#[derive(Debug)]
pub struct VoiceProfile {
    pub class: VoiceClass,
    pub name: &'static str,
    pub register: &'static str,
    pub range: &'static str,
    pub character: &'static str,
    pub sample: VoiceSample,
}

pub static VOICE_PROFILES: [VoiceProfile; 4] = [
    VoiceProfile {
        class: VoiceClass::Soprano,
        name: "Soprano",
        register: "High (female)",
        range: "C4 - C6",
        character: "Bright and ringing",
        sample: VoiceSample { frequency_hz: 783.99, label: "G5 (high)" },
    },
    VoiceProfile {
        class: VoiceClass::Alto,
        name: "Alto",
        register: "Low (female)",
        range: "F3 - F5",
        character: "Heavy and deep",
        sample: VoiceSample { frequency_hz: 349.23, label: "F4 (medium)" },
    },
    VoiceProfile {
        class: VoiceClass::Tenor,
        name: "Tenor",
        register: "High (male)",
        range: "C3 - C5",
        character: "Strong and powerful",
        sample: VoiceSample { frequency_hz: 261.63, label: "C4 (high male)" },
    },
    VoiceProfile {
        class: VoiceClass::Bass,
        name: "Bass",
        register: "Low (male)",
        range: "E2 - E4",
        character: "Resonant and thick",
        sample: VoiceSample { frequency_hz: 130.81, label: "C3 (low)" },
    },
];

impl VoiceClass {
    pub const ALL: [VoiceClass; 4] = [Self::Soprano, Self::Alto, Self::Tenor, Self::Bass];

    pub fn profile(self) -> &'static VoiceProfile {
        match self {
            Self::Soprano => &VOICE_PROFILES[0],
            Self::Alto => &VOICE_PROFILES[1],
            Self::Tenor => &VOICE_PROFILES[2],
            Self::Bass => &VOICE_PROFILES[3],
        }
    }

    pub fn sample(self) -> &'static VoiceSample {
        &self.profile().sample
    }
}

/// Vowels practised in the articulation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Vowel {
    #[default]
    A,
    I,
    U,
    E,
    O,
}

impl Vowel {
    pub const ALL: [Vowel; 5] = [Self::A, Self::I, Self::U, Self::E, Self::O];

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Self::A),
            'I' => Some(Self::I),
            'U' => Some(Self::U),
            'E' => Some(Self::E),
            'O' => Some(Self::O),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Self::A => 'A',
            Self::I => 'I',
            Self::U => 'U',
            Self::E => 'E',
            Self::O => 'O',
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::A => "Open the mouth wide vertically and let the lower jaw drop.",
            Self::I => "Pull the corners of the lips slightly sideways, tongue touching the lower teeth.",
            Self::U => "Push the lips forward into a small circle.",
            Self::E => "Mouth half open, tongue lying flat.",
            Self::O => "Round the mouth completely to maximise the resonance space inside.",
        }
    }

    /// Mouth opening as (width, height) in terminal cells.
    pub fn mouth_shape(self) -> (u16, u16) {
        match self {
            Self::A => (10, 6),
            Self::I => (14, 2),
            Self::U => (5, 3),
            Self::E => (13, 3),
            Self::O => (9, 5),
        }
    }
}

pub struct ChecklistItem {
    pub title: &'static str,
    pub detail: &'static str,
}

pub static POSTURE_CHECKLIST: [ChecklistItem; 3] = [
    ChecklistItem {
        title: "Spine",
        detail: "Imagine a thread pulling the crown of your head upwards.",
    },
    ChecklistItem {
        title: "Shoulders & chest",
        detail: "Shoulders relaxed downwards, chest open (no slouching).",
    },
    ChecklistItem {
        title: "Neck & chin",
        detail: "Chin relaxed and level with the floor for a straight airway.",
    },
];

pub static STANCES: [ChecklistItem; 2] = [
    ChecklistItem {
        title: "Standing (performance)",
        detail: "Feet shoulder-width apart, one foot slightly forward for balance.",
    },
    ChecklistItem {
        title: "Sitting (practice)",
        detail: "Sit on the edge of the chair, back off the rest, feet flat on the floor.",
    },
];

pub static BREATHING_STAGES: [&str; 5] = [
    "Relax the abdominal muscles as you begin to breathe in.",
    "Inhale deeply through the nose and feel the belly expand.",
    "The diaphragm flattens and drops, giving the lungs room downwards.",
    "Hold briefly without locking the throat.",
    "Exhale slowly on a hiss (sss...) while keeping the abdominal muscles engaged.",
];

pub static THEORY_PILLARS: [ChecklistItem; 3] = [
    ChecklistItem {
        title: "Airflow",
        detail: "Breath from the lungs is the power source of every sound you make.",
    },
    ChecklistItem {
        title: "Vibration",
        detail: "The vocal folds in the larynx vibrate as air passes, creating the raw tone.",
    },
    ChecklistItem {
        title: "Resonance",
        detail: "Throat, mouth and nasal cavities shape and amplify that tone.",
    },
];

/// A singer featured in the inspiration gallery.
pub struct Artist {
    pub name: &'static str,
    pub technique: &'static str,
    pub description: &'static str,
    pub video_id: &'static str,
}

impl Artist {
    pub fn video_url(&self) -> String {
        youtube_url(self.video_id)
    }
}

pub static ARTISTS: [Artist; 4] = [
    Artist {
        name: "Freddie Mercury",
        technique: "Belting & Power",
        description: "Hear Freddie's vocal power in 'Somebody To Love' without the band. Notice his vibrato control and remarkable resonance.",
        video_id: "6tDJXeUT2tg",
    },
    Artist {
        name: "Whitney Houston",
        technique: "Melisma & Acapella",
        description: "The most iconic melisma runs in the world. Listen to how Whitney controls pitch in the acapella 'I Will Always Love You'.",
        video_id: "k-hNjdM5NII",
    },
    Artist {
        name: "Dimash Kudaibergen",
        technique: "Mixed Voice & Range",
        description: "A vocal range beyond the usual male limits, from low notes up to high operatic pitches.",
        video_id: "OJfNaXcxM0E",
    },
    Artist {
        name: "Mariah Carey",
        technique: "Whistle Register",
        description: "The acapella studio version of 'My All'. Notice how Mariah blends a breathy tone with a delicate whistle register.",
        video_id: "Lgl7QHGFVF4",
    },
];

/// Guided warm-up routine shown in step six.
pub const WARMUP_VIDEO_ID: &str = "va8PnY-vy3c";

pub fn youtube_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_table_repeats_do_an_octave_apart() {
        let dos: Vec<&Note> = NOTES.iter().filter(|n| n.name == "DO").collect();
        assert_eq!(dos.len(), 2);
        assert!((dos[1].frequency_hz / dos[0].frequency_hz - 2.0).abs() < 0.001);
        assert!(NOTES.iter().all(|n| n.frequency_hz > 0.0));
    }

    #[test]
    fn test_find_note_returns_first_match() {
        assert_eq!(find_note("do").unwrap().frequency_hz, 261.63);
        assert_eq!(find_note("Sol").unwrap().frequency_hz, 392.0);
        assert!(find_note("ti").is_none());
    }

    #[test]
    fn test_voice_samples() {
        assert_eq!(VoiceClass::Soprano.sample().frequency_hz, 783.99);
        assert_eq!(VoiceClass::Bass.sample().label, "C3 (low)");
        for class in VoiceClass::ALL {
            assert_eq!(class.profile().class, class);
        }
    }

    #[test]
    fn test_vowel_parsing() {
        assert_eq!(Vowel::from_char('o'), Some(Vowel::O));
        assert_eq!(Vowel::from_char('x'), None);
        assert!(Vowel::ALL.iter().all(|v| Vowel::from_char(v.letter()) == Some(*v)));
    }
}
