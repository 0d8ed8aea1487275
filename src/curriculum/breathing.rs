//! Diaphragmatic breathing simulation.
//!
//! A running drill cycles inhale, hold and exhale with fixed durations. The
//! phase is derived from elapsed time, so rendering can sample it at any rate.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreathPhase {
    Inhale,
    Hold,
    Exhale,
}

impl BreathPhase {
    pub fn duration(self) -> Duration {
        match self {
            Self::Inhale => Duration::from_secs(4),
            Self::Hold => Duration::from_secs(2),
            Self::Exhale => Duration::from_secs(6),
        }
    }

    pub fn instruction(self) -> &'static str {
        match self {
            Self::Inhale => "Breathe in through the nose, let the belly expand",
            Self::Hold => "Hold gently, keep the throat open",
            Self::Exhale => "Release slowly on a hiss: sss...",
        }
    }
}

const CYCLE: [BreathPhase; 3] = [BreathPhase::Inhale, BreathPhase::Hold, BreathPhase::Exhale];

/// Snapshot of the drill at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreathState {
    pub phase: BreathPhase,
    /// Progress through the current phase, 0.0 to 1.0.
    pub progress: f32,
    /// Abdomen expansion, 0.0 (empty) to 1.0 (full).
    pub expansion: f32,
    pub cycles_completed: u32,
}

/// Toggleable breathing drill.
#[derive(Debug, Default)]
pub struct BreathingDrill {
    started_at: Option<Instant>,
}

impl BreathingDrill {
    pub fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn toggle(&mut self, now: Instant) {
        self.started_at = match self.started_at {
            Some(_) => None,
            None => Some(now),
        };
    }

    pub fn stop(&mut self) {
        self.started_at = None;
    }

    pub fn state(&self, now: Instant) -> Option<BreathState> {
        self.started_at
            .map(|start| state_at(now.saturating_duration_since(start)))
    }
}

fn cycle_length() -> Duration {
    CYCLE.iter().map(|phase| phase.duration()).sum()
}

/// Drill state after `elapsed` time.
pub fn state_at(elapsed: Duration) -> BreathState {
    let cycle = cycle_length();
    let cycles_completed = (elapsed.as_nanos() / cycle.as_nanos()) as u32;
    let mut offset = Duration::from_nanos((elapsed.as_nanos() % cycle.as_nanos()) as u64);

    for phase in CYCLE {
        if offset < phase.duration() {
            let progress = offset.as_secs_f32() / phase.duration().as_secs_f32();
            let expansion = match phase {
                BreathPhase::Inhale => progress,
                BreathPhase::Hold => 1.0,
                BreathPhase::Exhale => 1.0 - progress,
            };
            return BreathState {
                phase,
                progress,
                expansion,
                cycles_completed,
            };
        }
        offset -= phase.duration();
    }

    unreachable!("offset is always shorter than one cycle")
}
