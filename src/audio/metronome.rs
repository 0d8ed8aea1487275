//! Fixed-interval metronome driven by the tokio timer.
//!
//! The scheduler is a two-state machine, `Stopped` and `Running(tempo)`. A
//! running metronome owns one spawned ticker task; every transition cancels
//! that task before anything else happens, so at most one timer is ever live.
//! Changing tempo restarts the interval from the moment of the change.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::error::AudioError;
use super::tone::ToneEmitter;

/// Something that can sound a single metronome tick.
pub trait Clicker: Send + Sync + 'static {
    fn click(&self);
}

impl Clicker for ToneEmitter {
    fn click(&self) {
        ToneEmitter::click(self);
    }
}

/// Metronome tempo in beats per minute, always within 60-180.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tempo(u16);

impl Tempo {
    pub const MIN: u16 = 60;
    pub const MAX: u16 = 180;
    pub const DEFAULT: Tempo = Tempo(120);

    pub fn new(bpm: u16) -> Result<Self, AudioError> {
        if (Self::MIN..=Self::MAX).contains(&bpm) {
            Ok(Self(bpm))
        } else {
            Err(AudioError::TempoOutOfRange(bpm))
        }
    }

    /// Builds a tempo, pulling out-of-range values to the nearest bound.
    pub fn clamped(bpm: i32) -> Self {
        Self(bpm.clamp(Self::MIN as i32, Self::MAX as i32) as u16)
    }

    pub fn bpm(self) -> u16 {
        self.0
    }

    /// Time between ticks, `60000 / bpm` milliseconds.
    pub fn interval(self) -> Duration {
        Duration::from_nanos(60_000_000_000 / self.0 as u64)
    }

    pub fn faster(self, step: u16) -> Self {
        Self::clamped(self.0 as i32 + step as i32)
    }

    pub fn slower(self, step: u16) -> Self {
        Self::clamped(self.0 as i32 - step as i32)
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} BPM", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetronomeState {
    Stopped,
    Running(Tempo),
}

/// Periodic click scheduler.
///
/// Must be driven from inside a tokio runtime. Dropping the scheduler cancels
/// the pending timer.
pub struct MetronomeScheduler {
    clicker: Arc<dyn Clicker>,
    tempo: Tempo,
    ticker: Option<JoinHandle<()>>,
}

impl MetronomeScheduler {
    pub fn new(clicker: Arc<dyn Clicker>, tempo: Tempo) -> Self {
        Self {
            clicker,
            tempo,
            ticker: None,
        }
    }

    pub fn state(&self) -> MetronomeState {
        if self.ticker.is_some() {
            MetronomeState::Running(self.tempo)
        } else {
            MetronomeState::Stopped
        }
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// Applies a tempo and on/off request in one step.
    pub fn set(&mut self, tempo: Tempo, active: bool) {
        match (self.state(), active) {
            (MetronomeState::Stopped, false) => self.tempo = tempo,
            (MetronomeState::Stopped, true) => {
                self.tempo = tempo;
                self.spawn_ticker();
            }
            (MetronomeState::Running(current), true) if current == tempo => {}
            (MetronomeState::Running(_), true) => {
                self.cancel_ticker();
                self.tempo = tempo;
                self.spawn_ticker();
                tracing::debug!("Metronome tempo changed to {}", tempo);
            }
            (MetronomeState::Running(_), false) => {
                self.cancel_ticker();
                self.tempo = tempo;
                tracing::debug!("Metronome stopped");
            }
        }
    }

    pub fn start(&mut self) {
        self.set(self.tempo, true);
    }

    pub fn stop(&mut self) {
        self.set(self.tempo, false);
    }

    pub fn toggle(&mut self) {
        let active = !self.is_running();
        self.set(self.tempo, active);
    }

    pub fn set_tempo(&mut self, tempo: Tempo) {
        let active = self.is_running();
        self.set(tempo, active);
    }

    fn spawn_ticker(&mut self) {
        let period = self.tempo.interval();
        let clicker = Arc::clone(&self.clicker);
        tracing::debug!("Metronome started at {} ({:?} per tick)", self.tempo, period);

        self.ticker = Some(tokio::spawn(async move {
            let mut ticks = time::interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                clicker.click();
            }
        }));
    }

    fn cancel_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl Drop for MetronomeScheduler {
    fn drop(&mut self) {
        self.cancel_ticker();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::stub::StubHost;
    use std::sync::Mutex;

    #[derive(Default)]
    struct TickLog {
        at: Mutex<Vec<Instant>>,
    }

    impl TickLog {
        fn count(&self) -> usize {
            self.at.lock().unwrap().len()
        }

        fn gaps(&self) -> Vec<Duration> {
            let at = self.at.lock().unwrap();
            at.windows(2).map(|w| w[1] - w[0]).collect()
        }
    }

    impl Clicker for TickLog {
        fn click(&self) {
            self.at.lock().unwrap().push(Instant::now());
        }
    }

    fn scheduler(bpm: u16) -> (MetronomeScheduler, Arc<TickLog>) {
        let log = Arc::new(TickLog::default());
        let metronome = MetronomeScheduler::new(log.clone(), Tempo::new(bpm).unwrap());
        (metronome, log)
    }

    #[test]
    fn test_tempo_bounds() {
        assert!(Tempo::new(59).is_err());
        assert!(Tempo::new(181).is_err());
        assert_eq!(Tempo::new(60).unwrap().bpm(), 60);
        assert_eq!(Tempo::new(180).unwrap().bpm(), 180);
        assert_eq!(Tempo::clamped(10).bpm(), 60);
        assert_eq!(Tempo::clamped(400).bpm(), 180);
        assert_eq!(Tempo::new(175).unwrap().faster(10).bpm(), 180);
        assert_eq!(Tempo::new(62).unwrap().slower(5).bpm(), 60);
    }

    #[test]
    fn test_tempo_interval() {
        assert_eq!(Tempo::new(60).unwrap().interval(), Duration::from_secs(1));
        assert_eq!(Tempo::new(120).unwrap().interval(), Duration::from_millis(500));
        assert_eq!(Tempo::new(180).unwrap().interval(), Duration::from_nanos(333_333_333));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_one_interval() {
        let (mut metronome, log) = scheduler(120);
        metronome.start();

        time::sleep(Duration::from_millis(499)).await;
        assert_eq!(log.count(), 0);

        time::sleep(Duration::from_millis(2)).await;
        assert_eq!(log.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_count_matches_duration() {
        let (mut metronome, log) = scheduler(120);
        metronome.start();
        assert_eq!(metronome.state(), MetronomeState::Running(Tempo::new(120).unwrap()));

        time::sleep(Duration::from_millis(2_250)).await;
        assert_eq!(log.count(), 4);
        assert!(log.gaps().iter().all(|gap| *gap == Duration::from_millis(500)));
    }

    /// Ticks expected in `elapsed`: floor(elapsed / interval).
    fn expected_ticks(bpm: u16, elapsed: Duration) -> usize {
        (elapsed.as_nanos() / Tempo::new(bpm).unwrap().interval().as_nanos()) as usize
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_count_with_fractional_interval() {
        // 333.333333ms and 857.142857ms; timer deadlines round up to whole milliseconds.
        let runs = [
            (180, Duration::from_millis(10_100)),
            (70, Duration::from_millis(6_200)),
        ];
        for (bpm, elapsed) in runs {
            let (mut metronome, log) = scheduler(bpm);
            metronome.start();

            time::sleep(elapsed).await;
            metronome.stop();
            assert_eq!(log.count(), expected_ticks(bpm, elapsed), "{bpm} BPM");

            let interval = Tempo::new(bpm).unwrap().interval();
            for gap in log.gaps() {
                assert!(gap + Duration::from_millis(1) >= interval, "{bpm} BPM gap {gap:?}");
                assert!(gap <= interval + Duration::from_millis(1), "{bpm} BPM gap {gap:?}");
            }
        }
        assert_eq!(expected_ticks(180, Duration::from_millis(10_100)), 30);
        assert_eq!(expected_ticks(70, Duration::from_millis(6_200)), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tempo_change_restarts_interval() {
        let (mut metronome, log) = scheduler(60);
        metronome.start();

        time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(log.count(), 1);

        metronome.set_tempo(Tempo::new(120).unwrap());
        time::sleep(Duration::from_millis(1_100)).await;

        assert_eq!(log.count(), 3);
        let gaps = log.gaps();
        assert_eq!(gaps[0], Duration::from_millis(1_000));
        assert!(gaps.iter().all(|gap| *gap >= Duration::from_millis(500)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_tempo_does_not_restart() {
        let (mut metronome, log) = scheduler(120);
        metronome.start();

        time::sleep(Duration::from_millis(400)).await;
        metronome.set(Tempo::new(120).unwrap(), true);
        time::sleep(Duration::from_millis(150)).await;

        assert_eq!(log.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_silences_further_ticks() {
        let (mut metronome, log) = scheduler(90);
        metronome.start();

        time::sleep(Duration::from_millis(700)).await;
        assert_eq!(log.count(), 1);

        metronome.stop();
        assert_eq!(metronome.state(), MetronomeState::Stopped);
        time::sleep(Tempo::new(90).unwrap().interval() * 3).await;
        assert_eq!(log.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_and_set_while_stopped() {
        let (mut metronome, log) = scheduler(120);
        metronome.set(Tempo::new(60).unwrap(), false);
        assert_eq!(metronome.state(), MetronomeState::Stopped);
        assert_eq!(metronome.tempo().bpm(), 60);

        metronome.toggle();
        assert!(metronome.is_running());
        time::sleep(Duration::from_millis(1_050)).await;
        assert_eq!(log.count(), 1);

        metronome.toggle();
        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(log.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_timer() {
        let (mut metronome, log) = scheduler(180);
        metronome.start();
        drop(metronome);

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(log.count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_use_click_envelope() {
        let host = Arc::new(StubHost::new());
        let emitter = Arc::new(ToneEmitter::new(host.clone(), 1.0));
        let mut metronome = MetronomeScheduler::new(emitter, Tempo::new(120).unwrap());
        metronome.start();

        time::sleep(Duration::from_millis(1_100)).await;
        metronome.stop();

        let tones = host.tones();
        assert_eq!(tones.len(), 2);
        assert!(tones.iter().all(|t| t.frequency_hz == 880.0));
        assert!(tones.iter().all(|t| t.envelope.duration == Duration::from_millis(100)));
    }
}
