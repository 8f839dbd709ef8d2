use std::time::{Duration, Instant};

/// Wall-clock game time that stands still while the game is paused.
#[derive(Clone, Debug)]
pub struct GameClock {
    started: Instant,
    paused_at: Option<Instant>,
    paused_total: Duration,
}

impl GameClock {
    pub fn start(now: Instant) -> Self {
        Self {
            started: now,
            paused_at: None,
            paused_total: Duration::ZERO,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn pause(&mut self, now: Instant) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if let Some(at) = self.paused_at.take() {
            self.paused_total += now.saturating_duration_since(at);
        }
    }

    /// Game time elapsed at `now`, excluding paused intervals.
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        let until = self.paused_at.unwrap_or(now);
        until
            .saturating_duration_since(self.started)
            .saturating_sub(self.paused_total)
    }
}
