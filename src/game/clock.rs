//! Round deadline bookkeeping.
//!
//! The clock is re-armed whenever the dealer places or removes cards. In
//! countdown mode that pushes the deadline out again; in elapsed mode it
//! restarts the displayed counter. Either mode can be collapsed, which ends
//! the round at the dealer's next check.

use std::time::{Duration, Instant};

use crate::core::{DeadlineMode, GameConfig};

/// What the clock shows right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockReading {
    Remaining { remaining: Duration, warning: bool },
    Elapsed(Duration),
    Off,
}

/// Deadline for the current round.
#[derive(Clone, Debug)]
pub struct RoundClock {
    mode: DeadlineMode,
    timeout: Duration,
    warning: Duration,
    armed_at: Instant,
    deadline: Option<Instant>,
}

impl RoundClock {
    #[must_use]
    pub fn new(mode: DeadlineMode, timeout: Duration, warning: Duration) -> Self {
        let now = Instant::now();
        let mut clock = Self {
            mode,
            timeout,
            warning,
            armed_at: now,
            deadline: None,
        };
        clock.reset(now);
        clock
    }

    #[must_use]
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.deadline, config.turn_timeout(), config.turn_timeout_warning())
    }

    #[must_use]
    pub fn mode(&self) -> DeadlineMode {
        self.mode
    }

    /// Re-arm after a table change.
    pub fn reset(&mut self, now: Instant) {
        self.armed_at = now;
        self.deadline = match self.mode {
            DeadlineMode::Countdown => Some(now + self.timeout),
            DeadlineMode::Elapsed | DeadlineMode::Disabled => None,
        };
    }

    /// End the round at the next check, whatever the mode.
    pub fn collapse(&mut self, now: Instant) {
        self.deadline = Some(now);
    }

    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Time left before the deadline, `None` without one.
    #[must_use]
    pub fn until_deadline(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|deadline| deadline.saturating_duration_since(now))
    }

    #[must_use]
    pub fn reading(&self, now: Instant) -> ClockReading {
        match self.mode {
            DeadlineMode::Countdown => {
                let remaining = self.until_deadline(now).unwrap_or_default();
                ClockReading::Remaining {
                    remaining,
                    warning: remaining <= self.warning,
                }
            }
            DeadlineMode::Elapsed => ClockReading::Elapsed(now.saturating_duration_since(self.armed_at)),
            DeadlineMode::Disabled => ClockReading::Off,
        }
    }
}
