//! Display sinks.
//!
//! The dealer and players report everything a front end would render
//! through `DisplaySink`. The engine never depends on how, or whether, the
//! events are shown.
//!
//! - `TracingDisplay`: structured `tracing` events, used by the binary
//! - `NullDisplay`: discards everything
//! - `EventLog`: records every event, for tests and replays

mod recorder;

pub use recorder::{DisplayEvent, EventLog};

use std::time::Duration;

use tracing::{debug, info};

use crate::core::{CardId, PlayerId, Slot};

/// Receiver of display updates. Every method defaults to doing nothing.
///
/// Calls arrive from the dealer and player threads concurrently, sometimes
/// with the table lock held: implementations must be quick and must not
/// call back into the game.
pub trait DisplaySink: Send + Sync {
    fn place_card(&self, _card: CardId, _slot: Slot) {}

    fn remove_card(&self, _slot: Slot) {}

    fn place_token(&self, _player: PlayerId, _slot: Slot) {}

    fn remove_token(&self, _player: PlayerId, _slot: Slot) {}

    fn set_score(&self, _player: PlayerId, _score: u32) {}

    /// Remaining freeze for a player; zero when the freeze is over.
    fn set_freeze(&self, _player: PlayerId, _remaining: Duration) {}

    /// Remaining round time in countdown mode.
    fn set_countdown(&self, _remaining: Duration, _warning: bool) {}

    /// Time since the last table change in elapsed mode.
    fn set_elapsed(&self, _elapsed: Duration) {}

    fn announce_winners(&self, _winners: &[PlayerId]) {}
}

/// Sink that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullDisplay;

impl DisplaySink for NullDisplay {}

/// Sink that renders events as `tracing` records.
///
/// Table and clock traffic goes to `debug`, scores and winners to `info`.
#[derive(Clone, Debug, Default)]
pub struct TracingDisplay {
    names: Vec<String>,
}

impl TracingDisplay {
    /// Use `names[i]` for player `i` where available.
    #[must_use]
    pub fn with_names(names: Vec<String>) -> Self {
        Self { names }
    }

    fn name(&self, player: PlayerId) -> String {
        self.names
            .get(player.index())
            .cloned()
            .unwrap_or_else(|| player.to_string())
    }
}

impl DisplaySink for TracingDisplay {
    fn place_card(&self, card: CardId, slot: Slot) {
        debug!(%card, %slot, "card placed");
    }

    fn remove_card(&self, slot: Slot) {
        debug!(%slot, "card removed");
    }

    fn place_token(&self, player: PlayerId, slot: Slot) {
        debug!(player = %self.name(player), %slot, "token placed");
    }

    fn remove_token(&self, player: PlayerId, slot: Slot) {
        debug!(player = %self.name(player), %slot, "token removed");
    }

    fn set_score(&self, player: PlayerId, score: u32) {
        info!(player = %self.name(player), score, "score");
    }

    fn set_freeze(&self, player: PlayerId, remaining: Duration) {
        debug!(player = %self.name(player), remaining_ms = remaining.as_millis() as u64, "freeze");
    }

    fn set_countdown(&self, remaining: Duration, warning: bool) {
        // Only whole seconds are worth a log line.
        if remaining.subsec_millis() < 100 || warning {
            debug!(remaining_ms = remaining.as_millis() as u64, warning, "countdown");
        }
    }

    fn set_elapsed(&self, elapsed: Duration) {
        if elapsed.subsec_millis() < 100 {
            debug!(elapsed_ms = elapsed.as_millis() as u64, "elapsed");
        }
    }

    fn announce_winners(&self, winners: &[PlayerId]) {
        let names: Vec<String> = winners.iter().map(|&p| self.name(p)).collect();
        info!(winners = ?names, "game over");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_display_names() {
        let display = TracingDisplay::with_names(vec!["Ada".to_string()]);
        assert_eq!(display.name(PlayerId(0)), "Ada");
        assert_eq!(display.name(PlayerId(1)), "Player 1");
    }

    #[test]
    fn test_null_display_accepts_everything() {
        let display: &dyn DisplaySink = &NullDisplay;
        display.place_card(CardId(1), Slot(0));
        display.set_score(PlayerId(0), 3);
        display.announce_winners(&[PlayerId(0)]);
    }
}
