//! Recording display sink.

use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::core::{CardId, PlayerId, Slot};

use super::DisplaySink;

/// One display update, as recorded by `EventLog`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayEvent {
    PlaceCard { card: CardId, slot: Slot },
    RemoveCard { slot: Slot },
    PlaceToken { player: PlayerId, slot: Slot },
    RemoveToken { player: PlayerId, slot: Slot },
    Score { player: PlayerId, score: u32 },
    Freeze { player: PlayerId, remaining: Duration },
    Countdown { remaining: Duration, warning: bool },
    Elapsed { elapsed: Duration },
    Winners { winners: Vec<PlayerId> },
}

impl DisplayEvent {
    /// Clock ticks are noisy; most assertions skip them.
    #[must_use]
    pub fn is_clock(&self) -> bool {
        matches!(self, DisplayEvent::Countdown { .. } | DisplayEvent::Elapsed { .. })
    }
}

/// Sink that keeps every event in arrival order.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<DisplayEvent>>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: DisplayEvent) {
        self.events.lock().push(event);
    }

    /// Copy of everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<DisplayEvent> {
        self.events.lock().clone()
    }

    /// Number of recorded events matching a predicate.
    pub fn count(&self, predicate: impl Fn(&DisplayEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| predicate(e)).count()
    }

    /// Last score published for a player, if any.
    #[must_use]
    pub fn last_score(&self, player: PlayerId) -> Option<u32> {
        self.events.lock().iter().rev().find_map(|event| match event {
            DisplayEvent::Score { player: p, score } if *p == player => Some(*score),
            _ => None,
        })
    }

    /// Winner announcement, if the game has ended.
    #[must_use]
    pub fn winners(&self) -> Option<Vec<PlayerId>> {
        self.events.lock().iter().find_map(|event| match event {
            DisplayEvent::Winners { winners } => Some(winners.clone()),
            _ => None,
        })
    }
}

impl DisplaySink for EventLog {
    fn place_card(&self, card: CardId, slot: Slot) {
        self.push(DisplayEvent::PlaceCard { card, slot });
    }

    fn remove_card(&self, slot: Slot) {
        self.push(DisplayEvent::RemoveCard { slot });
    }

    fn place_token(&self, player: PlayerId, slot: Slot) {
        self.push(DisplayEvent::PlaceToken { player, slot });
    }

    fn remove_token(&self, player: PlayerId, slot: Slot) {
        self.push(DisplayEvent::RemoveToken { player, slot });
    }

    fn set_score(&self, player: PlayerId, score: u32) {
        self.push(DisplayEvent::Score { player, score });
    }

    fn set_freeze(&self, player: PlayerId, remaining: Duration) {
        self.push(DisplayEvent::Freeze { player, remaining });
    }

    fn set_countdown(&self, remaining: Duration, warning: bool) {
        self.push(DisplayEvent::Countdown { remaining, warning });
    }

    fn set_elapsed(&self, elapsed: Duration) {
        self.push(DisplayEvent::Elapsed { elapsed });
    }

    fn announce_winners(&self, winners: &[PlayerId]) {
        self.push(DisplayEvent::Winners {
            winners: winners.to_vec(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let log = EventLog::new();
        log.place_card(CardId(3), Slot(0));
        log.set_score(PlayerId(1), 1);
        log.set_score(PlayerId(1), 2);
        log.set_countdown(Duration::from_secs(1), false);

        let events = log.events();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], DisplayEvent::PlaceCard { card: CardId(3), slot: Slot(0) });
        assert!(events[3].is_clock());
        assert_eq!(log.last_score(PlayerId(1)), Some(2));
        assert_eq!(log.last_score(PlayerId(0)), None);
        assert_eq!(log.count(|e| matches!(e, DisplayEvent::Score { .. })), 2);
    }

    #[test]
    fn test_winners() {
        let log = EventLog::new();
        assert_eq!(log.winners(), None);
        log.announce_winners(&[PlayerId(0), PlayerId(2)]);
        assert_eq!(log.winners(), Some(vec![PlayerId(0), PlayerId(2)]));
    }

    #[test]
    fn test_events_serialize() {
        let event = DisplayEvent::Freeze {
            player: PlayerId(1),
            remaining: Duration::from_millis(500),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: DisplayEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
