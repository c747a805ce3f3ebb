//! Per-player action queue.
//!
//! Slot presses from the input source and from the automated generator
//! share one bounded queue. Producers block while it is full instead of
//! dropping presses; both ends give up as soon as the player's shutdown
//! signal fires.

use crossbeam_channel::{bounded, select, Receiver, Sender};

use crate::core::Slot;

use super::Shutdown;

/// Create a queue of `capacity` pending presses tied to `shutdown`.
#[must_use]
pub fn action_queue(capacity: usize, shutdown: Shutdown) -> (ActionSender, ActionReceiver) {
    let (tx, rx) = bounded(capacity.max(1));
    (
        ActionSender {
            tx,
            shutdown: shutdown.clone(),
        },
        ActionReceiver { rx, shutdown },
    )
}

/// Producer end. Cloned for every input source.
#[derive(Clone, Debug)]
pub struct ActionSender {
    tx: Sender<Slot>,
    shutdown: Shutdown,
}

impl ActionSender {
    /// Queue a press, blocking while the queue is full.
    ///
    /// Returns `false` once the player is shutting down.
    pub fn press(&self, slot: Slot) -> bool {
        if self.shutdown.is_triggered() {
            return false;
        }
        select! {
            send(self.tx, slot) -> sent => sent.is_ok(),
            recv(self.shutdown.signal()) -> _ => false,
        }
    }
}

/// Consumer end, owned by the player loop.
#[derive(Debug)]
pub struct ActionReceiver {
    rx: Receiver<Slot>,
    shutdown: Shutdown,
}

impl ActionReceiver {
    /// Block for the next press. `None` once the player is shutting down.
    pub fn next(&self) -> Option<Slot> {
        if self.shutdown.is_triggered() {
            return None;
        }
        select! {
            recv(self.rx) -> slot => slot.ok(),
            recv(self.shutdown.signal()) -> _ => None,
        }
    }

    /// Throw away every queued press. Returns how many were dropped.
    pub fn discard_pending(&self) -> usize {
        self.rx.try_iter().count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_press_then_next() {
        let (tx, rx) = action_queue(3, Shutdown::new());
        assert!(tx.press(Slot(4)));
        assert!(tx.press(Slot(1)));
        assert_eq!(rx.next(), Some(Slot(4)));
        assert_eq!(rx.next(), Some(Slot(1)));
    }

    #[test]
    fn test_full_queue_blocks_producer() {
        let (tx, rx) = action_queue(1, Shutdown::new());
        assert!(tx.press(Slot(0)));

        let producer = {
            let tx = tx.clone();
            thread::spawn(move || tx.press(Slot(1)))
        };
        thread::sleep(Duration::from_millis(10));
        assert_eq!(rx.len(), 1);

        assert_eq!(rx.next(), Some(Slot(0)));
        assert!(producer.join().unwrap());
        assert_eq!(rx.next(), Some(Slot(1)));
    }

    #[test]
    fn test_shutdown_releases_both_ends() {
        let shutdown = Shutdown::new();
        let (tx, rx) = action_queue(1, shutdown.clone());
        assert!(tx.press(Slot(0)));

        let producer = thread::spawn(move || tx.press(Slot(1)));
        thread::sleep(Duration::from_millis(10));
        shutdown.trigger();

        assert!(!producer.join().unwrap());
        assert_eq!(rx.next(), None);
    }

    #[test]
    fn test_discard_pending() {
        let (tx, rx) = action_queue(3, Shutdown::new());
        tx.press(Slot(0));
        tx.press(Slot(1));
        assert_eq!(rx.discard_pending(), 2);
        assert!(rx.is_empty());
    }
}
