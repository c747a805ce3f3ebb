//! Synthetic input for automated players.
//!
//! Each computer player owns one generator thread that presses uniformly
//! random slots into the player's action queue. It goes through the same
//! bounded queue as human input, so it blocks while the player is busy or
//! frozen instead of flooding it.

use std::io;
use std::thread::{self, JoinHandle};

use tracing::info;

use crate::core::{GameRng, PlayerId, Slot};
use crate::protocol::ActionSender;

/// Start the generator. The thread returns the number of presses it made
/// once the player's shutdown signal fires.
pub(crate) fn spawn_generator(
    player: PlayerId,
    actions: ActionSender,
    mut rng: GameRng,
    table_size: usize,
) -> io::Result<JoinHandle<u64>> {
    thread::Builder::new()
        .name(format!("computer-{}", player.0))
        .spawn(move || {
            info!(%player, "generator thread starting");
            let mut presses = 0u64;
            loop {
                let slot = Slot(rng.gen_range_usize(0..table_size) as u16);
                if !actions.press(slot) {
                    break;
                }
                presses += 1;
            }
            info!(%player, presses, "generator thread terminated");
            presses
        })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::protocol::{action_queue, Shutdown};

    #[test]
    fn test_generator_respects_backpressure_and_shutdown() {
        let shutdown = Shutdown::new();
        let (tx, rx) = action_queue(3, shutdown.clone());
        let generator = spawn_generator(PlayerId(1), tx, GameRng::new(9), 12).unwrap();

        // Nobody consumes: the generator fills the queue and blocks.
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(rx.len(), 3);

        for _ in 0..5 {
            let slot = rx.next().unwrap();
            assert!(slot.index() < 12);
        }

        shutdown.trigger();
        let presses = generator.join().unwrap();
        assert!(presses >= 5);
    }
}
