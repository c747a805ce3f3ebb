//! The board behind its mutual-exclusion section.
//!
//! Every operation that reads or writes cards and tokens together runs with
//! the `Table` lock held: claim validation, card removal with token
//! eviction, a player's token toggle. One lock for the whole board keeps a
//! player's toggle and the dealer's card replacement from interleaving.

use parking_lot::{Mutex, MutexGuard};

use crate::core::GameConfig;

use super::Board;

/// Shared board, one per game, handed to the dealer and every player.
#[derive(Debug)]
pub struct Table {
    board: Mutex<Board>,
}

impl Table {
    #[must_use]
    pub fn new(table_size: usize, feature_size: usize) -> Self {
        Self {
            board: Mutex::new(Board::new(table_size, feature_size)),
        }
    }

    #[must_use]
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.table_size, config.feature_size)
    }

    /// Enter the critical section.
    pub fn lock(&self) -> MutexGuard<'_, Board> {
        self.board.lock()
    }

    /// Copy of the current board, for observers outside the protocol.
    #[must_use]
    pub fn snapshot(&self) -> Board {
        self.board.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::core::{CardId, PlayerId, Slot};

    #[test]
    fn test_concurrent_token_toggles_stay_consistent() {
        let table = Arc::new(Table::new(12, 3));
        {
            let mut board = table.lock();
            for slot in Slot::all(12) {
                board.place_card(CardId(u32::from(slot.0)), slot).unwrap();
            }
        }

        let workers: Vec<_> = (0..4u8)
            .map(|p| {
                let table = Arc::clone(&table);
                thread::spawn(move || {
                    let player = PlayerId(p);
                    for i in 0..500u16 {
                        let slot = Slot((i * 7 + u16::from(p)) % 12);
                        let mut board = table.lock();
                        if !board.remove_token(player, slot) && board.token_count(player) < 3 {
                            board.place_token(player, slot).unwrap();
                        }
                    }
                })
            })
            .collect();

        // Dealer side: swap cards underneath the players.
        for round in 0..200u32 {
            let slot = Slot((round % 12) as u16);
            let mut board = table.lock();
            let removal = board.remove_card(slot).unwrap().unwrap();
            board.place_card(removal.card, slot).unwrap();
            assert!(board.is_consistent());
        }

        for worker in workers {
            worker.join().unwrap();
        }

        let board = table.snapshot();
        assert!(board.is_consistent());
        for player in PlayerId::all(4) {
            assert!(board.token_count(player) <= 3);
        }
    }
}
