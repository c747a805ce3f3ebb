//! Slot↔card mapping, token sets and removal marks.
//!
//! `Board` is plain data with no locking of its own; the dealer and players
//! only ever reach it through `Table`, which serializes every access.
//!
//! ## Invariants
//!
//! - a slot holds at most one card, and `card → slot` is the exact inverse of
//!   `slot → card`
//! - a player holds at most one token per slot and at most `feature_size`
//!   tokens in total
//! - tokens only sit on occupied slots: removing a card evicts them

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::core::{BoardError, CardId, PlayerId, Slot};

/// Slots a player has tokens on, ascending.
type HeldSlots = SmallVec<[Slot; 3]>;

/// A card taken off the table, with the players whose tokens went with it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Removal {
    pub slot: Slot,
    pub card: CardId,
    /// Players that had a token on the slot, ascending.
    pub evicted: Vec<PlayerId>,
}

/// Shared table state.
#[derive(Clone, Debug)]
pub struct Board {
    feature_size: usize,
    slot_to_card: Vec<Option<CardId>>,
    card_to_slot: FxHashMap<CardId, Slot>,
    tokens: Vec<FxHashSet<PlayerId>>,
    held: FxHashMap<PlayerId, HeldSlots>,
    marked: Vec<bool>,
}

impl Board {
    /// Create an empty board with `table_size` slots and claims of
    /// `feature_size` tokens.
    #[must_use]
    pub fn new(table_size: usize, feature_size: usize) -> Self {
        Self {
            feature_size,
            slot_to_card: vec![None; table_size],
            card_to_slot: FxHashMap::default(),
            tokens: vec![FxHashSet::default(); table_size],
            held: FxHashMap::default(),
            marked: vec![false; table_size],
        }
    }

    #[must_use]
    pub fn table_size(&self) -> usize {
        self.slot_to_card.len()
    }

    /// Tokens that make up a full claim.
    #[must_use]
    pub fn feature_size(&self) -> usize {
        self.feature_size
    }

    fn check_slot(&self, slot: Slot) -> Result<(), BoardError> {
        if slot.index() < self.table_size() {
            Ok(())
        } else {
            Err(BoardError::SlotOutOfRange {
                slot,
                table_size: self.table_size(),
            })
        }
    }

    // === Cards ===

    /// Put a card on an empty slot.
    pub fn place_card(&mut self, card: CardId, slot: Slot) -> Result<(), BoardError> {
        self.check_slot(slot)?;
        if let Some(existing) = self.slot_to_card[slot.index()] {
            return Err(BoardError::SlotOccupied { slot, card: existing });
        }
        if let Some(&at) = self.card_to_slot.get(&card) {
            return Err(BoardError::CardOnTable { card, slot: at });
        }
        self.slot_to_card[slot.index()] = Some(card);
        self.card_to_slot.insert(card, slot);
        Ok(())
    }

    /// Take the card off a slot, evicting every token on it.
    ///
    /// Returns `None` if the slot was already empty.
    pub fn remove_card(&mut self, slot: Slot) -> Result<Option<Removal>, BoardError> {
        self.check_slot(slot)?;
        self.marked[slot.index()] = false;
        let Some(card) = self.slot_to_card[slot.index()].take() else {
            return Ok(None);
        };
        self.card_to_slot.remove(&card);

        let mut evicted: Vec<PlayerId> = self.tokens[slot.index()].drain().collect();
        evicted.sort_unstable();
        for player in &evicted {
            self.forget_held(*player, slot);
        }

        Ok(Some(Removal { slot, card, evicted }))
    }

    /// Remove every card, returning them in slot order.
    pub fn clear(&mut self) -> Vec<Removal> {
        let mut removed = Vec::with_capacity(self.card_to_slot.len());
        for slot in Slot::all(self.table_size()) {
            if let Ok(Some(removal)) = self.remove_card(slot) {
                removed.push(removal);
            }
        }
        removed
    }

    #[must_use]
    pub fn card_at(&self, slot: Slot) -> Option<CardId> {
        self.slot_to_card.get(slot.index()).copied().flatten()
    }

    #[must_use]
    pub fn slot_of(&self, card: CardId) -> Option<Slot> {
        self.card_to_slot.get(&card).copied()
    }

    #[must_use]
    pub fn count_cards(&self) -> usize {
        self.card_to_slot.len()
    }

    /// Cards on the table in slot order.
    #[must_use]
    pub fn cards(&self) -> Vec<CardId> {
        self.slot_to_card.iter().flatten().copied().collect()
    }

    #[must_use]
    pub fn empty_slots(&self) -> Vec<Slot> {
        Slot::all(self.table_size())
            .filter(|slot| self.slot_to_card[slot.index()].is_none())
            .collect()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.count_cards() == self.table_size()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.card_to_slot.is_empty()
    }

    // === Tokens ===

    /// Place a player's token on an occupied slot.
    ///
    /// Returns `false` if the player already had a token there.
    pub fn place_token(&mut self, player: PlayerId, slot: Slot) -> Result<bool, BoardError> {
        self.check_slot(slot)?;
        if self.slot_to_card[slot.index()].is_none() {
            return Err(BoardError::SlotEmpty { slot });
        }
        if self.has_token(player, slot) {
            return Ok(false);
        }
        if self.token_count(player) >= self.feature_size {
            return Err(BoardError::TokenLimit {
                player,
                limit: self.feature_size,
            });
        }

        self.tokens[slot.index()].insert(player);
        let held = self.held.entry(player).or_default();
        let at = held.partition_point(|&s| s < slot);
        held.insert(at, slot);
        Ok(true)
    }

    /// Remove a player's token. Returns `false` if there was none.
    pub fn remove_token(&mut self, player: PlayerId, slot: Slot) -> bool {
        let removed = self
            .tokens
            .get_mut(slot.index())
            .is_some_and(|players| players.remove(&player));
        if removed {
            self.forget_held(player, slot);
        }
        removed
    }

    fn forget_held(&mut self, player: PlayerId, slot: Slot) {
        if let Some(held) = self.held.get_mut(&player) {
            held.retain(|s| *s != slot);
            if held.is_empty() {
                self.held.remove(&player);
            }
        }
    }

    #[must_use]
    pub fn has_token(&self, player: PlayerId, slot: Slot) -> bool {
        self.tokens
            .get(slot.index())
            .is_some_and(|players| players.contains(&player))
    }

    #[must_use]
    pub fn token_count(&self, player: PlayerId) -> usize {
        self.held.get(&player).map_or(0, |held| held.len())
    }

    /// The player's tokens as (slot, card) pairs in slot order.
    #[must_use]
    pub fn tokens_of(&self, player: PlayerId) -> SmallVec<[(Slot, CardId); 3]> {
        self.held
            .get(&player)
            .into_iter()
            .flatten()
            .filter_map(|&slot| self.card_at(slot).map(|card| (slot, card)))
            .collect()
    }

    /// Players with a token on a slot, ascending.
    #[must_use]
    pub fn players_on(&self, slot: Slot) -> Vec<PlayerId> {
        let mut players: Vec<_> = self
            .tokens
            .get(slot.index())
            .into_iter()
            .flatten()
            .copied()
            .collect();
        players.sort_unstable();
        players
    }

    // === Removal staging ===

    /// Stage a slot for removal at the dealer's next refill point.
    pub fn mark_for_removal(&mut self, slot: Slot) -> Result<(), BoardError> {
        self.check_slot(slot)?;
        self.marked[slot.index()] = true;
        Ok(())
    }

    #[must_use]
    pub fn is_marked(&self, slot: Slot) -> bool {
        self.marked.get(slot.index()).copied().unwrap_or(false)
    }

    /// Take every staged slot, ascending, and clear the marks.
    pub fn consume_removal_marks(&mut self) -> Vec<Slot> {
        let mut slots = Vec::new();
        for (index, mark) in self.marked.iter_mut().enumerate() {
            if std::mem::take(mark) {
                slots.push(Slot(index as u16));
            }
        }
        slots
    }

    /// Check every structural invariant.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let mapping = self.slot_to_card.iter().enumerate().all(|(index, card)| match card {
            Some(card) => self.card_to_slot.get(card) == Some(&Slot(index as u16)),
            None => true,
        }) && self.card_to_slot.len() == self.slot_to_card.iter().flatten().count();

        let tokens_on_cards = self
            .tokens
            .iter()
            .zip(&self.slot_to_card)
            .all(|(players, card)| players.is_empty() || card.is_some());

        let held_matches = self.held.iter().all(|(player, slots)| {
            slots.len() <= self.feature_size
                && slots.windows(2).all(|w| w[0] < w[1])
                && slots.iter().all(|slot| self.tokens[slot.index()].contains(player))
        }) && self.tokens.iter().map(|players| players.len()).sum::<usize>()
            == self.held.values().map(|slots| slots.len()).sum::<usize>();

        mapping && tokens_on_cards && held_matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P0: PlayerId = PlayerId(0);
    const P1: PlayerId = PlayerId(1);

    fn board_with_cards(n: u16) -> Board {
        let mut board = Board::new(6, 3);
        for i in 0..n {
            board.place_card(CardId(u32::from(i) + 10), Slot(i)).unwrap();
        }
        board
    }

    #[test]
    fn test_place_card_sets_both_directions() {
        let board = board_with_cards(2);
        assert_eq!(board.card_at(Slot(1)), Some(CardId(11)));
        assert_eq!(board.slot_of(CardId(11)), Some(Slot(1)));
        assert_eq!(board.count_cards(), 2);
        assert!(board.is_consistent());
    }

    #[test]
    fn test_place_card_on_occupied_slot_fails() {
        let mut board = board_with_cards(1);
        assert_eq!(
            board.place_card(CardId(99), Slot(0)),
            Err(BoardError::SlotOccupied {
                slot: Slot(0),
                card: CardId(10)
            })
        );
        assert_eq!(
            board.place_card(CardId(10), Slot(3)),
            Err(BoardError::CardOnTable {
                card: CardId(10),
                slot: Slot(0)
            })
        );
        assert!(matches!(
            board.place_card(CardId(1), Slot(6)),
            Err(BoardError::SlotOutOfRange { .. })
        ));
    }

    #[test]
    fn test_remove_card_evicts_tokens() {
        let mut board = board_with_cards(3);
        board.place_token(P1, Slot(1)).unwrap();
        board.place_token(P0, Slot(1)).unwrap();
        board.place_token(P0, Slot(2)).unwrap();

        let removal = board.remove_card(Slot(1)).unwrap().unwrap();
        assert_eq!(removal.card, CardId(11));
        assert_eq!(removal.evicted, vec![P0, P1]);
        assert_eq!(board.slot_of(CardId(11)), None);
        assert_eq!(board.token_count(P0), 1);
        assert_eq!(board.token_count(P1), 0);
        assert!(board.is_consistent());
    }

    #[test]
    fn test_remove_empty_slot_is_noop() {
        let mut board = board_with_cards(1);
        assert_eq!(board.remove_card(Slot(4)), Ok(None));
        assert_eq!(board.count_cards(), 1);
    }

    #[test]
    fn test_place_token_limits() {
        let mut board = board_with_cards(5);
        assert_eq!(board.place_token(P0, Slot(0)), Ok(true));
        assert_eq!(board.place_token(P0, Slot(0)), Ok(false));
        board.place_token(P0, Slot(3)).unwrap();
        board.place_token(P0, Slot(1)).unwrap();

        assert_eq!(
            board.place_token(P0, Slot(4)),
            Err(BoardError::TokenLimit { player: P0, limit: 3 })
        );
        assert_eq!(board.token_count(P0), 3);
    }

    #[test]
    fn test_place_token_on_empty_slot_fails() {
        let mut board = board_with_cards(2);
        assert_eq!(
            board.place_token(P0, Slot(5)),
            Err(BoardError::SlotEmpty { slot: Slot(5) })
        );
        assert_eq!(board.token_count(P0), 0);
    }

    #[test]
    fn test_tokens_of_is_slot_ordered() {
        let mut board = board_with_cards(5);
        board.place_token(P0, Slot(4)).unwrap();
        board.place_token(P0, Slot(0)).unwrap();
        board.place_token(P0, Slot(2)).unwrap();

        let tokens = board.tokens_of(P0);
        assert_eq!(
            tokens.as_slice(),
            &[
                (Slot(0), CardId(10)),
                (Slot(2), CardId(12)),
                (Slot(4), CardId(14))
            ]
        );
    }

    #[test]
    fn test_remove_token() {
        let mut board = board_with_cards(2);
        board.place_token(P0, Slot(0)).unwrap();

        assert!(board.remove_token(P0, Slot(0)));
        assert!(!board.remove_token(P0, Slot(0)));
        assert!(!board.remove_token(P1, Slot(1)));
        assert!(!board.remove_token(P1, Slot(40)));
        assert_eq!(board.token_count(P0), 0);
    }

    #[test]
    fn test_removal_marks() {
        let mut board = board_with_cards(4);
        board.mark_for_removal(Slot(3)).unwrap();
        board.mark_for_removal(Slot(1)).unwrap();
        assert!(board.is_marked(Slot(1)));

        assert_eq!(board.consume_removal_marks(), vec![Slot(1), Slot(3)]);
        assert!(board.consume_removal_marks().is_empty());
        assert!(!board.is_marked(Slot(1)));
    }

    #[test]
    fn test_clear() {
        let mut board = board_with_cards(3);
        board.place_token(P0, Slot(2)).unwrap();
        board.mark_for_removal(Slot(0)).unwrap();

        let removed = board.clear();
        assert_eq!(removed.len(), 3);
        assert_eq!(removed[2].evicted, vec![P0]);
        assert!(board.is_empty());
        assert_eq!(board.empty_slots().len(), 6);
        assert!(board.consume_removal_marks().is_empty());
        assert!(board.is_consistent());
    }
}
