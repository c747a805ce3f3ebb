//! The dealer's pool of undealt cards.
//!
//! Only the dealer thread owns a `Deck`, so it needs no locking. Cards leave
//! it when dealt and come back when the dealer sweeps the table for a
//! reshuffle.

use crate::core::{CardId, DeckError, GameRng};
use crate::oracle::SetOracle;

/// Undealt cards. The top of the deck is the end of the vector.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<CardId>,
}

impl Deck {
    /// A full deck holding every card id in `0..deck_size`, unshuffled.
    #[must_use]
    pub fn new(deck_size: usize) -> Self {
        Self {
            cards: CardId::all(deck_size).collect(),
        }
    }

    /// A deck with exactly these cards, the last one on top.
    #[must_use]
    pub fn from_cards(cards: Vec<CardId>) -> Self {
        Self { cards }
    }

    /// Randomize the order of the remaining cards.
    pub fn shuffle(&mut self, rng: &mut GameRng) {
        rng.shuffle(&mut self.cards);
    }

    /// Take the top card.
    pub fn draw(&mut self) -> Result<CardId, DeckError> {
        self.cards.pop().ok_or(DeckError::Exhausted)
    }

    /// Return a card from the table.
    pub fn put_back(&mut self, card: CardId) {
        debug_assert!(!self.cards.contains(&card), "{card} returned to the deck twice");
        self.cards.push(card);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Remaining cards, bottom first.
    #[must_use]
    pub fn cards(&self) -> &[CardId] {
        &self.cards
    }

    /// Whether a legal claim exists among the undealt cards together with
    /// `extra` (cards on the table, or about to be dealt).
    #[must_use]
    pub fn has_any_valid_claim(&self, oracle: &dyn SetOracle, extra: &[CardId]) -> bool {
        if extra.is_empty() {
            return oracle.any_legal_claim_exists(&self.cards);
        }
        let mut pool = Vec::with_capacity(self.cards.len() + extra.len());
        pool.extend_from_slice(&self.cards);
        pool.extend_from_slice(extra);
        oracle.any_legal_claim_exists(&pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{ClassicSet, FnOracle};

    #[test]
    fn test_new_deck_holds_universe() {
        let deck = Deck::new(12);
        assert_eq!(deck.len(), 12);
        assert_eq!(deck.cards()[0], CardId(0));
        assert!(!deck.is_empty());
    }

    #[test]
    fn test_draw_until_exhausted() {
        let mut deck = Deck::from_cards(vec![CardId(1), CardId(2)]);
        assert_eq!(deck.draw(), Ok(CardId(2)));
        assert_eq!(deck.draw(), Ok(CardId(1)));
        assert_eq!(deck.draw(), Err(DeckError::Exhausted));
        assert!(deck.is_empty());
    }

    #[test]
    fn test_shuffle_keeps_cards() {
        let mut deck = Deck::new(81);
        let mut rng = GameRng::new(7);
        deck.shuffle(&mut rng);

        assert_ne!(deck.cards(), Deck::new(81).cards());
        let mut sorted = deck.cards().to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, Deck::new(81).cards());
    }

    #[test]
    fn test_put_back() {
        let mut deck = Deck::new(3);
        let card = deck.draw().unwrap();
        assert_eq!(deck.len(), 2);
        deck.put_back(card);
        assert_eq!(deck.len(), 3);
        assert_eq!(deck.draw(), Ok(card));
    }

    #[test]
    fn test_has_any_valid_claim_combines_extra() {
        let oracle = FnOracle::new(3, |cards: &[CardId]| cards.contains(&CardId(50)));
        let deck = Deck::from_cards(vec![CardId(1), CardId(2)]);

        assert!(!deck.has_any_valid_claim(&oracle, &[]));
        assert!(!deck.has_any_valid_claim(&oracle, &[CardId(3)]));
        assert!(deck.has_any_valid_claim(&oracle, &[CardId(50)]));
    }

    #[test]
    fn test_classic_deck_has_claims() {
        let oracle = ClassicSet::new(3, 4);
        assert!(Deck::new(81).has_any_valid_claim(&oracle, &[]));
        // Two cards can never form a claim of three.
        assert!(!Deck::new(2).has_any_valid_claim(&oracle, &[]));
    }
}
