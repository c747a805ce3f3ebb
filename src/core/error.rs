//! Error types.
//!
//! Only `BoardError` is fatal: it means the table's locking discipline was
//! broken somewhere. Incomplete claims and an exhausted deck are part of
//! normal play and are recovered where they occur.

use std::path::PathBuf;

use thiserror::Error;

use super::{CardId, PlayerId, Slot};

/// A precondition on the board was violated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("{slot} is outside a table of {table_size} slots")]
    SlotOutOfRange { slot: Slot, table_size: usize },
    #[error("{slot} already holds {card}")]
    SlotOccupied { slot: Slot, card: CardId },
    #[error("{card} is already on the table at {slot}")]
    CardOnTable { card: CardId, slot: Slot },
    #[error("{slot} holds no card")]
    SlotEmpty { slot: Slot },
    #[error("{player} already holds {limit} tokens")]
    TokenLimit { player: PlayerId, limit: usize },
}

/// A submitted claim no longer matches the board.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClaimError {
    #[error("{player} holds {held} of {required} tokens")]
    Incomplete {
        player: PlayerId,
        held: usize,
        required: usize,
    },
}

/// Drawing from an empty deck.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeckError {
    #[error("deck is exhausted")]
    Exhausted,
}

/// The configuration cannot describe a playable game.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("claim size {feature_size} exceeds deck size {deck_size}")]
    ClaimLargerThanDeck { feature_size: usize, deck_size: usize },
    #[error("claim size {feature_size} exceeds table size {table_size}")]
    ClaimLargerThanTable { feature_size: usize, table_size: usize },
    #[error("claim size must be at least 1")]
    EmptyClaim,
    #[error("deck size {deck_size} exceeds the {universe} distinct cards of the feature space")]
    DeckLargerThanUniverse { deck_size: usize, universe: usize },
    #[error("table size {0} does not fit in a slot index")]
    TableTooLarge(usize),
    #[error("deck size {0} does not fit in a card id")]
    DeckTooLarge(usize),
    #[error("a game needs between 1 and 255 players, got {0}")]
    PlayerCount(usize),
    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,
    #[error("countdown deadline needs a positive turn timeout")]
    ZeroTurnTimeout,
    #[error("oracle judges claims of {oracle} cards but the table uses {config}")]
    OracleClaimSize { oracle: usize, config: usize },
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level error for a game run.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid board state: {0}")]
    InvalidState(#[from] BoardError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0} thread panicked")]
    ThreadPanicked(String),
    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_error_messages() {
        let err = BoardError::SlotOccupied {
            slot: Slot(2),
            card: CardId(7),
        };
        assert_eq!(err.to_string(), "Slot(2) already holds Card(7)");

        let err = BoardError::TokenLimit {
            player: PlayerId(1),
            limit: 3,
        };
        assert_eq!(err.to_string(), "Player 1 already holds 3 tokens");
    }

    #[test]
    fn test_game_error_wraps_board_error() {
        let err: GameError = BoardError::SlotEmpty { slot: Slot(0) }.into();
        assert!(matches!(err, GameError::InvalidState(_)));
        assert_eq!(err.to_string(), "invalid board state: Slot(0) holds no card");
    }

    #[test]
    fn test_claim_error_message() {
        let err = ClaimError::Incomplete {
            player: PlayerId(0),
            held: 2,
            required: 3,
        };
        assert_eq!(err.to_string(), "Player 0 holds 2 of 3 tokens");
    }
}
