//! Core types: identifiers, configuration, RNG and errors.
//!
//! Everything here is plain data shared by the board, the protocol
//! primitives and the dealer/player loops.

pub mod card;
pub mod config;
pub mod error;
pub mod player;
pub mod rng;

pub use card::{CardId, Slot};
pub use config::{DeadlineMode, GameConfig};
pub use error::{BoardError, ClaimError, ConfigError, DeckError, GameError};
pub use player::{PlayerId, PlayerKind, PlayerMap};
pub use rng::GameRng;
