//! # rust-set
//!
//! A concurrent dealer/player engine for real-time "find the set" card games.
//!
//! One dealer thread owns the deck and judges claims; every player runs on
//! its own thread and races the others to place tokens on the shared table.
//! Whoever completes a legal claim first scores. Everyone else's overlapping
//! claim is cancelled when the cards leave the table.
//!
//! ## Design Principles
//!
//! 1. **Rule-Agnostic**: the engine never looks inside a card. Claim
//!    legality comes from a `SetOracle`; `ClassicSet` implements the usual
//!    feature-vector rule.
//!
//! 2. **One Lock, One Judge**: the table is only touched under its mutex,
//!    and the dealer judges claims one at a time in submission order. A
//!    claim cannot score after a competing claim took its cards.
//!
//! 3. **Every Wait Is Interruptible**: input queues, verdict waits, freezes
//!    and claim polls all wake on termination, so a game can always be torn
//!    down promptly.
//!
//! ## Modules
//!
//! - `core`: ids, configuration, RNG, errors
//! - `board`: slot/card/token state and the locked `Table`
//! - `deck`: the dealer's undealt cards
//! - `oracle`: claim legality
//! - `protocol`: claim queue, verdicts, action queues, shutdown signal
//! - `display`: output sinks
//! - `game`: dealer and player loops, and the `Game` entry point

pub mod board;
pub mod core;
pub mod deck;
pub mod display;
pub mod game;
pub mod oracle;
pub mod protocol;

pub use crate::core::{
    BoardError, CardId, ClaimError, ConfigError, DeadlineMode, DeckError, GameConfig, GameError,
    GameRng, PlayerId, PlayerKind, PlayerMap, Slot,
};

pub use crate::board::{Board, Removal, Table};

pub use crate::deck::Deck;

pub use crate::oracle::{Claim, ClassicSet, FnOracle, SetOracle};

pub use crate::protocol::{ClaimQueue, Shutdown, Verdict};

pub use crate::display::{DisplayEvent, DisplaySink, EventLog, NullDisplay, TracingDisplay};

pub use crate::game::{
    Dealer, DealerState, Game, GameContext, GameHandle, GameOutcome, PlayerHandle, PlayerState,
    PlayerSummary,
};
