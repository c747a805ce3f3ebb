//! Game wiring.
//!
//! `Game::start` validates the configuration, builds the shared pieces and
//! starts the dealer thread, which in turn starts one thread per player (and
//! one input generator per computer player). The returned `GameHandle` feeds
//! input in and collects the `GameOutcome` at the end.
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use rust_set::core::GameConfig;
//! use rust_set::display::NullDisplay;
//! use rust_set::game::Game;
//! use rust_set::oracle::ClassicSet;
//!
//! let config = GameConfig::default().with_players(0, 3);
//! let oracle = ClassicSet::from_config(&config)?;
//! let game = Game::start(config, Arc::new(oracle), Arc::new(NullDisplay))?;
//!
//! std::thread::sleep(Duration::from_secs(10));
//! game.terminate();
//! let outcome = game.join()?;
//! println!("winners: {:?}", outcome.winners);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod clock;
mod computer;
mod dealer;
mod player;

pub use clock::{ClockReading, RoundClock};
pub use dealer::{Dealer, DealerState, GameOutcome};
pub use player::{Player, PlayerHandle, PlayerState, PlayerSummary};

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::board::Table;
use crate::core::{ConfigError, GameConfig, GameError, PlayerId, PlayerMap, Slot};
use crate::display::DisplaySink;
use crate::oracle::SetOracle;
use crate::protocol::{ClaimQueue, Shutdown};

/// State shared by the dealer and every player.
pub struct GameContext {
    pub config: GameConfig,
    pub table: Table,
    pub claims: ClaimQueue,
    pub oracle: Arc<dyn SetOracle>,
    pub display: Arc<dyn DisplaySink>,
}

impl GameContext {
    /// Validate `config` against itself and the oracle, then build an empty
    /// table and claim queue.
    pub fn new(
        config: GameConfig,
        oracle: Arc<dyn SetOracle>,
        display: Arc<dyn DisplaySink>,
    ) -> Result<Arc<Self>, ConfigError> {
        config.validate()?;
        if oracle.claim_size() != config.feature_size {
            return Err(ConfigError::OracleClaimSize {
                oracle: oracle.claim_size(),
                config: config.feature_size,
            });
        }

        Ok(Arc::new(Self {
            table: Table::from_config(&config),
            claims: ClaimQueue::new(config.player_count()),
            config,
            oracle,
            display,
        }))
    }
}

impl std::fmt::Debug for GameContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameContext")
            .field("config", &self.config)
            .field("claims", &self.claims)
            .finish_non_exhaustive()
    }
}

/// Entry point.
#[derive(Debug)]
pub struct Game;

impl Game {
    /// Start a game on a new dealer thread.
    pub fn start(
        config: GameConfig,
        oracle: Arc<dyn SetOracle>,
        display: Arc<dyn DisplaySink>,
    ) -> Result<GameHandle, GameError> {
        let ctx = GameContext::new(config, oracle, display)?;
        let dealer = Dealer::new(Arc::clone(&ctx));
        let players = dealer.handles().clone();
        let shutdown = dealer.shutdown();

        let thread = thread::Builder::new()
            .name("dealer".into())
            .spawn(move || dealer.run())
            .map_err(|source| GameError::Spawn {
                name: "dealer".into(),
                source,
            })?;

        Ok(GameHandle {
            ctx,
            players,
            shutdown,
            thread,
        })
    }
}

/// Handle to a running game.
pub struct GameHandle {
    ctx: Arc<GameContext>,
    players: PlayerMap<PlayerHandle>,
    shutdown: Shutdown,
    thread: JoinHandle<Result<GameOutcome, GameError>>,
}

impl GameHandle {
    /// Forward a slot press to a player. Blocks while that player's input
    /// queue is full; returns `false` for an unknown or terminated player.
    pub fn key_pressed(&self, player: PlayerId, slot: Slot) -> bool {
        self.players.get(player).is_some_and(|handle| handle.key_pressed(slot))
    }

    #[must_use]
    pub fn player(&self, player: PlayerId) -> Option<&PlayerHandle> {
        self.players.get(player)
    }

    #[must_use]
    pub fn players(&self) -> &PlayerMap<PlayerHandle> {
        &self.players
    }

    #[must_use]
    pub fn score(&self, player: PlayerId) -> Option<u32> {
        self.players.get(player).map(PlayerHandle::score)
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.ctx.config
    }

    #[must_use]
    pub fn table(&self) -> &Table {
        &self.ctx.table
    }

    #[must_use]
    pub fn claims(&self) -> &ClaimQueue {
        &self.ctx.claims
    }

    /// Ask the game to stop. The dealer finishes the current step, tears
    /// the players down and reports the outcome through `join`.
    pub fn terminate(&self) {
        self.shutdown.trigger();
        self.ctx.claims.interrupt();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the dealer thread and return the outcome.
    pub fn join(self) -> Result<GameOutcome, GameError> {
        self.thread
            .join()
            .map_err(|_| GameError::ThreadPanicked("dealer".into()))?
    }
}
