//! Game configuration.
//!
//! `GameConfig` carries every constant the dealer and players read: table
//! geometry, claim size, deadline mode, freeze durations and seating. It
//! deserializes from TOML with every field optional:
//!
//! ```toml
//! table_size = 12
//! deadline = "countdown"
//! turn_timeout_millis = 60000
//! human_players = 1
//! computer_players = 3
//! ```
//!
//! Durations are stored as milliseconds so config files stay readable; use
//! the `Duration` accessors in code. Call `validate` before starting a game.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::{PlayerId, PlayerKind};

/// How the round deadline behaves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeadlineMode {
    /// Fixed countdown from the last card placement or removal.
    #[default]
    Countdown,
    /// Counts up from round start and never expires on its own.
    Elapsed,
    /// No timer at all.
    Disabled,
}

impl DeadlineMode {
    /// Whether a round only ends because no legal claim remains on the table.
    #[must_use]
    pub const fn ends_on_stalemate(self) -> bool {
        !matches!(self, DeadlineMode::Countdown)
    }
}

/// Complete game configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of distinct cards in the game.
    pub deck_size: usize,
    /// Number of slots on the table.
    pub table_size: usize,
    /// Cards per claim, and values per feature for the classic oracle.
    pub feature_size: usize,
    /// Features per card for the classic oracle.
    pub feature_count: usize,

    pub deadline: DeadlineMode,
    /// Round length in `Countdown` mode.
    pub turn_timeout_millis: u64,
    /// Remaining time under which the countdown is shown as a warning.
    pub turn_timeout_warning_millis: u64,

    pub point_freeze_millis: u64,
    pub penalty_freeze_millis: u64,
    /// Interval between freeze countdown updates.
    pub freeze_tick_millis: u64,
    /// Upper bound on how long the dealer waits for a claim before it
    /// refreshes the countdown and re-checks the table.
    pub poll_interval_millis: u64,
    pub end_game_pause_millis: u64,

    /// Log every legal claim on the table after each deal.
    pub hints: bool,

    pub human_players: usize,
    pub computer_players: usize,
    /// Display names by seat. Missing entries fall back to "Player N".
    pub player_names: Vec<String>,

    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            deck_size: 81,
            table_size: 12,
            feature_size: 3,
            feature_count: 4,
            deadline: DeadlineMode::Countdown,
            turn_timeout_millis: 60_000,
            turn_timeout_warning_millis: 5_000,
            point_freeze_millis: 1_000,
            penalty_freeze_millis: 3_000,
            freeze_tick_millis: 1_000,
            poll_interval_millis: 100,
            end_game_pause_millis: 5_000,
            hints: false,
            human_players: 2,
            computer_players: 0,
            player_names: Vec::new(),
            seed: 0,
        }
    }
}

impl GameConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Reject configurations that could never be played.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feature_size == 0 {
            return Err(ConfigError::EmptyClaim);
        }
        if self.feature_size > self.deck_size {
            return Err(ConfigError::ClaimLargerThanDeck {
                feature_size: self.feature_size,
                deck_size: self.deck_size,
            });
        }
        if self.feature_size > self.table_size {
            return Err(ConfigError::ClaimLargerThanTable {
                feature_size: self.feature_size,
                table_size: self.table_size,
            });
        }
        if self.table_size > usize::from(u16::MAX) {
            return Err(ConfigError::TableTooLarge(self.table_size));
        }
        if u32::try_from(self.deck_size).is_err() {
            return Err(ConfigError::DeckTooLarge(self.deck_size));
        }
        let players = self.player_count();
        if players == 0 || players > 255 {
            return Err(ConfigError::PlayerCount(players));
        }
        if self.poll_interval_millis == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.deadline == DeadlineMode::Countdown && self.turn_timeout_millis == 0 {
            return Err(ConfigError::ZeroTurnTimeout);
        }
        Ok(())
    }

    /// Total number of seats.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.human_players + self.computer_players
    }

    /// Humans take the first seats, computers the rest.
    #[must_use]
    pub fn player_kind(&self, player: PlayerId) -> PlayerKind {
        if player.index() < self.human_players {
            PlayerKind::Human
        } else {
            PlayerKind::Computer
        }
    }

    /// Display name for a seat.
    #[must_use]
    pub fn player_name(&self, player: PlayerId) -> String {
        self.player_names
            .get(player.index())
            .cloned()
            .unwrap_or_else(|| player.to_string())
    }

    #[must_use]
    pub fn turn_timeout(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_millis)
    }

    #[must_use]
    pub fn turn_timeout_warning(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_warning_millis)
    }

    #[must_use]
    pub fn point_freeze(&self) -> Duration {
        Duration::from_millis(self.point_freeze_millis)
    }

    #[must_use]
    pub fn penalty_freeze(&self) -> Duration {
        Duration::from_millis(self.penalty_freeze_millis)
    }

    #[must_use]
    pub fn freeze_tick(&self) -> Duration {
        Duration::from_millis(self.freeze_tick_millis.max(1))
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_millis)
    }

    #[must_use]
    pub fn end_game_pause(&self) -> Duration {
        Duration::from_millis(self.end_game_pause_millis)
    }

    /// Set the deck, table and claim geometry.
    #[must_use]
    pub fn with_geometry(mut self, deck_size: usize, table_size: usize, feature_size: usize) -> Self {
        self.deck_size = deck_size;
        self.table_size = table_size;
        self.feature_size = feature_size;
        self
    }

    /// Set the deadline mode and countdown length.
    #[must_use]
    pub fn with_deadline(mut self, mode: DeadlineMode, timeout: Duration) -> Self {
        self.deadline = mode;
        self.turn_timeout_millis = timeout.as_millis() as u64;
        self
    }

    /// Set point and penalty freeze durations.
    #[must_use]
    pub fn with_freezes(mut self, point: Duration, penalty: Duration) -> Self {
        self.point_freeze_millis = point.as_millis() as u64;
        self.penalty_freeze_millis = penalty.as_millis() as u64;
        self
    }

    /// Set the seating.
    #[must_use]
    pub fn with_players(mut self, human: usize, computer: usize) -> Self {
        self.human_players = human;
        self.computer_players = computer;
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_millis = interval.as_millis() as u64;
        self
    }

    #[must_use]
    pub fn with_end_game_pause(mut self, pause: Duration) -> Self {
        self.end_game_pause_millis = pause.as_millis() as u64;
        self
    }

    #[must_use]
    pub fn with_hints(mut self, hints: bool) -> Self {
        self.hints = hints;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
