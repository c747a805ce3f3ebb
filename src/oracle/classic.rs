//! The feature-vector rule of the Set card game.
//!
//! A card id is read as a number in base `feature_size`, one digit per
//! feature. A claim of `feature_size` distinct cards is legal when, for every
//! feature, the cards' values are either all equal or all different.

use smallvec::SmallVec;

use crate::core::{CardId, ConfigError, GameConfig};

use super::SetOracle;

/// Classic Set legality over `feature_count` features of `feature_size`
/// values each. With the defaults (3 values, 4 features) there are 81 cards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassicSet {
    feature_size: usize,
    feature_count: usize,
}

impl ClassicSet {
    #[must_use]
    pub fn new(feature_size: usize, feature_count: usize) -> Self {
        assert!(feature_size > 0, "feature size must be positive");
        Self {
            feature_size,
            feature_count,
        }
    }

    /// Build the oracle for a configuration, rejecting decks that need more
    /// cards than the feature space can describe.
    pub fn from_config(config: &GameConfig) -> Result<Self, ConfigError> {
        if config.feature_size == 0 {
            return Err(ConfigError::EmptyClaim);
        }
        let oracle = Self::new(config.feature_size, config.feature_count);
        let universe = oracle.universe();
        if config.deck_size > universe {
            return Err(ConfigError::DeckLargerThanUniverse {
                deck_size: config.deck_size,
                universe,
            });
        }
        Ok(oracle)
    }

    /// Number of distinct cards the feature space describes.
    #[must_use]
    pub fn universe(&self) -> usize {
        u32::try_from(self.feature_count)
            .ok()
            .and_then(|count| self.feature_size.checked_pow(count))
            .unwrap_or(usize::MAX)
    }

    /// Feature values of a card, least significant feature first.
    #[must_use]
    pub fn features(&self, card: CardId) -> SmallVec<[usize; 4]> {
        let mut rest = card.raw() as usize;
        (0..self.feature_count)
            .map(|_| {
                let value = rest % self.feature_size;
                rest /= self.feature_size;
                value
            })
            .collect()
    }

    /// Inverse of `features`.
    #[must_use]
    pub fn card_from_features(&self, features: &[usize]) -> CardId {
        let id = features
            .iter()
            .rev()
            .fold(0usize, |acc, &value| acc * self.feature_size + value);
        CardId(id as u32)
    }
}

impl SetOracle for ClassicSet {
    fn claim_size(&self) -> usize {
        self.feature_size
    }

    fn is_legal_claim(&self, cards: &[CardId]) -> bool {
        if cards.len() != self.feature_size {
            return false;
        }
        let features: SmallVec<[SmallVec<[usize; 4]>; 3]> =
            cards.iter().map(|&card| self.features(card)).collect();

        for (i, a) in cards.iter().enumerate() {
            if cards[i + 1..].contains(a) {
                return false;
            }
        }

        (0..self.feature_count).all(|feature| {
            let first = features[0][feature];
            let all_same = features.iter().all(|f| f[feature] == first);
            let all_different = features.iter().enumerate().all(|(i, f)| {
                features[i + 1..].iter().all(|g| g[feature] != f[feature])
            });
            all_same || all_different
        })
    }
}
