//! Claim validity oracles.
//!
//! The engine never interprets cards. A `SetOracle` decides whether a group
//! of cards is a legal claim, and the dealer asks it whether any legal claim
//! is left among a collection of cards.
//!
//! - `ClassicSet`: the feature-vector rule of the Set card game
//! - `FnOracle`: wraps a closure, for custom rules and tests

mod classic;

pub use classic::ClassicSet;

use smallvec::SmallVec;

use crate::core::CardId;

/// Cards forming one claim, in the order they were examined.
pub type Claim = SmallVec<[CardId; 3]>;

/// Decides claim legality.
///
/// Implementations must be pure: the dealer may call them at any time and
/// from any thread.
pub trait SetOracle: Send + Sync {
    /// Number of cards in a claim.
    fn claim_size(&self) -> usize;

    /// Whether exactly these cards form a legal claim.
    fn is_legal_claim(&self, cards: &[CardId]) -> bool;

    /// Find up to `limit` legal claims among `cards`.
    ///
    /// The default implementation walks every `claim_size` combination in
    /// lexicographic index order.
    fn find_claims(&self, cards: &[CardId], limit: usize) -> Vec<Claim> {
        let mut found = Vec::new();
        let k = self.claim_size();
        if limit == 0 || k == 0 || k > cards.len() {
            return found;
        }

        let mut indices: SmallVec<[usize; 3]> = (0..k).collect();
        let mut claim = Claim::with_capacity(k);
        loop {
            claim.clear();
            claim.extend(indices.iter().map(|&i| cards[i]));
            if self.is_legal_claim(&claim) {
                found.push(claim.clone());
                if found.len() >= limit {
                    return found;
                }
            }
            if !advance(&mut indices, cards.len()) {
                return found;
            }
        }
    }

    /// Whether any legal claim exists among `cards`.
    fn any_legal_claim_exists(&self, cards: &[CardId]) -> bool {
        !self.find_claims(cards, 1).is_empty()
    }
}

/// Step `indices` to the next k-combination of `0..n`. Returns false after
/// the last one.
fn advance(indices: &mut [usize], n: usize) -> bool {
    let k = indices.len();
    let mut i = k;
    while i > 0 {
        i -= 1;
        if indices[i] < n - k + i {
            indices[i] += 1;
            for j in i + 1..k {
                indices[j] = indices[j - 1] + 1;
            }
            return true;
        }
    }
    false
}

/// Oracle backed by a closure.
///
/// ```
/// use rust_set::core::CardId;
/// use rust_set::oracle::{FnOracle, SetOracle};
///
/// // Three cards are a claim when their ids sum to a multiple of 3.
/// let oracle = FnOracle::new(3, |cards: &[CardId]| {
///     cards.iter().map(|c| c.raw()).sum::<u32>() % 3 == 0
/// });
///
/// assert!(oracle.is_legal_claim(&[CardId(0), CardId(1), CardId(2)]));
/// assert!(!oracle.any_legal_claim_exists(&[CardId(1), CardId(4), CardId(8)]));
/// ```
pub struct FnOracle<F> {
    claim_size: usize,
    predicate: F,
}

impl<F> FnOracle<F>
where
    F: Fn(&[CardId]) -> bool + Send + Sync,
{
    pub fn new(claim_size: usize, predicate: F) -> Self {
        Self { claim_size, predicate }
    }
}

impl<F> SetOracle for FnOracle<F>
where
    F: Fn(&[CardId]) -> bool + Send + Sync,
{
    fn claim_size(&self) -> usize {
        self.claim_size
    }

    fn is_legal_claim(&self, cards: &[CardId]) -> bool {
        cards.len() == self.claim_size && (self.predicate)(cards)
    }
}

impl<F> std::fmt::Debug for FnOracle<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnOracle").field("claim_size", &self.claim_size).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(ids: &[u32]) -> Vec<CardId> {
        ids.iter().copied().map(CardId).collect()
    }

    #[test]
    fn test_advance_enumerates_all_combinations() {
        let mut indices = vec![0, 1, 2];
        let mut count = 1;
        while advance(&mut indices, 5) {
            count += 1;
        }
        assert_eq!(count, 10);
        assert_eq!(indices, vec![2, 3, 4]);
    }

    #[test]
    fn test_find_claims_respects_limit() {
        let oracle = FnOracle::new(2, |_: &[CardId]| true);
        let all = oracle.find_claims(&cards(&[1, 2, 3, 4]), usize::MAX);
        assert_eq!(all.len(), 6);

        let one = oracle.find_claims(&cards(&[1, 2, 3, 4]), 1);
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].as_slice(), &[CardId(1), CardId(2)]);
    }

    #[test]
    fn test_find_claims_too_few_cards() {
        let oracle = FnOracle::new(3, |_: &[CardId]| true);
        assert!(oracle.find_claims(&cards(&[1, 2]), 10).is_empty());
        assert!(!oracle.any_legal_claim_exists(&[]));
    }

    #[test]
    fn test_fn_oracle_checks_size() {
        let oracle = FnOracle::new(3, |_: &[CardId]| true);
        assert!(!oracle.is_legal_claim(&cards(&[1, 2])));
        assert!(oracle.is_legal_claim(&cards(&[1, 2, 3])));
    }

    #[test]
    fn test_any_legal_claim_exists() {
        let oracle = FnOracle::new(3, |c: &[CardId]| c.contains(&CardId(9)));
        assert!(!oracle.any_legal_claim_exists(&cards(&[1, 2, 3, 4])));
        assert!(oracle.any_legal_claim_exists(&cards(&[1, 2, 9])));
    }
}
