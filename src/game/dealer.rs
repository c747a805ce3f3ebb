//! Dealer loop.
//!
//! The dealer owns the deck and is the only thread that places or removes
//! cards. Each round it deals, then judges claims one at a time in the order
//! they were submitted, until the round clock runs out or no legal claim is
//! left to find. The table is then swept back into the deck and dealt again.
//! The game ends when no legal claim exists among all remaining cards.
//!
//! ```text
//! Dealing ──▶ Running ──deadline / stalemate──▶ Reshuffling ──▶ Dealing
//!    │                                                            │
//!    └──── no legal claim left, or terminated ──▶ Finished ◀──────┘
//! ```

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use smallvec::SmallVec;
use tracing::{debug, error, info, warn};

use crate::core::{
    ClaimError, DeckError, GameError, GameRng, PlayerId, PlayerMap, Slot,
};
use crate::deck::Deck;
use crate::oracle::Claim;
use crate::protocol::{Shutdown, Verdict};

use super::clock::{ClockReading, RoundClock};
use super::player::{Player, PlayerHandle, PlayerSummary};
use super::GameContext;

/// Where the dealer loop currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DealerState {
    Dealing,
    Running,
    Reshuffling,
    Finished,
}

/// Final result of a game.
#[derive(Clone, Debug)]
pub struct GameOutcome {
    /// Every player holding the top score, ascending.
    pub winners: Vec<PlayerId>,
    pub scores: PlayerMap<u32>,
    /// One summary per player thread, ascending by player.
    pub players: Vec<PlayerSummary>,
    /// Number of deals.
    pub rounds: u32,
    pub claims_judged: u64,
    /// Cards left in the deck. The table is swept before the game ends, so
    /// these are all the cards still in play.
    pub deck_remaining: usize,
}

struct Seat {
    player: PlayerId,
    thread: JoinHandle<Result<PlayerSummary, GameError>>,
}

/// Dealer loop state. Built on the caller's thread, run on its own.
pub struct Dealer {
    ctx: Arc<GameContext>,
    deck: Deck,
    rng: GameRng,
    clock: RoundClock,
    handles: PlayerMap<PlayerHandle>,
    unseated: Vec<Player>,
    seats: Vec<Seat>,
    shutdown: Shutdown,
    state: DealerState,
    rounds: u32,
    claims_judged: u64,
}

impl Dealer {
    /// Create the dealer and every player. Player threads are started by
    /// `run`.
    pub fn new(ctx: Arc<GameContext>) -> Self {
        let config = &ctx.config;
        let root = GameRng::new(config.seed);

        let mut unseated = Vec::with_capacity(config.player_count());
        let handles = PlayerMap::new(config.player_count(), |id| {
            let rng = root.for_context(&format!("player-{}", id.0));
            let (player, handle) = Player::new(id, config.player_kind(id), Arc::clone(&ctx), rng);
            unseated.push(player);
            handle
        });

        Self {
            deck: Deck::new(config.deck_size),
            rng: root.for_context("deck"),
            clock: RoundClock::from_config(config),
            handles,
            unseated,
            seats: Vec::new(),
            shutdown: Shutdown::new(),
            state: DealerState::Dealing,
            rounds: 0,
            claims_judged: 0,
            ctx,
        }
    }

    #[must_use]
    pub fn handles(&self) -> &PlayerMap<PlayerHandle> {
        &self.handles
    }

    /// Signal observed by the dealer loop. Pair a trigger with
    /// `ClaimQueue::interrupt` to stop a dealer blocked in a poll.
    #[must_use]
    pub fn shutdown(&self) -> Shutdown {
        self.shutdown.clone()
    }

    #[must_use]
    pub fn state(&self) -> DealerState {
        self.state
    }

    /// Play until the cards run out or termination is requested.
    ///
    /// Players are always torn down before this returns. An error from the
    /// dealer loop wins over errors reported by player threads.
    pub fn run(mut self) -> Result<GameOutcome, GameError> {
        info!(
            players = self.handles.player_count(),
            deck = self.deck.len(),
            seed = self.ctx.config.seed,
            "dealer thread starting"
        );

        let played = self.seat_players().and_then(|()| self.play());
        if let Err(err) = &played {
            error!(%err, "dealer loop aborted");
        }
        let finished = self.finish();

        info!(rounds = self.rounds, claims = self.claims_judged, "dealer thread terminated");
        played?;
        finished
    }

    fn seat_players(&mut self) -> Result<(), GameError> {
        for player in std::mem::take(&mut self.unseated) {
            let id = player.id();
            let name = format!("player-{}", id.0);
            let thread = thread::Builder::new()
                .name(name.clone())
                .spawn(move || player.run())
                .map_err(|source| GameError::Spawn { name, source })?;
            self.seats.push(Seat { player: id, thread });
        }
        Ok(())
    }

    fn play(&mut self) -> Result<(), GameError> {
        loop {
            self.transition(DealerState::Dealing);
            if self.shutdown.is_triggered() {
                return Ok(());
            }
            if !self.deck.has_any_valid_claim(self.ctx.oracle.as_ref(), &[]) {
                info!(remaining = self.deck.len(), "no legal claim left among the remaining cards");
                return Ok(());
            }
            self.deal()?;

            self.transition(DealerState::Running);
            self.run_round()?;

            self.transition(DealerState::Reshuffling);
            self.sweep_table()?;
        }
    }

    fn deal(&mut self) -> Result<(), GameError> {
        self.deck.shuffle(&mut self.rng);
        self.rounds += 1;
        let placed = self.refill()?;
        info!(round = self.rounds, placed, deck = self.deck.len(), "cards dealt");

        let now = Instant::now();
        self.clock.reset(now);
        self.publish_clock(now);
        if self.ctx.config.hints {
            self.log_hints();
        }
        Ok(())
    }

    fn run_round(&mut self) -> Result<(), GameError> {
        let poll_interval = self.ctx.config.poll_interval();
        loop {
            let now = Instant::now();
            if self.shutdown.is_triggered() || self.clock.is_expired(now) {
                return Ok(());
            }

            let wait = self
                .clock
                .until_deadline(now)
                .map_or(poll_interval, |left| left.min(poll_interval));
            if let Some(player) = self.ctx.claims.poll(wait) {
                self.judge(player)?;
            }

            let removed = self.apply_removals()?;
            let placed = self.refill()?;

            let now = Instant::now();
            if removed + placed > 0 {
                self.clock.reset(now);
                if placed > 0 && self.ctx.config.hints {
                    self.log_hints();
                }
            }
            self.publish_clock(now);
            self.check_stalemate(placed, now);
        }
    }

    /// Judge the oldest claim and deliver its verdict.
    fn judge(&mut self, player: PlayerId) -> Result<(), GameError> {
        self.claims_judged += 1;
        let required = self.ctx.config.feature_size;

        let verdict = {
            let mut board = self.ctx.table.lock();
            let held = board.tokens_of(player);
            if held.len() == required {
                let cards: Claim = held.iter().map(|&(_, card)| card).collect();
                if self.ctx.oracle.is_legal_claim(&cards) {
                    for &(slot, _) in &held {
                        board.mark_for_removal(slot)?;
                    }
                    Verdict::Point
                } else {
                    Verdict::Penalty
                }
            } else {
                let err = ClaimError::Incomplete {
                    player,
                    held: held.len(),
                    required,
                };
                warn!(%err, "claim no longer matches the table");
                Verdict::Cancelled
            }
        };

        debug!(%player, %verdict, "claim judged");
        self.deliver(player, verdict);
        Ok(())
    }

    /// Take staged cards off the table. Players whose tokens went with them
    /// lose any claim still waiting in the queue.
    fn apply_removals(&mut self) -> Result<usize, GameError> {
        let mut withdrawn = Vec::new();
        let mut removed = 0;
        {
            let mut board = self.ctx.table.lock();
            for slot in board.consume_removal_marks() {
                let Some(removal) = board.remove_card(slot)? else {
                    continue;
                };
                removed += 1;
                self.ctx.display.remove_card(removal.slot);
                for player in removal.evicted {
                    self.ctx.display.remove_token(player, removal.slot);
                    if self.ctx.claims.withdraw(player) {
                        withdrawn.push(player);
                    }
                }
            }
        }

        for player in withdrawn {
            debug!(%player, "queued claim withdrawn");
            self.deliver(player, Verdict::Cancelled);
        }
        Ok(removed)
    }

    /// Fill empty slots from the deck until either runs out.
    fn refill(&mut self) -> Result<usize, GameError> {
        let mut board = self.ctx.table.lock();
        let mut placed = 0;
        for slot in board.empty_slots() {
            let card = match self.deck.draw() {
                Ok(card) => card,
                Err(DeckError::Exhausted) => break,
            };
            board.place_card(card, slot)?;
            self.ctx.display.place_card(card, slot);
            placed += 1;
        }
        Ok(placed)
    }

    /// Return every card on the table to the deck.
    fn sweep_table(&mut self) -> Result<(), GameError> {
        self.apply_removals()?;

        let mut withdrawn = Vec::new();
        let returned = {
            let mut board = self.ctx.table.lock();
            let removals = board.clear();
            for removal in &removals {
                self.ctx.display.remove_card(removal.slot);
                for &player in &removal.evicted {
                    self.ctx.display.remove_token(player, removal.slot);
                    if self.ctx.claims.withdraw(player) {
                        withdrawn.push(player);
                    }
                }
                self.deck.put_back(removal.card);
            }
            removals.len()
        };

        for player in withdrawn {
            self.deliver(player, Verdict::Cancelled);
        }
        info!(round = self.rounds, returned, deck = self.deck.len(), "table swept");
        Ok(())
    }

    /// End the round early when no legal claim is left on the table and
    /// waiting cannot change that.
    fn check_stalemate(&mut self, placed: usize, now: Instant) {
        if self.clock.is_expired(now) {
            return;
        }
        let cards = self.ctx.table.lock().cards();
        if self.ctx.oracle.any_legal_claim_exists(&cards) {
            return;
        }

        let deck_spent = self.deck.is_empty() && placed == 0;
        if deck_spent || self.clock.mode().ends_on_stalemate() {
            info!(round = self.rounds, on_table = cards.len(), "no legal claim on the table");
            self.clock.collapse(now);
        }
    }

    fn publish_clock(&self, now: Instant) {
        match self.clock.reading(now) {
            ClockReading::Remaining { remaining, warning } => {
                self.ctx.display.set_countdown(remaining, warning);
            }
            ClockReading::Elapsed(elapsed) => self.ctx.display.set_elapsed(elapsed),
            ClockReading::Off => {}
        }
    }

    fn log_hints(&self) {
        let board = self.ctx.table.lock();
        let cards = board.cards();
        for claim in self.ctx.oracle.find_claims(&cards, usize::MAX) {
            let slots: SmallVec<[Slot; 3]> = claim.iter().filter_map(|&card| board.slot_of(card)).collect();
            info!(slots = ?slots.as_slice(), cards = ?claim.as_slice(), "hint");
        }
    }

    fn deliver(&self, player: PlayerId, verdict: Verdict) {
        match self.handles.get(player) {
            Some(handle) => {
                handle.deliver(verdict);
            }
            None => warn!(%player, "verdict for unknown player dropped"),
        }
    }

    fn finish(&mut self) -> Result<GameOutcome, GameError> {
        self.transition(DealerState::Finished);

        for player in self.ctx.claims.close() {
            self.deliver(player, Verdict::Cancelled);
        }

        let mut players = Vec::with_capacity(self.seats.len());
        let mut failure = None;
        for seat in self.seats.drain(..).rev() {
            if let Some(handle) = self.handles.get(seat.player) {
                handle.terminate();
            }
            match seat.thread.join() {
                Ok(Ok(summary)) => players.push(summary),
                Ok(Err(err)) => {
                    failure.get_or_insert(err);
                }
                Err(_) => {
                    error!(player = %seat.player, "player thread panicked");
                    failure.get_or_insert(GameError::ThreadPanicked(format!("player-{}", seat.player.0)));
                }
            }
        }
        players.reverse();

        let scores = self.handles.map(|_, handle| handle.score());
        let winners = winners(&scores);
        self.ctx.display.announce_winners(&winners);
        info!(winners = ?winners, rounds = self.rounds, "game over");

        // Cut short by `GameHandle::terminate`.
        self.shutdown.wait_timeout(self.ctx.config.end_game_pause());
        self.shutdown.trigger();

        if let Some(err) = failure {
            return Err(err);
        }
        Ok(GameOutcome {
            winners,
            scores,
            players,
            rounds: self.rounds,
            claims_judged: self.claims_judged,
            deck_remaining: self.deck.len(),
        })
    }

    fn transition(&mut self, next: DealerState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "dealer state");
            self.state = next;
        }
    }
}

/// Every player holding the top score.
fn winners(scores: &PlayerMap<u32>) -> Vec<PlayerId> {
    let best = scores.iter().map(|(_, &score)| score).max().unwrap_or(0);
    scores
        .iter()
        .filter(|&(_, &score)| score == best)
        .map(|(player, _)| player)
        .collect()
}
