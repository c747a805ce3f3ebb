//! Player loop.
//!
//! A player turns slot presses into token toggles on the shared table. When
//! a toggle completes a claim it posts its id to the dealer's claim queue
//! and blocks on its private verdict slot, then applies the verdict: a point
//! and its freeze, a penalty freeze, or nothing for a cancelled claim.
//!
//! ```text
//! Idle ──claim──▶ AwaitingVerdict ──Point/Penalty──▶ Frozen ──▶ Idle
//!   │                  │ Cancelled ───────────────────────────▶ Idle
//!   └── shutdown ──────┴──────────────────────────────────────▶ Terminated
//! ```
//!
//! Tokens of a penalized claim stay on the table; the player takes them back
//! by pressing the same slots again.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::core::{BoardError, GameError, GameRng, PlayerId, PlayerKind, Slot};
use crate::protocol::{
    action_queue, verdict_channel, ActionReceiver, ActionSender, Shutdown, Verdict, VerdictReceiver,
    VerdictSender,
};

use super::computer::spawn_generator;
use super::GameContext;

/// Where a player's loop currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    AwaitingVerdict,
    Frozen,
    Terminated,
}

/// Tally returned when a player thread exits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub player: PlayerId,
    pub score: u32,
    /// Claims submitted to the dealer.
    pub claims: u32,
    pub points: u32,
    pub penalties: u32,
    pub cancelled: u32,
}

impl PlayerSummary {
    #[must_use]
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            score: 0,
            claims: 0,
            points: 0,
            penalties: 0,
            cancelled: 0,
        }
    }

    /// Verdicts observed, one per submitted claim.
    #[must_use]
    pub fn verdicts(&self) -> u32 {
        self.points + self.penalties + self.cancelled
    }
}

/// Shared view of a player used by the dealer and by input sources.
#[derive(Clone, Debug)]
pub struct PlayerHandle {
    id: PlayerId,
    kind: PlayerKind,
    score: Arc<AtomicU32>,
    actions: ActionSender,
    verdicts: VerdictSender,
    shutdown: Shutdown,
}

impl PlayerHandle {
    #[must_use]
    pub fn id(&self) -> PlayerId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> PlayerKind {
        self.kind
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score.load(Ordering::Acquire)
    }

    /// Queue a slot press for this player, blocking while its queue is full.
    /// Returns `false` once the player is terminated.
    pub fn key_pressed(&self, slot: Slot) -> bool {
        self.actions.press(slot)
    }

    /// Ask the player to stop. Wakes every wait the player or its
    /// generator is blocked in.
    pub fn terminate(&self) {
        self.shutdown.trigger();
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.shutdown.is_triggered()
    }

    pub(crate) fn deliver(&self, verdict: Verdict) -> bool {
        self.verdicts.deliver(verdict)
    }
}

/// Player loop state, moved onto the player's thread by `run`.
pub struct Player {
    id: PlayerId,
    kind: PlayerKind,
    ctx: Arc<GameContext>,
    actions: ActionReceiver,
    verdicts: VerdictReceiver,
    handle: PlayerHandle,
    rng: GameRng,
    state: PlayerState,
    summary: PlayerSummary,
}

impl Player {
    /// Create a player and the handle others use to reach it.
    ///
    /// `rng` drives the synthetic presses of a computer player and is unused
    /// for humans.
    pub fn new(id: PlayerId, kind: PlayerKind, ctx: Arc<GameContext>, rng: GameRng) -> (Self, PlayerHandle) {
        let shutdown = Shutdown::new();
        let (action_tx, action_rx) = action_queue(ctx.config.feature_size, shutdown.clone());
        let (verdict_tx, verdict_rx) = verdict_channel();

        let handle = PlayerHandle {
            id,
            kind,
            score: Arc::new(AtomicU32::new(0)),
            actions: action_tx,
            verdicts: verdict_tx,
            shutdown,
        };
        let player = Self {
            id,
            kind,
            ctx,
            actions: action_rx,
            verdicts: verdict_rx,
            handle: handle.clone(),
            rng,
            state: PlayerState::Idle,
            summary: PlayerSummary::new(id),
        };
        (player, handle)
    }

    #[must_use]
    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Run the loop until terminated.
    ///
    /// A board invariant violation ends the loop with an error; everything
    /// else is part of normal play.
    pub fn run(mut self) -> Result<PlayerSummary, GameError> {
        info!(player = %self.id, kind = ?self.kind, "player thread starting");

        let generator = match self.kind {
            PlayerKind::Computer => {
                let rng = self.rng.fork();
                let generator = spawn_generator(
                    self.id,
                    self.handle.actions.clone(),
                    rng,
                    self.ctx.config.table_size,
                )
                .map_err(|source| GameError::Spawn {
                    name: format!("computer-{}", self.id.0),
                    source,
                })?;
                Some(generator)
            }
            PlayerKind::Human => None,
        };

        let result = self.play();
        if let Err(err) = &result {
            error!(player = %self.id, %err, "player loop aborted");
        }

        // Also stops the generator when the loop bailed out on its own.
        self.handle.terminate();
        if let Some(generator) = generator {
            if generator.join().is_err() {
                warn!(player = %self.id, "generator thread panicked");
            }
        }

        self.transition(PlayerState::Terminated);
        info!(player = %self.id, "player thread terminated");

        result?;
        self.summary.score = self.handle.score();
        Ok(self.summary)
    }

    fn play(&mut self) -> Result<(), GameError> {
        while let Some(slot) = self.actions.next() {
            if !self.toggle(slot)? {
                continue;
            }

            let verdict = self.await_verdict();
            self.apply(verdict);

            if self.kind.is_human() {
                let dropped = self.actions.discard_pending();
                if dropped > 0 {
                    debug!(player = %self.id, dropped, "discarded presses made while waiting");
                }
            }
            self.transition(PlayerState::Idle);
        }
        Ok(())
    }

    /// Toggle this player's token on `slot`. Returns `true` when the toggle
    /// completed a claim.
    fn toggle(&self, slot: Slot) -> Result<bool, BoardError> {
        let feature_size = self.ctx.config.feature_size;
        let mut board = self.ctx.table.lock();

        if board.remove_token(self.id, slot) {
            self.ctx.display.remove_token(self.id, slot);
            return Ok(false);
        }
        if board.card_at(slot).is_none() {
            debug!(player = %self.id, %slot, "press on empty slot ignored");
            return Ok(false);
        }
        if board.token_count(self.id) >= feature_size {
            return Ok(false);
        }

        board.place_token(self.id, slot)?;
        self.ctx.display.place_token(self.id, slot);
        Ok(board.token_count(self.id) == feature_size)
    }

    fn await_verdict(&mut self) -> Verdict {
        self.transition(PlayerState::AwaitingVerdict);
        self.summary.claims += 1;

        if !self.ctx.claims.submit(self.id) {
            debug!(player = %self.id, "claim queue closed");
            return Verdict::Cancelled;
        }
        debug!(player = %self.id, "claim submitted");
        self.verdicts.wait(&self.handle.shutdown)
    }

    fn apply(&mut self, verdict: Verdict) {
        debug!(player = %self.id, %verdict, "verdict received");
        match verdict {
            Verdict::Point => {
                self.summary.points += 1;
                let score = self.handle.score.fetch_add(1, Ordering::AcqRel) + 1;
                self.ctx.display.set_score(self.id, score);
                self.freeze(self.ctx.config.point_freeze());
            }
            Verdict::Penalty => {
                self.summary.penalties += 1;
                self.freeze(self.ctx.config.penalty_freeze());
            }
            Verdict::Cancelled => {
                self.summary.cancelled += 1;
            }
        }
    }

    /// Hold for `duration`, publishing the remaining time once per tick.
    /// Cut short by termination.
    fn freeze(&mut self, duration: Duration) {
        self.transition(PlayerState::Frozen);
        let tick = self.ctx.config.freeze_tick();
        let mut remaining = duration;
        while !remaining.is_zero() {
            self.ctx.display.set_freeze(self.id, remaining);
            let step = remaining.min(tick);
            if self.handle.shutdown.wait_timeout(step) {
                break;
            }
            remaining -= step;
        }
        self.ctx.display.set_freeze(self.id, Duration::ZERO);
    }

    fn transition(&mut self, next: PlayerState) {
        if self.state != next {
            debug!(player = %self.id, from = ?self.state, to = ?next, "player state");
            self.state = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Instant;

    use super::*;
    use crate::core::{CardId, GameConfig};
    use crate::display::{DisplayEvent, EventLog};
    use crate::oracle::FnOracle;

    fn context(log: Arc<EventLog>) -> Arc<GameContext> {
        let config = GameConfig::default()
            .with_geometry(12, 6, 3)
            .with_players(1, 0)
            .with_freezes(Duration::from_millis(30), Duration::from_millis(30));
        let oracle = Arc::new(FnOracle::new(3, |_: &[CardId]| true));
        let ctx = GameContext::new(config, oracle, log).unwrap();
        {
            let mut board = ctx.table.lock();
            for slot in Slot::all(6) {
                board.place_card(CardId(u32::from(slot.0)), slot).unwrap();
            }
        }
        ctx
    }

    fn wait_for(what: &str, mut condition: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !condition() {
            assert!(Instant::now() < deadline, "timed out waiting for {what}");
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn test_toggle_places_and_removes_tokens() {
        let ctx = context(Arc::new(EventLog::new()));
        let (player, _handle) = Player::new(PlayerId(0), PlayerKind::Human, Arc::clone(&ctx), GameRng::new(1));

        assert_eq!(player.toggle(Slot(2)), Ok(false));
        assert!(ctx.table.lock().has_token(PlayerId(0), Slot(2)));
        assert_eq!(player.toggle(Slot(2)), Ok(false));
        assert!(!ctx.table.lock().has_token(PlayerId(0), Slot(2)));

        assert_eq!(player.toggle(Slot(0)), Ok(false));
        assert_eq!(player.toggle(Slot(1)), Ok(false));
        assert_eq!(player.toggle(Slot(3)), Ok(true));

        // A fourth token is ignored.
        assert_eq!(player.toggle(Slot(4)), Ok(false));
        assert_eq!(ctx.table.lock().token_count(PlayerId(0)), 3);
    }

    #[test]
    fn test_press_on_empty_slot_is_ignored() {
        let ctx = context(Arc::new(EventLog::new()));
        ctx.table.lock().remove_card(Slot(5)).unwrap();
        let (player, _handle) = Player::new(PlayerId(0), PlayerKind::Human, Arc::clone(&ctx), GameRng::new(1));

        assert_eq!(player.toggle(Slot(5)), Ok(false));
        assert_eq!(player.toggle(Slot(40)), Ok(false));
        assert_eq!(ctx.table.lock().token_count(PlayerId(0)), 0);
    }

    #[test]
    fn test_point_updates_score_and_freezes() {
        let log = Arc::new(EventLog::new());
        let ctx = context(Arc::clone(&log));
        let (player, handle) = Player::new(PlayerId(0), PlayerKind::Human, Arc::clone(&ctx), GameRng::new(1));
        let thread = thread::spawn(move || player.run());

        for slot in [0, 1, 2] {
            assert!(handle.key_pressed(Slot(slot)));
        }
        wait_for("claim", || ctx.claims.is_pending(PlayerId(0)));
        assert_eq!(ctx.claims.poll(Duration::from_millis(1)), Some(PlayerId(0)));
        assert!(handle.deliver(Verdict::Point));

        wait_for("score", || handle.score() == 1);
        wait_for("freeze end", || {
            log.count(|e| matches!(e, DisplayEvent::Freeze { remaining, .. } if remaining.is_zero())) == 1
        });

        handle.terminate();
        let summary = thread.join().unwrap().unwrap();
        assert_eq!(summary.score, 1);
        assert_eq!(summary.points, 1);
        assert_eq!(summary.verdicts(), summary.claims);
        assert_eq!(log.last_score(PlayerId(0)), Some(1));
    }

    #[test]
    fn test_penalty_leaves_tokens() {
        let log = Arc::new(EventLog::new());
        let ctx = context(Arc::clone(&log));
        let (player, handle) = Player::new(PlayerId(0), PlayerKind::Human, Arc::clone(&ctx), GameRng::new(1));
        let thread = thread::spawn(move || player.run());

        for slot in [3, 4, 5] {
            handle.key_pressed(Slot(slot));
        }
        wait_for("claim", || ctx.claims.is_pending(PlayerId(0)));
        ctx.claims.poll(Duration::from_millis(1));
        handle.deliver(Verdict::Penalty);

        wait_for("freeze end", || {
            log.count(|e| matches!(e, DisplayEvent::Freeze { remaining, .. } if remaining.is_zero())) == 1
        });
        assert_eq!(ctx.table.lock().token_count(PlayerId(0)), 3);

        handle.terminate();
        let summary = thread.join().unwrap().unwrap();
        assert_eq!(summary.score, 0);
        assert_eq!(summary.penalties, 1);
    }

    #[test]
    fn test_closed_queue_cancels_claim() {
        let log = Arc::new(EventLog::new());
        let ctx = context(Arc::clone(&log));
        ctx.claims.close();
        let (player, handle) = Player::new(PlayerId(0), PlayerKind::Human, Arc::clone(&ctx), GameRng::new(1));
        let thread = thread::spawn(move || player.run());

        for slot in [0, 1, 2] {
            handle.key_pressed(Slot(slot));
        }
        wait_for("tokens", || ctx.table.lock().token_count(PlayerId(0)) == 3);
        // Give the loop time to observe the closed queue.
        thread::sleep(Duration::from_millis(20));

        handle.terminate();
        let summary = thread.join().unwrap().unwrap();
        assert_eq!(summary.claims, 1);
        assert_eq!(summary.cancelled, 1);
        assert_eq!(log.count(|e| matches!(e, DisplayEvent::Freeze { .. })), 0);
    }

    #[test]
    fn test_computer_player_terminates_with_generator() {
        let ctx = context(Arc::new(EventLog::new()));
        let (player, handle) = Player::new(PlayerId(0), PlayerKind::Computer, Arc::clone(&ctx), GameRng::new(3));
        let thread = thread::spawn(move || player.run());

        // The generator keeps pressing; claims pile up unanswered.
        wait_for("claim", || ctx.claims.is_pending(PlayerId(0)));

        handle.terminate();
        let summary = thread.join().unwrap().unwrap();
        assert_eq!(summary.claims, 1);
        assert_eq!(summary.cancelled, 1);
        assert!(!handle.key_pressed(Slot(0)));
    }
}
