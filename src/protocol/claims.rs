//! Claim request channel.
//!
//! A player that completes a claim posts its id here and waits for a
//! verdict. The dealer is the only consumer and takes requests strictly in
//! submission order, one at a time. Requests can be withdrawn by the dealer
//! when a board change invalidates them before they are judged, and the
//! queue is closed for good when the game ends.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::core::PlayerId;

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<PlayerId>,
    closed: bool,
    interrupted: bool,
}

/// Bounded FIFO of claim requests.
#[derive(Debug)]
pub struct ClaimQueue {
    state: Mutex<QueueState>,
    ready: Condvar,
    space: Condvar,
    capacity: usize,
}

impl ClaimQueue {
    /// Create a queue holding at most `capacity` requests. One slot per
    /// player is enough, since a player waits for its verdict before
    /// claiming again.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            ready: Condvar::new(),
            space: Condvar::new(),
            capacity: capacity.max(1),
        }
    }

    /// Post a request, blocking while the queue is full.
    ///
    /// Returns `false` if the queue is closed; the claim will never be
    /// judged.
    pub fn submit(&self, player: PlayerId) -> bool {
        let mut state = self.state.lock();
        while !state.closed && state.pending.len() >= self.capacity {
            self.space.wait(&mut state);
        }
        if state.closed {
            return false;
        }
        debug_assert!(!state.pending.contains(&player), "{player} submitted twice");
        state.pending.push_back(player);
        self.ready.notify_one();
        true
    }

    /// Take the oldest request, waiting at most `timeout` for one.
    pub fn poll(&self, timeout: Duration) -> Option<PlayerId> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        loop {
            if let Some(player) = state.pending.pop_front() {
                self.space.notify_one();
                return Some(player);
            }
            if std::mem::take(&mut state.interrupted) {
                return None;
            }
            if state.closed || self.ready.wait_until(&mut state, deadline).timed_out() {
                let player = state.pending.pop_front();
                if player.is_some() {
                    self.space.notify_one();
                }
                return player;
            }
        }
    }

    /// Cut the consumer's current `poll` short. A poll that finds no
    /// request after the wakeup returns `None` at once.
    pub fn interrupt(&self) {
        self.state.lock().interrupted = true;
        self.ready.notify_all();
    }

    /// Drop a pending request. Returns `true` if one was queued.
    pub fn withdraw(&self, player: PlayerId) -> bool {
        let mut state = self.state.lock();
        let before = state.pending.len();
        state.pending.retain(|&p| p != player);
        let removed = state.pending.len() != before;
        if removed {
            self.space.notify_one();
        }
        removed
    }

    /// Stop accepting requests and hand back every request still pending.
    pub fn close(&self) -> Vec<PlayerId> {
        let mut state = self.state.lock();
        state.closed = true;
        let pending = state.pending.drain(..).collect();
        self.ready.notify_all();
        self.space.notify_all();
        pending
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a player's request is waiting to be judged.
    #[must_use]
    pub fn is_pending(&self, player: PlayerId) -> bool {
        self.state.lock().pending.contains(&player)
    }
}
