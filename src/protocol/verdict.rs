//! Per-player verdict rendezvous.
//!
//! Each player owns a private single-slot channel. The dealer delivers
//! exactly one `Verdict` per claim request into it; the player blocks on it
//! after submitting. Nothing is broadcast, so no player can observe another
//! player's verdict.

use crossbeam_channel::{bounded, select, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Shutdown;

/// Outcome of a claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// Legal claim: score +1, then the point freeze.
    Point,
    /// Illegal claim: the penalty freeze.
    Penalty,
    /// Not judged: the game ended or the board changed under the claim.
    /// No freeze, no score change.
    Cancelled,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Verdict::Point => "point",
            Verdict::Penalty => "penalty",
            Verdict::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Create a linked sender/receiver pair.
#[must_use]
pub fn verdict_channel() -> (VerdictSender, VerdictReceiver) {
    let (tx, rx) = bounded(1);
    (VerdictSender { tx }, VerdictReceiver { rx })
}

/// Dealer side.
#[derive(Clone, Debug)]
pub struct VerdictSender {
    tx: Sender<Verdict>,
}

impl VerdictSender {
    /// Hand a verdict to the player without blocking.
    ///
    /// Returns `false` if the player is gone, or if an undelivered verdict
    /// is still sitting in the slot (a protocol bug, logged).
    pub fn deliver(&self, verdict: Verdict) -> bool {
        match self.tx.try_send(verdict) {
            Ok(()) => true,
            Err(TrySendError::Full(dropped)) => {
                warn!(%dropped, "verdict slot already full");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Player side.
#[derive(Debug)]
pub struct VerdictReceiver {
    rx: Receiver<Verdict>,
}

impl VerdictReceiver {
    /// Block until a verdict arrives or `shutdown` fires. Shutdown (or a
    /// vanished dealer) reads as `Cancelled`.
    pub fn wait(&self, shutdown: &Shutdown) -> Verdict {
        select! {
            recv(self.rx) -> verdict => verdict.unwrap_or(Verdict::Cancelled),
            recv(shutdown.signal()) -> _ => Verdict::Cancelled,
        }
    }
}
