//! Coordination primitives between the dealer and the players.
//!
//! - `ClaimQueue`: FIFO of claim requests, consumed only by the dealer
//! - `verdict_channel`: per-player single-slot verdict rendezvous
//! - `action_queue`: per-player bounded queue of slot presses
//! - `Shutdown`: stop signal every blocking wait selects on

mod actions;
mod claims;
mod shutdown;
mod verdict;

pub use actions::{action_queue, ActionReceiver, ActionSender};
pub use claims::ClaimQueue;
pub use shutdown::Shutdown;
pub use verdict::{verdict_channel, Verdict, VerdictReceiver, VerdictSender};
