//! Shared board state.
//!
//! - `Board`: slot↔card mapping, token sets, removal marks
//! - `Table`: the board behind a single lock, shared by dealer and players

mod state;
mod table;

pub use state::{Board, Removal};
pub use table::Table;
