//! Chess rules: board storage, move generation, check detection, move
//! execution and the FEN interchange codec.

pub mod attacks;
pub mod board;
pub mod game;
pub mod movegen;
pub mod notation;
pub mod types;

pub use board::Position;
pub use game::{Game, SelectOutcome, Selection};
pub use movegen::{legal_destinations, legal_moves};
pub use types::*;
