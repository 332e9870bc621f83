//! SQLite persistence layer for puzzles and attempts.

mod error;
mod models;
mod repository;
mod schema;

pub use error::StoreError;
pub use models::{Attempt, NewAttempt, NewPuzzle, Puzzle};
pub use repository::PuzzleRepository;
